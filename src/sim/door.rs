//! Level exit door
//!
//! Hidden until the snake is long enough, then placed once and left in place
//! for the rest of the level.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::{DOOR_BASE_LENGTH, DOOR_LENGTH_PER_LEVEL};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Door {
    position: Option<IVec2>,
    visible: bool,
    required_length: usize,
}

impl Door {
    pub fn new(required_length: usize) -> Self {
        Self {
            position: None,
            visible: false,
            required_length,
        }
    }

    /// Door for a given level number
    pub fn for_level(level: u32) -> Self {
        Self::new(required_length_for_level(level))
    }

    pub fn should_activate(&self, snake_length: usize) -> bool {
        !self.visible && snake_length >= self.required_length
    }

    /// Reveal the door at `cell`. Ignored once already visible.
    pub fn activate(&mut self, cell: IVec2) {
        if self.visible {
            return;
        }
        self.position = Some(cell);
        self.visible = true;
    }

    pub fn touched(&self, head: IVec2) -> bool {
        self.is_at(head)
    }

    pub fn is_at(&self, cell: IVec2) -> bool {
        self.visible && self.position == Some(cell)
    }

    /// Hide and clear position for a new level
    pub fn reset(&mut self, required_length: usize) {
        self.required_length = required_length;
        self.visible = false;
        self.position = None;
    }

    pub fn position(&self) -> Option<IVec2> {
        if self.visible { self.position } else { None }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn required_length(&self) -> usize {
        self.required_length
    }
}

/// Snake length needed to open the door on `level`
pub fn required_length_for_level(level: u32) -> usize {
    DOOR_BASE_LENGTH + DOOR_LENGTH_PER_LEVEL * level as usize
}
