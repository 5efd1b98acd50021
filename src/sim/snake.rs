//! The player's snake
//!
//! Body is head-first. Direction changes are queued and only committed on the
//! next advance, so two quick turns inside one move interval can never fold
//! the head back onto the neck.

use std::collections::VecDeque;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::grid::{Direction, step};
use crate::consts::INITIAL_SNAKE_LENGTH;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snake {
    /// Body cells, head at the front
    body: VecDeque<IVec2>,
    direction: Direction,
    /// Applied on the next advance
    pending: Direction,
    alive: bool,
}

impl Snake {
    /// Create a snake with its head at `head`, body trailing opposite `direction`
    pub fn new(head: IVec2, direction: Direction) -> Self {
        let back = direction.opposite().delta();
        let body = (0..INITIAL_SNAKE_LENGTH as i32)
            .map(|i| head + back * i)
            .collect();
        Self {
            body,
            direction,
            pending: direction,
            alive: true,
        }
    }

    /// Queue a direction change. Returns false if rejected as a 180° turn.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if self.direction.is_opposite(direction) {
            return false;
        }
        self.pending = direction;
        true
    }

    /// Move one cell, keeping the tail when `grow` is set
    pub fn advance(&mut self, grow: bool) {
        if !self.alive {
            return;
        }

        self.direction = self.pending;
        let head = step(self.head(), self.direction);
        self.body.push_front(head);

        if !grow {
            self.body.pop_back();
        }
    }

    /// Head overlaps any other body cell
    pub fn self_collision(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|&cell| cell == head)
    }

    pub fn occupies(&self, cell: IVec2) -> bool {
        self.body.contains(&cell)
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn head(&self) -> IVec2 {
        // Body never drops below INITIAL_SNAKE_LENGTH cells
        self.body.front().copied().unwrap_or_default()
    }

    pub fn tail(&self) -> IVec2 {
        self.body.back().copied().unwrap_or_default()
    }

    pub fn body(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.body.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_direction(&self) -> Direction {
        self.pending
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }
}
