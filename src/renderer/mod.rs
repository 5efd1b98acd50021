//! Render collaborator
//!
//! The engine pushes an owned `BoardSnapshot` once per tick and sets or clears
//! a banner overlay on state changes. Renderers never touch the board.

pub mod text;

use serde::{Deserialize, Serialize};

use crate::sim::BoardSnapshot;

pub use text::TextRenderer;

/// RGBA color, components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_array(c: [f32; 4]) -> Self {
        Self::rgba(c[0], c[1], c[2], c[3])
    }
}

/// Banner colors
pub mod colors {
    use super::Color;

    pub const OVERLAY_INFO: Color = Color::from_array([1.0, 1.0, 1.0, 1.0]);
    pub const OVERLAY_DANGER: Color = Color::from_array([1.0, 0.25, 0.25, 1.0]);
    pub const OVERLAY_SUCCESS: Color = Color::from_array([0.3, 1.0, 0.5, 1.0]);
}

/// Frame sink. Called from the tick thread; implementations must not block.
pub trait Renderer: Send + Sync {
    fn render(&self, snapshot: &BoardSnapshot);
    fn set_overlay(&self, text: &str, color: Color);
    fn clear_overlay(&self);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&self, _snapshot: &BoardSnapshot) {}
    fn set_overlay(&self, _text: &str, _color: Color) {}
    fn clear_overlay(&self) {}
}
