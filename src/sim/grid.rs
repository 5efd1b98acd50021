//! Grid directions and cell stepping
//!
//! Cells are `IVec2` with x growing right and y growing down.

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// One of the four axis directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit offset of one step in this direction
    #[inline]
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    #[inline]
    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "u" | "w" => Some(Direction::Up),
            "down" | "s" => Some(Direction::Down),
            "left" | "l" | "a" => Some(Direction::Left),
            "right" | "r" | "d" => Some(Direction::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cell one step away from `cell` in `direction`
#[inline]
pub fn step(cell: IVec2, direction: Direction) -> IVec2 {
    cell + direction.delta()
}

/// Manhattan distance between two cells
#[inline]
pub fn manhattan(a: IVec2, b: IVec2) -> u32 {
    let d = (a - b).abs();
    (d.x + d.y) as u32
}
