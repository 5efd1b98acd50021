//! Obstacles: the boundary ring and destructible blocks

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{BLOCK_HEALTH_MAX, BLOCK_HEALTH_MIN, BOUNDARY_HEALTH};

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Arena wall, health high enough to never break in play
    Boundary,
    /// Breakable block with 1-3 health
    Block,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub cell: IVec2,
    pub kind: ObstacleKind,
    health: i32,
    max_health: i32,
    destroyed: bool,
}

impl Obstacle {
    pub fn boundary(cell: IVec2) -> Self {
        Self::with_health(cell, ObstacleKind::Boundary, BOUNDARY_HEALTH)
    }

    /// Block with random health
    pub fn block<R: Rng>(cell: IVec2, rng: &mut R) -> Self {
        let health = rng.random_range(BLOCK_HEALTH_MIN..=BLOCK_HEALTH_MAX);
        Self::with_health(cell, ObstacleKind::Block, health)
    }

    pub fn with_health(cell: IVec2, kind: ObstacleKind, health: i32) -> Self {
        Self {
            cell,
            kind,
            health,
            max_health: health,
            destroyed: false,
        }
    }

    /// Apply damage. Returns whether the obstacle is now destroyed.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.destroyed {
            return true;
        }

        self.health -= amount;
        if self.health <= 0 {
            self.destroyed = true;
        }
        self.destroyed
    }

    /// Solid at `cell` (destroyed obstacles occupy nothing)
    pub fn is_at(&self, cell: IVec2) -> bool {
        !self.destroyed && self.cell == cell
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
