//! Snake Arena - a grid arena snake game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, board, collision order)
//! - `engine`: Game state machine, tick cadence, speed curve, cooldowns
//! - `platform`: Clock and command-surface abstraction
//! - `renderer`: Render collaborator and a text renderer
//! - `persistence`: Session/event recording collaborator
//! - `analysis`: Remote behaviour-analysis collaborator
//! - `settings`: Runtime configuration

pub mod analysis;
pub mod engine;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use engine::{Engine, GamePhase, Services};
pub use settings::Settings;

use glam::IVec2;

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Grid is square: GRID_SIZE x GRID_SIZE cells, (0,0) top-left
    pub const GRID_SIZE: i32 = 64;

    /// Default tick cadence (~30 Hz)
    pub const TICK_INTERVAL: Duration = Duration::from_millis(33);
    /// Maximum ticks run per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Time budget per level
    pub const LEVEL_TIME_LIMIT: Duration = Duration::from_secs(180);
    /// Score added per food eaten
    pub const FOOD_REWARD: u32 = 10;
    /// Minimum time between two accepted shots
    pub const SHOOT_COOLDOWN: Duration = Duration::from_millis(1000);
    /// Move interval while sprint is held
    pub const SPRINT_INTERVAL: Duration = Duration::from_millis(30);
    /// Move interval at speed level 1
    pub const BASE_MOVE_INTERVAL_MS: u64 = 100;
    /// Interval between snapshot/telemetry pushes
    pub const SNAPSHOT_INTERVAL: Duration = Duration::from_secs(5);

    /// Snake length at level start
    pub const INITIAL_SNAKE_LENGTH: usize = 3;
    /// Random placement attempts before a spawn search gives up
    pub const SPAWN_ATTEMPTS: u32 = 1000;
    /// Boundary walls are effectively indestructible
    pub const BOUNDARY_HEALTH: i32 = 9999;
    /// Destructible block health range (inclusive)
    pub const BLOCK_HEALTH_MIN: i32 = 1;
    pub const BLOCK_HEALTH_MAX: i32 = 3;
    /// Default bullet damage
    pub const BULLET_DAMAGE: i32 = 1;

    /// Door threshold: DOOR_BASE_LENGTH + DOOR_LENGTH_PER_LEVEL * level
    pub const DOOR_BASE_LENGTH: usize = 8;
    pub const DOOR_LENGTH_PER_LEVEL: usize = 2;
    /// Block count: BLOCK_BASE_COUNT + BLOCKS_PER_LEVEL * level
    pub const BLOCK_BASE_COUNT: u32 = 5;
    pub const BLOCKS_PER_LEVEL: u32 = 3;
}

/// Whether a cell lies inside a `width` x `height` grid
#[inline]
pub fn in_bounds(cell: IVec2, width: i32, height: i32) -> bool {
    cell.x >= 0 && cell.x < width && cell.y >= 0 && cell.y < height
}

/// Whether a cell lies inside the fixed arena
#[inline]
pub fn in_arena(cell: IVec2) -> bool {
    in_bounds(cell, consts::GRID_SIZE, consts::GRID_SIZE)
}

/// Center cell of the arena
#[inline]
pub fn arena_center() -> IVec2 {
    IVec2::splat(consts::GRID_SIZE / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_bounds_edges() {
        assert!(in_bounds(IVec2::new(0, 0), 4, 4));
        assert!(in_bounds(IVec2::new(3, 3), 4, 4));
        assert!(!in_bounds(IVec2::new(4, 0), 4, 4));
        assert!(!in_bounds(IVec2::new(0, -1), 4, 4));
    }

    #[test]
    fn test_arena_center() {
        assert_eq!(arena_center(), IVec2::new(32, 32));
        assert!(in_arena(arena_center()));
    }
}
