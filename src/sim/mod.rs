//! Deterministic simulation module
//!
//! All gameplay rules live here:
//! - Integer grid cells only
//! - Seeded RNG only
//! - No clock reads: time is passed in by the caller
//! - No rendering, persistence or platform dependencies

pub mod board;
pub mod bullet;
pub mod collision;
pub mod door;
pub mod food;
pub mod grid;
pub mod obstacle;
pub mod snake;

pub use board::{Board, BoardEvent, BoardSnapshot, BulletView, DeathCause, ObstacleView};
pub use bullet::Bullet;
pub use collision::{HeadCollision, Occupancy, check_head};
pub use door::Door;
pub use food::Food;
pub use grid::{Direction, manhattan, step};
pub use obstacle::{Obstacle, ObstacleKind};
pub use snake::Snake;
