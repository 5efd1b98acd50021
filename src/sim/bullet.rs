//! Projectiles fired by the snake

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::grid::{Direction, step};
use crate::consts::BULLET_DAMAGE;
use crate::in_bounds;

/// Travels one cell per bullet pass in a fixed direction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub cell: IVec2,
    pub direction: Direction,
    pub damage: i32,
    active: bool,
}

impl Bullet {
    pub fn new(cell: IVec2, direction: Direction) -> Self {
        Self::with_damage(cell, direction, BULLET_DAMAGE)
    }

    pub fn with_damage(cell: IVec2, direction: Direction, damage: i32) -> Self {
        Self {
            cell,
            direction,
            damage,
            active: true,
        }
    }

    pub fn advance(&mut self) {
        if self.active {
            self.cell = step(self.cell, self.direction);
        }
    }

    pub fn out_of_bounds(&self, width: i32, height: i32) -> bool {
        !in_bounds(self.cell, width, height)
    }

    pub fn expire(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullet_flies_straight() {
        let mut bullet = Bullet::new(IVec2::new(5, 5), Direction::Up);
        bullet.advance();
        bullet.advance();
        assert_eq!(bullet.cell, IVec2::new(5, 3));
        assert_eq!(bullet.damage, BULLET_DAMAGE);
    }

    #[test]
    fn test_bullet_leaves_grid() {
        let mut bullet = Bullet::new(IVec2::new(3, 0), Direction::Up);
        assert!(!bullet.out_of_bounds(4, 4));
        bullet.advance();
        assert!(bullet.out_of_bounds(4, 4));
    }

    #[test]
    fn test_expired_bullet_is_inert() {
        let mut bullet = Bullet::new(IVec2::new(1, 1), Direction::Right);
        bullet.expire();
        bullet.advance();
        assert_eq!(bullet.cell, IVec2::new(1, 1));
        assert!(!bullet.is_active());
    }
}
