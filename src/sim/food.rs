//! Food pellet

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::SPAWN_ATTEMPTS;

/// A single food cell. Absent until a spawn search succeeds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Food {
    position: Option<IVec2>,
    exists: bool,
}

impl Food {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place food on a random free cell of a `width` x `height` grid.
    ///
    /// Gives up after `SPAWN_ATTEMPTS` samples and leaves the food absent;
    /// the board is considered full and the next spawn call tries again.
    pub fn spawn<R, F>(&mut self, rng: &mut R, width: i32, height: i32, occupied: F) -> bool
    where
        R: Rng,
        F: Fn(IVec2) -> bool,
    {
        for _ in 0..SPAWN_ATTEMPTS {
            let cell = IVec2::new(rng.random_range(0..width), rng.random_range(0..height));
            if !occupied(cell) {
                self.position = Some(cell);
                self.exists = true;
                return true;
            }
        }

        log::warn!(
            "Food spawn gave up after {} attempts, board is full",
            SPAWN_ATTEMPTS
        );
        self.exists = false;
        false
    }

    /// Mark eaten. Score, growth and respawn are the caller's job.
    pub fn consume(&mut self) {
        self.exists = false;
    }

    /// Position of live food, if any
    pub fn position(&self) -> Option<IVec2> {
        if self.exists { self.position } else { None }
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn is_at(&self, cell: IVec2) -> bool {
        self.position() == Some(cell)
    }

    /// Force a position (level design and tests)
    pub fn place(&mut self, cell: IVec2) {
        self.position = Some(cell);
        self.exists = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spawn_avoids_occupied_cells() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut food = Food::new();
        // Only (3, 2) is free
        let free = IVec2::new(3, 2);
        assert!(food.spawn(&mut rng, 4, 4, |cell| cell != free));
        assert_eq!(food.position(), Some(free));
    }

    #[test]
    fn test_spawn_on_full_board_leaves_food_absent() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut food = Food::new();
        food.place(IVec2::new(1, 1));
        assert!(!food.spawn(&mut rng, 4, 4, |_| true));
        assert!(!food.exists());
        assert_eq!(food.position(), None);
    }

    #[test]
    fn test_consume_clears_existence() {
        let mut food = Food::new();
        assert!(!food.exists());
        food.place(IVec2::new(5, 5));
        assert!(food.is_at(IVec2::new(5, 5)));
        food.consume();
        assert!(!food.is_at(IVec2::new(5, 5)));
    }
}
