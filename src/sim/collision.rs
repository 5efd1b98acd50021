//! Cell occupancy and head collision resolution
//!
//! Everything on the board lives on integer cells, so collision is a matter of
//! asking who holds a cell. The head check runs in a fixed priority order:
//! obstacle, then self, then door. An obstacle hit short-circuits before
//! self-collision is evaluated.

use glam::IVec2;

use super::door::Door;
use super::obstacle::Obstacle;
use super::snake::Snake;

/// Outcome of checking the snake head after a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadCollision {
    None,
    /// Index into the obstacle list
    Obstacle(usize),
    SelfCollision,
    Door,
}

impl HeadCollision {
    pub fn is_fatal(&self) -> bool {
        matches!(self, HeadCollision::Obstacle(_) | HeadCollision::SelfCollision)
    }
}

/// Borrowed view of everything that can hold a cell
pub struct Occupancy<'a> {
    pub snake: &'a Snake,
    pub food: Option<IVec2>,
    pub door: &'a Door,
    pub obstacles: &'a [Obstacle],
}

impl Occupancy<'_> {
    /// Snake, food, visible door or a live obstacle at `cell`
    pub fn contains(&self, cell: IVec2) -> bool {
        self.snake.occupies(cell)
            || self.food == Some(cell)
            || self.door.is_at(cell)
            || obstacle_at(self.obstacles, cell).is_some()
    }
}

/// Index of the live obstacle at `cell`, if any
pub fn obstacle_at(obstacles: &[Obstacle], cell: IVec2) -> Option<usize> {
    obstacles.iter().position(|o| o.is_at(cell))
}

/// Check the post-move head against obstacles, the body and the door
pub fn check_head(snake: &Snake, obstacles: &[Obstacle], door: &Door) -> HeadCollision {
    let head = snake.head();

    if let Some(index) = obstacle_at(obstacles, head) {
        return HeadCollision::Obstacle(index);
    }

    if snake.self_collision() {
        return HeadCollision::SelfCollision;
    }

    if door.touched(head) {
        return HeadCollision::Door;
    }

    HeadCollision::None
}
