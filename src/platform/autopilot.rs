//! Demo steering
//!
//! Greedy: head toward the open door, else the food, never into a cell that
//! is solid right now. Not meant to be good, just to keep a headless run
//! alive long enough to exercise every system.

use glam::IVec2;

use super::input::Command;
use crate::sim::collision::obstacle_at;
use crate::sim::{Board, Direction, ObstacleKind, manhattan, step};

/// How far ahead a block must be to be worth a shot
const SIGHT_RANGE: i32 = 6;

fn target(board: &Board) -> Option<IVec2> {
    board.door().position().or(board.food().position())
}

fn is_blocked(board: &Board, cell: IVec2) -> bool {
    let snake = board.snake();
    // The tail moves out of the way on the same step
    let body_hit = snake.body().take(snake.len().saturating_sub(1)).any(|c| c == cell);
    body_hit || obstacle_at(board.obstacles(), cell).is_some()
}

/// Turn to issue, if the best direction differs from the queued one
pub fn steer(board: &Board) -> Option<Command> {
    let snake = board.snake();
    if !snake.is_alive() {
        return None;
    }

    let head = snake.head();
    let current = snake.direction();
    let goal = target(board).unwrap_or(crate::arena_center());

    let best = Direction::ALL
        .into_iter()
        .filter(|d| !d.is_opposite(current))
        .filter(|d| !is_blocked(board, step(head, *d)))
        .min_by_key(|d| {
            let distance = manhattan(step(head, *d), goal);
            // Prefer going straight on ties
            (distance, *d != current)
        })?;

    if best == snake.pending_direction() {
        None
    } else {
        Some(Command::Move(best))
    }
}

/// Shoot at a block sitting straight ahead within sight
pub fn aim(board: &Board) -> Option<Command> {
    let snake = board.snake();
    let direction = snake.direction();
    let mut cell = snake.head();

    for _ in 0..SIGHT_RANGE {
        cell = step(cell, direction);
        if let Some(index) = obstacle_at(board.obstacles(), cell) {
            return match board.obstacles()[index].kind {
                ObstacleKind::Block => Some(Command::Shoot(direction)),
                ObstacleKind::Boundary => None,
            };
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Obstacle;
    use std::time::Duration;

    fn board_with_food(food: IVec2) -> Board {
        let mut board = Board::new(5, Duration::ZERO);
        board.clear_blocks();
        board.place_food(food);
        board
    }

    #[test]
    fn test_turns_toward_food() {
        let board = board_with_food(IVec2::new(32, 10));
        assert_eq!(steer(&board), Some(Command::Move(Direction::Up)));
    }

    #[test]
    fn test_keeps_course_when_aligned() {
        let board = board_with_food(IVec2::new(50, 32));
        assert_eq!(steer(&board), None);
    }

    #[test]
    fn test_avoids_obstacle_ahead() {
        let mut board = board_with_food(IVec2::new(50, 32));
        board.add_obstacle(Obstacle::with_health(
            IVec2::new(33, 32),
            ObstacleKind::Block,
            1,
        ));
        let turn = steer(&board);
        assert!(matches!(
            turn,
            Some(Command::Move(Direction::Up)) | Some(Command::Move(Direction::Down))
        ));
    }

    #[test]
    fn test_aims_at_blocks_not_walls() {
        let mut board = board_with_food(IVec2::new(5, 5));
        assert_eq!(aim(&board), None);

        board.add_obstacle(Obstacle::with_health(
            IVec2::new(35, 32),
            ObstacleKind::Block,
            1,
        ));
        assert_eq!(aim(&board), Some(Command::Shoot(Direction::Right)));
    }
}
