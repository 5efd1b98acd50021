//! The board: owns every entity and runs the per-move update
//!
//! Update order is fixed and later steps depend on earlier ones:
//! 1. Pre-move food check against the current head
//! 2. Snake advance (grows when food was eaten)
//! 3. Food consumption, score, respawn, door activation
//! 4. Bullet pass
//! 5. Head collision (obstacle, self, door)
//! 6. Level transition on door touch

use std::time::Duration;

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bullet::Bullet;
use super::collision::{HeadCollision, Occupancy, check_head, obstacle_at};
use super::door::{Door, required_length_for_level};
use super::food::Food;
use super::grid::{Direction, step};
use super::obstacle::{Obstacle, ObstacleKind};
use super::snake::Snake;
use crate::arena_center;
use crate::consts::{
    BLOCK_BASE_COUNT, BLOCKS_PER_LEVEL, FOOD_REWARD, GRID_SIZE, LEVEL_TIME_LIMIT, SPAWN_ATTEMPTS,
};

/// Why the snake died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Obstacle,
    SelfCollision,
    Timeout,
}

impl DeathCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeathCause::Obstacle => "obstacle",
            DeathCause::SelfCollision => "self_collision",
            DeathCause::Timeout => "timeout",
        }
    }
}

/// Things that happened during an update, drained by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardEvent {
    FoodEaten { cell: IVec2, score: u32, length: usize },
    DoorOpened { cell: IVec2 },
    LevelAdvanced { level: u32 },
    SnakeDied { cause: DeathCause },
    ObstacleDestroyed { cell: IVec2 },
    BulletSpent { cell: IVec2 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleView {
    pub cell: IVec2,
    pub kind: ObstacleKind,
    pub health: i32,
    pub max_health: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletView {
    pub cell: IVec2,
    pub direction: Direction,
}

/// Owned, read-only copy of the board for renderers and recorders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: i32,
    pub height: i32,
    pub level: u32,
    pub score: u32,
    pub remaining_secs: u64,
    /// Head first
    pub snake: Vec<IVec2>,
    pub direction: Direction,
    pub alive: bool,
    pub food: Option<IVec2>,
    pub door: Option<IVec2>,
    pub door_required_length: usize,
    pub obstacles: Vec<ObstacleView>,
    pub bullets: Vec<BulletView>,
}

impl BoardSnapshot {
    pub fn head(&self) -> IVec2 {
        self.snake.first().copied().unwrap_or_default()
    }
}

pub struct Board {
    snake: Snake,
    food: Food,
    door: Door,
    obstacles: Vec<Obstacle>,
    bullets: Vec<Bullet>,
    level: u32,
    score: u32,
    /// Clock reading when the current level started
    level_start: Duration,
    rng: Pcg32,
    events: Vec<BoardEvent>,
}

impl Board {
    /// Fresh level-1 board. `now` is the clock reading used for the level timer.
    pub fn new(seed: u64, now: Duration) -> Self {
        let mut board = Self {
            snake: Snake::new(arena_center(), Direction::Right),
            food: Food::new(),
            door: Door::for_level(1),
            obstacles: Vec::new(),
            bullets: Vec::new(),
            level: 1,
            score: 0,
            level_start: now,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        };
        board.init_level(now);
        board
    }

    /// Reset entities for the current level number
    fn init_level(&mut self, now: Duration) {
        self.snake = Snake::new(arena_center(), Direction::Right);
        self.food = Food::new();
        self.door.reset(required_length_for_level(self.level));
        self.bullets.clear();
        self.generate_obstacles();
        self.spawn_food();
        self.level_start = now;

        log::debug!(
            "Level {} ready: {} obstacles, door at length {}",
            self.level,
            self.obstacles.len(),
            self.door.required_length()
        );
    }

    /// Boundary ring plus a level-scaled number of random blocks
    fn generate_obstacles(&mut self) {
        self.obstacles.clear();

        let last = GRID_SIZE - 1;
        for x in 0..GRID_SIZE {
            self.obstacles.push(Obstacle::boundary(IVec2::new(x, 0)));
            self.obstacles.push(Obstacle::boundary(IVec2::new(x, last)));
        }
        for y in 1..last {
            self.obstacles.push(Obstacle::boundary(IVec2::new(0, y)));
            self.obstacles.push(Obstacle::boundary(IVec2::new(last, y)));
        }

        let count = BLOCK_BASE_COUNT + BLOCKS_PER_LEVEL * self.level;
        for placed in 0..count {
            let Some(cell) = self.find_free_interior_cell() else {
                log::warn!("Only placed {} of {} blocks, no free cells", placed, count);
                break;
            };
            let block = Obstacle::block(cell, &mut self.rng);
            self.obstacles.push(block);
        }
    }

    /// Random free cell away from the boundary ring
    fn find_free_interior_cell(&mut self) -> Option<IVec2> {
        for _ in 0..SPAWN_ATTEMPTS {
            let cell = IVec2::new(
                self.rng.random_range(1..GRID_SIZE - 1),
                self.rng.random_range(1..GRID_SIZE - 1),
            );
            if !self.is_occupied(cell) {
                return Some(cell);
            }
        }
        None
    }

    fn spawn_food(&mut self) {
        let Self {
            snake,
            food,
            door,
            obstacles,
            rng,
            ..
        } = self;

        let occupancy = Occupancy {
            snake,
            food: food.position(),
            door,
            obstacles,
        };
        food.spawn(rng, GRID_SIZE, GRID_SIZE, |cell| occupancy.contains(cell));
    }

    /// Whether any entity holds `cell`. Every spawn search goes through this.
    pub fn is_occupied(&self, cell: IVec2) -> bool {
        Occupancy {
            snake: &self.snake,
            food: self.food.position(),
            door: &self.door,
            obstacles: &self.obstacles,
        }
        .contains(cell)
    }

    /// Queue a direction change on the snake. False if rejected as a reversal.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        self.snake.set_direction(direction)
    }

    /// Spawn a bullet one cell ahead of the head. Rate limiting is the caller's job.
    pub fn shoot_bullet(&mut self, direction: Direction) -> IVec2 {
        let cell = step(self.snake.head(), direction);
        self.bullets.push(Bullet::new(cell, direction));
        cell
    }

    /// One full move: snake, food, door, bullets, collisions, level
    pub fn update(&mut self, now: Duration) {
        if !self.snake.is_alive() {
            return;
        }

        self.restock();

        let ate_food = self.food.is_at(self.snake.head());
        self.snake.advance(ate_food);

        if ate_food {
            self.eat_food();
        }

        self.advance_bullets();

        match check_head(&self.snake, &self.obstacles, &self.door) {
            HeadCollision::Obstacle(index) => {
                log::debug!("Snake hit obstacle at {}", self.obstacles[index].cell);
                self.kill_snake(DeathCause::Obstacle);
            }
            HeadCollision::SelfCollision => self.kill_snake(DeathCause::SelfCollision),
            HeadCollision::Door => self.next_level(now),
            HeadCollision::None => {}
        }
    }

    fn eat_food(&mut self) {
        let cell = self.food.position().unwrap_or_default();
        self.food.consume();
        self.score += FOOD_REWARD;
        self.events.push(BoardEvent::FoodEaten {
            cell,
            score: self.score,
            length: self.snake.len(),
        });

        self.spawn_food();
        self.open_door_if_due();
    }

    fn open_door_if_due(&mut self) {
        if !self.door.should_activate(self.snake.len()) {
            return;
        }
        match self.find_free_interior_cell() {
            Some(door_cell) => {
                self.door.activate(door_cell);
                self.events.push(BoardEvent::DoorOpened { cell: door_cell });
                log::info!("Door opened at {}", door_cell);
            }
            None => log::warn!("No free cell for the door, retrying next move"),
        }
    }

    /// Retry spawns that found no free cell earlier
    fn restock(&mut self) {
        if !self.food.exists() {
            self.spawn_food();
        }
        self.open_door_if_due();
    }

    /// Move every bullet one cell and resolve hits
    ///
    /// A bullet already sitting on an obstacle (fired point-blank) hits it
    /// without moving. Spent bullets and destroyed obstacles are removed
    /// before returning, and missing food is retried on the freed cells.
    pub fn advance_bullets(&mut self) {
        for bullet in &mut self.bullets {
            if !bullet.is_active() {
                continue;
            }

            if let Some(index) = obstacle_at(&self.obstacles, bullet.cell) {
                self.obstacles[index].take_damage(bullet.damage);
                bullet.expire();
                self.events.push(BoardEvent::BulletSpent { cell: bullet.cell });
                continue;
            }

            bullet.advance();

            if bullet.out_of_bounds(GRID_SIZE, GRID_SIZE) {
                bullet.expire();
                continue;
            }

            if let Some(index) = obstacle_at(&self.obstacles, bullet.cell) {
                self.obstacles[index].take_damage(bullet.damage);
                bullet.expire();
                self.events.push(BoardEvent::BulletSpent { cell: bullet.cell });
            }
        }

        self.bullets.retain(Bullet::is_active);

        let before = self.obstacles.len();
        let events = &mut self.events;
        self.obstacles.retain(|obstacle| {
            if obstacle.is_destroyed() {
                events.push(BoardEvent::ObstacleDestroyed {
                    cell: obstacle.cell,
                });
                false
            } else {
                true
            }
        });

        // Destroyed blocks free cells
        if self.obstacles.len() < before {
            self.restock();
        }
    }

    fn kill_snake(&mut self, cause: DeathCause) {
        self.snake.kill();
        self.events.push(BoardEvent::SnakeDied { cause });
        log::info!(
            "Snake died ({}) at level {} with score {}",
            cause.as_str(),
            self.level,
            self.score
        );
    }

    fn next_level(&mut self, now: Duration) {
        self.level += 1;
        self.init_level(now);
        self.events.push(BoardEvent::LevelAdvanced { level: self.level });
        log::info!("Advanced to level {}", self.level);
    }

    /// Time left in the level, zero once the budget is spent
    pub fn remaining_time(&self, now: Duration) -> Duration {
        let elapsed = now.saturating_sub(self.level_start);
        LEVEL_TIME_LIMIT.saturating_sub(elapsed)
    }

    pub fn is_time_up(&self, now: Duration) -> bool {
        self.remaining_time(now).is_zero()
    }

    /// Kill the snake if the level budget is spent. Returns true on a timeout kill.
    pub fn enforce_time_limit(&mut self, now: Duration) -> bool {
        if self.snake.is_alive() && self.is_time_up(now) {
            self.kill_snake(DeathCause::Timeout);
            return true;
        }
        false
    }

    /// Restart the level timer (leaving a level-complete pause)
    pub fn reset_level_clock(&mut self, now: Duration) {
        self.level_start = now;
    }

    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self, now: Duration) -> BoardSnapshot {
        BoardSnapshot {
            width: GRID_SIZE,
            height: GRID_SIZE,
            level: self.level,
            score: self.score,
            remaining_secs: self.remaining_time(now).as_secs(),
            snake: self.snake.body().collect(),
            direction: self.snake.direction(),
            alive: self.snake.is_alive(),
            food: self.food.position(),
            door: self.door.position(),
            door_required_length: self.door.required_length(),
            obstacles: self
                .obstacles
                .iter()
                .map(|o| ObstacleView {
                    cell: o.cell,
                    kind: o.kind,
                    health: o.health(),
                    max_health: o.max_health(),
                })
                .collect(),
            bullets: self
                .bullets
                .iter()
                .map(|b| BulletView {
                    cell: b.cell,
                    direction: b.direction,
                })
                .collect(),
        }
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> &Food {
        &self.food
    }

    pub fn door(&self) -> &Door {
        &self.door
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_snake_alive(&self) -> bool {
        self.snake.is_alive()
    }

    pub fn block_count(&self) -> usize {
        self.obstacles
            .iter()
            .filter(|o| o.kind == ObstacleKind::Block)
            .count()
    }

    /// Remove all destructible blocks, leaving the boundary ring
    #[cfg(test)]
    pub(crate) fn clear_blocks(&mut self) {
        self.obstacles.retain(|o| o.kind == ObstacleKind::Boundary);
    }

    #[cfg(test)]
    pub(crate) fn place_food(&mut self, cell: IVec2) {
        self.food.place(cell);
    }

    #[cfg(test)]
    pub(crate) fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    #[cfg(test)]
    pub(crate) fn open_door_at(&mut self, cell: IVec2) {
        self.door.activate(cell);
    }
}
