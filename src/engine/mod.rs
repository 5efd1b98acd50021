//! Game engine: phase machine, tick cadence, speed and cooldowns
//!
//! The engine owns the board and is the only thing that mutates it. Hosts
//! feed it commands and frame time; it calls out to the render, persistence
//! and analysis collaborators, none of which can stall a tick.

pub mod scheduler;
pub mod speed;

use std::sync::Arc;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, Analyzer, TelemetryFrame};
use crate::consts::{SHOOT_COOLDOWN, SNAPSHOT_INTERVAL, SPRINT_INTERVAL};
use crate::persistence::{EndReason, NullRecorder, Recorder, SessionId, SnapshotRecord};
use crate::platform::{Clock, Command};
use crate::renderer::{NullRenderer, Renderer, colors};
use crate::sim::{Board, BoardEvent, BoardSnapshot, DeathCause, Direction};

pub use scheduler::FixedScheduler;
pub use speed::{move_interval, move_interval_ms};

/// Top-level game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Board built, waiting for the first start command
    Ready,
    /// Ticks are running
    Running,
    /// Player paused
    Paused,
    /// Snake died or the level timer ran out
    GameOver,
    /// Door reached, waiting for acknowledgement
    LevelComplete,
}

/// Outcome of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Ack,
    /// Not applicable in the current phase, or rejected (reversal, cooldown)
    Ignored,
    SpeedLevel(u32),
    MoveInterval(Duration),
}

impl Response {
    fn from_accepted(accepted: bool) -> Self {
        if accepted {
            Response::Ack
        } else {
            Response::Ignored
        }
    }
}

/// Collaborators the engine calls into
#[derive(Clone)]
pub struct Services {
    pub clock: Arc<dyn Clock>,
    pub renderer: Arc<dyn Renderer>,
    pub recorder: Arc<dyn Recorder>,
    pub analyzer: Option<Arc<dyn Analyzer>>,
}

impl Services {
    /// No rendering, no recording, no analysis
    pub fn headless(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            renderer: Arc::new(NullRenderer),
            recorder: Arc::new(NullRecorder),
            analyzer: None,
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_recorder(mut self, recorder: Arc<dyn Recorder>) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }
}

pub struct Engine {
    board: Board,
    phase: GamePhase,
    scheduler: FixedScheduler,
    services: Services,
    /// Seeds each new board
    rng: Pcg32,
    speed_level: u32,
    sprinting: bool,
    /// Time accumulated toward the next snake move
    move_accumulator: Duration,
    last_shot: Option<Duration>,
    last_snapshot: Duration,
    session: Option<SessionId>,
    /// Telemetry frames sent so far
    data_points: u32,
}

impl Engine {
    pub fn new(seed: u64, tick_interval: Duration, services: Services) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let now = services.clock.now();
        let board = Board::new(rng.random(), now);

        let engine = Self {
            board,
            phase: GamePhase::Ready,
            scheduler: FixedScheduler::new(tick_interval),
            services,
            rng,
            speed_level: 1,
            sprinting: false,
            move_accumulator: Duration::ZERO,
            last_shot: None,
            last_snapshot: now,
            session: None,
            data_points: 0,
        };
        engine.render(now);
        engine
    }

    /// Apply one command
    pub fn handle(&mut self, command: Command) -> Response {
        match command {
            Command::Move(direction) => Response::from_accepted(self.set_direction(direction)),
            Command::Shoot(direction) => Response::from_accepted(self.shoot(direction)),
            Command::Pause => Response::from_accepted(self.pause()),
            Command::Resume => Response::from_accepted(self.resume()),
            Command::TogglePause => Response::from_accepted(self.toggle_pause()),
            Command::Start => Response::from_accepted(self.start()),
            Command::Restart => Response::from_accepted(self.restart()),
            Command::Continue => Response::from_accepted(self.continue_level()),
            Command::Sprint(on) => {
                self.set_sprint(on);
                Response::Ack
            }
            Command::SetSpeedLevel(level) => Response::from_accepted(self.set_speed_level(level)),
            Command::QuerySpeedLevel => Response::SpeedLevel(self.speed_level),
            Command::QueryDelay => Response::MoveInterval(self.effective_move_interval()),
        }
    }

    // === Phase transitions ===

    fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            log::info!("Phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    /// Start a game, continue a finished level or resume from pause
    pub fn start(&mut self) -> bool {
        match self.phase {
            GamePhase::Ready | GamePhase::GameOver => {
                self.new_game();
                true
            }
            GamePhase::LevelComplete => self.continue_level(),
            GamePhase::Paused => self.resume(),
            GamePhase::Running => false,
        }
    }

    /// Throw away the current board and start over
    pub fn restart(&mut self) -> bool {
        self.end_session(EndReason::Restart);
        self.new_game();
        true
    }

    fn new_game(&mut self) {
        let now = self.services.clock.now();
        self.board = Board::new(self.rng.random(), now);
        self.move_accumulator = Duration::ZERO;
        self.last_shot = None;
        self.last_snapshot = now;
        self.session = Some(self.services.recorder.start_session());

        self.set_phase(GamePhase::Running);
        self.services.renderer.clear_overlay();
        self.scheduler.start();
        self.render(now);
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        self.set_phase(GamePhase::Paused);
        self.scheduler.stop();
        self.services
            .renderer
            .set_overlay("PAUSED", colors::OVERLAY_INFO);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            return false;
        }
        self.set_phase(GamePhase::Running);
        self.services.renderer.clear_overlay();
        self.scheduler.start();
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            GamePhase::Running => self.pause(),
            GamePhase::Paused => self.resume(),
            _ => false,
        }
    }

    /// Acknowledge a completed level and start its timer
    pub fn continue_level(&mut self) -> bool {
        if self.phase != GamePhase::LevelComplete {
            return false;
        }
        let now = self.services.clock.now();
        self.board.reset_level_clock(now);
        self.move_accumulator = Duration::ZERO;

        self.set_phase(GamePhase::Running);
        self.services.renderer.clear_overlay();
        self.scheduler.start();
        self.render(now);
        true
    }

    fn enter_game_over(&mut self, cause: DeathCause) {
        self.set_phase(GamePhase::GameOver);
        self.scheduler.stop();

        let (banner, reason) = match cause {
            DeathCause::Timeout => ("TIME UP", EndReason::Timeout),
            DeathCause::Obstacle | DeathCause::SelfCollision => ("GAME OVER", EndReason::Collision),
        };
        self.services
            .renderer
            .set_overlay(banner, colors::OVERLAY_DANGER);
        self.end_session(reason);
    }

    fn enter_level_complete(&mut self, level: u32) {
        self.set_phase(GamePhase::LevelComplete);
        self.scheduler.stop();
        self.move_accumulator = Duration::ZERO;
        self.services
            .renderer
            .set_overlay(&format!("LEVEL {}", level), colors::OVERLAY_SUCCESS);
    }

    /// End any open session
    pub fn shutdown(&mut self) {
        self.scheduler.stop();
        self.end_session(EndReason::Shutdown);
    }

    fn end_session(&mut self, reason: EndReason) {
        if let Some(session) = self.session.take() {
            log::info!(
                "Session {} ended ({:?}): score {}, level {}",
                session,
                reason,
                self.board.score(),
                self.board.level()
            );
            self.services.recorder.end_session(
                &session,
                self.board.score(),
                self.board.level(),
                reason,
            );
        }
    }

    // === Player intents ===

    /// Queue a turn. Rejected outside Running or as a reversal.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if self.phase != GamePhase::Running || !self.board.set_direction(direction) {
            return false;
        }
        if let Some(session) = &self.session {
            self.services.recorder.record_action(
                session,
                "direction_change",
                self.board.snake().head(),
                direction.as_str(),
            );
        }
        true
    }

    /// Fire if running and off cooldown. Rejected shots are dropped.
    pub fn shoot(&mut self, direction: Direction) -> bool {
        if self.phase != GamePhase::Running || !self.can_shoot() {
            return false;
        }
        let cell = self.board.shoot_bullet(direction);
        self.last_shot = Some(self.services.clock.now());
        if let Some(session) = &self.session {
            self.services
                .recorder
                .record_shooting(session, cell, direction);
        }
        true
    }

    pub fn can_shoot(&self) -> bool {
        self.shoot_cooldown_remaining().is_zero()
    }

    pub fn shoot_cooldown_remaining(&self) -> Duration {
        match self.last_shot {
            Some(at) => {
                let since = self.services.clock.now().saturating_sub(at);
                SHOOT_COOLDOWN.saturating_sub(since)
            }
            None => Duration::ZERO,
        }
    }

    pub fn set_sprint(&mut self, on: bool) {
        self.sprinting = on;
    }

    pub fn set_speed_level(&mut self, level: u32) -> bool {
        if level < 1 {
            return false;
        }
        self.speed_level = level;
        self.move_accumulator = Duration::ZERO;
        log::info!(
            "Speed level {} ({} ms per move)",
            level,
            move_interval_ms(level)
        );
        true
    }

    /// Sprint interval while held, else the speed-level interval
    pub fn effective_move_interval(&self) -> Duration {
        if self.sprinting {
            SPRINT_INTERVAL
        } else {
            move_interval(self.speed_level)
        }
    }

    // === Ticking ===

    /// Advance by host frame time. Returns the number of ticks run.
    pub fn update(&mut self, frame_dt: Duration) -> u32 {
        let due = self.scheduler.advance(frame_dt);
        let mut ran = 0;
        for _ in 0..due {
            if self.phase != GamePhase::Running {
                break;
            }
            self.tick();
            ran += 1;
        }
        ran
    }

    /// One scheduler tick: a full board move when enough time has built up,
    /// otherwise only the bullet pass
    pub fn tick(&mut self) {
        if self.phase != GamePhase::Running {
            return;
        }

        let now = self.services.clock.now();
        self.move_accumulator += self.scheduler.interval();

        if self.move_accumulator >= self.effective_move_interval() {
            self.move_accumulator = Duration::ZERO;
            self.board.update(now);
            log::trace!("Move: head {}", self.board.snake().head());
        } else {
            self.board.advance_bullets();
        }

        self.board.enforce_time_limit(now);
        self.process_events();

        if self.phase == GamePhase::Running {
            self.maybe_snapshot(now);
        }
        self.render(now);
    }

    fn process_events(&mut self) {
        for event in self.board.drain_events() {
            match event {
                BoardEvent::FoodEaten {
                    cell,
                    score,
                    length,
                } => {
                    log::debug!("Food at {}: score {}, length {}", cell, score, length);
                    if let Some(session) = &self.session {
                        self.services
                            .recorder
                            .record_food(session, cell, score, length);
                    }
                }
                BoardEvent::LevelAdvanced { level } => self.enter_level_complete(level),
                BoardEvent::SnakeDied { cause } => self.enter_game_over(cause),
                BoardEvent::DoorOpened { .. }
                | BoardEvent::ObstacleDestroyed { .. }
                | BoardEvent::BulletSpent { .. } => log::trace!("{:?}", event),
            }
        }
    }

    fn maybe_snapshot(&mut self, now: Duration) {
        if now.saturating_sub(self.last_snapshot) < SNAPSHOT_INTERVAL {
            return;
        }
        self.last_snapshot = now;

        let head = self.board.snake().head();
        let remaining_secs = self.board.remaining_time(now).as_secs();

        if let Some(session) = &self.session {
            self.services.recorder.record_snapshot(
                session,
                SnapshotRecord {
                    head_x: head.x,
                    head_y: head.y,
                    length: self.board.snake().len(),
                    score: self.board.score(),
                    level: self.board.level(),
                    remaining_secs,
                    obstacle_count: self.board.obstacles().len(),
                },
            );
        }

        if let Some(analyzer) = &self.services.analyzer {
            analyzer.send_state(TelemetryFrame {
                snake_length: self.board.snake().len(),
                score: self.board.score(),
                direction: self.board.snake().direction(),
                position_x: head.x,
                position_y: head.y,
                level: self.board.level(),
                remaining_time: remaining_secs,
            });
            self.data_points += 1;
        }
    }

    fn render(&self, now: Duration) {
        self.services.renderer.render(&self.board.snapshot(now));
    }

    /// Ask the analysis service about everything sent so far
    pub fn request_analysis(&self) -> Option<AnalysisResult> {
        let analyzer = self.services.analyzer.as_ref()?;
        analyzer.request_analysis(self.data_points.max(1))
    }

    // === Queries ===

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.board.snapshot(self.services.clock.now())
    }

    pub fn speed_level(&self) -> u32 {
        self.speed_level
    }

    pub fn is_sprinting(&self) -> bool {
        self.sprinting
    }

    pub fn session(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    pub fn tick_interval(&self) -> Duration {
        self.scheduler.interval()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use glam::IVec2;

    use crate::consts::LEVEL_TIME_LIMIT;
    use crate::persistence::{MemoryRecorder, Record};
    use crate::platform::ManualClock;
    use crate::renderer::TextRenderer;
    use crate::sim::{Obstacle, ObstacleKind};

    #[derive(Default)]
    struct FakeAnalyzer {
        frames: Mutex<Vec<TelemetryFrame>>,
    }

    impl Analyzer for FakeAnalyzer {
        fn ping(&self) -> bool {
            true
        }

        fn send_state(&self, frame: TelemetryFrame) {
            self.frames.lock().unwrap().push(frame);
        }

        fn request_analysis(&self, sample_size: u32) -> Option<AnalysisResult> {
            Some(AnalysisResult {
                personality: "ISTP".into(),
                sample_size,
                ..AnalysisResult::default()
            })
        }
    }

    struct Harness {
        engine: Engine,
        clock: ManualClock,
        recorder: Arc<MemoryRecorder>,
        renderer: Arc<TextRenderer>,
        analyzer: Arc<FakeAnalyzer>,
    }

    impl Harness {
        fn new() -> Self {
            let clock = ManualClock::new();
            let recorder = Arc::new(MemoryRecorder::new());
            let renderer = Arc::new(TextRenderer::new());
            let analyzer = Arc::new(FakeAnalyzer::default());
            let services = Services::headless(Arc::new(clock.clone()))
                .with_renderer(renderer.clone())
                .with_recorder(recorder.clone())
                .with_analyzer(analyzer.clone());
            let engine = Engine::new(1234, Duration::from_millis(33), services);
            Self {
                engine,
                clock,
                recorder,
                renderer,
                analyzer,
            }
        }

        /// Started, no blocks, food parked away from the snake's row
        fn running() -> Self {
            let mut h = Self::new();
            assert!(h.engine.start());
            h.engine.board.clear_blocks();
            h.engine.board.place_food(IVec2::new(5, 5));
            h
        }

        fn head(&self) -> IVec2 {
            self.engine.board().snake().head()
        }

        fn records_matching(&self, f: impl Fn(&Record) -> bool) -> usize {
            self.recorder.records().iter().filter(|r| f(r)).count()
        }
    }

    #[test]
    fn test_ready_ignores_play_commands() {
        let mut h = Harness::new();
        assert_eq!(h.engine.phase(), GamePhase::Ready);
        assert_eq!(h.engine.handle(Command::Move(Direction::Up)), Response::Ignored);
        assert_eq!(h.engine.handle(Command::Shoot(Direction::Up)), Response::Ignored);
        assert_eq!(h.engine.handle(Command::Pause), Response::Ignored);
        assert!(h.engine.board().bullets().is_empty());
        assert!(h.recorder.is_empty());
        // Ready board is still drawn
        assert_eq!(h.renderer.frames_rendered(), 1);
    }

    #[test]
    fn test_start_opens_session() {
        let mut h = Harness::new();
        assert_eq!(h.engine.handle(Command::Start), Response::Ack);
        assert_eq!(h.engine.phase(), GamePhase::Running);
        assert!(h.engine.session().is_some());
        assert_eq!(
            h.records_matching(|r| matches!(r, Record::SessionStart { .. })),
            1
        );
        // Already running
        assert_eq!(h.engine.handle(Command::Start), Response::Ignored);
    }

    #[test]
    fn test_speed_commands() {
        let mut h = Harness::new();
        assert_eq!(
            h.engine.handle(Command::QueryDelay),
            Response::MoveInterval(Duration::from_millis(100))
        );
        assert_eq!(h.engine.handle(Command::SetSpeedLevel(2)), Response::Ack);
        assert_eq!(
            h.engine.handle(Command::QueryDelay),
            Response::MoveInterval(Duration::from_millis(70))
        );
        assert_eq!(h.engine.handle(Command::SetSpeedLevel(11)), Response::Ack);
        assert_eq!(h.engine.handle(Command::QuerySpeedLevel), Response::SpeedLevel(11));
        assert_eq!(
            h.engine.effective_move_interval(),
            Duration::from_millis(47)
        );

        assert_eq!(h.engine.handle(Command::SetSpeedLevel(0)), Response::Ignored);
        assert_eq!(h.engine.speed_level(), 11);

        h.engine.handle(Command::Sprint(true));
        assert_eq!(h.engine.effective_move_interval(), SPRINT_INTERVAL);
        h.engine.handle(Command::Sprint(false));
        assert_eq!(
            h.engine.effective_move_interval(),
            Duration::from_millis(47)
        );
    }

    #[test]
    fn test_shoot_cooldown() {
        let mut h = Harness::running();
        assert!(h.engine.shoot(Direction::Up));
        assert_eq!(h.engine.board().bullets().len(), 1);

        h.clock.advance(Duration::from_millis(500));
        assert!(!h.engine.can_shoot());
        assert_eq!(
            h.engine.shoot_cooldown_remaining(),
            Duration::from_millis(500)
        );
        assert_eq!(h.engine.handle(Command::Shoot(Direction::Up)), Response::Ignored);
        assert_eq!(h.engine.board().bullets().len(), 1);

        h.clock.advance(Duration::from_millis(500));
        assert_eq!(h.engine.handle(Command::Shoot(Direction::Up)), Response::Ack);
        assert_eq!(h.engine.board().bullets().len(), 2);
        assert_eq!(
            h.records_matching(|r| matches!(r, Record::Shooting { .. })),
            2
        );
    }

    #[test]
    fn test_move_waits_for_interval() {
        let mut h = Harness::running();
        let start = h.head();

        // 33 ms ticks against a 100 ms interval: the fourth tick moves
        for _ in 0..3 {
            h.engine.tick();
            assert_eq!(h.head(), start);
        }
        h.engine.tick();
        assert_eq!(h.head(), start + IVec2::X);

        // Accumulator restarted, so three more ticks stay put
        for _ in 0..3 {
            h.engine.tick();
        }
        assert_eq!(h.head(), start + IVec2::X);
    }

    #[test]
    fn test_speed_change_restarts_move_timer() {
        let mut h = Harness::running();
        let start = h.head();
        h.engine.tick();
        h.engine.tick();

        // 70 ms per move from here on, counted from the change
        assert!(h.engine.set_speed_level(2));
        h.engine.tick();
        h.engine.tick();
        assert_eq!(h.head(), start);
        h.engine.tick();
        assert_eq!(h.head(), start + IVec2::X);
    }

    #[test]
    fn test_sprint_moves_every_tick() {
        let mut h = Harness::running();
        let start = h.head();
        h.engine.handle(Command::Sprint(true));
        h.engine.tick();
        h.engine.tick();
        assert_eq!(h.head(), start + IVec2::new(2, 0));
    }

    #[test]
    fn test_bullets_fly_between_moves() {
        let mut h = Harness::running();
        h.engine.shoot(Direction::Up);
        let fired_at = h.engine.board().bullets()[0].cell;
        h.engine.tick();
        assert_eq!(h.engine.board().bullets()[0].cell, fired_at - IVec2::Y);
        // Snake has not moved yet
        assert_eq!(h.head(), IVec2::new(32, 32));
    }

    #[test]
    fn test_update_converts_frame_time_to_ticks() {
        let mut h = Harness::running();
        assert_eq!(h.engine.update(Duration::from_millis(20)), 0);
        assert_eq!(h.engine.update(Duration::from_millis(50)), 2);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut h = Harness::running();
        h.engine.handle(Command::Sprint(true));
        let start = h.head();

        assert_eq!(h.engine.handle(Command::TogglePause), Response::Ack);
        assert_eq!(h.engine.phase(), GamePhase::Paused);
        assert_eq!(h.renderer.overlay().as_deref(), Some("PAUSED"));

        h.engine.tick();
        assert_eq!(h.engine.update(Duration::from_secs(1)), 0);
        assert_eq!(h.head(), start);
        assert_eq!(h.engine.handle(Command::Move(Direction::Up)), Response::Ignored);

        assert_eq!(h.engine.handle(Command::Resume), Response::Ack);
        assert_eq!(h.engine.phase(), GamePhase::Running);
        assert_eq!(h.renderer.overlay(), None);
        h.engine.tick();
        assert_eq!(h.head(), start + IVec2::X);
    }

    #[test]
    fn test_direction_changes_are_recorded_when_accepted() {
        let mut h = Harness::running();
        assert_eq!(h.engine.handle(Command::Move(Direction::Left)), Response::Ignored);
        assert_eq!(h.engine.handle(Command::Move(Direction::Up)), Response::Ack);

        let actions: Vec<_> = h
            .recorder
            .records()
            .into_iter()
            .filter_map(|r| match r {
                Record::Action { kind, extra, .. } => Some((kind, extra)),
                _ => None,
            })
            .collect();
        assert_eq!(actions, vec![("direction_change".to_string(), "UP".to_string())]);
    }

    #[test]
    fn test_collision_ends_game_and_session() {
        let mut h = Harness::running();
        h.engine
            .board
            .add_obstacle(Obstacle::with_health(IVec2::new(33, 32), ObstacleKind::Block, 2));
        h.engine.handle(Command::Sprint(true));
        h.engine.tick();

        assert_eq!(h.engine.phase(), GamePhase::GameOver);
        assert_eq!(h.renderer.overlay().as_deref(), Some("GAME OVER"));
        assert!(h.engine.session().is_none());
        assert_eq!(
            h.records_matching(|r| matches!(
                r,
                Record::SessionEnd {
                    reason: EndReason::Collision,
                    ..
                }
            )),
            1
        );
        assert_eq!(h.engine.handle(Command::Shoot(Direction::Up)), Response::Ignored);
        assert_eq!(h.engine.update(Duration::from_secs(1)), 0);

        // Restart builds a fresh board and a new session
        assert_eq!(h.engine.handle(Command::Restart), Response::Ack);
        assert_eq!(h.engine.phase(), GamePhase::Running);
        assert!(h.engine.board().snake().is_alive());
        assert_eq!(h.engine.board().score(), 0);
        assert_eq!(
            h.records_matching(|r| matches!(r, Record::SessionStart { .. })),
            2
        );
        assert_eq!(h.renderer.overlay(), None);
    }

    #[test]
    fn test_timeout_ends_game() {
        let mut h = Harness::running();
        h.clock.advance(LEVEL_TIME_LIMIT);
        h.engine.tick();

        assert_eq!(h.engine.phase(), GamePhase::GameOver);
        assert_eq!(h.renderer.overlay().as_deref(), Some("TIME UP"));
        assert_eq!(
            h.records_matching(|r| matches!(
                r,
                Record::SessionEnd {
                    reason: EndReason::Timeout,
                    ..
                }
            )),
            1
        );
    }

    #[test]
    fn test_level_complete_and_continue() {
        let mut h = Harness::running();
        h.engine.board.open_door_at(IVec2::new(33, 32));
        h.engine.handle(Command::Sprint(true));
        h.engine.tick();

        assert_eq!(h.engine.phase(), GamePhase::LevelComplete);
        assert_eq!(h.engine.board().level(), 2);
        assert_eq!(h.renderer.overlay().as_deref(), Some("LEVEL 2"));
        // Session carries across levels
        assert!(h.engine.session().is_some());

        let head = h.head();
        h.engine.tick();
        assert_eq!(h.head(), head);

        h.clock.advance(Duration::from_secs(30));
        assert_eq!(h.engine.handle(Command::Continue), Response::Ack);
        assert_eq!(h.engine.phase(), GamePhase::Running);
        assert_eq!(h.renderer.overlay(), None);
        assert_eq!(
            h.engine.board().remaining_time(h.clock.now()),
            LEVEL_TIME_LIMIT
        );
    }

    #[test]
    fn test_start_also_continues_a_level() {
        let mut h = Harness::running();
        h.engine.board.open_door_at(IVec2::new(33, 32));
        h.engine.handle(Command::Sprint(true));
        h.engine.tick();
        assert_eq!(h.engine.handle(Command::Start), Response::Ack);
        assert_eq!(h.engine.phase(), GamePhase::Running);
        assert_eq!(h.engine.board().level(), 2);
    }

    #[test]
    fn test_food_is_recorded() {
        let mut h = Harness::running();
        let head = h.head();
        h.engine.board.place_food(head);
        h.engine.handle(Command::Sprint(true));
        h.engine.tick();

        assert_eq!(h.engine.board().snake().len(), 4);
        assert_eq!(
            h.records_matching(|r| matches!(r, Record::Food { score: 10, length: 4, .. })),
            1
        );
    }

    #[test]
    fn test_snapshots_on_interval() {
        let mut h = Harness::running();
        h.engine.tick();
        assert!(h.analyzer.frames.lock().unwrap().is_empty());

        h.clock.advance(SNAPSHOT_INTERVAL);
        h.engine.tick();
        h.engine.tick();
        assert_eq!(h.analyzer.frames.lock().unwrap().len(), 1);
        assert_eq!(
            h.records_matching(|r| matches!(r, Record::Snapshot { .. })),
            1
        );

        let frame = h.analyzer.frames.lock().unwrap()[0].clone();
        assert_eq!(frame.snake_length, 3);
        assert_eq!(frame.level, 1);
        assert_eq!(frame.remaining_time, 175);

        let result = h.engine.request_analysis().unwrap();
        assert_eq!(result.sample_size, 1);
    }

    #[test]
    fn test_restart_while_running_ends_session() {
        let mut h = Harness::running();
        assert!(h.engine.restart());
        assert_eq!(
            h.records_matching(|r| matches!(
                r,
                Record::SessionEnd {
                    reason: EndReason::Restart,
                    ..
                }
            )),
            1
        );
        assert_eq!(h.engine.phase(), GamePhase::Running);
    }

    #[test]
    fn test_shutdown_closes_session_once() {
        let mut h = Harness::running();
        h.engine.shutdown();
        h.engine.shutdown();
        assert_eq!(
            h.records_matching(|r| matches!(
                r,
                Record::SessionEnd {
                    reason: EndReason::Shutdown,
                    ..
                }
            )),
            1
        );
    }

    #[test]
    fn test_same_seed_same_first_board() {
        let a = Harness::new();
        let b = Harness::new();
        assert_eq!(a.engine.snapshot().food, b.engine.snapshot().food);
    }
}
