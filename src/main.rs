//! Snake Arena - headless host
//!
//! Runs the engine in real time, reads console commands from stdin and
//! prints the board as text.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use snake_arena::analysis::{AnalysisClient, Analyzer};
use snake_arena::engine::Response;
use snake_arena::persistence::JournalRecorder;
use snake_arena::platform::{Command, SystemClock, autopilot, parse_command};
use snake_arena::renderer::TextRenderer;
use snake_arena::settings::AnalysisSettings;
use snake_arena::{Engine, GamePhase, Services, Settings};

/// Host loop sleep between frames
const FRAME_SLEEP: Duration = Duration::from_millis(5);
/// Minimum time between printed frames
const PRINT_INTERVAL: Duration = Duration::from_millis(500);

enum ConsoleInput {
    Command(Command),
    Quit,
}

/// Read stdin on a helper thread so the loop never blocks on input
fn spawn_console_reader() -> Receiver<ConsoleInput> {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("console".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let input = match trimmed.trim_start_matches('/') {
                    "quit" | "exit" => ConsoleInput::Quit,
                    _ => match parse_command(trimmed) {
                        Ok(command) => ConsoleInput::Command(command),
                        Err(e) => {
                            log::warn!("{}", e);
                            continue;
                        }
                    },
                };
                if tx.send(input).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        log::warn!("Console input unavailable: {}", e);
    }
    rx
}

fn connect_analyzer(settings: &AnalysisSettings) -> Option<Arc<AnalysisClient>> {
    if !settings.enabled {
        return None;
    }
    let addr = settings.address()?;
    match AnalysisClient::connect(&addr, settings.timeouts()) {
        Ok(client) => {
            if !client.ping() {
                log::warn!("Analysis service at {} did not answer ping", addr);
            }
            Some(Arc::new(client))
        }
        Err(e) => {
            log::warn!("Analysis disabled: {}", e);
            None
        }
    }
}

fn report(response: Response) {
    match response {
        Response::SpeedLevel(level) => println!("speed level: {}", level),
        Response::MoveInterval(interval) => println!("move delay: {} ms", interval.as_millis()),
        Response::Ack => log::debug!("ok"),
        Response::Ignored => log::debug!("ignored"),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = Settings::load_or_default(settings_path.as_deref());
    let seed = settings.resolve_seed();
    log::info!("Snake Arena starting (seed {})", seed);

    let renderer = Arc::new(TextRenderer::new());
    let mut services =
        Services::headless(Arc::new(SystemClock::new())).with_renderer(renderer.clone());

    if let Some(path) = &settings.journal_path {
        match JournalRecorder::open(path) {
            Ok(journal) => services = services.with_recorder(Arc::new(journal)),
            Err(e) => log::warn!("Journal disabled: {}", e),
        }
    }

    let analyzer = connect_analyzer(&settings.analysis);
    if let Some(client) = &analyzer {
        services = services.with_analyzer(client.clone());
    }

    let mut engine = Engine::new(seed, settings.tick_interval(), services);
    if !engine.set_speed_level(settings.speed_level) {
        log::warn!("Ignoring speed level {}", settings.speed_level);
    }
    engine.start();

    let console = spawn_console_reader();
    let started = Instant::now();
    let run_limit = settings.run_seconds.map(Duration::from_secs);
    let mut last_frame = Instant::now();
    let mut last_print: Option<Instant> = None;

    'frames: loop {
        while let Ok(input) = console.try_recv() {
            match input {
                ConsoleInput::Quit => break 'frames,
                ConsoleInput::Command(command) => report(engine.handle(command)),
            }
        }

        if settings.autopilot {
            match engine.phase() {
                GamePhase::Running => {
                    if let Some(turn) = autopilot::steer(engine.board()) {
                        engine.handle(turn);
                    }
                    if let Some(shot) = autopilot::aim(engine.board()) {
                        engine.handle(shot);
                    }
                }
                GamePhase::GameOver => {
                    engine.restart();
                }
                GamePhase::LevelComplete => {
                    engine.continue_level();
                }
                GamePhase::Ready | GamePhase::Paused => {}
            }
        }

        let now = Instant::now();
        engine.update(now - last_frame);
        last_frame = now;

        if last_print.is_none_or(|t| now - t >= PRINT_INTERVAL) {
            println!("{}", renderer.frame());
            last_print = Some(now);
        }

        if run_limit.is_some_and(|limit| started.elapsed() >= limit) {
            log::info!("Run time limit reached");
            break;
        }

        thread::sleep(FRAME_SLEEP);
    }

    engine.shutdown();

    if analyzer.is_some() {
        match engine.request_analysis() {
            Some(result) => log::info!(
                "Analysis: {} (confidence {:.2}, {} samples, aggression {:.2}, caution {:.2}, exploration {:.2})",
                result.personality,
                result.confidence,
                result.sample_size,
                result.traits.aggression,
                result.traits.caution,
                result.traits.exploration
            ),
            None => log::info!("No analysis result"),
        }
    }

    log::info!(
        "Final score {} at level {}",
        engine.board().score(),
        engine.board().level()
    );
}
