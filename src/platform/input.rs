//! Command surface consumed by the engine
//!
//! Hosts translate whatever input they have (keys, console lines) into
//! `Command`s. Console lines are parsed here.

use thiserror::Error;

use crate::sim::Direction;

/// One player or host intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Shoot(Direction),
    Pause,
    Resume,
    TogglePause,
    Start,
    Restart,
    /// Acknowledge a completed level
    Continue,
    /// Sprint held (true) or released (false)
    Sprint(bool),
    SetSpeedLevel(u32),
    QuerySpeedLevel,
    QueryDelay,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
    #[error("not a direction: {0}")]
    InvalidDirection(String),
    #[error("speed level must be a whole number >= 1, got {0}")]
    InvalidSpeedLevel(String),
    #[error("sprint expects on or off, got {0}")]
    InvalidSprint(String),
}

/// Parse one console line such as `shoot up` or `/speed 3`
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let line = line.strip_prefix('/').unwrap_or(line);
    let mut words = line.split_whitespace();

    let Some(verb) = words.next() else {
        return Err(CommandError::Empty);
    };
    let verb = verb.to_ascii_lowercase();
    let arg = words.next();

    let command = match verb.as_str() {
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "toggle" => Command::TogglePause,
        "start" => Command::Start,
        "restart" => Command::Restart,
        "continue" => Command::Continue,
        "delay" => Command::QueryDelay,
        "shoot" | "fire" => {
            let arg = arg.ok_or(CommandError::MissingArgument("shoot"))?;
            Command::Shoot(parse_direction(arg)?)
        }
        "sprint" => match arg.map(str::to_ascii_lowercase).as_deref() {
            Some("on") => Command::Sprint(true),
            Some("off") => Command::Sprint(false),
            Some(other) => return Err(CommandError::InvalidSprint(other.to_string())),
            None => return Err(CommandError::MissingArgument("sprint")),
        },
        "speed" => match arg {
            None => Command::QuerySpeedLevel,
            Some(level) => match level.parse::<u32>() {
                Ok(level) if level >= 1 => Command::SetSpeedLevel(level),
                _ => return Err(CommandError::InvalidSpeedLevel(level.to_string())),
            },
        },
        other => match Direction::from_str(other) {
            Some(direction) => Command::Move(direction),
            None => return Err(CommandError::Unknown(other.to_string())),
        },
    };

    Ok(command)
}

fn parse_direction(word: &str) -> Result<Direction, CommandError> {
    Direction::from_str(word).ok_or_else(|| CommandError::InvalidDirection(word.to_string()))
}
