//! Remote behaviour analysis
//!
//! The game streams periodic telemetry to an external service and can ask it
//! for a personality-style summary of the player. The service may be absent,
//! slow or gone; every call degrades to "no result".

pub mod client;
pub mod wire;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::Direction;

pub use client::{AnalysisClient, ClientTimeouts};
pub use wire::discover_port;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis service I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed analysis message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("analysis service timed out during {0}")]
    Timeout(&'static str),
    #[error("analysis service disconnected")]
    Disconnected,
    #[error("cannot read service port from {path}: {reason}")]
    PortDiscovery { path: String, reason: String },
}

/// Telemetry pushed with `send_state`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryFrame {
    pub snake_length: usize,
    pub score: u32,
    pub direction: Direction,
    pub position_x: i32,
    pub position_y: i32,
    pub level: u32,
    pub remaining_time: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Traits {
    pub aggression: f64,
    pub caution: f64,
    pub exploration: f64,
}

/// Service verdict. Missing fields default to zero/empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    #[serde(rename = "mbti")]
    pub personality: String,
    pub confidence: f64,
    pub sample_size: u32,
    pub traits: Traits,
}

/// Analysis collaborator. Calls never block the caller past their timeout.
pub trait Analyzer: Send + Sync {
    /// Liveness probe
    fn ping(&self) -> bool;
    /// Fire-and-forget telemetry
    fn send_state(&self, frame: TelemetryFrame);
    /// Ask for a verdict over the last `sample_size` data points
    fn request_analysis(&self, sample_size: u32) -> Option<AnalysisResult>;
}
