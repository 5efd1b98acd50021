//! Runtime settings
//!
//! Loaded from an optional JSON file. Gameplay contracts (grid size, time
//! limit, rewards) are constants in `consts`, not settings.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::{ClientTimeouts, discover_port};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Connection to the external analysis service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub enabled: bool,
    pub host: String,
    /// Fixed port; takes precedence over `port_file`
    pub port: Option<u16>,
    /// File the service writes its port into
    pub port_file: Option<PathBuf>,
    pub connect_timeout_ms: u64,
    pub ping_timeout_ms: u64,
    pub analysis_timeout_ms: u64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "127.0.0.1".to_string(),
            port: None,
            port_file: Some(PathBuf::from("data/ai_port.txt")),
            connect_timeout_ms: 2000,
            ping_timeout_ms: 2000,
            analysis_timeout_ms: 5000,
        }
    }
}

impl AnalysisSettings {
    pub fn timeouts(&self) -> ClientTimeouts {
        ClientTimeouts {
            connect: Duration::from_millis(self.connect_timeout_ms),
            ping: Duration::from_millis(self.ping_timeout_ms),
            analysis: Duration::from_millis(self.analysis_timeout_ms),
        }
    }

    /// `host:port`, reading the port file when no port is configured
    pub fn address(&self) -> Option<String> {
        let port = match (self.port, &self.port_file) {
            (Some(port), _) => port,
            (None, Some(path)) => match discover_port(path) {
                Ok(port) => port,
                Err(e) => {
                    log::warn!("{}", e);
                    return None;
                }
            },
            (None, None) => return None,
        };
        Some(format!("{}:{}", self.host, port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed; random when absent
    pub seed: Option<u64>,
    /// Engine tick cadence
    pub tick_interval_ms: u64,
    /// Starting speed level (1 = slowest)
    pub speed_level: u32,
    /// JSON-lines journal; no recording when absent
    pub journal_path: Option<PathBuf>,
    /// Let the demo steering drive the snake
    pub autopilot: bool,
    /// Stop the host loop after this long
    pub run_seconds: Option<u64>,
    pub analysis: AnalysisSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            tick_interval_ms: 33,
            speed_level: 1,
            journal_path: None,
            autopilot: true,
            run_seconds: None,
            analysis: AnalysisSettings::default(),
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Load from `path` if given, falling back to defaults on any failure
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Self::default();
        };

        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Configured seed, or a fresh random one
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}
