//! Line protocol: one JSON object per line, tagged by `type`

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::{AnalysisError, AnalysisResult, TelemetryFrame};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outbound {
    Ping {
        timestamp: u64,
    },
    GameState {
        timestamp: u64,
        data: TelemetryFrame,
    },
    RequestAnalysis {
        timestamp: u64,
        data_points: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Pong,
    GameStateAck,
    AnalysisResult(AnalysisResult),
    /// Any other message type, kept for logging
    Other(String),
}

/// Serialize with the trailing newline
pub fn encode_line(message: &Outbound) -> Result<String, AnalysisError> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

pub fn decode_line(line: &str) -> Result<Inbound, AnalysisError> {
    let value: Value = serde_json::from_str(line.trim())?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let message = match kind.as_str() {
        "PONG" => Inbound::Pong,
        "GAME_STATE_ACK" => Inbound::GameStateAck,
        "ANALYSIS_RESULT" => Inbound::AnalysisResult(serde_json::from_value(value)?),
        _ => Inbound::Other(kind),
    };
    Ok(message)
}

/// Read the TCP port the service advertises in `path`
pub fn discover_port(path: impl AsRef<Path>) -> Result<u16, AnalysisError> {
    let path = path.as_ref();
    let failure = |reason: String| AnalysisError::PortDiscovery {
        path: path.display().to_string(),
        reason,
    };

    let text = fs::read_to_string(path).map_err(|e| failure(e.to_string()))?;
    text.trim()
        .parse::<u16>()
        .map_err(|e| failure(format!("{:?}: {}", text.trim(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Direction;

    #[test]
    fn test_outbound_shapes() {
        let line = encode_line(&Outbound::Ping { timestamp: 5 }).unwrap();
        assert_eq!(line, "{\"type\":\"PING\",\"timestamp\":5}\n");

        let line = encode_line(&Outbound::RequestAnalysis {
            timestamp: 1,
            data_points: 40,
        })
        .unwrap();
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "REQUEST_ANALYSIS");
        assert_eq!(value["data_points"], 40);

        let frame = TelemetryFrame {
            snake_length: 15,
            score: 300,
            direction: Direction::Up,
            position_x: 25,
            position_y: 30,
            level: 2,
            remaining_time: 120,
        };
        let line = encode_line(&Outbound::GameState {
            timestamp: 1,
            data: frame,
        })
        .unwrap();
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "GAME_STATE");
        assert_eq!(value["data"]["direction"], "UP");
        assert_eq!(value["data"]["snake_length"], 15);
    }

    #[test]
    fn test_decode_known_and_unknown() {
        assert_eq!(decode_line("{\"type\":\"PONG\",\"timestamp\":9}").unwrap(), Inbound::Pong);
        assert_eq!(
            decode_line("{\"type\":\"GAME_STATE_ACK\"}\n").unwrap(),
            Inbound::GameStateAck
        );
        assert_eq!(
            decode_line("{\"type\":\"ERROR\",\"message\":\"x\"}").unwrap(),
            Inbound::Other("ERROR".into())
        );
        assert!(decode_line("not json").is_err());
    }

    #[test]
    fn test_analysis_result_defaults_missing_fields() {
        let line = r#"{"type":"ANALYSIS_RESULT","mbti":"INTJ","confidence":0.8,"traits":{"caution":0.6}}"#;
        let Inbound::AnalysisResult(result) = decode_line(line).unwrap() else {
            panic!("expected an analysis result");
        };
        assert_eq!(result.personality, "INTJ");
        assert_eq!(result.sample_size, 0);
        assert_eq!(result.traits.caution, 0.6);
        assert_eq!(result.traits.aggression, 0.0);
    }

    #[test]
    fn test_discover_port() {
        let dir = std::env::temp_dir().join(format!("snake-arena-port-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ai_port.txt");

        std::fs::write(&path, "5555\n").unwrap();
        assert_eq!(discover_port(&path).unwrap(), 5555);

        std::fs::write(&path, "nope").unwrap();
        assert!(matches!(
            discover_port(&path),
            Err(AnalysisError::PortDiscovery { .. })
        ));

        assert!(discover_port(dir.join("missing.txt")).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
