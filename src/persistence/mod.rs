//! Session and event recording
//!
//! Features:
//! - Session-scoped records (start, end, actions, shots, food, snapshots)
//! - Fire-and-forget: recorders never report failures to the caller
//! - JSON-lines journal on a worker thread, no-op and in-memory recorders

pub mod journal;

use std::fmt;
use std::sync::Mutex;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::platform::time::unix_millis;
use crate::sim::Direction;

pub use journal::{JournalError, JournalRecorder};

/// Opaque session identifier (128-bit random hex)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(format!("{:032x}", rand::random::<u128>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Collision,
    Timeout,
    Restart,
    Shutdown,
}

/// Periodic state sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub head_x: i32,
    pub head_y: i32,
    pub length: usize,
    pub score: u32,
    pub level: u32,
    pub remaining_secs: u64,
    pub obstacle_count: usize,
}

/// One journal line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
    SessionStart {
        session: SessionId,
        timestamp: u64,
    },
    SessionEnd {
        session: SessionId,
        timestamp: u64,
        final_score: u32,
        level: u32,
        reason: EndReason,
    },
    Action {
        session: SessionId,
        timestamp: u64,
        kind: String,
        x: i32,
        y: i32,
        extra: String,
    },
    Shooting {
        session: SessionId,
        timestamp: u64,
        x: i32,
        y: i32,
        direction: Direction,
    },
    Food {
        session: SessionId,
        timestamp: u64,
        x: i32,
        y: i32,
        score: u32,
        length: usize,
    },
    Snapshot {
        session: SessionId,
        timestamp: u64,
        head_x: i32,
        head_y: i32,
        length: usize,
        score: u32,
        level: u32,
        remaining_secs: u64,
        obstacle_count: usize,
    },
}

impl Record {
    pub fn session(&self) -> &SessionId {
        match self {
            Record::SessionStart { session, .. }
            | Record::SessionEnd { session, .. }
            | Record::Action { session, .. }
            | Record::Shooting { session, .. }
            | Record::Food { session, .. }
            | Record::Snapshot { session, .. } => session,
        }
    }
}

/// Persistence collaborator
///
/// Only `record` is required; the session helpers build records from it.
pub trait Recorder: Send + Sync {
    fn record(&self, record: Record);

    fn start_session(&self) -> SessionId {
        let session = SessionId::generate();
        self.record(Record::SessionStart {
            session: session.clone(),
            timestamp: unix_millis(),
        });
        session
    }

    fn end_session(&self, session: &SessionId, final_score: u32, level: u32, reason: EndReason) {
        self.record(Record::SessionEnd {
            session: session.clone(),
            timestamp: unix_millis(),
            final_score,
            level,
            reason,
        });
    }

    fn record_action(&self, session: &SessionId, kind: &str, cell: IVec2, extra: &str) {
        self.record(Record::Action {
            session: session.clone(),
            timestamp: unix_millis(),
            kind: kind.to_string(),
            x: cell.x,
            y: cell.y,
            extra: extra.to_string(),
        });
    }

    fn record_shooting(&self, session: &SessionId, cell: IVec2, direction: Direction) {
        self.record(Record::Shooting {
            session: session.clone(),
            timestamp: unix_millis(),
            x: cell.x,
            y: cell.y,
            direction,
        });
    }

    fn record_food(&self, session: &SessionId, cell: IVec2, score: u32, length: usize) {
        self.record(Record::Food {
            session: session.clone(),
            timestamp: unix_millis(),
            x: cell.x,
            y: cell.y,
            score,
            length,
        });
    }

    fn record_snapshot(&self, session: &SessionId, sample: SnapshotRecord) {
        let SnapshotRecord {
            head_x,
            head_y,
            length,
            score,
            level,
            remaining_secs,
            obstacle_count,
        } = sample;
        self.record(Record::Snapshot {
            session: session.clone(),
            timestamp: unix_millis(),
            head_x,
            head_y,
            length,
            score,
            level,
            remaining_secs,
            obstacle_count,
        });
    }
}

/// Drops every record
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRecorder;

impl Recorder for NullRecorder {
    fn record(&self, _record: Record) {}
}

/// Keeps records in memory, for tests and short-lived tools
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    records: Mutex<Vec<Record>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Recorder for MemoryRecorder {
    fn record(&self, record: Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}
