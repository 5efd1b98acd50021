//! JSON-lines journal
//!
//! Records are queued to a worker thread that owns the file. Write failures
//! are logged there and never reach the game loop.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;

use super::{Record, Recorder};

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("journal line is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

enum Message {
    Record(Record),
    Flush(SyncSender<()>),
}

pub struct JournalRecorder {
    path: PathBuf,
    tx: Option<Sender<Message>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl JournalRecorder {
    /// Open (or create) the journal for appending and start the writer thread
    pub fn open(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        let (tx, rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("journal".into())
            .spawn(move || write_loop(file, rx))?;

        log::info!("Journal writing to {}", path.display());

        Ok(Self {
            path,
            tx: Some(tx),
            worker: Mutex::new(Some(worker)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait until everything queued so far is on disk
    pub fn flush(&self) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        let (ack_tx, ack_rx) = mpsc::sync_channel(1);
        if tx.send(Message::Flush(ack_tx)).is_err() {
            return false;
        }
        ack_rx.recv_timeout(Duration::from_secs(2)).is_ok()
    }
}

fn write_loop(file: File, rx: Receiver<Message>) {
    let mut writer = BufWriter::new(file);

    for message in rx {
        match message {
            Message::Record(record) => {
                if let Err(e) = write_record(&mut writer, &record) {
                    log::warn!("Journal write failed: {}", e);
                }
            }
            Message::Flush(ack) => {
                if let Err(e) = writer.flush() {
                    log::warn!("Journal flush failed: {}", e);
                }
                let _ = ack.send(());
            }
        }
    }

    if let Err(e) = writer.flush() {
        log::warn!("Journal final flush failed: {}", e);
    }
}

fn write_record(writer: &mut impl Write, record: &Record) -> Result<(), JournalError> {
    serde_json::to_writer(&mut *writer, record)?;
    writer.write_all(b"\n")?;
    Ok(())
}

impl Recorder for JournalRecorder {
    fn record(&self, record: Record) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(Message::Record(record)).is_err() {
            log::warn!("Journal worker is gone, dropping record");
        }
    }
}

impl Drop for JournalRecorder {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop
        self.tx.take();
        let worker = self.worker.get_mut().ok().and_then(Option::take);
        if let Some(worker) = worker {
            if worker.join().is_err() {
                log::warn!("Journal worker panicked");
            }
        }
    }
}

/// Read a journal back, one record per non-empty line
pub fn read_journal(path: impl AsRef<Path>) -> Result<Vec<Record>, JournalError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{EndReason, SnapshotRecord};
    use crate::sim::Direction;
    use glam::IVec2;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("snake-arena-{}-{}", std::process::id(), name))
            .join("journal.jsonl")
    }

    #[test]
    fn test_journal_writes_one_line_per_record() {
        let path = temp_path("lines");
        let _ = fs::remove_file(&path);

        let journal = JournalRecorder::open(&path).unwrap();
        let session = journal.start_session();
        journal.record_action(&session, "direction_change", IVec2::new(3, 4), "UP");
        journal.record_shooting(&session, IVec2::new(3, 3), Direction::Up);
        journal.record_food(&session, IVec2::new(9, 9), 10, 4);
        journal.record_snapshot(
            &session,
            SnapshotRecord {
                head_x: 9,
                head_y: 9,
                length: 4,
                score: 10,
                level: 1,
                remaining_secs: 170,
                obstacle_count: 260,
            },
        );
        journal.end_session(&session, 10, 1, EndReason::Shutdown);
        assert!(journal.flush());

        let records = read_journal(&path).unwrap();
        assert_eq!(records.len(), 6);
        assert!(matches!(records[0], Record::SessionStart { .. }));
        assert!(matches!(
            records[5],
            Record::SessionEnd {
                reason: EndReason::Shutdown,
                ..
            }
        ));

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw.lines().count(), 6);
        assert!(raw.lines().nth(1).unwrap().contains("\"type\":\"action\""));

        drop(journal);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_drop_flushes_pending_records() {
        let path = temp_path("drop");
        let _ = fs::remove_file(&path);

        {
            let journal = JournalRecorder::open(&path).unwrap();
            let session = journal.start_session();
            journal.end_session(&session, 0, 1, EndReason::Restart);
        }

        let records = read_journal(&path).unwrap();
        assert_eq!(records.len(), 2);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
