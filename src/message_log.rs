//! Append-only JSONL record of protocol traffic
//!
//! Side channel for post-hoc test assertions. Never affects protocol
//! behavior: write failures are swallowed, and a disabled log drops every
//! record.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;

/// Direction or kind of a logged record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    In,
    Out,
    Meta,
    InResponse,
    Error,
}

/// Append-only JSONL message log.
///
/// Records are whole-line appends behind a lock so concurrent writers
/// never interleave partial lines.
pub struct MessageLog {
    file: Option<Mutex<File>>,
}

impl MessageLog {
    /// Open the log at `path` for appending, creating parent directories.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Some(Mutex::new(file)),
        })
    }

    /// A log that drops every record.
    pub fn disabled() -> Self {
        Self { file: None }
    }

    /// Append one record stamped with the capture time.
    pub fn record(&self, direction: Direction, payload: &Value, note: Option<&str>) {
        let Some(file) = &self.file else { return };

        let mut entry = json!({
            "ts": Utc::now().timestamp_micros() as f64 / 1_000_000.0,
            "dir": direction,
            "payload": payload,
        });
        if let Some(note) = note {
            entry["note"] = json!(note);
        }

        let mut line = entry.to_string();
        line.push('\n');

        let mut file = file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = file.write_all(line.as_bytes()) {
            warn!(error = %err, "failed to append message log record");
        }
    }
}
