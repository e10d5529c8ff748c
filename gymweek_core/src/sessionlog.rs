//! Session log: append-only JSONL persistence for created sessions.
//!
//! Session creation and media attachment are two separate appends and are
//! deliberately not atomic. If the attach step fails after the create
//! succeeded, callers must surface the partial success; retrying the whole
//! sequence would duplicate the session.

use crate::types::{CreateSessionBody, LoggedSession, MediaItem};
use crate::Result;
use chrono::{DateTime, NaiveDate, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Session sink trait for persisting created sessions
pub trait SessionSink {
    fn append(&mut self, session: &LoggedSession) -> Result<()>;
}

/// JSONL-based session sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionSink for JsonlSink {
    fn append(&mut self, session: &LoggedSession) -> Result<()> {
        let line = serde_json::to_string(session)?;
        append_line(&self.path, &line)?;
        tracing::debug!("Appended session {} to log", session.id);
        Ok(())
    }
}

/// Record of a media-attach call for a created session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionMediaRecord {
    pub session_id: Uuid,
    pub items: Vec<MediaItem>,
    pub attached_at: DateTime<Utc>,
}

/// Materialize a creation payload into a session record and append it
///
/// Assigns the id, stamps `created_at`, and dates the session. The payload
/// is consumed; the stored record is returned for display.
pub fn create_session(
    sink: &mut dyn SessionSink,
    body: CreateSessionBody,
    date: NaiveDate,
) -> Result<LoggedSession> {
    let session = LoggedSession {
        id: Uuid::new_v4(),
        date,
        session_type: body.session_type,
        duration_seconds: body.duration_seconds,
        notes: body.notes,
        exercises: body.exercises,
        meta: body.meta,
        created_at: Utc::now(),
    };
    sink.append(&session)?;
    tracing::info!("Created session {} for {}", session.id, session.date);
    Ok(session)
}

/// Append a media-attach record for an already created session
///
/// Attaching an empty list is a no-op rather than an error, so callers can
/// pass the diff result straight through.
pub fn attach_media(path: &Path, session_id: Uuid, items: &[MediaItem]) -> Result<()> {
    if items.is_empty() {
        tracing::debug!("No media to attach to session {}", session_id);
        return Ok(());
    }
    let record = SessionMediaRecord {
        session_id,
        items: items.to_vec(),
        attached_at: Utc::now(),
    };
    let line = serde_json::to_string(&record)?;
    append_line(path, &line)?;
    tracing::info!("Attached {} media item(s) to session {}", items.len(), session_id);
    Ok(())
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    file.lock_exclusive()?;

    let mut writer = std::io::BufWriter::new(&file);
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    drop(writer);

    file.unlock()?;
    Ok(())
}

/// Read all sessions from a log file
///
/// Unparseable lines are skipped with a warning so one bad record never
/// hides the rest of the history.
pub fn read_sessions(path: &Path) -> Result<Vec<LoggedSession>> {
    read_jsonl(path, "session")
}

/// Read all media-attach records from a log file
pub fn read_media_records(path: &Path) -> Result<Vec<SessionMediaRecord>> {
    read_jsonl(path, "media record")
}

fn read_jsonl<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = match line_result {
            Ok(line) => line,
            Err(e) => {
                let _ = file.unlock();
                return Err(e.into());
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<T>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse {} at line {}: {}", what, line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} {}(s) from {:?}", records.len(), what, path);
    Ok(records)
}
