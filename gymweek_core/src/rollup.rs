//! CSV rollup functionality for archiving logged sessions.
//!
//! This module implements atomic log-to-CSV conversion with proper error
//! handling to prevent data loss.

use crate::types::LoggedSession;
use crate::Result;
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    date: String,
    #[serde(rename = "type")]
    session_type: String,
    duration_seconds: Option<u32>,
    notes: Option<String>,
    source: Option<String>,
    week_key: Option<String>,
    day_key: Option<String>,
    created_at: String,
}

impl From<&LoggedSession> for CsvRow {
    fn from(session: &LoggedSession) -> Self {
        CsvRow {
            id: session.id.to_string(),
            date: session.date.to_string(),
            session_type: session.session_type.clone(),
            duration_seconds: session.duration_seconds,
            notes: session.notes.clone(),
            source: session.meta.as_ref().map(|m| m.source.clone()),
            week_key: session.meta.as_ref().map(|m| m.week_key.to_string()),
            day_key: session.meta.as_ref().map(|m| m.day_key.to_string()),
            created_at: session.created_at.to_rfc3339(),
        }
    }
}

/// Roll up logged sessions into CSV and archive the log atomically
///
/// This function:
/// 1. Reads all sessions from the log
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the log to .processed
/// 5. Returns the number of sessions processed
///
/// # Safety
/// - CSV is fsynced before the log is renamed
/// - The log is renamed (not deleted) to allow manual recovery if needed
/// - Processed log files can be cleaned up separately
pub fn log_to_csv_and_archive(log_path: &Path, csv_path: &Path) -> Result<usize> {
    let sessions = crate::sessionlog::read_sessions(log_path)?;

    if sessions.is_empty() {
        tracing::info!("No sessions in log to roll up");
        return Ok(0);
    }

    // Ensure parent directory exists
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Write headers only when the CSV is brand new
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for session in &sessions {
        let row = CsvRow::from(session);
        writer.serialize(row)?;
    }

    // Flush and sync to disk before touching the log
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} sessions to CSV", sessions.len());

    let processed_path = log_path.with_extension("wal.processed");
    std::fs::rename(log_path, &processed_path)?;

    tracing::info!("Archived session log to {:?}", processed_path);

    Ok(sessions.len())
}

/// Clean up old processed log files
///
/// This removes all .wal.processed files in the given directory.
pub fn cleanup_processed_logs(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Some(extension) = path.extension() {
            if extension == "processed" {
                std::fs::remove_file(&path)?;
                tracing::debug!("Removed processed log: {:?}", path);
                count += 1;
            }
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed log files", count);
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessionlog::{JsonlSink, SessionSink};
    use crate::types::{CreateSessionBody, SessionMeta, WeekKey};
    use chrono::NaiveDate;
    use std::fs::File;

    fn create_test_session(session_type: &str) -> LoggedSession {
        let week = WeekKey::parse("2026-W07").expect("valid week");
        let body = CreateSessionBody {
            session_type: session_type.to_string(),
            duration_seconds: Some(2700),
            notes: Some("notes".to_string()),
            exercises: Vec::new(),
            meta: Some(SessionMeta {
                source: "gymCheck".to_string(),
                week_key: week,
                day_key: crate::types::DayKey::Wed,
                routine_week_key: week,
            }),
        };
        LoggedSession {
            id: uuid::Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2026, 2, 11).unwrap(),
            session_type: body.session_type,
            duration_seconds: body.duration_seconds,
            notes: body.notes,
            exercises: body.exercises,
            meta: body.meta,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_log_to_csv_creates_file_and_archives() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlSink::new(&log_path);
        for i in 0..3 {
            sink.append(&create_test_session(&format!("type_{}", i)))
                .unwrap();
        }

        let count = log_to_csv_and_archive(&log_path, &csv_path).unwrap();
        assert_eq!(count, 3);

        assert!(csv_path.exists());
        assert!(!log_path.exists());
        assert!(log_path.with_extension("wal.processed").exists());
    }

    #[test]
    fn test_log_to_csv_appends_without_repeating_headers() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlSink::new(&log_path);
        sink.append(&create_test_session("push")).unwrap();
        assert_eq!(log_to_csv_and_archive(&log_path, &csv_path).unwrap(), 1);

        let mut sink = JsonlSink::new(&log_path);
        sink.append(&create_test_session("pull")).unwrap();
        assert_eq!(log_to_csv_and_archive(&log_path, &csv_path).unwrap(), 1);

        let reader = csv::Reader::from_path(&csv_path).unwrap();
        let record_count = reader.into_records().count();
        assert_eq!(record_count, 2);
    }

    #[test]
    fn test_empty_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("empty.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        File::create(&log_path).unwrap();

        let count = log_to_csv_and_archive(&log_path, &csv_path).unwrap();
        assert_eq!(count, 0);
        assert!(!csv_path.exists());
    }

    #[test]
    fn test_cleanup_processed_logs() {
        let temp_dir = tempfile::tempdir().unwrap();

        File::create(temp_dir.path().join("s1.wal.processed")).unwrap();
        File::create(temp_dir.path().join("s2.wal.processed")).unwrap();
        File::create(temp_dir.path().join("keep.wal")).unwrap();

        let count = cleanup_processed_logs(temp_dir.path()).unwrap();
        assert_eq!(count, 2);

        assert!(!temp_dir.path().join("s1.wal.processed").exists());
        assert!(!temp_dir.path().join("s2.wal.processed").exists());
        assert!(temp_dir.path().join("keep.wal").exists());
    }
}
