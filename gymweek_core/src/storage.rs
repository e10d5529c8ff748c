//! Routine document storage with file locking.
//!
//! One JSON document per week under `<data_dir>/routines/`, written
//! atomically so a plan edit and a check-off write from separate
//! invocations never tear a document. Unlike derived state, routine
//! documents are authored data: a corrupt file is reported as an error
//! instead of being silently replaced with defaults.

use crate::{Error, Result, RoutineDoc, WeekKey};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File-backed routine store keyed by week
pub struct RoutineStore {
    dir: PathBuf,
}

impl RoutineStore {
    /// Store rooted at `<data_dir>/routines`
    pub fn new(data_dir: &Path) -> RoutineStore {
        RoutineStore {
            dir: data_dir.join("routines"),
        }
    }

    /// Path of the document for one week
    pub fn path_for(&self, week_key: WeekKey) -> PathBuf {
        self.dir.join(format!("{}.json", week_key))
    }

    /// Load the routine for a week with shared locking
    ///
    /// Returns `Ok(None)` when no routine has been saved for the week.
    pub fn get(&self, week_key: WeekKey) -> Result<Option<RoutineDoc>> {
        let path = self.path_for(week_key);
        if !path.exists() {
            tracing::debug!("No routine stored for {}", week_key);
            return Ok(None);
        }

        let file = File::open(&path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            return Err(e.into());
        }
        file.unlock()?;

        let doc: RoutineDoc = serde_json::from_str(&contents)
            .map_err(|e| Error::Storage(format!("corrupt routine document {:?}: {}", path, e)))?;
        tracing::debug!("Loaded routine for {} from {:?}", week_key, path);
        Ok(Some(doc))
    }

    /// Save a routine with exclusive locking
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, doc: &RoutineDoc) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let temp = NamedTempFile::new_in(&self.dir)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(doc)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(self.path_for(doc.week_key))
            .map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved routine for {}", doc.week_key);
        Ok(())
    }

    /// Load-or-create the week's routine, modify it, and save it back
    pub fn update<F>(&self, week_key: WeekKey, f: F) -> Result<RoutineDoc>
    where
        F: FnOnce(&mut RoutineDoc) -> Result<()>,
    {
        let mut doc = self
            .get(week_key)?
            .unwrap_or_else(|| RoutineDoc::new(week_key));
        f(&mut doc)?;
        self.save(&doc)?;
        Ok(doc)
    }

    /// Mark a stored routine as archived
    ///
    /// Archiving a week that was never saved is an error; there is nothing
    /// to create retroactively.
    pub fn archive(&self, week_key: WeekKey) -> Result<RoutineDoc> {
        let Some(mut doc) = self.get(week_key)? else {
            return Err(Error::Storage(format!("no routine stored for {}", week_key)));
        };
        doc.status = Some("archived".to_string());
        self.save(&doc)?;
        tracing::info!("Archived routine for {}", week_key);
        Ok(doc)
    }
}
