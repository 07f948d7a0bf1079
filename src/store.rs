//! Session persistence for wizard state.
//!
//! Reads are deliberately lenient: malformed or unreadable state is logged
//! and treated as absence, so a corrupt session file can never wedge the
//! wizard. Writes are best effort for the same reason; a failed save is a
//! warning, not a user-facing error.

use crate::record::LeadRecord;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Storage port for one wizard session.
///
/// `load_*` never fail; implementations fall back to "no prior state".
pub trait SessionStore {
    fn load_record(&self) -> LeadRecord;
    fn save_record(&mut self, record: &LeadRecord);
    fn load_step(&self) -> Option<u32>;
    fn save_step(&mut self, step: u32);
    fn clear(&mut self);
}

impl<S: SessionStore + ?Sized> SessionStore for Box<S> {
    fn load_record(&self) -> LeadRecord {
        (**self).load_record()
    }

    fn save_record(&mut self, record: &LeadRecord) {
        (**self).save_record(record)
    }

    fn load_step(&self) -> Option<u32> {
        (**self).load_step()
    }

    fn save_step(&mut self, step: u32) {
        (**self).save_step(step)
    }

    fn clear(&mut self) {
        (**self).clear()
    }
}

/// Typed paths for the files one session owns.
pub struct SessionPaths {
    root: PathBuf,
}

impl SessionPaths {
    pub fn new(root: PathBuf) -> SessionPaths {
        SessionPaths { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn lead_path(&self) -> PathBuf {
        self.root.join("lead.json")
    }

    /// Step marker file; holds the step index as plain text.
    pub fn step_path(&self) -> PathBuf {
        self.root.join("step")
    }
}

/// Lenient step marker parse shared by every store: junk is logged and
/// read as absence.
fn parse_step_marker(raw: &str) -> Option<u32> {
    match raw.trim().parse::<u32>() {
        Ok(step) => Some(step),
        Err(_) => {
            tracing::warn!(raw = %raw.trim(), "discarding malformed step marker");
            None
        }
    }
}

/// File-backed store: one directory per session holding the record JSON
/// and the step marker.
pub struct FileStore {
    paths: SessionPaths,
}

impl FileStore {
    pub fn new(root: PathBuf) -> FileStore {
        FileStore {
            paths: SessionPaths::new(root),
        }
    }

    /// Default session directory under the platform data dir.
    pub fn default_root() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("leadwiz")
            .join("session")
    }

    pub fn paths(&self) -> &SessionPaths {
        &self.paths
    }

    fn read_record(&self) -> Result<Option<LeadRecord>> {
        let path = self.paths.lead_path();
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = fs::read(&path).with_context(|| format!("read {}", path.display()))?;
        let record = serde_json::from_slice(&bytes).context("parse lead record JSON")?;
        Ok(Some(record))
    }

    fn write_record(&self, record: &LeadRecord) -> Result<()> {
        let path = self.paths.lead_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("create session dir")?;
        }
        let text = serde_json::to_string_pretty(record).context("serialize lead record")?;
        fs::write(&path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    fn write_step(&self, step: u32) -> Result<()> {
        let path = self.paths.step_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("create session dir")?;
        }
        fs::write(&path, step.to_string().as_bytes())
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn load_record(&self) -> LeadRecord {
        match self.read_record() {
            Ok(Some(record)) => record,
            Ok(None) => LeadRecord::new(),
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable lead record");
                LeadRecord::new()
            }
        }
    }

    fn save_record(&mut self, record: &LeadRecord) {
        if let Err(err) = self.write_record(record) {
            tracing::warn!(error = %err, "lead record not persisted");
        }
    }

    fn load_step(&self) -> Option<u32> {
        let text = fs::read_to_string(self.paths.step_path()).ok()?;
        parse_step_marker(&text)
    }

    fn save_step(&mut self, step: u32) {
        if let Err(err) = self.write_step(step) {
            tracing::warn!(error = %err, "step marker not persisted");
        }
    }

    fn clear(&mut self) {
        for path in [self.paths.lead_path(), self.paths.step_path()] {
            if !path.is_file() {
                continue;
            }
            if let Err(err) = fs::remove_file(&path) {
                tracing::warn!(error = %err, path = %path.display(), "session file not removed");
            }
        }
    }
}

/// In-memory store for ephemeral runs.
///
/// State is held as raw text, the same way the file store sees it, so the
/// lenient parsing contract is exercised identically.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record_raw: Option<String>,
    step_raw: Option<String>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    #[cfg(test)]
    pub(crate) fn with_raw(record_raw: Option<&str>, step_raw: Option<&str>) -> MemoryStore {
        MemoryStore {
            record_raw: record_raw.map(str::to_owned),
            step_raw: step_raw.map(str::to_owned),
        }
    }
}

impl SessionStore for MemoryStore {
    fn load_record(&self) -> LeadRecord {
        let raw = match self.record_raw.as_deref() {
            Some(raw) => raw,
            None => return LeadRecord::new(),
        };
        match serde_json::from_str(raw) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable lead record");
                LeadRecord::new()
            }
        }
    }

    fn save_record(&mut self, record: &LeadRecord) {
        match serde_json::to_string(record) {
            Ok(text) => self.record_raw = Some(text),
            Err(err) => tracing::warn!(error = %err, "lead record not kept"),
        }
    }

    fn load_step(&self) -> Option<u32> {
        parse_step_marker(self.step_raw.as_deref()?)
    }

    fn save_step(&mut self, step: u32) {
        self.step_raw = Some(step.to_string());
    }

    fn clear(&mut self) {
        self.record_raw = None;
        self.step_raw = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{LeadPatch, KEY_LEAD_ID, KEY_NAME};

    fn sample_record() -> LeadRecord {
        LeadRecord::new().merged(
            &LeadPatch::new()
                .set(KEY_NAME, "Asha Rao")
                .set(KEY_LEAD_ID, "CS0001"),
        )
    }

    #[test]
    fn file_store_round_trips_record_and_step() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FileStore::new(dir.path().join("session"));
        assert!(store.load_record().is_empty());
        assert_eq!(store.load_step(), None);

        store.save_record(&sample_record());
        store.save_step(3);
        assert_eq!(store.load_record(), sample_record());
        assert_eq!(store.load_step(), Some(3));

        // A fresh handle over the same directory sees the same state.
        let reopened = FileStore::new(dir.path().join("session"));
        assert_eq!(reopened.load_record(), sample_record());
        assert_eq!(reopened.load_step(), Some(3));
    }

    #[test]
    fn malformed_record_file_loads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("session");
        std::fs::create_dir_all(&root).expect("create session dir");
        std::fs::write(root.join("lead.json"), b"not json at all").expect("write junk");
        let store = FileStore::new(root);
        assert!(store.load_record().is_empty());
    }

    #[test]
    fn malformed_step_marker_loads_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("session");
        std::fs::create_dir_all(&root).expect("create session dir");
        std::fs::write(root.join("step"), b"banana").expect("write junk");
        let store = FileStore::new(root);
        assert_eq!(store.load_step(), None);
    }

    #[test]
    fn step_marker_parsing_is_lenient() {
        assert_eq!(parse_step_marker("6"), Some(6));
        assert_eq!(parse_step_marker(" 6\n"), Some(6));
        assert_eq!(parse_step_marker("banana"), None);
        assert_eq!(parse_step_marker("-1"), None);
        assert_eq!(parse_step_marker(""), None);
    }

    #[test]
    fn step_marker_is_plain_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("session");
        let mut store = FileStore::new(root.clone());
        store.save_step(6);
        let raw = std::fs::read_to_string(root.join("step")).expect("read step");
        assert_eq!(raw, "6");
    }

    #[test]
    fn clear_removes_session_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FileStore::new(dir.path().join("session"));
        store.save_record(&sample_record());
        store.save_step(2);
        store.clear();
        assert!(store.load_record().is_empty());
        assert_eq!(store.load_step(), None);
    }

    #[test]
    fn memory_store_matches_file_store_leniency() {
        let store = MemoryStore::with_raw(Some("{broken"), Some("not a number"));
        assert!(store.load_record().is_empty());
        assert_eq!(store.load_step(), None);

        let mut fresh = MemoryStore::new();
        fresh.save_record(&sample_record());
        fresh.save_step(4);
        assert_eq!(fresh.load_record(), sample_record());
        assert_eq!(fresh.load_step(), Some(4));
        fresh.clear();
        assert!(fresh.load_record().is_empty());
        assert_eq!(fresh.load_step(), None);
    }
}
