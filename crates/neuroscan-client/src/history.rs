//! Durable local history of past scans.
//!
//! The store is an injected capability: the submission pipeline takes any
//! [`HistoryStore`] so tests can substitute [`MemoryHistoryStore`] and
//! assert append/read behavior deterministically.
//!
//! History is best-effort by contract. `append` returns an explicit result
//! so failures are observable, but callers in the scan pipeline log and
//! continue — a full disk must never fail a submission. Entries are
//! append-only with no deduplication: fetching the same scan twice records
//! two rows.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, warn};

use neuroscan_core::{defaults, HistoryEntry};

/// Failure internal to the history store. Never propagated as a pipeline
/// error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("History I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("History serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Append-only store of scan summaries.
pub trait HistoryStore: Send + Sync {
    /// Record one entry. The error is returned for observability; pipeline
    /// callers treat it as non-fatal.
    fn append(&self, entry: HistoryEntry) -> StoreResult<()>;

    /// All recorded entries in insertion order. Missing, corrupt, or
    /// inaccessible storage reads as empty — never an error.
    fn list(&self) -> Vec<HistoryEntry>;
}

/// History persisted as a single JSON array in one file.
///
/// There is no append primitive on a JSON file, so each append is
/// read-concatenate-rewrite of the whole list. Writes go through a temp
/// file and rename. Concurrent writers race last-writer-wins; losing a
/// concurrent append is accepted since entries are append-only summaries.
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the default history file name inside `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(defaults::HISTORY_FILE),
        }
    }

    fn read_entries(&self) -> Vec<HistoryEntry> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            // Absent file: no history yet
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(error) => {
                warn!(
                    path = %self.path.display(),
                    error = %error,
                    "History file is not valid JSON, reading as empty"
                );
                Vec::new()
            }
        }
    }
}

impl HistoryStore for FileHistoryStore {
    fn append(&self, entry: HistoryEntry) -> StoreResult<()> {
        let mut entries = self.read_entries();
        entries.push(entry);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Temp file + rename so readers never see a half-written list
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, serde_json::to_vec(&entries)?)?;
        fs::rename(&temp_path, &self.path)?;

        debug!(
            path = %self.path.display(),
            count = entries.len(),
            "History entry recorded"
        );
        Ok(())
    }

    fn list(&self) -> Vec<HistoryEntry> {
        self.read_entries()
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryHistoryStore {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn append(&self, entry: HistoryEntry) -> StoreResult<()> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry);
        Ok(())
    }

    fn list(&self) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuroscan_core::Classification;

    fn entry(id: &str) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            timestamp: "2026-02-10T12:00:00".to_string(),
            classification: Classification::Glioma,
            confidence: 0.91,
        }
    }

    #[test]
    fn test_memory_store_append_and_list() {
        let store = MemoryHistoryStore::new();
        assert!(store.list().is_empty());

        store.append(entry("a")).unwrap();
        store.append(entry("b")).unwrap();

        let entries = store.list();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "a");
        assert_eq!(entries[1].id, "b");
    }

    #[test]
    fn test_memory_store_keeps_duplicates() {
        let store = MemoryHistoryStore::new();
        store.append(entry("same")).unwrap();
        store.append(entry("same")).unwrap();
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn test_file_store_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(dir.path().join("scan_history.json"));
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan_history.json");
        let store = FileHistoryStore::new(&path);

        store.append(entry("a")).unwrap();
        store.append(entry("b")).unwrap();

        // A fresh store over the same file sees the same entries
        let reopened = FileHistoryStore::new(&path);
        let entries = reopened.list();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "a");
        assert_eq!(entries[1].id, "b");
    }

    #[test]
    fn test_file_store_corrupt_content_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan_history.json");
        fs::write(&path, "definitely not json {{{").unwrap();

        let store = FileHistoryStore::new(&path);
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_file_store_append_replaces_corrupt_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan_history.json");
        fs::write(&path, "garbage").unwrap();

        let store = FileHistoryStore::new(&path);
        store.append(entry("fresh")).unwrap();

        let entries = store.list();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "fresh");
    }

    #[test]
    fn test_in_dir_uses_default_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::in_dir(dir.path());
        store.append(entry("a")).unwrap();

        assert!(dir.path().join(defaults::HISTORY_FILE).exists());
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_file_store_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("history.json");
        let store = FileHistoryStore::new(&path);

        store.append(entry("a")).unwrap();
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_file_store_append_to_unwritable_path_errors() {
        // The error surfaces to the caller; pipeline callers swallow it
        let store = FileHistoryStore::new("/proc/definitely/not/writable/history.json");
        assert!(store.append(entry("a")).is_err());
        // list over the same path still reads as empty
        assert!(store.list().is_empty());
    }
}
