//! Flat key→string store backing the virtual filesystem.
//!
//! Keys are "paths" only by convention; there is no hierarchy. Mutations
//! apply immediately (last-writer-wins) and are written through to a JSON
//! file when the store was opened with a backing path. Persistence
//! failures are logged and dropped, never surfaced to processes.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("{path}: no such file")]
    NotFound { path: String },
}

#[derive(Debug, Default)]
pub struct Storage {
    entries: BTreeMap<String, String>,
    backing: Option<PathBuf>,
}

impl Storage {
    /// Store without persistence, for tests and piped one-shot runs.
    pub fn in_memory() -> Self {
        Storage::default()
    }

    /// Open a store persisted at `path`, loading any existing contents.
    /// A missing or unreadable file starts the session empty.
    pub fn open(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(err) => {
                    warn!(path = %path.display(), %err, "storage file unreadable, starting empty");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Storage {
            entries,
            backing: Some(path),
        }
    }

    pub fn read(&self, path: &str) -> Result<String, StorageError> {
        self.entries
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                path: path.to_string(),
            })
    }

    pub fn write(&mut self, path: &str, content: &str) {
        self.entries.insert(path.to_string(), content.to_string());
        self.persist();
    }

    /// Appends to `path`, creating the key if absent.
    pub fn append(&mut self, path: &str, content: &str) {
        self.entries
            .entry(path.to_string())
            .or_default()
            .push_str(content);
        self.persist();
    }

    /// All keys, sorted.
    pub fn list(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn rename(&mut self, path: &str, target: &str) -> Result<(), StorageError> {
        let content = self
            .entries
            .remove(path)
            .ok_or_else(|| StorageError::NotFound {
                path: path.to_string(),
            })?;
        self.entries.insert(target.to_string(), content);
        self.persist();
        Ok(())
    }

    /// Idempotent: removing an absent key succeeds.
    pub fn remove(&mut self, path: &str) {
        self.entries.remove(path);
        self.persist();
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    fn persist(&self) {
        let Some(path) = &self.backing else { return };
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let serialized = match serde_json::to_string_pretty(&self.entries) {
            Ok(s) => s,
            Err(err) => {
                warn!(%err, "storage serialization failed");
                return;
            }
        };
        if let Err(err) = fs::write(path, serialized) {
            warn!(path = %path.display(), %err, "storage persistence failed");
        }
    }
}
