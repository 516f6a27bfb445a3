// veilmask-core/src/persist.rs
//! Persistence boundary for the alias store.
//!
//! The store itself never touches the filesystem directly; it talks to a
//! [`StoreBackend`], which loads the full entry list once at startup and
//! rewrites it after every mutation (write-through, no batching). A crash
//! can therefore never lose an alias that was already returned to a caller,
//! short of the backend's own save failing.
//!
//! Two implementations ship with the crate: [`JsonFileBackend`] for durable
//! single-file JSON storage and [`MemoryBackend`] for tests and ephemeral
//! engines.
//!
//! License: MIT OR APACHE 2.0

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::VeilError;
use crate::store::AliasEntry;

/// On-disk schema version. Bumped only for incompatible layout changes.
const STORE_FILE_VERSION: u32 = 1;

/// Loads and saves the complete alias entry list for one store scope.
pub trait StoreBackend: Send + Sync {
    /// Returns every persisted entry, in original insertion order.
    ///
    /// A missing backing file is not an error; it yields an empty list.
    /// Unparseable state must surface as [`VeilError::MalformedStoreState`]
    /// so the store can apply its empty-start policy.
    fn load(&self) -> Result<Vec<AliasEntry>, VeilError>;

    /// Replaces the persisted state with `entries`.
    fn save(&self, entries: &[AliasEntry]) -> Result<(), VeilError>;

    /// A human-readable identifier for diagnostics (a path, `"memory"`, ...).
    fn describe(&self) -> String;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    entries: Vec<AliasEntry>,
}

/// Durable JSON-file persistence.
///
/// Writes go to a sibling `.tmp` file first and are renamed into place, so
/// a crash mid-save leaves the previous state intact rather than a torn file.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StoreBackend for JsonFileBackend {
    fn load(&self) -> Result<Vec<AliasEntry>, VeilError> {
        if !self.path.exists() {
            debug!("No alias store file at {}; starting empty.", self.path.display());
            return Ok(Vec::new());
        }

        let text = fs::read_to_string(&self.path).map_err(|e| {
            VeilError::Persistence(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        let file: StoreFile = serde_json::from_str(&text).map_err(|e| {
            VeilError::MalformedStoreState(format!(
                "failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })?;

        if file.version != STORE_FILE_VERSION {
            return Err(VeilError::MalformedStoreState(format!(
                "unsupported store file version {} in {}",
                file.version,
                self.path.display()
            )));
        }

        debug!(
            "Loaded {} alias entries from {}.",
            file.entries.len(),
            self.path.display()
        );
        Ok(file.entries)
    }

    fn save(&self, entries: &[AliasEntry]) -> Result<(), VeilError> {
        let file = StoreFile { version: STORE_FILE_VERSION, entries: entries.to_vec() };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| VeilError::Persistence(format!("failed to serialize store: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    VeilError::Persistence(format!(
                        "failed to create store directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| {
            VeilError::Persistence(format!("failed to write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            VeilError::Persistence(format!(
                "failed to move {} into place: {}",
                tmp.display(),
                e
            ))
        })?;

        debug!("Persisted {} alias entries to {}.", entries.len(), self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Volatile in-process persistence for tests and throwaway engines.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<Vec<AliasEntry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreBackend for MemoryBackend {
    fn load(&self) -> Result<Vec<AliasEntry>, VeilError> {
        Ok(self.entries.lock().expect("memory backend poisoned").clone())
    }

    fn save(&self, entries: &[AliasEntry]) -> Result<(), VeilError> {
        *self.entries.lock().expect("memory backend poisoned") = entries.to_vec();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;

    fn entry(original: &str, alias: &str, category: Category, sequence: u32) -> AliasEntry {
        AliasEntry {
            original: original.to_string(),
            alias: alias.to_string(),
            category,
            sequence,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn file_backend_round_trips_entries() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("aliases.json"));

        assert!(backend.load().unwrap().is_empty());

        let entries = vec![
            entry("Acme Corp", "[Company_1]", Category::Company, 1),
            entry("jane@acme.com", "[Email_1]", Category::Email, 1),
        ];
        backend.save(&entries).unwrap();
        assert_eq!(backend.load().unwrap(), entries);
    }

    #[test]
    fn file_backend_flags_garbage_as_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aliases.json");
        fs::write(&path, "not json at all {").unwrap();

        let backend = JsonFileBackend::new(&path);
        match backend.load() {
            Err(VeilError::MalformedStoreState(_)) => {}
            other => panic!("expected MalformedStoreState, got {:?}", other),
        }
    }

    #[test]
    fn file_backend_rejects_future_versions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aliases.json");
        fs::write(&path, r#"{"version": 99, "entries": []}"#).unwrap();

        let backend = JsonFileBackend::new(&path);
        assert!(matches!(backend.load(), Err(VeilError::MalformedStoreState(_))));
    }

    #[test]
    fn memory_backend_round_trips_entries() {
        let backend = MemoryBackend::new();
        let entries = vec![entry("John Smith", "[Client_1]", Category::Client, 1)];
        backend.save(&entries).unwrap();
        assert_eq!(backend.load().unwrap(), entries);
    }
}
