// veilmask-core/src/store.rs
//! The persistent, bidirectional alias store.
//!
//! One [`AliasStore`] owns every original-text/placeholder pair for a single
//! user or session scope. The two directions are explicit indices over a
//! single entry list rather than one flat map holding both, so an original
//! that happens to look like a placeholder can never collide with a real
//! alias.
//!
//! Invariants:
//! * an alias is unique across the store, and so is a trimmed original;
//! * `sequence` is the 1-based ordinal of the alias within its category,
//!   assigned at creation and never reused;
//! * entries are never deleted, so a placeholder stays resolvable for the
//!   lifetime of the store.
//!
//! License: MIT OR APACHE 2.0

use std::collections::HashMap;

use chrono::Utc;
use lazy_static::lazy_static;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::category::Category;
use crate::errors::VeilError;
use crate::persist::StoreBackend;
use crate::token;

lazy_static! {
    /// Initialized once to decide whether raw originals may appear in debug logs.
    static ref PII_DEBUG_ALLOWED: bool = {
        std::env::var("VEILMASK_ALLOW_DEBUG_PII")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// A short, stable digest of sensitive text, safe to put in log lines.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(&hasher.finalize()[..6])
}

fn loggable(text: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        text.to_string()
    } else {
        format!("sha256:{}", fingerprint(text))
    }
}

/// One original-text/placeholder pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    /// The trimmed sensitive text this alias stands for.
    pub original: String,
    /// The placeholder token, e.g. `[Client_3]`.
    pub alias: String,
    pub category: Category,
    /// 1-based ordinal of this alias within its category.
    pub sequence: u32,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// Persistent bidirectional mapping between originals and placeholders.
///
/// The store is synchronous and takes `&mut self` for mutation; a deployment
/// where several callers share one persisted store must serialize
/// [`AliasStore::get_or_create`] (wrap the store in a mutex) so the
/// read-count-insert-persist step stays atomic per call. `resolve` is
/// read-only and safe to share.
pub struct AliasStore {
    entries: Vec<AliasEntry>,
    by_original: HashMap<String, String>,
    by_alias: HashMap<String, String>,
    backend: Box<dyn StoreBackend>,
}

impl std::fmt::Debug for AliasStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliasStore")
            .field("entries", &self.entries.len())
            .field("backend", &self.backend.describe())
            .finish()
    }
}

impl AliasStore {
    /// Opens a store over `backend`, loading any persisted state.
    ///
    /// Malformed persisted state (unparseable file, duplicate originals or
    /// aliases, aliases outside the placeholder grammar) initializes the
    /// store empty instead of failing startup. The data loss is logged; that
    /// trade of silent memory loss for availability is deliberate policy.
    /// I/O failures reading an existing file are surfaced as errors.
    pub fn open(backend: Box<dyn StoreBackend>) -> Result<Self, VeilError> {
        let entries = match backend.load() {
            Ok(entries) => entries,
            Err(VeilError::MalformedStoreState(msg)) => {
                warn!(
                    "Alias store at {} is malformed ({}); starting with an empty store. \
                     Previously issued placeholders will no longer resolve.",
                    backend.describe(),
                    msg
                );
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let mut store = Self {
            entries: Vec::new(),
            by_original: HashMap::new(),
            by_alias: HashMap::new(),
            backend,
        };

        if let Err(VeilError::MalformedStoreState(msg)) = store.adopt(entries) {
            warn!(
                "Alias store at {} violates its uniqueness invariants ({}); \
                 starting with an empty store.",
                store.backend.describe(),
                msg
            );
            store.entries.clear();
            store.by_original.clear();
            store.by_alias.clear();
        }

        debug!(
            "Alias store opened with {} entries from {}.",
            store.entries.len(),
            store.backend.describe()
        );
        Ok(store)
    }

    /// Rebuilds both indices from `entries`, enforcing uniqueness.
    fn adopt(&mut self, entries: Vec<AliasEntry>) -> Result<(), VeilError> {
        for entry in &entries {
            if token::parse_placeholder(&entry.alias) != Some((entry.category, entry.sequence)) {
                return Err(VeilError::MalformedStoreState(format!(
                    "entry alias '{}' does not match its category/sequence",
                    entry.alias
                )));
            }
            let key = entry.original.trim().to_string();
            if self.by_original.insert(key, entry.alias.clone()).is_some() {
                return Err(VeilError::MalformedStoreState(format!(
                    "duplicate original behind alias '{}'",
                    entry.alias
                )));
            }
            if self
                .by_alias
                .insert(entry.alias.clone(), entry.original.clone())
                .is_some()
            {
                return Err(VeilError::MalformedStoreState(format!(
                    "duplicate alias '{}'",
                    entry.alias
                )));
            }
        }
        self.entries = entries;
        Ok(())
    }

    /// Returns the alias for `original`, creating and persisting a new one
    /// if none exists.
    ///
    /// The original is trimmed first, so `"Acme Corp"` and `" Acme Corp "`
    /// share one alias. A new alias gets sequence number
    /// `count-of-existing-entries-in-category + 1`, recounted on every call
    /// rather than read from a stored counter.
    ///
    /// On persistence failure the in-memory mapping is already established
    /// and stays usable for the rest of the process; the error is surfaced
    /// so the caller knows durability was not achieved.
    pub fn get_or_create(&mut self, original: &str, category: Category) -> Result<String, VeilError> {
        let key = original.trim();
        if key.is_empty() {
            return Err(VeilError::Fatal(
                "refusing to register an alias for empty text".to_string(),
            ));
        }

        if let Some(alias) = self.by_original.get(key) {
            return Ok(alias.clone());
        }

        let sequence = self.count_for(category) as u32 + 1;
        let alias = token::format_placeholder(category, sequence);
        debug!(
            "Registering alias {} for original {} ({} chars).",
            alias,
            loggable(key),
            key.len()
        );

        self.entries.push(AliasEntry {
            original: key.to_string(),
            alias: alias.clone(),
            category,
            sequence,
            created_at: Utc::now().to_rfc3339(),
        });
        self.by_original.insert(key.to_string(), alias.clone());
        self.by_alias.insert(alias.clone(), key.to_string());

        self.backend.save(&self.entries)?;
        Ok(alias)
    }

    /// Resolves a placeholder back to its original text. Pure lookup.
    pub fn resolve(&self, alias: &str) -> Option<&str> {
        self.by_alias.get(alias).map(String::as_str)
    }

    /// Forward lookup without creation, for diagnostics.
    pub fn lookup(&self, original: &str) -> Option<&str> {
        self.by_original.get(original.trim()).map(String::as_str)
    }

    /// Count of distinct originals across all categories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of distinct originals registered under `category`.
    pub fn count_for(&self, category: Category) -> usize {
        self.entries.iter().filter(|e| e.category == category).count()
    }

    /// Read-only view of every entry, in insertion order.
    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryBackend;

    fn memory_store() -> AliasStore {
        AliasStore::open(Box::new(MemoryBackend::new())).unwrap()
    }

    #[test]
    fn aliases_are_stable_per_trimmed_original() {
        let mut store = memory_store();
        let a = store.get_or_create("Acme Corp", Category::Company).unwrap();
        let b = store.get_or_create(" Acme Corp ", Category::Company).unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn sequences_count_per_category() {
        let mut store = memory_store();
        assert_eq!(store.get_or_create("John Smith", Category::Client).unwrap(), "[Client_1]");
        assert_eq!(store.get_or_create("Acme Corp", Category::Company).unwrap(), "[Company_1]");
        assert_eq!(store.get_or_create("Jane Doe", Category::Client).unwrap(), "[Client_2]");
        assert_eq!(store.count_for(Category::Client), 2);
        assert_eq!(store.count_for(Category::Company), 1);
    }

    #[test]
    fn resolve_is_the_exact_inverse() {
        let mut store = memory_store();
        let alias = store.get_or_create("jane@acme.com", Category::Email).unwrap();
        assert_eq!(store.resolve(&alias), Some("jane@acme.com"));
        assert_eq!(store.resolve("[Email_999]"), None);
    }

    #[test]
    fn refuses_empty_originals() {
        let mut store = memory_store();
        assert!(store.get_or_create("   ", Category::Client).is_err());
    }

    #[test]
    fn fingerprint_is_short_and_stable() {
        assert_eq!(fingerprint("abc"), fingerprint("abc"));
        assert_eq!(fingerprint("abc").len(), 12);
        assert_ne!(fingerprint("abc"), fingerprint("abd"));
    }
}
