//! Session caches shared by every fetch.
//!
//! Nothing here is persisted or evicted. A [`CacheStore`] lives as long as the
//! fetchers that hold it; tests build a fresh one per case.

mod inflight;

pub use inflight::InflightMap;

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::backend::{BackendKind, PathSet};
use crate::result::FileResult;

/// Identity of a raw listing document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetaKey {
    /// `{package.json path or name}@{version}`.
    pub id: String,
    pub backend: BackendKind,
}

impl MetaKey {
    pub fn new(package: &str, version: &str, backend: BackendKind) -> Self {
        Self {
            id: format!("{package}@{version}"),
            backend,
        }
    }
}

/// Identity of one downloaded file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey {
    /// Real package name, after alias resolution.
    pub name: String,
    pub version: String,
    /// Path relative to the package root.
    pub path: String,
}

/// Counters for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub meta_hits: u64,
    pub meta_misses: u64,
    pub content_hits: u64,
    pub content_misses: u64,
    pub normalized_entries: usize,
    pub known_paths: usize,
}

/// The four session maps.
#[derive(Debug, Default)]
pub struct CacheStore {
    pub(crate) metas: InflightMap<MetaKey, Arc<Value>>,
    pub(crate) files: InflightMap<ContentKey, Arc<FileResult>>,
    normalized: DashMap<String, Arc<PathSet>>,
    known_paths: RwLock<PathSet>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalized listing previously stored under `key` (`{name}{root}`).
    pub fn normalized(&self, key: &str) -> Option<Arc<PathSet>> {
        self.normalized.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Store a normalized listing and merge it into the existence index.
    ///
    /// An existing entry for `key` wins; the returned set is the one in the
    /// cache afterwards.
    pub fn insert_normalized(&self, key: String, paths: PathSet) -> Arc<PathSet> {
        let stored = Arc::clone(
            self.normalized
                .entry(key.clone())
                .or_insert_with(|| Arc::new(paths))
                .value(),
        );
        let mut known = self.known_paths.write();
        let before = known.len();
        known.extend(stored.iter().cloned());
        debug!(key = %key, added = known.len() - before, "merged listing into existence index");
        stored
    }

    /// Whether any listing seen so far contains `path`.
    pub fn is_known(&self, path: &str) -> bool {
        self.known_paths.read().contains(path)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            meta_hits: self.metas.hits(),
            meta_misses: self.metas.misses(),
            content_hits: self.files.hits(),
            content_misses: self.files.misses(),
            normalized_entries: self.normalized.len(),
            known_paths: self.known_paths.read().len(),
        }
    }
}
