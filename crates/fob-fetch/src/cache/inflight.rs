//! Shared in-flight futures keyed by request identity.

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::{BoxFuture, FutureExt, Shared};

use crate::error::FetchResult;

type SharedFetch<T> = Shared<BoxFuture<'static, FetchResult<T>>>;

/// Map from key to the one future that produces its value.
///
/// The first caller for a key inserts the future before anyone polls it;
/// later callers attach to the same handle. Successful values stay for the
/// life of the map. A failed future is removed so the next caller starts over.
pub struct InflightMap<K, T> {
    entries: DashMap<K, SharedFetch<T>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, T> Default for InflightMap<K, T>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

impl<K, T> fmt::Debug for InflightMap<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InflightMap")
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<K, T> InflightMap<K, T>
where
    K: Eq + Hash + Clone,
    T: Clone + Send + Sync + 'static,
{
    /// Await the value for `key`, creating its future with `make` when no
    /// entry exists.
    ///
    /// `make` runs while the map shard is locked and must only build the
    /// future, not poll it.
    pub async fn get_or_spawn<F>(&self, key: K, make: F) -> FetchResult<T>
    where
        F: FnOnce() -> BoxFuture<'static, FetchResult<T>>,
    {
        let shared = match self.entries.entry(key.clone()) {
            Entry::Occupied(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let shared = make().shared();
                entry.insert(shared.clone());
                shared
            }
        };

        let result = shared.clone().await;
        if result.is_err() {
            // A newer attempt may already have replaced the failed handle
            self.entries
                .remove_if(&key, |_, current| current.ptr_eq(&shared));
        }
        result
    }

    /// Whether `key` has an entry, pending or completed.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of calls that attached to an existing entry.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of calls that created an entry.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
