//! Version-stamped memoization of search results.
//!
//! # Responsibility
//! - Serve repeated queries without rescanning the store.
//! - Guarantee a cache miss for every key after any mutation.
//!
//! # Invariants
//! - An entry is served only when its stamp equals the store's current data
//!   version.
//! - `invalidate_all` never recomputes; it only drops stale entries.
//!
//! Invalidation is a global flush by version stamp rather than per-key
//! dependency tracking: a substring query's dependency set is unbounded and
//! data-dependent (any title/content edit can affect any key), so precise
//! tracking cannot be correct here.

use crate::model::note::Note;
use crate::query::key::QueryKey;
use crate::repo::note_repo::{NoteRepository, StoreResult};
use crate::store::NoteStore;
use log::trace;
use std::collections::HashMap;
use std::sync::Arc;

struct CacheEntry {
    result: Arc<Vec<Note>>,
    version: u64,
}

/// Memoized substring-search results keyed by normalized query string.
///
/// Pure cache: dropping any entry at any time is correct, the store stays
/// the source of truth. Consumers hold results as shared read-only views.
#[derive(Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, CacheEntry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached result for `key`, recomputing from the store when
    /// the entry is missing or stale.
    pub fn get<R: NoteRepository>(
        &mut self,
        store: &NoteStore<R>,
        key: &QueryKey,
    ) -> StoreResult<Arc<Vec<Note>>> {
        let version = store.data_version();
        if let Some(entry) = self.entries.get(key) {
            if entry.version == version {
                trace!(
                    "event=query_get module=query status=hit key_len={} version={version}",
                    key.as_str().len()
                );
                return Ok(Arc::clone(&entry.result));
            }
        }

        let matched: Vec<Note> = store
            .all()?
            .into_iter()
            .filter(|note| key.matches(note))
            .collect();
        let result = Arc::new(matched);
        self.entries.insert(
            key.clone(),
            CacheEntry {
                result: Arc::clone(&result),
                version,
            },
        );
        trace!(
            "event=query_get module=query status=miss key_len={} version={version} hits={}",
            key.as_str().len(),
            result.len()
        );
        Ok(result)
    }

    /// Drops every entry computed against an older data version.
    ///
    /// Called after each successful mutation. The stamp check in `get`
    /// already guarantees a miss for stale entries; this bounds the memory
    /// held by results nobody can be served again.
    pub fn invalidate_all(&mut self, current_version: u64) {
        self.entries
            .retain(|_, entry| entry.version == current_version);
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
