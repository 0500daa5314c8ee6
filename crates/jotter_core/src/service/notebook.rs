//! Notebook facade: the single entry point for reads and writes.
//!
//! # Responsibility
//! - Couple every store mutation to cache invalidation and subscription
//!   republication.
//! - Provide the subscription lifecycle incl. the commit-on-teardown path.
//!
//! # Invariants
//! - Invalidation is observed by every subsequent query before a dispatch
//!   call returns.
//! - A failed mutation performs no invalidation and publishes nothing.
//! - `dispatch_update` after a successful `dispatch_delete` of the same id
//!   fails with `NotFound`; it never re-creates the record.
//!
//! All operations take `&mut self`, so mutations and reads execute on one
//! sequential timeline. Embeddings that share a notebook across threads
//! serialize calls externally (see `jotter_ffi`).

use crate::db::{open_db, open_db_in_memory};
use crate::model::note::{Note, NoteId};
use crate::query::cache::QueryCache;
use crate::query::key::QueryKey;
use crate::query::subscription::{SubscriptionHandle, SubscriptionManager};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository, StoreResult};
use crate::store::NoteStore;
use log::debug;
use std::path::Path;
use std::sync::Arc;

/// Field changes held by an edit session, flushed on teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub id: NoteId,
    pub title: String,
    pub content: String,
}

/// Owner of the note store, query cache and subscription registry.
pub struct Notebook<R: NoteRepository> {
    store: NoteStore<R>,
    cache: QueryCache,
    subscriptions: SubscriptionManager,
}

impl Notebook<SqliteNoteRepository> {
    /// Opens a file-backed notebook, applying pending schema migrations.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = open_db(path)?;
        Ok(Self::new(SqliteNoteRepository::try_new(conn)?))
    }

    /// Opens an in-memory notebook, mostly for tests and probes.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = open_db_in_memory()?;
        Ok(Self::new(SqliteNoteRepository::try_new(conn)?))
    }
}

impl<R: NoteRepository> Notebook<R> {
    /// Creates a notebook over any repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            store: NoteStore::new(repo),
            cache: QueryCache::new(),
            subscriptions: SubscriptionManager::new(),
        }
    }

    /// Creates a note, then refreshes caches and subscribers.
    pub fn dispatch_create(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> StoreResult<Note> {
        let note = self.store.create(title, content)?;
        self.after_mutation("dispatch_create")?;
        Ok(note)
    }

    /// Updates a note, then refreshes caches and subscribers.
    pub fn dispatch_update(
        &mut self,
        id: NoteId,
        title: impl AsRef<str>,
        content: impl AsRef<str>,
    ) -> StoreResult<Note> {
        let note = self.store.update(id, title.as_ref(), content.as_ref())?;
        self.after_mutation("dispatch_update")?;
        Ok(note)
    }

    /// Deletes a note permanently, then refreshes caches and subscribers.
    pub fn dispatch_delete(&mut self, id: NoteId) -> StoreResult<()> {
        self.store.delete(id)?;
        self.after_mutation("dispatch_delete")?;
        Ok(())
    }

    /// One-shot cached query for `key` (no subscription).
    pub fn query(&mut self, key: &str) -> StoreResult<Arc<Vec<Note>>> {
        self.cache.get(&self.store, &QueryKey::normalize(key))
    }

    /// Gets one note by id.
    pub fn note(&self, id: NoteId) -> StoreResult<Option<Note>> {
        self.store.get(id)
    }

    /// Registers a live query and returns its current result immediately.
    ///
    /// The listener runs on the dispatching call stack whenever the result
    /// for `key` changes, until the handle is released.
    pub fn subscribe<F>(
        &mut self,
        key: &str,
        listener: F,
    ) -> StoreResult<(Arc<Vec<Note>>, SubscriptionHandle)>
    where
        F: FnMut(&[Note]) + Send + 'static,
    {
        let key = QueryKey::normalize(key);
        let current = self.cache.get(&self.store, &key)?;
        let handle =
            self.subscriptions
                .register(key, Arc::clone(&current), Box::new(listener));
        Ok((current, handle))
    }

    /// Removes the registration immediately. Unknown handles are a no-op.
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) {
        self.subscriptions.release(handle);
    }

    /// Commit-on-teardown: flushes `pending` through the dispatcher, then
    /// releases the handle.
    ///
    /// The handle is released in all cases, including a failed flush — a
    /// torn-down edit session must not keep receiving publications. Callers
    /// pass `None` when no field changed. Returns the updated note when a
    /// pending edit was flushed.
    pub fn flush_and_unsubscribe(
        &mut self,
        handle: SubscriptionHandle,
        pending: Option<PendingEdit>,
    ) -> StoreResult<Option<Note>> {
        let flushed = pending.map(|edit| self.dispatch_update(edit.id, edit.title, edit.content));
        self.subscriptions.release(handle);
        match flushed {
            Some(Ok(note)) => Ok(Some(note)),
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }

    /// Current store data version, exposed for diagnostics and tests.
    pub fn data_version(&self) -> u64 {
        self.store.data_version()
    }

    /// Number of active subscriptions.
    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions.active_count()
    }

    fn after_mutation(&mut self, op: &'static str) -> StoreResult<()> {
        let Self {
            store,
            cache,
            subscriptions,
        } = self;
        cache.invalidate_all(store.data_version());
        let republished = subscriptions.republish(|key| cache.get(store, key))?;
        debug!(
            "event={op} module=notebook status=ok data_version={} republished={republished}",
            store.data_version()
        );
        Ok(())
    }
}
