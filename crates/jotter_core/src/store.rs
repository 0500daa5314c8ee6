//! Note store facade over repository implementations.
//!
//! # Responsibility
//! - Own note identity assignment and the process-wide data version.
//! - Gate every mutation through one place so staleness tracking stays
//!   correct.
//!
//! # Invariants
//! - The data version advances exactly once per successful mutation.
//! - Failed mutations leave the version (and therefore every cache entry)
//!   untouched.
//! - Ids are UUID v4: never reused, even after a hard delete.

use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::{NoteRepository, StoreResult};

/// Authoritative keyed collection of notes.
///
/// Generic over the repository so tests and alternative backends can slot
/// in; the cache only ever observes it through `all()` and `data_version()`.
pub struct NoteStore<R: NoteRepository> {
    repo: R,
    data_version: u64,
}

impl<R: NoteRepository> NoteStore<R> {
    /// Creates a store over the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            data_version: 0,
        }
    }

    /// Monotonic counter bumped on every successful mutation.
    ///
    /// Process-local: the caches it guards are process-local too.
    pub fn data_version(&self) -> u64 {
        self.data_version
    }

    /// Assigns a fresh id, persists the record and returns it.
    pub fn create(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> StoreResult<Note> {
        let note = Note::new(title, content);
        self.repo.insert(&note)?;
        self.data_version += 1;
        Ok(note)
    }

    /// Replaces title/content of an existing note and returns the updated
    /// record. Fails with `NotFound` when the id is absent or retired.
    pub fn update(&mut self, id: NoteId, title: &str, content: &str) -> StoreResult<Note> {
        let note = self.repo.update(id, title, content)?;
        self.data_version += 1;
        Ok(note)
    }

    /// Removes the record permanently. Fails with `NotFound` when absent.
    pub fn delete(&mut self, id: NoteId) -> StoreResult<()> {
        self.repo.delete(id)?;
        self.data_version += 1;
        Ok(())
    }

    /// Gets one note by id.
    pub fn get(&self, id: NoteId) -> StoreResult<Option<Note>> {
        self.repo.get(id)
    }

    /// Read-only snapshot of every note, ordered `updated_at DESC, id ASC`.
    pub fn all(&self) -> StoreResult<Vec<Note>> {
        self.repo.list_all()
    }
}
