//! Note domain model.
//!
//! # Responsibility
//! - Define the single persisted entity of the core.
//! - Provide construction and mutation helpers that keep timestamps honest.
//!
//! # Invariants
//! - `id` is assigned once at creation and never changes.
//! - `updated_at >= created_at` for every note that went through the store.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for a note.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = Uuid;

/// Canonical note record.
///
/// The UI layer renders these directly; both timestamps are epoch
/// milliseconds so list ordering and display need no further conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable global ID assigned at creation.
    pub id: NoteId,
    /// Short display title.
    pub title: String,
    /// Free-form body text.
    pub content: String,
    /// Creation time in epoch milliseconds, immutable after creation.
    pub created_at: i64,
    /// Last mutation time in epoch milliseconds.
    pub updated_at: i64,
}

impl Note {
    /// Creates a new note with a generated stable ID and fresh timestamps.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces title and content and refreshes `updated_at`.
    pub fn apply_edit(&mut self, title: impl Into<String>, content: impl Into<String>) {
        self.title = title.into();
        self.content = content.into();
        self.updated_at = now_epoch_ms();
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{now_epoch_ms, Note};

    #[test]
    fn new_assigns_id_and_equal_timestamps() {
        let note = Note::new("Groceries", "milk, eggs");
        assert!(!note.id.is_nil());
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.content, "milk, eggs");
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn apply_edit_keeps_id_and_created_at() {
        let mut note = Note::new("Groceries", "milk");
        let id = note.id;
        let created_at = note.created_at;

        note.apply_edit("Shopping", "milk, eggs");

        assert_eq!(note.id, id);
        assert_eq!(note.created_at, created_at);
        assert_eq!(note.title, "Shopping");
        assert!(note.updated_at >= created_at);
    }

    #[test]
    fn now_epoch_ms_is_after_2020() {
        assert!(now_epoch_ms() > 1_577_836_800_000);
    }
}
