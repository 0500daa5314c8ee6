//! Normalized search key and its matching predicate.

use crate::model::note::Note;

/// Normalized search string: trimmed and lowercased.
///
/// Empty after normalization means "match all". Normalization is total, so
/// any `&str` becomes a valid key; there is no malformed-key error path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    /// Builds a key from raw user input.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this key matches every note.
    pub fn matches_all(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive substring match over title or content.
    pub fn matches(&self, note: &Note) -> bool {
        self.matches_all()
            || note.title.to_lowercase().contains(&self.0)
            || note.content.to_lowercase().contains(&self.0)
    }
}
