//! FFI use-case API for the mobile UI layer.
//!
//! # Responsibility
//! - Expose stable, use-case-level note operations to Dart via FRB.
//! - Keep error semantics simple for screen-level integration.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - All writes and reads go through one process-global notebook, so the
//!   query cache and subscriptions see every mutation. The mutex serializes
//!   callers into a single writer queue.

use jotter_core::db::open_db;
use jotter_core::{
    core_version as core_version_inner, derive_note_preview, init_logging as init_logging_inner,
    ping as ping_inner, Note, Notebook, SqliteNoteRepository,
};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use uuid::Uuid;

const NOTEBOOK_DB_FILE_NAME: &str = "jotter_notes.sqlite3";
static NOTEBOOK_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static NOTEBOOK: OnceLock<Mutex<Notebook<SqliteNoteRepository>>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Note list item shape rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    /// Stable note ID in string form.
    pub id: String,
    pub title: String,
    pub content: String,
    /// Short plain-text summary for card/list display.
    pub preview: Option<String>,
    /// Last mutation time in epoch milliseconds.
    pub updated_at: i64,
}

/// Search response envelope for the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSearchResponse {
    /// Matching notes, most recently updated first (empty when no hits).
    pub items: Vec<NoteItem>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Generic action response envelope for mutation flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Affected note ID on success.
    pub note_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note_id: String) -> Self {
        Self {
            ok: true,
            note_id: Some(note_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note_id: None,
            message: message.into(),
        }
    }
}

/// Searches notes by case-insensitive substring; blank text lists all.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Served from the process-wide query cache when fresh.
#[flutter_rust_bridge::frb(sync)]
pub fn note_search(text: String) -> NoteSearchResponse {
    let result = with_notebook(|notebook| {
        notebook
            .query(text.as_str())
            .map_err(|err| format!("note_search failed: {err}"))
    });

    match result {
        Ok(notes) => {
            let items = notes.iter().map(to_note_item).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No results.".to_string()
            } else {
                format!("Found {} result(s).", items.len())
            };
            NoteSearchResponse { items, message }
        }
        Err(message) => NoteSearchResponse {
            items: Vec::new(),
            message,
        },
    }
}

/// Creates a note from the editor screen.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns the created note ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create(title: String, content: String) -> NoteActionResponse {
    let result = with_notebook(|notebook| {
        notebook
            .dispatch_create(title.trim().to_string(), content)
            .map_err(|err| format!("note_create failed: {err}"))
    });

    match result {
        Ok(note) => NoteActionResponse::success("Note created.", note.id.to_string()),
        Err(message) => NoteActionResponse::failure(message),
    }
}

/// Replaces a note's title and content.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Fails with a message when the id is malformed or unknown.
#[flutter_rust_bridge::frb(sync)]
pub fn note_update(id: String, title: String, content: String) -> NoteActionResponse {
    let note_id = match parse_note_id(&id) {
        Ok(note_id) => note_id,
        Err(message) => return NoteActionResponse::failure(message),
    };

    let result = with_notebook(|notebook| {
        notebook
            .dispatch_update(note_id, title.trim(), content.as_str())
            .map_err(|err| format!("note_update failed: {err}"))
    });

    match result {
        Ok(note) => NoteActionResponse::success("Note updated.", note.id.to_string()),
        Err(message) => NoteActionResponse::failure(message),
    }
}

/// Deletes a note permanently.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Fails with a message when the id is malformed or unknown.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(id: String) -> NoteActionResponse {
    let note_id = match parse_note_id(&id) {
        Ok(note_id) => note_id,
        Err(message) => return NoteActionResponse::failure(message),
    };

    let result = with_notebook(|notebook| {
        notebook
            .dispatch_delete(note_id)
            .map_err(|err| format!("note_delete failed: {err}"))
    });

    match result {
        Ok(()) => NoteActionResponse::success("Note deleted.", note_id.to_string()),
        Err(message) => NoteActionResponse::failure(message),
    }
}

fn parse_note_id(raw: &str) -> Result<jotter_core::NoteId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid note id `{raw}`"))
}

fn resolve_db_path() -> PathBuf {
    NOTEBOOK_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("JOTTER_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(NOTEBOOK_DB_FILE_NAME)
        })
        .clone()
}

fn with_notebook<T>(
    f: impl FnOnce(&mut Notebook<SqliteNoteRepository>) -> Result<T, String>,
) -> Result<T, String> {
    if NOTEBOOK.get().is_none() {
        let conn =
            open_db(resolve_db_path()).map_err(|err| format!("notebook DB open failed: {err}"))?;
        let repo = SqliteNoteRepository::try_new(conn)
            .map_err(|err| format!("notebook repo init failed: {err}"))?;
        // A concurrent first call may have won the race; that one is kept.
        if NOTEBOOK.set(Mutex::new(Notebook::new(repo))).is_ok() {
            log::info!("event=notebook_init module=ffi status=ok");
        }
    }

    let mutex = NOTEBOOK
        .get()
        .ok_or_else(|| "notebook not initialized".to_string())?;
    let mut notebook = mutex
        .lock()
        .map_err(|_| "notebook lock poisoned".to_string())?;
    f(&mut notebook)
}

fn to_note_item(note: &Note) -> NoteItem {
    NoteItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        content: note.content.clone(),
        preview: derive_note_preview(&note.content),
        updated_at: note.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, note_create, note_delete, note_search, note_update, ping,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn note_search_finds_created_note() {
        let token = unique_token("ffi-search");
        let created = note_create(format!("note {token}"), "body".to_string());
        assert!(created.ok, "{}", created.message);
        let created_id = created.note_id.clone().expect("create should return id");

        let response = note_search(token);
        assert!(response.items.iter().any(|item| item.id == created_id));
    }

    #[test]
    fn note_update_replaces_fields() {
        let token = unique_token("ffi-update");
        let created = note_create("draft".to_string(), format!("body {token}"));
        assert!(created.ok, "{}", created.message);
        let id = created.note_id.expect("create should return id");

        let replacement = unique_token("ffi-updated");
        let updated = note_update(id.clone(), replacement.clone(), "new body".to_string());
        assert!(updated.ok, "{}", updated.message);

        let response = note_search(replacement);
        assert!(response.items.iter().any(|item| item.id == id));
    }

    #[test]
    fn note_delete_removes_note_from_search() {
        let token = unique_token("ffi-delete");
        let created = note_create(format!("note {token}"), "body".to_string());
        assert!(created.ok, "{}", created.message);
        let id = created.note_id.expect("create should return id");

        let deleted = note_delete(id);
        assert!(deleted.ok, "{}", deleted.message);

        let response = note_search(token);
        assert!(response.items.is_empty());
    }

    #[test]
    fn note_update_rejects_malformed_id() {
        let response = note_update(
            "not-a-uuid".to_string(),
            "x".to_string(),
            "y".to_string(),
        );
        assert!(!response.ok);
        assert!(response.message.contains("invalid note id"));
    }

    #[test]
    fn note_delete_rejects_unknown_id() {
        let response = note_delete("00000000-0000-4000-8000-00000000dead".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("not found"));
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
