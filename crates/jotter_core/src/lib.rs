//! Core domain logic for jotter.
//! This crate is the single source of truth for note data and query state.

pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteId};
pub use query::cache::QueryCache;
pub use query::key::QueryKey;
pub use query::subscription::{QueryListener, SubscriptionHandle, SubscriptionManager};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository, StoreError, StoreResult};
pub use service::notebook::{Notebook, PendingEdit};
pub use service::preview::derive_note_preview;
pub use store::NoteStore;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
