//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the note data-access contract used by the store facade.
//! - Isolate SQLite query details from cache/dispatch orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod note_repo;
