//! Domain model for the note collection.
//!
//! # Responsibility
//! - Define the canonical note record shared by store, cache and UI boundary.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deleted ids are retired permanently and never reassigned.

pub mod note;
