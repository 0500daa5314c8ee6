//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store, cache and subscriptions into use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod notebook;
pub mod preview;
