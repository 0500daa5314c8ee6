//! Reactive query layer: memoized search plus live subscriptions.
//!
//! # Responsibility
//! - Memoize substring search results against the note store.
//! - Track active subscriptions and republish changed results after
//!   mutations.
//!
//! # Invariants
//! - A cached result is never older than the last mutation that could
//!   affect it: entries are stamped with the store data version and any
//!   stamp mismatch forces a recompute.
//! - Publication happens on the dispatching call stack; an unsubscribed
//!   handle never receives another publication.

pub mod cache;
pub mod key;
pub mod subscription;
