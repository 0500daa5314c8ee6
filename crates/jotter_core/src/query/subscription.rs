//! Handle-based subscription registry with republish-on-invalidation.
//!
//! # Responsibility
//! - Track which query keys have live consumers.
//! - Push recomputed results to consumers, skipping unchanged ones.
//!
//! # Invariants
//! - Handles are monotonic and never reused; releasing an unknown handle is
//!   a no-op.
//! - A consumer is called only with a result that differs from the last one
//!   it was given.

use crate::model::note::Note;
use crate::query::key::QueryKey;
use log::debug;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Consumer callback receiving each newly published result.
///
/// `Send` so a notebook can live behind a process-global mutex (the FFI
/// embedding); publication itself always happens on the dispatching call
/// stack.
pub type QueryListener = Box<dyn FnMut(&[Note]) + Send>;

/// Opaque token identifying one active subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionHandle(u64);

struct Subscription {
    key: QueryKey,
    last_published: Arc<Vec<Note>>,
    listener: QueryListener,
}

/// Registry of active subscriptions.
///
/// Lifecycle per subscription is `Unsubscribed -> Active -> Unsubscribed`;
/// re-subscribing starts a fresh lifecycle under a new handle.
#[derive(Default)]
pub struct SubscriptionManager {
    next_id: u64,
    active: BTreeMap<u64, Subscription>,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in `key`. `initial` becomes the last-published
    /// baseline; it was already handed to the consumer by the caller.
    pub fn register(
        &mut self,
        key: QueryKey,
        initial: Arc<Vec<Note>>,
        listener: QueryListener,
    ) -> SubscriptionHandle {
        self.next_id += 1;
        let id = self.next_id;
        self.active.insert(
            id,
            Subscription {
                key,
                last_published: initial,
                listener,
            },
        );
        debug!("event=subscribe module=query status=ok handle={id} active={}", self.active.len());
        SubscriptionHandle(id)
    }

    /// Removes the registration. Returns whether the handle was active;
    /// releasing twice (or a foreign handle) is a no-op.
    pub fn release(&mut self, handle: SubscriptionHandle) -> bool {
        let removed = self.active.remove(&handle.0).is_some();
        if removed {
            debug!(
                "event=unsubscribe module=query status=ok handle={} active={}",
                handle.0,
                self.active.len()
            );
        }
        removed
    }

    /// Whether the handle still has an active registration.
    pub fn is_active(&self, handle: SubscriptionHandle) -> bool {
        self.active.contains_key(&handle.0)
    }

    /// Number of active subscriptions.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Recomputes every active subscription through `fetch` and publishes
    /// results that differ from the last published value.
    ///
    /// Returns how many subscriptions were published to. A `fetch` error
    /// aborts the sweep; consumers keep their previous values.
    pub fn republish<E>(
        &mut self,
        mut fetch: impl FnMut(&QueryKey) -> Result<Arc<Vec<Note>>, E>,
    ) -> Result<usize, E> {
        let mut published = 0;
        for subscription in self.active.values_mut() {
            let fresh = fetch(&subscription.key)?;
            if *fresh != *subscription.last_published {
                subscription.last_published = Arc::clone(&fresh);
                (subscription.listener)(&fresh);
                published += 1;
            }
        }
        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::SubscriptionManager;
    use crate::model::note::Note;
    use crate::query::key::QueryKey;
    use std::convert::Infallible;
    use std::sync::{Arc, Mutex};

    fn empty() -> Arc<Vec<Note>> {
        Arc::new(Vec::new())
    }

    #[test]
    fn handles_are_monotonic_and_not_reused() {
        let mut manager = SubscriptionManager::new();
        let first = manager.register(QueryKey::normalize(""), empty(), Box::new(|_| {}));
        assert!(manager.release(first));

        let second = manager.register(QueryKey::normalize(""), empty(), Box::new(|_| {}));
        assert_ne!(first, second);
    }

    #[test]
    fn release_of_unknown_handle_is_noop() {
        let mut manager = SubscriptionManager::new();
        let handle = manager.register(QueryKey::normalize(""), empty(), Box::new(|_| {}));
        assert!(manager.release(handle));
        assert!(!manager.release(handle));
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn republish_skips_unchanged_results() {
        let mut manager = SubscriptionManager::new();
        let calls = Arc::new(Mutex::new(0_usize));
        let observed = Arc::clone(&calls);
        manager.register(
            QueryKey::normalize(""),
            empty(),
            Box::new(move |_| *observed.lock().unwrap() += 1),
        );

        let unchanged = manager
            .republish(|_| Ok::<_, Infallible>(empty()))
            .unwrap();
        assert_eq!(unchanged, 0);
        assert_eq!(*calls.lock().unwrap(), 0);

        let fresh = Arc::new(vec![Note::new("Groceries", "milk")]);
        let changed = manager
            .republish(move |_| Ok::<_, Infallible>(Arc::clone(&fresh)))
            .unwrap();
        assert_eq!(changed, 1);
        assert_eq!(*calls.lock().unwrap(), 1);
    }
}
