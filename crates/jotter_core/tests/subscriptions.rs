use jotter_core::{Note, Notebook, PendingEdit, StoreError};
use std::sync::{Arc, Mutex};

type PublishedLog = Arc<Mutex<Vec<Vec<Note>>>>;

/// Collects every published result set for later assertions.
fn recording_listener() -> (PublishedLog, impl FnMut(&[Note]) + Send + 'static) {
    let published: PublishedLog = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&published);
    let listener = move |notes: &[Note]| sink.lock().unwrap().push(notes.to_vec());
    (published, listener)
}

#[test]
fn subscribe_returns_current_result_immediately() {
    let mut notebook = Notebook::open_in_memory().unwrap();
    let created = notebook.dispatch_create("Groceries", "milk").unwrap();

    let (published, listener) = recording_listener();
    let (initial, _handle) = notebook.subscribe("", listener).unwrap();

    assert_eq!(initial.len(), 1);
    assert_eq!(initial[0].id, created.id);
    // Nothing published yet: the initial result is the return value.
    assert!(published.lock().unwrap().is_empty());
    assert_eq!(notebook.active_subscriptions(), 1);
}

#[test]
fn live_subscriber_sees_created_note_without_resubscribing() {
    let mut notebook = Notebook::open_in_memory().unwrap();
    let (published, listener) = recording_listener();
    let (initial, _handle) = notebook.subscribe("", listener).unwrap();
    assert!(initial.is_empty());

    let created = notebook.dispatch_create("Groceries", "milk").unwrap();

    let snapshots = published.lock().unwrap();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].len(), 1);
    assert_eq!(snapshots[0][0].id, created.id);
}

#[test]
fn mutation_outside_the_key_publishes_nothing() {
    let mut notebook = Notebook::open_in_memory().unwrap();
    let (published, listener) = recording_listener();
    notebook.subscribe("zzz", listener).unwrap();

    notebook.dispatch_create("Groceries", "milk").unwrap();

    assert!(published.lock().unwrap().is_empty());
}

#[test]
fn unsubscribed_handle_receives_nothing() {
    let mut notebook = Notebook::open_in_memory().unwrap();
    let (published, listener) = recording_listener();
    let (_initial, handle) = notebook.subscribe("", listener).unwrap();

    notebook.unsubscribe(handle);
    notebook.dispatch_create("Groceries", "milk").unwrap();

    assert!(published.lock().unwrap().is_empty());
    assert_eq!(notebook.active_subscriptions(), 0);
}

#[test]
fn unsubscribe_twice_is_a_noop() {
    let mut notebook = Notebook::open_in_memory().unwrap();
    let (_published, listener) = recording_listener();
    let (_initial, handle) = notebook.subscribe("", listener).unwrap();

    notebook.unsubscribe(handle);
    notebook.unsubscribe(handle);

    assert_eq!(notebook.active_subscriptions(), 0);
}

#[test]
fn every_affected_subscriber_is_republished() {
    let mut notebook = Notebook::open_in_memory().unwrap();
    let (published_all, listener_all) = recording_listener();
    let (published_gro, listener_gro) = recording_listener();
    notebook.subscribe("", listener_all).unwrap();
    notebook.subscribe("gro", listener_gro).unwrap();

    notebook.dispatch_create("Groceries", "milk").unwrap();

    assert_eq!(published_all.lock().unwrap().len(), 1);
    assert_eq!(published_gro.lock().unwrap().len(), 1);
}

#[test]
fn update_republishes_shrunken_result() {
    let mut notebook = Notebook::open_in_memory().unwrap();
    let created = notebook.dispatch_create("Groceries", "milk").unwrap();

    let (published, listener) = recording_listener();
    let (initial, _handle) = notebook.subscribe("gro", listener).unwrap();
    assert_eq!(initial.len(), 1);

    notebook
        .dispatch_update(created.id, "Shopping", "milk")
        .unwrap();

    let snapshots = published.lock().unwrap();
    assert_eq!(snapshots.len(), 1);
    assert!(snapshots[0].is_empty());
}

#[test]
fn subscriber_observes_delete() {
    let mut notebook = Notebook::open_in_memory().unwrap();
    let created = notebook.dispatch_create("Groceries", "milk").unwrap();

    let (published, listener) = recording_listener();
    notebook.subscribe("", listener).unwrap();

    notebook.dispatch_delete(created.id).unwrap();

    let snapshots = published.lock().unwrap();
    assert_eq!(snapshots.len(), 1);
    assert!(snapshots[0].is_empty());
}

#[test]
fn flush_and_unsubscribe_commits_pending_edit() {
    let mut notebook = Notebook::open_in_memory().unwrap();
    let created = notebook.dispatch_create("Groceries", "milk").unwrap();

    let (published, listener) = recording_listener();
    let (_initial, handle) = notebook.subscribe("", listener).unwrap();

    let flushed = notebook
        .flush_and_unsubscribe(
            handle,
            Some(PendingEdit {
                id: created.id,
                title: "Shopping".to_string(),
                content: "milk, eggs".to_string(),
            }),
        )
        .unwrap()
        .expect("pending edit should be flushed");

    assert_eq!(flushed.title, "Shopping");
    assert_eq!(notebook.note(created.id).unwrap().unwrap().title, "Shopping");
    assert_eq!(notebook.active_subscriptions(), 0);

    // The flush itself still publishes to the closing session; later
    // mutations must not.
    let publications_after_flush = published.lock().unwrap().len();
    notebook.dispatch_create("Other", "note").unwrap();
    assert_eq!(published.lock().unwrap().len(), publications_after_flush);
}

#[test]
fn flush_with_no_pending_edit_dispatches_nothing() {
    let mut notebook = Notebook::open_in_memory().unwrap();
    notebook.dispatch_create("Groceries", "milk").unwrap();
    let version = notebook.data_version();

    let (_published, listener) = recording_listener();
    let (_initial, handle) = notebook.subscribe("", listener).unwrap();

    let flushed = notebook.flush_and_unsubscribe(handle, None).unwrap();

    assert!(flushed.is_none());
    assert_eq!(notebook.data_version(), version);
    assert_eq!(notebook.active_subscriptions(), 0);
}

#[test]
fn flush_after_delete_fails_and_never_resurrects_the_note() {
    let mut notebook = Notebook::open_in_memory().unwrap();
    let created = notebook.dispatch_create("Groceries", "milk").unwrap();

    let (_published, listener) = recording_listener();
    let (_initial, handle) = notebook.subscribe("", listener).unwrap();

    notebook.dispatch_delete(created.id).unwrap();

    let err = notebook
        .flush_and_unsubscribe(
            handle,
            Some(PendingEdit {
                id: created.id,
                title: "Ghost".to_string(),
                content: "should not come back".to_string(),
            }),
        )
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound(id) if id == created.id));
    assert!(notebook.note(created.id).unwrap().is_none());
    assert!(notebook.query("").unwrap().is_empty());
    // Handle is released even though the flush failed.
    assert_eq!(notebook.active_subscriptions(), 0);
}

#[test]
fn resubscribing_starts_a_fresh_lifecycle() {
    let mut notebook = Notebook::open_in_memory().unwrap();
    let (_first_published, first_listener) = recording_listener();
    let (_initial, first_handle) = notebook.subscribe("", first_listener).unwrap();
    notebook.unsubscribe(first_handle);

    let (second_published, second_listener) = recording_listener();
    let (_initial, second_handle) = notebook.subscribe("", second_listener).unwrap();

    assert_ne!(first_handle, second_handle);
    notebook.dispatch_create("Groceries", "milk").unwrap();
    assert_eq!(second_published.lock().unwrap().len(), 1);
}
