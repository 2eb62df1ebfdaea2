// Live-query subscription tests
// Covers: immediate initial snapshot, snapshot-per-mutation delivery,
// unsubscribe semantics, and multiple observers.

use snipvault_core::Snippet;
use snipvault_store::{OrderBy, SnippetStore};
use std::sync::{Arc, Mutex};

fn snippet(id: &str, title: &str) -> Snippet {
    Snippet::new(
        id.to_string(),
        title.to_string(),
        "rust".to_string(),
        "fn main() {}".to_string(),
    )
}

/// Collects every delivered snapshot as a list of titles
fn collector() -> (
    Arc<Mutex<Vec<Vec<String>>>>,
    Box<dyn Fn(&[Snippet]) + Send + Sync>,
) {
    let seen: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback = Box::new(move |snap: &[Snippet]| {
        sink.lock()
            .unwrap()
            .push(snap.iter().map(|s| s.title.clone()).collect());
    });
    (seen, callback)
}

#[test]
fn test_subscriber_gets_current_snapshot_immediately() {
    let store = SnippetStore::open_in_memory().unwrap();
    store.add(&snippet("snip-1", "Existing")).unwrap();

    let (seen, callback) = collector();
    let _handle = store.subscribe(OrderBy::UpdatedAt, callback).unwrap();

    let deliveries = seen.lock().unwrap();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0], vec!["Existing".to_string()]);
}

#[test]
fn test_each_mutation_delivers_a_fresh_snapshot() {
    let store = SnippetStore::open_in_memory().unwrap();
    let (seen, callback) = collector();
    let _handle = store.subscribe(OrderBy::UpdatedAt, callback).unwrap();

    store.add(&snippet("snip-1", "First")).unwrap();
    store.add(&snippet("snip-2", "Second")).unwrap();
    store.delete("snip-1").unwrap();

    let deliveries = seen.lock().unwrap();
    // initial empty + three mutations
    assert_eq!(deliveries.len(), 4);
    assert!(deliveries[0].is_empty());
    assert_eq!(deliveries[1], vec!["First".to_string()]);
    assert_eq!(deliveries[3], vec!["Second".to_string()]);
}

#[test]
fn test_idempotent_delete_does_not_renotify() {
    let store = SnippetStore::open_in_memory().unwrap();
    store.add(&snippet("snip-1", "Only")).unwrap();

    let (seen, callback) = collector();
    let _handle = store.subscribe(OrderBy::UpdatedAt, callback).unwrap();

    store.delete("snip-1").unwrap();
    store.delete("snip-1").unwrap();

    // initial + the one real deletion
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[test]
fn test_unsubscribed_observer_receives_nothing_further() {
    let store = SnippetStore::open_in_memory().unwrap();
    let (seen, callback) = collector();
    let handle = store.subscribe(OrderBy::UpdatedAt, callback).unwrap();

    store.add(&snippet("snip-1", "One")).unwrap();
    handle.unsubscribe();
    store.add(&snippet("snip-2", "Two")).unwrap();

    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[test]
fn test_multiple_observers_share_the_same_view() {
    let store = SnippetStore::open_in_memory().unwrap();
    let (seen_a, callback_a) = collector();
    let (seen_b, callback_b) = collector();
    let _ha = store.subscribe(OrderBy::UpdatedAt, callback_a).unwrap();
    let _hb = store.subscribe(OrderBy::UpdatedAt, callback_b).unwrap();

    store.add(&snippet("snip-1", "Shared")).unwrap();

    assert_eq!(seen_a.lock().unwrap().last(), seen_b.lock().unwrap().last());
}
