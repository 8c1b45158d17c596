//! Tests for flow persistence and optimistic concurrency, run against both stores.
mod common;
use common::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::sync::Arc;
use std::thread;
use ura::prelude::*;

fn tenant() -> TenantId {
    TenantId::new(TENANT)
}

fn draft(name: &str) -> FlowDraft {
    let flow = support_sales_flow();
    FlowDraft::from_graph(name, flow.entry_node_id, flow.graph)
}

/// Creates a flow and saves it until it reaches `version`.
fn flow_at_version(store: &dyn FlowStore, name: &str, version: u64) -> Flow {
    let mut flow = store.create(&tenant(), draft(name)).expect("Failed to create");
    while flow.version < version {
        flow = store.save(&flow).expect("Failed to save");
    }
    flow
}

fn check_create_and_load(store: &dyn FlowStore) {
    let created = store.create(&tenant(), draft("Main line")).expect("Failed to create");
    assert_eq!(created.version, 0);
    assert!(created.id.starts_with("flow-"));

    let loaded = store.load(&tenant(), "Main line").expect("Failed to load");
    assert_eq!(loaded, created);

    let again = store.create(&tenant(), draft("Main line"));
    assert!(matches!(again, Err(StoreError::AlreadyExists { .. })));
}

fn check_save_bumps_version(store: &dyn FlowStore) {
    let mut flow = flow_at_version(store, "Bump", 0);
    flow.graph
        .add_node(extension("sales", "2002", "Sales"))
        .expect("fresh id");

    let saved = store.save(&flow).expect("Failed to save");

    assert_eq!(saved.version, 1);
    assert_eq!(store.load(&tenant(), "Bump").expect("exists"), saved);
}

fn check_stale_save_conflicts(store: &dyn FlowStore) {
    flow_at_version(store, "Shared", 3);
    let session_a = store.load(&tenant(), "Shared").expect("exists");
    let mut session_b = store.load(&tenant(), "Shared").expect("exists");
    assert_eq!(session_a.version, 3);

    let saved_a = store.save(&session_a).expect("first save wins");
    assert_eq!(saved_a.version, 4);

    session_b.graph
        .update_position("main", Position { x: 1.0, y: 1.0 })
        .expect("node exists");
    match store.save(&session_b) {
        Err(StoreError::Conflict {
            expected, found, ..
        }) => {
            assert_eq!(expected, 3);
            assert_eq!(found, 4);
        }
        other => panic!("Expected Conflict, got {:?}", other),
    }
    assert_eq!(store.load(&tenant(), "Shared").expect("exists"), saved_a);
}

fn check_save_requires_existing_flow_with_same_id(store: &dyn FlowStore) {
    let mut unknown = support_sales_flow();
    unknown.name = "Never created".to_string();
    assert!(matches!(store.save(&unknown), Err(StoreError::NotFound { .. })));

    let mut flow = flow_at_version(store, "Ids", 0);
    flow.id = "someone-else".to_string();
    assert!(matches!(store.save(&flow), Err(StoreError::IdMismatch { .. })));
}

fn check_delete_and_list(store: &dyn FlowStore) {
    let listed = TenantId::new("tenant-list");
    let other = TenantId::new("tenant-list-b");
    store.create(&listed, draft("Zeta")).expect("Failed to create");
    store.create(&listed, draft("Alpha")).expect("Failed to create");
    store.create(&other, draft("Other")).expect("Failed to create");

    assert_eq!(
        store.list(&listed).expect("list"),
        vec!["Alpha".to_string(), "Zeta".to_string()]
    );
    assert_eq!(store.list(&other).expect("list"), vec!["Other".to_string()]);

    store.delete(&listed, "Zeta").expect("Failed to delete");
    store.delete(&listed, "Zeta").expect("delete is idempotent");
    assert!(matches!(
        store.load(&listed, "Zeta"),
        Err(StoreError::NotFound { .. })
    ));
    assert_eq!(store.list(&listed).expect("list"), vec!["Alpha".to_string()]);
    assert!(store.list(&TenantId::new("nobody")).expect("list").is_empty());
}

fn check_tenants_are_isolated(store: &dyn FlowStore) {
    flow_at_version(store, "Same name", 2);
    let other = store
        .create(&TenantId::new("tenant-b"), draft("Same name"))
        .expect("names are per tenant");

    assert_eq!(other.version, 0);
    assert_eq!(
        store.load(&tenant(), "Same name").expect("exists").version,
        2
    );
}

fn check_all(store: &dyn FlowStore) {
    check_create_and_load(store);
    check_save_bumps_version(store);
    check_stale_save_conflicts(store);
    check_save_requires_existing_flow_with_same_id(store);
    check_delete_and_list(store);
    check_tenants_are_isolated(store);
}

#[test]
fn test_in_memory_store() {
    check_all(&InMemoryFlowStore::new());
}

#[test]
fn test_json_file_store() {
    let dir = tempfile::tempdir().expect("temp dir");
    check_all(&JsonFileStore::new(dir.path()));
}

#[test]
fn test_file_store_writes_readable_documents() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = JsonFileStore::new(dir.path());
    let created = store
        .create(&TenantId::new("acme"), draft("Main line"))
        .expect("Failed to create");

    let path = dir.path().join("acme").join("Main%20line.json");
    let json = fs::read_to_string(&path).expect("document on disk");
    assert_eq!(Flow::from_json(&json), Ok(created));

    // A second handle on the same directory sees the same data.
    let reopened = JsonFileStore::new(dir.path());
    assert_eq!(
        reopened.list(&TenantId::new("acme")).expect("list"),
        vec!["Main line".to_string()]
    );
}

#[test]
fn test_file_store_rejects_corrupt_documents() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = JsonFileStore::new(dir.path());
    fs::create_dir_all(dir.path().join("acme")).expect("mkdir");
    fs::write(dir.path().join("acme").join("broken.json"), "{ nope").expect("write");

    assert!(matches!(
        store.load(&TenantId::new("acme"), "broken"),
        Err(StoreError::Document(_))
    ));
}

#[test]
fn test_concurrent_saves_of_one_version_admit_exactly_one() {
    let store = Arc::new(InMemoryFlowStore::new());
    let base = flow_at_version(store.as_ref(), "Race", 1);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let flow = base.clone();
            thread::spawn(move || store.save(&flow).is_ok())
        })
        .collect();
    let successes = handles
        .into_iter()
        .map(|h| h.join().expect("thread finished"))
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, 1);
    assert_eq!(store.load(&tenant(), "Race").expect("exists").version, 2);
}

#[test]
fn test_save_at_highest_version_is_refused() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = JsonFileStore::new(dir.path());
    let mut flow = store
        .create(&TenantId::new("acme"), draft("Worn out"))
        .expect("Failed to create");
    flow.version = u64::MAX;
    let path = dir.path().join("acme").join("Worn%20out.json");
    fs::write(&path, flow.to_json_pretty()).expect("write");

    let loaded = store.load(&TenantId::new("acme"), "Worn out").expect("exists");
    assert_eq!(loaded.version, u64::MAX);

    assert!(matches!(
        store.save(&loaded),
        Err(StoreError::VersionExhausted { .. })
    ));
    assert_eq!(
        store.load(&TenantId::new("acme"), "Worn out").expect("exists"),
        loaded
    );
}
