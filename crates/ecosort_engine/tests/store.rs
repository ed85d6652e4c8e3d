use std::fs;
use std::sync::Arc;

use ecosort_core::{SessionState, StoredSession, UserStats};
use ecosort_engine::{
    ensure_store_dir, FileStore, KeyValueStore, MemoryStore, SessionRepository, StoreError,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn creates_missing_store_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("data");
    assert!(!new_dir.exists());
    ensure_store_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn file_store_replaces_values() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::new(temp.path().join("data"));

    assert_eq!(store.get("ecosort_data_a@b.io").unwrap(), None);
    store.put("ecosort_data_a@b.io", "hello").unwrap();
    store.put("ecosort_data_a@b.io", "world").unwrap();
    assert_eq!(
        store.get("ecosort_data_a@b.io").unwrap().as_deref(),
        Some("world")
    );

    let files: Vec<_> = fs::read_dir(store.dir()).unwrap().collect();
    assert_eq!(files.len(), 1);
}

#[test]
fn file_store_fails_when_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let store = FileStore::new(file_path);
    let err = store.put("key", "data").unwrap_err();
    assert!(matches!(err, StoreError::StoreDir(_)));
}

#[test]
fn repository_keys_by_namespace_and_email() {
    let store = MemoryStore::new();
    let repo = SessionRepository::new(Arc::new(store.clone()));
    assert_eq!(repo.key_for("rina@example.com"), "ecosort_data_rina@example.com");

    repo.save("rina@example.com", &SessionState::fresh()).unwrap();
    assert!(store.get("ecosort_data_rina@example.com").unwrap().is_some());

    let custom = SessionRepository::with_namespace(Arc::new(store), "staging");
    assert_eq!(custom.key_for("x@y.z"), "staging_x@y.z");
}

#[test]
fn absent_and_empty_are_distinct() {
    let store = MemoryStore::new();
    let repo = SessionRepository::new(Arc::new(store.clone()));

    assert_eq!(repo.load_for_sign_in("new@example.com"), StoredSession::Absent);

    store.put("ecosort_data_new@example.com", "{}").unwrap();
    assert_eq!(
        repo.load_for_sign_in("new@example.com"),
        StoredSession::Present(SessionState::fresh())
    );
}

#[test]
fn missing_fields_fall_back_individually() {
    let store = MemoryStore::new();
    store
        .put(
            "ecosort_data_budi@example.com",
            r#"{"stats":{"totalPoints":150,"itemsScanned":3,"streakDays":2,"level":1},"redeemed":["4"]}"#,
        )
        .unwrap();
    let repo = SessionRepository::new(Arc::new(store));

    let session = repo.load("budi@example.com").unwrap().unwrap();
    assert_eq!(
        session.stats(),
        &UserStats {
            total_points: 150,
            items_scanned: 3,
            streak_days: 2,
            level: 1,
        }
    );
    assert!(session.history().is_empty());
    assert_eq!(session.redeemed(), ["4".to_string()]);
}

#[test]
fn corrupt_payload_is_unavailable() {
    let store = MemoryStore::new();
    store.put("ecosort_data_x@y.z", "{not json").unwrap();
    let repo = SessionRepository::new(Arc::new(store));

    assert!(matches!(repo.load("x@y.z"), Err(StoreError::Corrupt(_))));
    assert!(matches!(
        repo.load_for_sign_in("x@y.z"),
        StoredSession::Unavailable(_)
    ));
}

#[test]
fn file_backed_repository_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let stored = SessionState::from_parts(
        UserStats {
            total_points: 75,
            ..UserStats::fresh()
        },
        Vec::new(),
        vec!["1".to_string()],
    );

    SessionRepository::new(Arc::new(FileStore::new(temp.path())))
        .save("a@b.io", &stored)
        .unwrap();
    let reopened = SessionRepository::new(Arc::new(FileStore::new(temp.path())));
    assert_eq!(reopened.load("a@b.io").unwrap(), Some(stored));
}
