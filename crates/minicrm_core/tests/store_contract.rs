//! Behavior every `ContactStore` backend must share.

use minicrm_core::{
    Contact, ContactStore, JsonFileContactStore, MemoryContactStore, SqliteContactStore,
    StoreError,
};
use std::collections::HashSet;
use tempfile::TempDir;

#[test]
fn next_id_never_repeats_across_removes() {
    for_each_backend(|store| {
        let mut seen = HashSet::new();
        for round in 0..3 {
            let id = store.next_id().unwrap();
            assert!(seen.insert(id), "{}: id {id} reused", store.backend_name());
            store
                .add(&Contact::new(id, format!("c{round}"), "c@x.com"))
                .unwrap();
            store.remove(id).unwrap();
        }

        let reserved = store.next_id().unwrap();
        assert!(seen.insert(reserved));
        let after_reserved = store.next_id().unwrap();
        assert!(seen.insert(after_reserved));
        assert!(seen.iter().all(|id| *id > 0));
    });
}

#[test]
fn update_with_empty_values_keeps_stored_fields() {
    for_each_backend(|store| {
        let id = add(store, "Ana", "ana@x.com");

        store.update(id, "", "").unwrap();

        let loaded = store.get_by_id(id).unwrap().unwrap();
        assert_eq!(loaded, Contact::new(id, "Ana", "ana@x.com"));
    });
}

#[test]
fn update_name_only_leaves_email() {
    for_each_backend(|store| {
        let id = add(store, "Ana", "ana@x.com");

        store.update(id, "Anabel", "").unwrap();

        let loaded = store.get_by_id(id).unwrap().unwrap();
        assert_eq!(loaded.name, "Anabel");
        assert_eq!(loaded.email, "ana@x.com");
    });
}

#[test]
fn update_missing_id_returns_not_found() {
    for_each_backend(|store| {
        let err = store.update(42, "x", "y").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(42)));
        assert!(store.get_all().unwrap().is_empty());
    });
}

#[test]
fn remove_then_lookup_and_second_remove() {
    for_each_backend(|store| {
        let id = add(store, "Bo", "bo@x.com");

        store.remove(id).unwrap();

        assert!(store.get_by_id(id).unwrap().is_none());
        let err = store.remove(id).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(missing) if missing == id));
    });
}

#[test]
fn remove_on_empty_store_is_not_found() {
    for_each_backend(|store| {
        let err = store.remove(99).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(99)));
        assert!(store.get_all().unwrap().is_empty());
    });
}

#[test]
fn get_all_returns_copies_keyed_by_id() {
    for_each_backend(|store| {
        let ana = add(store, "Ana", "ana@x.com");
        let bo = add(store, "Bo", "bo@x.com");

        let mut all = store.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[&ana].name, "Ana");
        assert_eq!(all[&bo].email, "bo@x.com");

        all.get_mut(&ana).unwrap().name = "changed outside".to_string();
        assert_eq!(store.get_by_id(ana).unwrap().unwrap().name, "Ana");
    });
}

#[test]
fn empty_name_and_email_are_accepted() {
    for_each_backend(|store| {
        let id = add(store, "", "");
        assert_eq!(store.get_by_id(id).unwrap().unwrap(), Contact::new(id, "", ""));
    });
}

fn for_each_backend(check: impl Fn(&dyn ContactStore)) {
    let dir = TempDir::new().unwrap();
    let stores: Vec<Box<dyn ContactStore>> = vec![
        Box::new(MemoryContactStore::new()),
        Box::new(JsonFileContactStore::open(dir.path().join("contacts.json")).unwrap()),
        Box::new(SqliteContactStore::open(dir.path().join("contacts.db")).unwrap()),
    ];

    for store in &stores {
        check(store.as_ref());
    }
}

fn add(store: &dyn ContactStore, name: &str, email: &str) -> i64 {
    let id = store.next_id().unwrap();
    store.add(&Contact::new(id, name, email)).unwrap();
    id
}
