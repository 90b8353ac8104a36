use minicrm_core::db::open_db;
use minicrm_core::{Contact, ContactStore, SqliteContactStore, StoreError};
use rusqlite::Connection;

#[test]
fn open_creates_table_and_starts_ids_at_one() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.db");

    let store = SqliteContactStore::open(&path).unwrap();
    assert!(store.get_all().unwrap().is_empty());
    assert_eq!(store.next_id().unwrap(), 1);

    let conn = Connection::open(&path).unwrap();
    assert_eq!(row_count(&conn), 0);
}

#[test]
fn reopen_continues_from_highest_persisted_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.db");

    {
        let store = SqliteContactStore::open(&path).unwrap();
        for name in ["Ana", "Bo", "Cy"] {
            let id = store.next_id().unwrap();
            store.add(&Contact::new(id, name, "")).unwrap();
        }
        store.remove(1).unwrap();
    }

    let reopened = SqliteContactStore::open(&path).unwrap();
    assert_eq!(reopened.get_all().unwrap().len(), 2);
    assert_eq!(reopened.next_id().unwrap(), 4);
}

#[test]
fn adopts_existing_table_without_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE contacts (
            id INTEGER PRIMARY KEY,
            name TEXT,
            email TEXT
        );
        INSERT INTO contacts (id, name, email) VALUES (5, 'Eve', 'eve@x.com');",
    )
    .unwrap();
    drop(conn);

    let store = SqliteContactStore::open(&path).unwrap();
    assert_eq!(
        store.get_by_id(5).unwrap(),
        Some(Contact::new(5, "Eve", "eve@x.com"))
    );
    assert_eq!(store.next_id().unwrap(), 6);
}

#[test]
fn update_writes_only_supplied_columns() {
    let store = SqliteContactStore::open_in_memory().unwrap();
    let id = store.next_id().unwrap();
    store.add(&Contact::new(id, "Bo", "bo@x.com")).unwrap();

    store.update(id, "", "bo2@x.com").unwrap();
    assert_eq!(
        store.get_by_id(id).unwrap(),
        Some(Contact::new(id, "Bo", "bo2@x.com"))
    );

    store.update(id, "Bob", "").unwrap();
    assert_eq!(
        store.get_by_id(id).unwrap(),
        Some(Contact::new(id, "Bob", "bo2@x.com"))
    );
}

#[test]
fn update_without_fields_issues_no_statement() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.db");
    let store = SqliteContactStore::open(&path).unwrap();
    store.add(&Contact::new(1, "Ana", "ana@x.com")).unwrap();

    // Writes against the table fail from here on; reads still work.
    let conn = open_db(&path).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_update BEFORE UPDATE ON contacts
         BEGIN SELECT RAISE(ABORT, 'contacts are read-only'); END;",
    )
    .unwrap();
    drop(conn);

    store.update(1, "", "").unwrap();
    assert!(matches!(store.update(1, "Bo", ""), Err(StoreError::Db(_))));
    assert_eq!(
        store.get_by_id(1).unwrap(),
        Some(Contact::new(1, "Ana", "ana@x.com"))
    );
}

#[test]
fn highest_representable_id_fails_open_instead_of_overflowing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.db");
    let conn = open_db(&path).unwrap();
    conn.execute(
        "INSERT INTO contacts (id, name, email) VALUES (?1, 'Max', '');",
        [i64::MAX],
    )
    .unwrap();
    drop(conn);

    let err = SqliteContactStore::open(&path).unwrap_err();
    assert!(matches!(err, StoreError::IdsExhausted));
}

#[test]
fn duplicate_id_surfaces_db_error() {
    let store = SqliteContactStore::open_in_memory().unwrap();
    store.add(&Contact::new(1, "Ana", "")).unwrap();

    let err = store.add(&Contact::new(1, "Other", "")).unwrap_err();
    assert!(matches!(err, StoreError::Db(_)));
    assert_eq!(store.get_by_id(1).unwrap().unwrap().name, "Ana");
}

#[test]
fn missing_table_surfaces_db_error_on_every_operation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.db");
    let store = SqliteContactStore::open(&path).unwrap();

    let conn = open_db(&path).unwrap();
    conn.execute_batch("DROP TABLE contacts;").unwrap();
    drop(conn);

    assert!(matches!(
        store.add(&Contact::new(1, "Ana", "")),
        Err(StoreError::Db(_))
    ));
    assert!(matches!(store.get_all(), Err(StoreError::Db(_))));
    assert!(matches!(store.get_by_id(1), Err(StoreError::Db(_))));
    assert!(matches!(store.remove(1), Err(StoreError::Db(_))));
    assert!(matches!(store.update(1, "x", ""), Err(StoreError::Db(_))));
}

fn row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM contacts;", [], |row| row.get(0))
        .unwrap()
}
