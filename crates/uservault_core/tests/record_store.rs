use rusqlite::Connection;
use std::collections::HashSet;
use uservault_core::db::open_db_in_memory;
use uservault_core::password::MIN_HASH_ITERATIONS;
use uservault_core::{
    AccountId, CredentialStore, PasswordHasher, PutOutcome, RecordStore, SqliteCredentialStore,
    SqliteRecordStore, StoreError,
};

fn register(conn: &Connection, username: &str) -> AccountId {
    SqliteCredentialStore::new(conn, PasswordHasher::new(MIN_HASH_ITERATIONS))
        .register(username, "pw")
        .unwrap()
}

fn row_count(conn: &Connection, owner: AccountId, name: &str) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM records WHERE account_id = ?1 AND name = ?2;",
        rusqlite::params![owner.0, name],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn put_twice_replaces_value_in_place() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");

    let (first_id, second) = {
        let mut store = SqliteRecordStore::new(&mut conn);
        assert_eq!(
            store.put(alice, "score", "10").unwrap(),
            PutOutcome::Created
        );
        let first_id = store.get_record(alice, "score").unwrap().unwrap().id;
        assert_eq!(
            store.put(alice, "score", "12").unwrap(),
            PutOutcome::Updated
        );
        assert_eq!(store.get(alice, "score").unwrap(), "12");
        (first_id, store.get_record(alice, "score").unwrap().unwrap())
    };

    assert_eq!(second.id, first_id);
    assert_eq!(second.owner, alice);
    assert_eq!(second.value, "12");
    assert!(second.updated_at >= second.created_at);
    assert_eq!(row_count(&conn, alice, "score"), 1);
}

#[test]
fn replacement_bumps_updated_at_within_the_same_second() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let mut store = SqliteRecordStore::new(&mut conn);

    store.put(alice, "score", "10").unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    store.put(alice, "score", "11").unwrap();

    let record = store.get_record(alice, "score").unwrap().unwrap();
    assert!(
        record.updated_at > record.created_at,
        "created_at={} updated_at={}",
        record.created_at,
        record.updated_at
    );
}

#[test]
fn get_missing_name_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let store = SqliteRecordStore::new(&mut conn);

    let err = store.get(alice, "missing").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
    assert!(store.get_record(alice, "missing").unwrap().is_none());
}

#[test]
fn delete_is_idempotent() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let mut store = SqliteRecordStore::new(&mut conn);

    store.put(alice, "score", "10").unwrap();
    assert!(store.delete(alice, "score").unwrap());
    assert!(!store.delete(alice, "score").unwrap());
    assert!(matches!(
        store.get(alice, "score").unwrap_err(),
        StoreError::NotFound(_)
    ));
}

#[test]
fn names_are_scoped_to_their_owner() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let bob = register(&conn, "bob");
    let mut store = SqliteRecordStore::new(&mut conn);

    store.put(alice, "x", "alice-value").unwrap();
    assert!(matches!(
        store.get(bob, "x").unwrap_err(),
        StoreError::NotFound(_)
    ));

    store.put(bob, "x", "bob-value").unwrap();
    assert_eq!(store.get(alice, "x").unwrap(), "alice-value");
    assert_eq!(store.get(bob, "x").unwrap(), "bob-value");

    store.delete(bob, "x").unwrap();
    assert_eq!(store.get(alice, "x").unwrap(), "alice-value");
}

#[test]
fn list_names_returns_exactly_owned_names() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let bob = register(&conn, "bob");
    let mut store = SqliteRecordStore::new(&mut conn);

    store.put(alice, "score", "10").unwrap();
    store.put(alice, "level", "3").unwrap();
    store.put(alice, "score", "11").unwrap();
    store.put(bob, "coins", "99").unwrap();

    let names: HashSet<String> = store.list_names(alice).unwrap().into_iter().collect();
    let expected: HashSet<String> = ["score", "level"].into_iter().map(String::from).collect();
    assert_eq!(names, expected);
    assert!(store.list_names(AccountId(9_999)).unwrap().is_empty());
}

#[test]
fn put_for_unknown_owner_is_rejected_by_foreign_key() {
    let mut conn = open_db_in_memory().unwrap();
    let mut store = SqliteRecordStore::new(&mut conn);

    let err = store.put(AccountId(42), "score", "1").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn values_are_stored_verbatim() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let mut store = SqliteRecordStore::new(&mut conn);

    let payload = "{\"nested\": [1, 2, 3]}\n  trailing ";
    store.put(alice, "blob", payload).unwrap();
    store.put(alice, "empty", "").unwrap();
    assert_eq!(store.get(alice, "blob").unwrap(), payload);
    assert_eq!(store.get(alice, "empty").unwrap(), "");
}
