//! Mirrors `examples/original_source/tests/test_ttl.py`. The Python
//! original freezes a mocked clock with `time_machine`; here `now` is
//! computed once per test from the real clock and TTL values are set
//! relative to it, since `TtlPolicy::is_expired` takes `now` explicitly
//! rather than reading a process-global clock.

use dynafile::{Dynafile, Filter, QueryParams, TableOptions};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};

fn item(json: serde_json::Value) -> dynafile::Item {
    json.as_object().unwrap().clone()
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn opts() -> TableOptions {
    TableOptions {
        pk_attr: None,
        sk_attr: None,
        ttl_attr: Some("ttl".to_string()),
    }
}

#[test]
fn living_items_survive_scan_query_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let db = Dynafile::open(dir.path().join("db"), opts()).unwrap();

    let entry = item(json!({"PK": "1", "SK": "2", "ttl": now() + 1000}));
    db.put_item(entry.clone()).unwrap();

    assert_eq!(db.scan(Filter::AlwaysTruthy).unwrap(), vec![entry.clone()]);
    assert_eq!(db.query(QueryParams::new("1")).unwrap(), vec![entry.clone()]);
    assert_eq!(db.get_item(&entry).unwrap(), Some(entry));
}

#[test]
fn expired_items_are_removed_during_scan() {
    let dir = tempfile::tempdir().unwrap();
    let db = Dynafile::open(dir.path().join("db"), opts()).unwrap();

    db.put_item(item(json!({"PK": "1", "SK": "2", "ttl": now() - 1000})))
        .unwrap();

    assert!(db.scan(Filter::AlwaysTruthy).unwrap().is_empty());
}

#[test]
fn expired_items_are_removed_during_get() {
    let dir = tempfile::tempdir().unwrap();
    let db = Dynafile::open(dir.path().join("db"), opts()).unwrap();

    let entry = item(json!({"PK": "1", "SK": "2", "ttl": now() - 1000}));
    db.put_item(entry.clone()).unwrap();

    assert!(db.get_item(&entry).unwrap().is_none());
}

#[test]
fn expired_items_are_removed_during_query() {
    let dir = tempfile::tempdir().unwrap();
    let db = Dynafile::open(dir.path().join("db"), opts()).unwrap();

    db.put_item(item(json!({"PK": "1", "SK": "2", "ttl": now() - 1000})))
        .unwrap();

    assert!(db.query(QueryParams::new("1")).unwrap().is_empty());
}

#[test]
fn get_not_existing_item_works_with_ttl_configured() {
    let dir = tempfile::tempdir().unwrap();
    let db = Dynafile::open(dir.path().join("db"), opts()).unwrap();

    let found = db
        .get_item(&item(json!({"PK": "does", "SK": "not exist"})))
        .unwrap();
    assert!(found.is_none());
}
