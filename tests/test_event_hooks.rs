//! Mirrors `examples/original_source/tests/test_event_hooks.py`.

use dynafile::{Dynafile, Event, EventAction, TableOptions};
use serde_json::json;
use std::sync::{Arc, Mutex};

fn item(json: serde_json::Value) -> dynafile::Item {
    json.as_object().unwrap().clone()
}

#[test]
fn put_item_emits_a_put_event() {
    let dir = tempfile::tempdir().unwrap();
    let db = Dynafile::open(dir.path().join("db"), TableOptions::default()).unwrap();

    let events: Arc<Mutex<Vec<Event>>> = Arc::new(Mutex::new(Vec::new()));
    let e = Arc::clone(&events);
    db.add_stream_listener(move |ev: &Event| e.lock().unwrap().push(ev.clone()));

    db.put_item(item(json!({"PK": "1", "SK": "aa"}))).unwrap();

    let events = events.lock().unwrap();
    let last = events.last().unwrap();
    assert_eq!(last.action, EventAction::Put);
    assert_eq!(last.new, Some(item(json!({"PK": "1", "SK": "aa"}))));
    assert_eq!(last.old, None);
}

#[test]
fn put_item_overwrite_emits_old_and_new() {
    let dir = tempfile::tempdir().unwrap();
    let db = Dynafile::open(dir.path().join("db"), TableOptions::default()).unwrap();
    db.put_item(item(json!({"PK": "1", "SK": "aa", "old": true})))
        .unwrap();

    let events: Arc<Mutex<Vec<Event>>> = Arc::new(Mutex::new(Vec::new()));
    let e = Arc::clone(&events);
    db.add_stream_listener(move |ev: &Event| e.lock().unwrap().push(ev.clone()));

    db.put_item(item(json!({"PK": "1", "SK": "aa", "old": false})))
        .unwrap();

    let events = events.lock().unwrap();
    let last = events.last().unwrap();
    assert_eq!(last.action, EventAction::Put);
    assert_eq!(last.new, Some(item(json!({"PK": "1", "SK": "aa", "old": false}))));
    assert_eq!(last.old, Some(item(json!({"PK": "1", "SK": "aa", "old": true}))));
}

#[test]
fn delete_item_emits_a_delete_event() {
    let dir = tempfile::tempdir().unwrap();
    let db = Dynafile::open(dir.path().join("db"), TableOptions::default()).unwrap();
    db.put_item(item(json!({"PK": "1", "SK": "aa"}))).unwrap();

    let events: Arc<Mutex<Vec<Event>>> = Arc::new(Mutex::new(Vec::new()));
    let e = Arc::clone(&events);
    db.add_stream_listener(move |ev: &Event| e.lock().unwrap().push(ev.clone()));

    db.delete_item(&item(json!({"PK": "1", "SK": "aa"}))).unwrap();

    let events = events.lock().unwrap();
    let last = events.last().unwrap();
    assert_eq!(last.action, EventAction::Delete);
    assert_eq!(last.new, None);
    assert_eq!(last.old, Some(item(json!({"PK": "1", "SK": "aa"}))));
}

#[test]
fn batch_write_emits_one_event_per_action_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let db = Dynafile::open(dir.path().join("db"), TableOptions::default()).unwrap();

    let events: Arc<Mutex<Vec<Event>>> = Arc::new(Mutex::new(Vec::new()));
    let e = Arc::clone(&events);
    db.add_stream_listener(move |ev: &Event| e.lock().unwrap().push(ev.clone()));

    {
        let mut writer = db.batch_writer();
        writer.put_item(item(json!({"PK": "1", "SK": "aa"})));
        writer.delete_item(item(json!({"PK": "1", "SK": "aa"})));
    }

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].action, EventAction::Put);
    assert_eq!(events[0].new, Some(item(json!({"PK": "1", "SK": "aa"}))));
    assert_eq!(events[1].action, EventAction::Delete);
    assert_eq!(events[1].old, Some(item(json!({"PK": "1", "SK": "aa"}))));
}
