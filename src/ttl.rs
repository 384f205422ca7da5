//! Pure predicate over an item and current wall time, applied lazily on
//! read paths.
//!
//! Grounded on `examples/original_source/tests/test_ttl.py`: items carry
//! a configurable TTL attribute whose value is a Unix epoch-second
//! number, and expiry is an `<` comparison against "now", not `<=`.
//! `now` is passed in rather than read from a global clock, so tests can
//! pick an explicit instant instead of reaching for a mocking crate like
//! the original's `time_machine`.

use crate::item::Item;
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Default)]
pub struct TtlPolicy {
    ttl_attr: Option<String>,
}

impl TtlPolicy {
    pub fn new(ttl_attr: Option<String>) -> Self {
        Self { ttl_attr }
    }

    /// `TTL_attr != null ∧ item[TTL_attr] != null ∧ item[TTL_attr] < now`.
    pub fn is_expired(&self, item: &Item, now: u64) -> bool {
        let Some(attr) = &self.ttl_attr else {
            return false;
        };
        match item.get(attr) {
            Some(Value::Number(n)) => n.as_f64().is_some_and(|ttl| ttl < now as f64),
            _ => false,
        }
    }
}

pub fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(json: serde_json::Value) -> Item {
        json.as_object().unwrap().clone()
    }

    #[test]
    fn no_ttl_attr_configured_never_expires() {
        let policy = TtlPolicy::new(None);
        let i = item(json!({"PK": "1", "SK": "2", "ttl": 0}));
        assert!(!policy.is_expired(&i, 1_000_000));
    }

    #[test]
    fn missing_ttl_value_never_expires() {
        let policy = TtlPolicy::new(Some("ttl".to_string()));
        let i = item(json!({"PK": "1", "SK": "2"}));
        assert!(!policy.is_expired(&i, 1_000_000));
    }

    #[test]
    fn ttl_in_the_past_expires() {
        let policy = TtlPolicy::new(Some("ttl".to_string()));
        let i = item(json!({"PK": "1", "SK": "2", "ttl": 100}));
        assert!(policy.is_expired(&i, 200));
    }

    #[test]
    fn ttl_in_the_future_does_not_expire() {
        let policy = TtlPolicy::new(Some("ttl".to_string()));
        let i = item(json!({"PK": "1", "SK": "2", "ttl": 1_000_000}));
        assert!(!policy.is_expired(&i, 200));
    }
}
