//! The self-describing record value Dynafile stores and keys items by.
//!
//! Grounded on `ufos/src/store_types.rs`, which stores arbitrary record
//! bodies as a bare `serde_json::Value` inside its db value types
//! (`ByCollectionValue`). Dynafile items are always JSON objects at the
//! top level (a mapping from attribute name to value), so `Item` is
//! `serde_json::Map` rather than the unconstrained `Value`.

use serde_json::Value;

/// A mapping of attribute name to value. Arbitrary nesting is allowed in
/// attribute values; only the partition-key and sort-key attributes need
/// to resolve to a string-shaped scalar.
pub type Item = serde_json::Map<String, Value>;

/// A PUT carries a whole item; a DELETE carries only the key attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Put(Item),
    Delete(Item),
}

impl Action {
    pub(crate) fn data(&self) -> &Item {
        match self {
            Action::Put(item) => item,
            Action::Delete(key) => key,
        }
    }
}

/// A resolved (pk, sk) pair extracted from an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub pk: String,
    pub sk: String,
}

/// Reads `attr` off `item` and stringifies it the way a DynamoDB-style
/// composite key attribute is expected to resolve: a string as-is, a
/// number via its canonical decimal form. Any other shape (missing,
/// nested, bool, null) is not a valid key attribute.
pub fn attr_as_key_string(item: &Item, attr: &str) -> Option<String> {
    match item.get(attr)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extracts both halves of a composite key from `item`, or `None` if
/// either attribute is absent or not key-shaped.
pub fn extract_key(item: &Item, pk_attr: &str, sk_attr: &str) -> Option<Key> {
    Some(Key {
        pk: attr_as_key_string(item, pk_attr)?,
        sk: attr_as_key_string(item, sk_attr)?,
    })
}
