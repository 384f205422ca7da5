//! A single on-disk container: a sorted sk -> item map and its backing
//! file.
//!
//! Grounded on `examples/original_source/dynafile/__init__.py`'s
//! `_Partition` (load/save via `atomic_write` + pickle of a
//! `SortedDict`). Rust has no pickle equivalent, so the serialized form
//! uses `bincode`'s serde bridge over a `BTreeMap`, matching the
//! teacher's own choice of `bincode` (with the `serde` feature, see
//! `Cargo.toml`) for values it can't express as native `Encode`/`Decode`
//! types (`#[bincode(with_serde)]` in `ufos/src/store_types.rs`).
//! Atomicity is `tempfile::NamedTempFile` write + `persist`, the Rust
//! idiom for the `atomicwrites` crate the Python original used.

use crate::dispatcher::{Dispatcher, Event, EventAction};
use crate::error::{DynafileError, Result};
use crate::item::{attr_as_key_string, Action, Item};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Ordered sk -> item map; `BTreeMap` gives the strict lexicographic
/// sort-key ordering invariant (I2) for free.
pub type SortedMap = BTreeMap<String, Item>;

const BINCODE_CONFIG: bincode::config::Configuration = bincode::config::standard();

/// Stateless beyond its own directory path, so it's cheap to recreate
/// and safe to `Clone`.
#[derive(Clone)]
pub struct Partition {
    dir: PathBuf,
    sk_attr: String,
}

impl Partition {
    pub fn new(dir: PathBuf, sk_attr: String) -> Self {
        Self { dir, sk_attr }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn data_path(&self) -> PathBuf {
        self.dir.join("data.bin")
    }

    /// Returns the current map, or an empty one if the file doesn't
    /// exist yet (a partition is created lazily on first write).
    pub fn load(&self) -> Result<SortedMap> {
        let path = self.data_path();
        if !path.exists() {
            return Ok(SortedMap::new());
        }
        let bytes = fs::read(&path)?;
        let (map, _) = bincode::serde::decode_from_slice(&bytes, BINCODE_CONFIG)?;
        Ok(map)
    }

    /// Atomically replaces the backing file with `map`'s serialized
    /// form: write to a temp file in the same directory, fsync, rename
    /// over the target (I1).
    pub fn save(&self, map: &SortedMap) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let bytes = bincode::serde::encode_to_vec(map, BINCODE_CONFIG)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.data_path())
            .map_err(|persist_err| DynafileError::Io(persist_err.error))?;
        Ok(())
    }

    pub fn get_item(&self, sk: &str) -> Result<Option<Item>> {
        let map = self.load()?;
        Ok(map.get(sk).cloned())
    }

    pub fn add_item(&self, sk: &str, item: Item, dispatcher: &Dispatcher) -> Result<()> {
        let mut map = self.load()?;
        let old = map.insert(sk.to_string(), item.clone());
        dispatcher.emit(&Event {
            action: EventAction::Put,
            new: Some(item),
            old,
        });
        self.save(&map)
    }

    pub fn delete_item(&self, sk: &str, dispatcher: &Dispatcher) -> Result<()> {
        let mut map = self.load()?;
        let old = map
            .remove(sk)
            .ok_or_else(|| DynafileError::MissingKey { sk: sk.to_string() })?;
        dispatcher.emit(&Event {
            action: EventAction::Delete,
            new: None,
            old: Some(old),
        });
        self.save(&map)
    }

    /// Applies every action against one load/save cycle. If any action
    /// fails (delete of a missing key, or a PUT/DELETE whose item is
    /// missing the sort-key attribute) the whole batch aborts before
    /// `save` is ever called, leaving the file unchanged (I1). Unknown
    /// action kinds can't occur in this typed `Action` enum, so the
    /// source's "unknown action" warning+skip has no direct analogue
    /// here; see DESIGN.md.
    pub fn execute_write_batch(&self, actions: &[Action], dispatcher: &Dispatcher) -> Result<()> {
        let mut map = self.load()?;
        let mut events = Vec::with_capacity(actions.len());

        for action in actions {
            match action {
                Action::Put(item) => {
                    let sk = attr_as_key_string(item, &self.sk_attr).ok_or_else(|| {
                        DynafileError::MissingKey {
                            sk: self.sk_attr.clone(),
                        }
                    })?;
                    let old = map.insert(sk, item.clone());
                    events.push(Event {
                        action: EventAction::Put,
                        new: Some(item.clone()),
                        old,
                    });
                }
                Action::Delete(key) => {
                    let sk = attr_as_key_string(key, &self.sk_attr).ok_or_else(|| {
                        DynafileError::MissingKey {
                            sk: self.sk_attr.clone(),
                        }
                    })?;
                    let old = map
                        .remove(&sk)
                        .ok_or_else(|| DynafileError::MissingKey { sk })?;
                    events.push(Event {
                        action: EventAction::Delete,
                        new: None,
                        old: Some(old),
                    });
                }
            }
        }

        for event in &events {
            dispatcher.emit(event);
        }
        self.save(&map)
    }

    /// Items whose sk >= `starts_with` (forward) or <= `starts_with`
    /// (backward, reversed). An empty `starts_with` removes the bound
    /// entirely, returning every item in the partition in the chosen
    /// direction.
    pub fn query(&self, starts_with: &str, forward: bool) -> Result<Vec<Item>> {
        let map = self.load()?;
        let items = if forward {
            if starts_with.is_empty() {
                map.values().cloned().collect()
            } else {
                map.range(starts_with.to_string()..)
                    .map(|(_, v)| v.clone())
                    .collect()
            }
        } else if starts_with.is_empty() {
            map.values().rev().cloned().collect()
        } else {
            map.range(..=starts_with.to_string())
                .rev()
                .map(|(_, v)| v.clone())
                .collect()
        };
        Ok(items)
    }
}
