//! Lifecycle and synchronous propagation of global secondary indexes.
//!
//! Grounded on `examples/original_source/dynafile/__init__.py` (no GSI
//! support there) and `examples/original_source/tests/test_global_secondary_index.py`,
//! which pins down the behavior this module implements: creation
//! backfills by scanning the base table, and every later PUT/DELETE on
//! the base table is mirrored into each GSI whose projection condition
//! holds before the base call returns (I3).

use crate::dispatcher::{Event, EventAction};
use crate::error::{DynafileError, Result};
use crate::filter::Filter;
use crate::item::Item;
use crate::table::{Table, TableOptions};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Owns every GSI attached to one base table. A GSI table is opened
/// with `allow_gsi = false`, so it never gets its own `GsiManager` --
/// this is what rules out recursive GSIs by construction (spec §9).
pub struct GsiManager {
    root: PathBuf,
    indexes: Mutex<HashMap<String, Arc<Table>>>,
}

impl GsiManager {
    /// Enumerates `<table_root>/_gsi/*` and opens each as a sub-table.
    pub fn load_existing(gsi_root: &Path) -> Result<Self> {
        let mut indexes = HashMap::new();
        if gsi_root.exists() {
            for entry in fs::read_dir(gsi_root)? {
                let entry = entry?;
                if !entry.file_type()?.is_dir() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                let table = Table::open_internal(entry.path(), TableOptions::default(), false)?;
                indexes.insert(name, Arc::new(table));
            }
        }
        Ok(Self {
            root: gsi_root.to_path_buf(),
            indexes: Mutex::new(indexes),
        })
    }

    pub fn get(&self, name: &str) -> Option<Arc<Table>> {
        self.indexes.lock().unwrap().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.indexes.lock().unwrap().keys().cloned().collect()
    }

    /// Creates a new GSI, failing if `name` is already in use, then
    /// backfills it by scanning `base` and projecting every item that
    /// contains both of the GSI's key attributes.
    pub fn create(&self, base: &Table, name: &str, pk_attr: &str, sk_attr: &str) -> Result<()> {
        {
            let indexes = self.indexes.lock().unwrap();
            if indexes.contains_key(name) {
                return Err(DynafileError::GsiExists {
                    name: name.to_string(),
                });
            }
        }

        let gsi_table = Table::open_internal(
            self.root.join(name),
            TableOptions {
                pk_attr: Some(pk_attr.to_string()),
                sk_attr: Some(sk_attr.to_string()),
                ttl_attr: None,
            },
            false,
        )?;

        for item in base.scan(Filter::AlwaysTruthy)? {
            if item.contains_key(pk_attr) && item.contains_key(sk_attr) {
                gsi_table.put_item(item)?;
            }
        }

        self.indexes
            .lock()
            .unwrap()
            .insert(name.to_string(), Arc::new(gsi_table));
        Ok(())
    }

    /// The base table's change-dispatcher listener: mirrors `event`
    /// into every GSI whose projection condition holds. Best-effort:
    /// a GSI write failure is logged, not propagated, since the base
    /// mutation it shadows has already committed.
    pub fn on_event(&self, event: &Event) {
        let indexes = self.indexes.lock().unwrap();
        for (name, gsi) in indexes.iter() {
            match event.action {
                EventAction::Put => {
                    let Some(new) = &event.new else { continue };
                    if new.contains_key(gsi.pk_attr()) && new.contains_key(gsi.sk_attr()) {
                        if let Err(err) = gsi.put_item(new.clone()) {
                            log::error!("gsi {name:?}: failed to propagate put: {err}");
                        }
                    }
                }
                EventAction::Delete => {
                    let Some(old) = &event.old else { continue };
                    if old.contains_key(gsi.pk_attr()) && old.contains_key(gsi.sk_attr()) {
                        let key = projected_key(old, gsi.pk_attr(), gsi.sk_attr());
                        if let Err(err) = gsi.delete_item(&key) {
                            log::error!("gsi {name:?}: failed to propagate delete: {err}");
                        }
                    }
                }
            }
        }
    }
}

fn projected_key(item: &Item, pk_attr: &str, sk_attr: &str) -> Item {
    let mut key = Item::new();
    if let Some(v) = item.get(pk_attr) {
        key.insert(pk_attr.to_string(), v.clone());
    }
    if let Some(v) = item.get(sk_attr) {
        key.insert(sk_attr.to_string(), v.clone());
    }
    key
}
