//! The top-level façade: owns `MetaStore`, `PartitionRouter`,
//! `Dispatcher`, `GsiManager`, and `TtlPolicy`.
//!
//! Grounded on `examples/original_source/dynafile/__init__.py`'s
//! `Dynafile` class for the operation set, and on
//! `ufos/src/store.rs`'s `Storage::open`/`init_self` for the
//! eager-directory, load-or-create-metadata open sequence.

use crate::batch::BatchWriter;
use crate::dispatcher::{Dispatcher, Event};
use crate::error::{DynafileError, Result};
use crate::filter::{Filter, FilterCompiler};
use crate::gsi::GsiManager;
use crate::item::{attr_as_key_string, extract_key, Action, Item, Key};
use crate::meta::{MetaStore, TableMeta};
use crate::router::PartitionRouter;
use crate::ttl::{now_epoch_secs, TtlPolicy};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Caller-supplied table-open configuration. `pk_attr`/`sk_attr` default
/// to `"PK"`/`"SK"` on first creation; they're ignored (after a mismatch
/// check) on every later open of an existing table, since table metadata
/// is immutable once written (I4).
#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    pub pk_attr: Option<String>,
    pub sk_attr: Option<String>,
    pub ttl_attr: Option<String>,
}

/// `Table::query`'s parameters. `starts_with` defaults to `""` (no
/// bound, i.e. from the minimum in the scan direction) and `forward`
/// defaults to `true`, matching spec.md's `scan_index_forward=True`
/// default.
pub struct QueryParams {
    pub pk: String,
    pub starts_with: String,
    pub forward: bool,
    pub filter: Filter,
    pub index: Option<String>,
}

impl QueryParams {
    pub fn new(pk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            starts_with: String::new(),
            forward: true,
            filter: Filter::AlwaysTruthy,
            index: None,
        }
    }
}

pub struct Table {
    meta: TableMeta,
    router: PartitionRouter,
    dispatcher: Arc<Dispatcher>,
    ttl: TtlPolicy,
    gsi: Option<Arc<GsiManager>>,
    filter_compiler: Option<Arc<dyn FilterCompiler>>,
}

impl Table {
    /// Opens (loading existing metadata) or creates (persisting fresh
    /// metadata) the table rooted at `path`.
    pub fn open(path: impl AsRef<Path>, options: TableOptions) -> Result<Self> {
        Self::open_internal(path.as_ref().to_path_buf(), options, true)
    }

    pub(crate) fn open_internal(
        root: PathBuf,
        options: TableOptions,
        allow_gsi: bool,
    ) -> Result<Self> {
        fs::create_dir_all(&root)?;

        let meta_store = MetaStore::new(&root);
        let meta = match meta_store.load()? {
            Some(existing) => {
                let requested = TableMeta {
                    pk_attr: options
                        .pk_attr
                        .clone()
                        .unwrap_or_else(|| existing.pk_attr.clone()),
                    sk_attr: options
                        .sk_attr
                        .clone()
                        .unwrap_or_else(|| existing.sk_attr.clone()),
                };
                if requested != existing {
                    return Err(DynafileError::ConfigMismatch {
                        expected: requested,
                        found: existing,
                    });
                }
                existing
            }
            None => {
                let meta = TableMeta {
                    pk_attr: options.pk_attr.clone().unwrap_or_else(|| "PK".to_string()),
                    sk_attr: options.sk_attr.clone().unwrap_or_else(|| "SK".to_string()),
                };
                meta_store.save(&meta)?;
                meta
            }
        };

        let router = PartitionRouter::new(&root, meta.sk_attr.clone());
        let dispatcher = Arc::new(Dispatcher::new());
        let ttl = TtlPolicy::new(options.ttl_attr);

        let gsi = if allow_gsi {
            let gsi_root = root.join("_gsi");
            let manager = Arc::new(GsiManager::load_existing(&gsi_root)?);
            let for_listener = Arc::clone(&manager);
            dispatcher.connect(move |event: &Event| for_listener.on_event(event));
            Some(manager)
        } else {
            None
        };

        Ok(Self {
            meta,
            router,
            dispatcher,
            ttl,
            gsi,
            filter_compiler: None,
        })
    }

    /// Attaches a compiler for string filter expressions (the external
    /// collaborator spec.md §1 keeps out of core scope).
    pub fn with_filter_compiler(mut self, compiler: Arc<dyn FilterCompiler>) -> Self {
        self.filter_compiler = Some(compiler);
        self
    }

    pub fn pk_attr(&self) -> &str {
        &self.meta.pk_attr
    }

    pub fn sk_attr(&self) -> &str {
        &self.meta.sk_attr
    }

    fn require_key(&self, item: &Item) -> Result<Key> {
        extract_key(item, &self.meta.pk_attr, &self.meta.sk_attr).ok_or_else(|| {
            DynafileError::MissingKey {
                sk: self.meta.sk_attr.clone(),
            }
        })
    }

    fn require_pk(&self, item: &Item) -> Result<String> {
        attr_as_key_string(item, &self.meta.pk_attr).ok_or_else(|| DynafileError::MissingKey {
            sk: self.meta.pk_attr.clone(),
        })
    }

    pub fn put_item(&self, item: Item) -> Result<()> {
        let key = self.require_key(&item)?;
        let partition = self.router.resolve(&key.pk);
        partition.add_item(&key.sk, item, &self.dispatcher)
    }

    pub fn get_item(&self, key: &Item) -> Result<Option<Item>> {
        let key = self.require_key(key)?;
        let partition = self.router.resolve(&key.pk);

        let Some(item) = partition.get_item(&key.sk)? else {
            return Ok(None);
        };
        if self.ttl.is_expired(&item, now_epoch_secs()) {
            partition.delete_item(&key.sk, &self.dispatcher)?;
            return Ok(None);
        }
        Ok(Some(item))
    }

    pub fn delete_item(&self, key: &Item) -> Result<()> {
        let key = self.require_key(key)?;
        let partition = self.router.resolve(&key.pk);
        partition.delete_item(&key.sk, &self.dispatcher)
    }

    pub fn batch_writer(&self) -> BatchWriter<'_> {
        BatchWriter::new(self)
    }

    /// Groups actions by pk over *consecutive* runs in input order --
    /// matching `itertools.groupby`'s behavior in the Python original,
    /// which only merges adjacent same-key entries rather than
    /// collecting every action for a pk anywhere in the batch.
    pub fn execute_batch(&self, actions: Vec<Action>) -> Result<()> {
        let mut i = 0;
        while i < actions.len() {
            let pk = self.require_pk(actions[i].data())?;
            let mut j = i + 1;
            while j < actions.len() {
                let next_pk = self.require_pk(actions[j].data())?;
                if next_pk != pk {
                    break;
                }
                j += 1;
            }
            let partition = self.router.resolve(&pk);
            partition.execute_write_batch(&actions[i..j], &self.dispatcher)?;
            i = j;
        }
        Ok(())
    }

    pub fn scan(&self, filter: Filter) -> Result<Vec<Item>> {
        let predicate = filter.resolve(self.filter_compiler.as_deref())?;
        let now = now_epoch_secs();
        let mut out = Vec::new();

        let partitions_root = self.router.partitions_root();
        if !partitions_root.exists() {
            return Ok(out);
        }

        for entry in fs::read_dir(partitions_root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let partition = self.router.resolve_by_directory(entry.path());
            for item in partition.query("", true)? {
                if self.ttl.is_expired(&item, now) {
                    if let Some(sk) = attr_as_key_string(&item, &self.meta.sk_attr) {
                        let _ = partition.delete_item(&sk, &self.dispatcher);
                    }
                    continue;
                }
                if predicate(&item) {
                    out.push(item);
                }
            }
        }
        Ok(out)
    }

    pub fn query(&self, params: QueryParams) -> Result<Vec<Item>> {
        if let Some(index_name) = params.index {
            let gsi = self
                .gsi
                .as_ref()
                .and_then(|manager| manager.get(&index_name))
                .ok_or_else(|| DynafileError::UnknownIndex {
                    name: index_name.clone(),
                })?;
            return gsi.query(QueryParams {
                pk: params.pk,
                starts_with: params.starts_with,
                forward: params.forward,
                filter: params.filter,
                index: None,
            });
        }

        let predicate = params.filter.resolve(self.filter_compiler.as_deref())?;
        let partition = self.router.resolve(&params.pk);
        let now = now_epoch_secs();
        let mut out = Vec::new();

        for item in partition.query(&params.starts_with, params.forward)? {
            if self.ttl.is_expired(&item, now) {
                if let Some(sk) = attr_as_key_string(&item, &self.meta.sk_attr) {
                    let _ = partition.delete_item(&sk, &self.dispatcher);
                }
                continue;
            }
            if predicate(&item) {
                out.push(item);
            }
        }
        Ok(out)
    }

    /// Creates and backfills a GSI. Errors with
    /// [`DynafileError::NestedGsi`] if called on a table that is itself
    /// a GSI (spec §9: no recursive GSIs, enforced by construction).
    pub fn create_gsi(&self, name: &str, pk_attr: &str, sk_attr: &str) -> Result<()> {
        let manager = self.gsi.as_ref().ok_or(DynafileError::NestedGsi)?;
        manager.create(self, name, pk_attr, sk_attr)
    }

    pub fn add_stream_listener(
        &self,
        listener: impl Fn(&Event) + Send + Sync + 'static,
    ) -> crate::dispatcher::ListenerId {
        self.dispatcher.connect(listener)
    }

    pub fn remove_stream_listener(&self, id: crate::dispatcher::ListenerId) -> Result<()> {
        self.dispatcher.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(json: serde_json::Value) -> Item {
        json.as_object().unwrap().clone()
    }

    #[test]
    fn a_gsi_table_cannot_itself_have_a_gsi() {
        let dir = tempfile::tempdir().unwrap();
        let db = Table::open(dir.path().join("db"), TableOptions::default()).unwrap();
        db.create_gsi("gsi1", "SK", "PK").unwrap();

        let gsi_root = dir.path().join("db").join("_gsi").join("gsi1");
        let gsi_table =
            Table::open_internal(gsi_root, TableOptions::default(), false).unwrap();
        assert!(gsi_table.create_gsi("gsi2", "PK", "SK").is_err());
    }

    #[test]
    fn config_mismatch_on_reopen_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("db");
        Table::open(
            &root,
            TableOptions {
                pk_attr: Some("PK".to_string()),
                sk_attr: Some("SK".to_string()),
                ttl_attr: None,
            },
        )
        .unwrap();

        let reopened = Table::open(
            &root,
            TableOptions {
                pk_attr: Some("OtherPK".to_string()),
                sk_attr: None,
                ttl_attr: None,
            },
        );
        assert!(reopened.is_err());
    }

    #[test]
    fn execute_batch_groups_only_consecutive_same_pk_runs() {
        let dir = tempfile::tempdir().unwrap();
        let db = Table::open(dir.path().join("db"), TableOptions::default()).unwrap();

        // pk "1" appears twice, but not consecutively, so it forms two
        // separate runs (matching itertools.groupby, not a full
        // group-by-all-occurrences). The second run for pk "1" fails
        // (deleting a key that was never put), but the first run's put
        // must already be committed, since it ran as its own batch.
        let result = db.execute_batch(vec![
            Action::Put(item(json!({"PK": "1", "SK": "a"}))),
            Action::Put(item(json!({"PK": "2", "SK": "x"}))),
            Action::Delete(item(json!({"PK": "1", "SK": "does-not-exist"}))),
        ]);

        assert!(result.is_err());
        assert!(db.get_item(&item(json!({"PK": "1", "SK": "a"}))).unwrap().is_some());
        assert!(db.get_item(&item(json!({"PK": "2", "SK": "x"}))).unwrap().is_some());
    }
}
