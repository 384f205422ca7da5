//! Deterministic pk -> partition directory mapping.
//!
//! Hashing follows `ufos/src/lib.rs`'s `did_element`, which hashes atproto
//! DIDs through `sha2::Sha256` for cardinality sketches; here the digest
//! becomes the on-disk partition directory name instead of a sketch
//! element.

use crate::partition::Partition;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// `lowercase_hex(SHA-256(utf8(pk)))`.
pub fn partition_id(pk: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pk.as_bytes());
    let digest = hasher.finalize();
    digest.iter().fold(String::with_capacity(64), |mut out, byte| {
        use std::fmt::Write;
        write!(out, "{byte:02x}").unwrap();
        out
    })
}

/// Resolves partition keys to [`Partition`] handles under
/// `<table_root>/_partitions/<partition_id>/`, memoizing the handle per
/// `partition_id`. Memoizing is a cache only: `Partition` is a cheap
/// value type (a path and a sort-key attribute name), so recomputing it
/// is always safe.
pub struct PartitionRouter {
    partitions_root: PathBuf,
    sk_attr: String,
    cache: Mutex<HashMap<String, Partition>>,
}

impl PartitionRouter {
    pub fn new(table_root: &Path, sk_attr: String) -> Self {
        Self {
            partitions_root: table_root.join("_partitions"),
            sk_attr,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn partitions_root(&self) -> &Path {
        &self.partitions_root
    }

    pub fn resolve(&self, pk: &str) -> Partition {
        let id = partition_id(pk);
        let mut cache = self.cache.lock().unwrap();
        cache
            .entry(id.clone())
            .or_insert_with(|| Partition::new(self.partitions_root.join(&id), self.sk_attr.clone()))
            .clone()
    }

    /// Builds a [`Partition`] handle for a directory already known to
    /// exist under `_partitions/` (used by `Table::scan`, which walks
    /// the directory listing directly rather than routing by pk).
    pub fn resolve_by_directory(&self, dir: PathBuf) -> Partition {
        Partition::new(dir, self.sk_attr.clone())
    }
}
