//! Persisted table configuration: `{PK_attr, SK_attr}`, written once and
//! immutable thereafter (I4).
//!
//! Atomic write via temp+rename, same as [`crate::partition`], grounded
//! on the same `atomicwrites`-equivalent idiom the Python original uses
//! for `data.pickle`; here it's `meta.json` via `serde_json`.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    #[serde(rename = "PK_attr")]
    pub pk_attr: String,
    #[serde(rename = "SK_attr")]
    pub sk_attr: String,
}

pub struct MetaStore {
    path: PathBuf,
}

impl MetaStore {
    pub fn new(table_root: &Path) -> Self {
        Self {
            path: table_root.join("meta.json"),
        }
    }

    pub fn load(&self) -> Result<Option<TableMeta>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub fn save(&self, meta: &TableMeta) -> Result<()> {
        let dir = self.path.parent().expect("meta path always has a parent");
        fs::create_dir_all(dir)?;

        let bytes = serde_json::to_vec_pretty(meta)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|persist_err| crate::error::DynafileError::Io(persist_err.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = MetaStore::new(dir.path());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = MetaStore::new(dir.path());
        let meta = TableMeta {
            pk_attr: "PK".to_string(),
            sk_attr: "SK".to_string(),
        };
        store.save(&meta).unwrap();
        assert_eq!(store.load().unwrap(), Some(meta));
    }
}
