//! Error taxonomy, centralized the way the teacher centralizes
//! `StorageError`/`StorageResult<T>` in `ufos/src/storage.rs`.

use crate::meta::TableMeta;

#[derive(Debug, thiserror::Error)]
pub enum DynafileError {
    #[error("table metadata mismatch: expected {expected:?}, found {found:?}")]
    ConfigMismatch {
        expected: TableMeta,
        found: TableMeta,
    },

    #[error("missing sort key {sk:?} in partition")]
    MissingKey { sk: String },

    #[error("gsi {name:?} already exists")]
    GsiExists { name: String },

    #[error("unknown index {name:?}")]
    UnknownIndex { name: String },

    #[error("unsupported filter: {reason}")]
    UnsupportedFilter { reason: String },

    #[error("a global secondary index table cannot itself have a gsi")]
    NestedGsi,

    #[error("listener {0} is not registered")]
    UnknownListener(crate::dispatcher::ListenerId),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("partition encoding error: {0}")]
    Encoding(#[from] bincode::error::EncodeError),

    #[error("partition decoding error: {0}")]
    Decoding(#[from] bincode::error::DecodeError),

    #[error("meta descriptor error: {0}")]
    Meta(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DynafileError>;
