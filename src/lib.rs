//! Dynafile: an embedded, file-backed key-value store modelled after
//! the partition-key + sort-key pattern of a cloud wide-column table.
//!
//! See `SPEC_FULL.md` at the repository root for the full module and
//! invariant breakdown. The short version: [`Dynafile`] is the façade;
//! everything else is a supporting concern it orchestrates --
//! partition routing and storage ([`partition`], [`router`]), change
//! notification ([`dispatcher`]), TTL ([`ttl`]), global secondary
//! indexes ([`gsi`]), and table metadata ([`meta`]).

pub mod batch;
pub mod dispatcher;
pub mod error;
pub mod filter;
pub mod gsi;
pub mod item;
pub mod meta;
pub mod partition;
pub mod router;
pub mod table;
pub mod ttl;

pub use batch::BatchWriter;
pub use dispatcher::{Event, EventAction, ListenerId};
pub use error::{DynafileError, Result};
pub use filter::{Filter, FilterCompiler};
pub use item::{Action, Item, Key};
pub use meta::TableMeta;
pub use table::{QueryParams, Table as Dynafile, TableOptions};

use std::path::Path;

/// Opens (or creates) the table rooted at `path`.
pub fn open(path: impl AsRef<Path>, options: TableOptions) -> Result<Dynafile> {
    Dynafile::open(path, options)
}
