//! Scoped accumulator obtained from `Table::batch_writer`, flushed on
//! scope exit.
//!
//! Grounded on `examples/original_source/dynafile/__init__.py`'s
//! `BatchWriter`, a `@contextmanager`-style object whose `__exit__`
//! hands its queue to `execute_batch`. Rust's scoped-acquisition
//! equivalent is `Drop`, which (unlike a Python context manager) runs
//! even on an unwinding panic without needing a separate exceptional
//! path.

use crate::error::Result;
use crate::item::{Action, Item};
use crate::table::Table;

pub struct BatchWriter<'a> {
    table: &'a Table,
    queue: Vec<Action>,
    flushed: bool,
}

impl<'a> BatchWriter<'a> {
    pub(crate) fn new(table: &'a Table) -> Self {
        Self {
            table,
            queue: Vec::new(),
            flushed: false,
        }
    }

    pub fn put_item(&mut self, item: Item) -> &mut Self {
        self.queue.push(Action::Put(item));
        self
    }

    pub fn delete_item(&mut self, key: Item) -> &mut Self {
        self.queue.push(Action::Delete(key));
        self
    }

    /// Hands the queue to `Table::execute_batch`. Idempotent: a second
    /// call (including the implicit one from `Drop`) is a no-op.
    pub fn flush(&mut self) -> Result<()> {
        if self.flushed {
            return Ok(());
        }
        self.flushed = true;
        let queue = std::mem::take(&mut self.queue);
        if queue.is_empty() {
            return Ok(());
        }
        self.table.execute_batch(queue)
    }
}

impl Drop for BatchWriter<'_> {
    fn drop(&mut self) {
        if !self.flushed {
            if let Err(err) = self.flush() {
                log::error!("batch writer: flush on scope exit failed: {err}");
            }
        }
    }
}
