//! In-process fan-out of change events to registered listeners.
//!
//! Grounded on `examples/original_source/src/dynafile/dispatcher.py`
//! (the `Dispatcher`/`Event`/`EventListener` this module is a direct
//! port of) and on the teacher's callback-registry idiom of keeping
//! handlers behind `Arc<dyn Fn>` rather than raw boxed closures, since
//! `emit` must tolerate a listener re-entering the dispatcher (spec
//! requirement: "a listener that mutates the emitting Table is
//! permitted").

use crate::error::{DynafileError, Result};
use crate::item::Item;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    Put,
    Delete,
}

/// A change record delivered to registered listeners for each PUT or
/// DELETE. PUT carries both `new` and `old` (old is `None` on insert);
/// DELETE carries only `old`.
#[derive(Debug, Clone)]
pub struct Event {
    pub action: EventAction,
    pub new: Option<Item>,
    pub old: Option<Item>,
}

pub type ListenerId = usize;
type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// Synchronous, registration-ordered fan-out. No event queue: `emit`
/// runs every listener on the caller's execution context before
/// returning.
#[derive(Default)]
pub struct Dispatcher {
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_id: Mutex<ListenerId>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`, returning a handle `remove` can later use.
    /// Rust closures have no identity to compare by value, unlike the
    /// Python original's list membership removal, so removal here is by
    /// this opaque id instead of by listener equality.
    pub fn connect(&self, listener: impl Fn(&Event) + Send + Sync + 'static) -> ListenerId {
        let mut next_id = self.next_id.lock().unwrap();
        let id = *next_id;
        *next_id += 1;
        self.listeners.lock().unwrap().push((id, Arc::new(listener)));
        id
    }

    pub fn remove(&self, id: ListenerId) -> Result<()> {
        let mut listeners = self.listeners.lock().unwrap();
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        if listeners.len() == before {
            return Err(DynafileError::UnknownListener(id));
        }
        Ok(())
    }

    /// Invokes every currently-registered listener in registration
    /// order. The listener snapshot is cloned out from under the lock
    /// before any listener runs, so a listener that calls `connect` or
    /// `remove` on this same dispatcher (or that triggers another
    /// `emit`) does not deadlock or see a half-updated list.
    pub fn emit(&self, event: &Event) {
        let snapshot: Vec<Listener> = {
            let listeners = self.listeners.lock().unwrap();
            listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        for listener in snapshot {
            listener(event);
        }
    }
}
