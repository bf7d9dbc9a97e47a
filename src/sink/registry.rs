//! Arena of sink slots addressed through generational handles.
//!
//! Slots hold their sink behind an `Arc` so a caller can resolve a handle
//! under the brief slot-table lock, drop that lock, and only then block on
//! the per-sink mutex. The slot-table lock is therefore never held across
//! sink I/O, and destroying a sink merely detaches it: an in-flight writer
//! finishes its write against the closed target and gets a clean error.

use super::target::SinkInner;
use crate::error::{Error, Result};
use crate::handle::{check_handle, lock_unpoisoned, IdCounter, SinkHandle};
use std::sync::{Arc, Mutex};

pub(crate) type SharedSink = Arc<Mutex<SinkInner>>;

struct Slot {
    id: u32,
    sink: Option<SharedSink>,
}

struct Slots {
    entries: Vec<Slot>,
    free: Vec<usize>,
}

pub(crate) struct SinkRegistry {
    slots: Mutex<Slots>,
    ids: IdCounter,
    max: usize,
}

impl SinkRegistry {
    pub(crate) fn new(max: usize) -> Self {
        Self {
            slots: Mutex::new(Slots {
                entries: Vec::new(),
                free: Vec::new(),
            }),
            ids: IdCounter::default(),
            max,
        }
    }

    /// Bind `inner` to a slot (reusing a freed one LIFO) and issue a handle.
    ///
    /// The second return value reports an id-counter wraparound so the
    /// caller can emit the one-time warning.
    pub(crate) fn create(&self, inner: SinkInner) -> Result<(SinkHandle, bool)> {
        let mut slots = lock_unpoisoned(&self.slots);
        if slots.entries.len() - slots.free.len() >= self.max {
            return Err(Error::Capacity { max: self.max });
        }
        let (id, wrapped) = self.ids.next();
        let sink = Some(Arc::new(Mutex::new(inner)));
        let index = if let Some(index) = slots.free.pop() {
            slots.entries[index] = Slot { id, sink };
            index
        } else {
            slots.entries.push(Slot { id, sink });
            slots.entries.len() - 1
        };
        Ok((SinkHandle::new(index, id), wrapped))
    }

    /// Validate `handle` and hand out the shared sink it addresses.
    pub(crate) fn resolve(&self, handle: SinkHandle) -> Result<SharedSink> {
        let slots = lock_unpoisoned(&self.slots);
        check_handle(handle.valid, handle.index, handle.id, slots.entries.len(), |i| {
            slots.entries[i].id
        })?;
        slots.entries[handle.index]
            .sink
            .clone()
            .ok_or(Error::SinkClosed)
    }

    /// Validate without touching the sink itself.
    pub(crate) fn check(&self, handle: SinkHandle) -> Result<()> {
        let slots = lock_unpoisoned(&self.slots);
        check_handle(handle.valid, handle.index, handle.id, slots.entries.len(), |i| {
            slots.entries[i].id
        })
    }

    /// Detach the sink, close it, free the slot, and invalidate `handle`.
    ///
    /// Close failure is propagated, but the slot is freed and the handle
    /// invalidated either way: the destroy call is the single actor that
    /// releases the slot.
    pub(crate) fn destroy(&self, handle: &mut SinkHandle) -> Result<()> {
        let sink = {
            let mut slots = lock_unpoisoned(&self.slots);
            check_handle(handle.valid, handle.index, handle.id, slots.entries.len(), |i| {
                slots.entries[i].id
            })?;
            let slot = &mut slots.entries[handle.index];
            slot.id = 0;
            let sink = slot.sink.take();
            let index = handle.index;
            slots.free.push(index);
            sink
        };
        handle.invalidate();
        match sink {
            Some(sink) => lock_unpoisoned(&sink).close(),
            None => Ok(()),
        }
    }

    /// Number of live (not freed) slots.
    #[cfg(test)]
    pub(crate) fn live_count(&self) -> usize {
        let slots = lock_unpoisoned(&self.slots);
        slots.entries.len() - slots.free.len()
    }
}
