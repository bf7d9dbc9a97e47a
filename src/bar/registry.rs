//! Arena of statusbar slots, one generational id discipline with the sinks.
//!
//! Unlike the sink registry this struct carries no lock of its own: the
//! owning [`crate::Console`] guards the whole slot vector and free list with
//! a single mutex, because bar mutation and redraw must be atomic with
//! respect to log interleaving on the same sink.

use super::component::BarComponent;
use crate::error::{Error, Result};
use crate::handle::{check_handle, BarHandle, IdCounter, SinkHandle};

/// One named collection of bar components, all drawn to one sink.
pub(crate) struct BarSet {
    /// The sink every component of this set is drawn to.
    pub sink: SinkHandle,
    /// The stacked components, in creation order.
    pub bars: Vec<BarComponent>,
    /// Latched after the first reported render failure for this set.
    pub error_reported: bool,
}

struct Slot {
    id: u32,
    set: Option<BarSet>,
}

pub(crate) struct BarRegistry {
    entries: Vec<Slot>,
    free: Vec<usize>,
    ids: IdCounter,
    max: usize,
}

impl BarRegistry {
    pub(crate) fn new(max: usize) -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
            ids: IdCounter::default(),
            max,
        }
    }

    /// Store a bar set in a fresh or recycled slot and issue its handle.
    pub(crate) fn create(
        &mut self,
        sink: SinkHandle,
        bars: Vec<BarComponent>,
    ) -> Result<(BarHandle, bool)> {
        if self.entries.len() - self.free.len() >= self.max {
            return Err(Error::Capacity { max: self.max });
        }
        let (id, wrapped) = self.ids.next();
        let set = Some(BarSet { sink, bars, error_reported: false });
        let index = if let Some(index) = self.free.pop() {
            self.entries[index] = Slot { id, set };
            index
        } else {
            self.entries.push(Slot { id, set });
            self.entries.len() - 1
        };
        Ok((BarHandle::new(index, id), wrapped))
    }

    pub(crate) fn check(&self, handle: BarHandle) -> Result<()> {
        check_handle(handle.valid, handle.index, handle.id, self.entries.len(), |i| {
            self.entries[i].id
        })
    }

    /// Validated mutable access to the set behind `handle`.
    pub(crate) fn get_mut(&mut self, handle: BarHandle) -> Result<&mut BarSet> {
        self.check(handle)?;
        self.entries[handle.index]
            .set
            .as_mut()
            .ok_or(Error::HandleIdZero)
    }

    /// Remove the set behind `handle`, free its slot, invalidate the handle.
    ///
    /// Returns the removed set so the caller can blank its screen lines.
    pub(crate) fn destroy(&mut self, handle: &mut BarHandle) -> Result<BarSet> {
        self.check(*handle)?;
        let slot = &mut self.entries[handle.index];
        slot.id = 0;
        let set = slot.set.take().ok_or(Error::HandleIdZero)?;
        self.free.push(handle.index);
        handle.invalidate();
        Ok(set)
    }

    /// All live sets attached to `sink`.
    pub(crate) fn sets_for(&self, sink: SinkHandle) -> impl Iterator<Item = &BarSet> {
        self.entries
            .iter()
            .filter_map(|slot| slot.set.as_ref())
            .filter(move |set| set.sink == sink)
    }

    /// Highest bar position on `sink`, i.e. how far a log line must move
    /// the cursor up to print above every bar (0 when none are active).
    pub(crate) fn max_position_for(&self, sink: SinkHandle) -> u32 {
        self.sets_for(sink)
            .flat_map(|set| set.bars.iter())
            .map(|bar| bar.position)
            .max()
            .unwrap_or(0)
    }

    #[cfg(test)]
    pub(crate) fn live_count(&self) -> usize {
        self.entries.len() - self.free.len()
    }
}
