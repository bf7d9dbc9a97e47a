//! Generational handles: `{slot index, id, valid flag}` weak references.
//!
//! A handle addresses an arena slot by index and proves it still refers to
//! the same occupant by matching the slot's generation id (the classic
//! arena + generational-index pattern). Destroying a slot zeroes its id, so
//! every copy of an old handle is rejected afterwards, even if the slot index
//! has been reused for a new occupant.

use crate::error::{Error, Result};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Sentinel slot index stored in invalidated handles.
pub(crate) const INVALID_INDEX: usize = usize::MAX;

/// Lock a mutex, recovering the guard if a previous holder panicked.
pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Validate raw handle fields against a slot's current id.
///
/// Checks run in a fixed order so each failure maps to exactly one cause:
/// cleared flag, out-of-bounds index, id mismatch, zero id.
pub(crate) fn check_handle(
    valid: bool,
    index: usize,
    id: u32,
    slot_count: usize,
    slot_id: impl FnOnce(usize) -> u32,
) -> Result<()> {
    if !valid {
        return Err(Error::HandleCleared);
    }
    if index >= slot_count || index == INVALID_INDEX {
        return Err(Error::HandleOutOfBounds { index, len: slot_count });
    }
    let registry = slot_id(index);
    if id != registry {
        return Err(Error::HandleIdMismatch { handle: id, registry });
    }
    if id == 0 {
        return Err(Error::HandleIdZero);
    }
    Ok(())
}

macro_rules! define_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            pub(crate) index: usize,
            pub(crate) id: u32,
            pub(crate) valid: bool,
        }

        impl $name {
            pub(crate) const fn new(index: usize, id: u32) -> Self {
                Self { index, id, valid: true }
            }

            /// A handle that refers to nothing and fails every validation.
            pub const fn invalid() -> Self {
                Self { index: INVALID_INDEX, id: 0, valid: false }
            }

            /// Slot index this handle addresses.
            pub const fn index(&self) -> usize {
                self.index
            }

            /// Generation id this handle was issued with (0 = invalid).
            pub const fn id(&self) -> u32 {
                self.id
            }

            /// Whether the valid flag is set. A set flag does not guarantee
            /// the slot is still live; only the owning registry can tell.
            pub const fn is_valid(&self) -> bool {
                self.valid
            }

            /// Reset every field; called by the destroy path.
            pub(crate) const fn invalidate(&mut self) {
                self.valid = false;
                self.id = 0;
                self.index = INVALID_INDEX;
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }
    };
}

define_handle! {
    /// Opaque, validity-checked reference to a sink registry slot.
    SinkHandle
}

define_handle! {
    /// Opaque, validity-checked reference to a statusbar registry slot.
    BarHandle
}

/// Monotonic generation-id source shared by a registry.
///
/// Ids are pre-incremented per creation and never 0; on wraparound the
/// counter skips the reserved 0 and reports the wrap so the caller can log
/// a warning. Old ids stay unmatched while their slot remains live, so a
/// wrapped counter cannot collide with a live handle in practice.
#[derive(Debug, Default)]
pub(crate) struct IdCounter(Mutex<u32>);

impl IdCounter {
    #[cfg(test)]
    pub(crate) const fn starting_at(value: u32) -> Self {
        Self(Mutex::new(value))
    }

    /// Next id and whether the counter wrapped around to skip 0.
    pub(crate) fn next(&self) -> (u32, bool) {
        let mut count = lock_unpoisoned(&self.0);
        *count = count.wrapping_add(1);
        if *count == 0 {
            *count = 1;
            return (1, true);
        }
        (*count, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_handle_fields() {
        let handle = SinkHandle::invalid();
        assert!(!handle.is_valid());
        assert_eq!(handle.id(), 0);
        assert_eq!(handle.index(), INVALID_INDEX);
    }

    #[test]
    fn test_check_order_flag_first() {
        // A cleared flag wins over every other defect.
        let err = check_handle(false, INVALID_INDEX, 0, 0, |_| 0).unwrap_err();
        assert!(matches!(err, Error::HandleCleared));
    }

    #[test]
    fn test_check_out_of_bounds() {
        let err = check_handle(true, 5, 1, 3, |_| 1).unwrap_err();
        assert!(matches!(err, Error::HandleOutOfBounds { index: 5, len: 3 }));
    }

    #[test]
    fn test_check_id_mismatch() {
        let err = check_handle(true, 0, 7, 1, |_| 9).unwrap_err();
        assert!(matches!(err, Error::HandleIdMismatch { handle: 7, registry: 9 }));
    }

    #[test]
    fn test_check_zero_id() {
        // Both sides 0: ids match, so the zero-id check is what fires.
        let err = check_handle(true, 0, 0, 1, |_| 0).unwrap_err();
        assert!(matches!(err, Error::HandleIdZero));
    }

    #[test]
    fn test_id_counter_skips_zero_on_wrap() {
        let counter = IdCounter::starting_at(u32::MAX - 1);
        assert_eq!(counter.next(), (u32::MAX, false));
        assert_eq!(counter.next(), (1, true));
        assert_eq!(counter.next(), (2, false));
    }
}
