//! Error taxonomy for handle, capacity, resource, and rendering failures.
//!
//! Every public operation returns a [`Result`] with this error type; nothing
//! panics past the API boundary. All variants are recoverable by the caller.
//! The four handle-invalidity causes are distinct variants so tests can
//! assert on the exact reason a stale or malformed handle was rejected.

use std::io;
use std::path::PathBuf;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong in the registry, sink, and rendering paths.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The handle's `valid` flag is cleared (never created, or already
    /// destroyed through this very handle).
    #[error("invalid handle: valid flag is cleared")]
    HandleCleared,

    /// The handle's slot index does not address any registry slot.
    #[error("invalid handle: index {index} out of bounds (registry holds {len} slots)")]
    HandleOutOfBounds {
        /// Slot index carried by the handle.
        index: usize,
        /// Current slot count of the registry.
        len: usize,
    },

    /// The slot was destroyed (and possibly reused) since the handle was
    /// issued, so the generation ids no longer match.
    #[error("invalid handle: id mismatch (handle {handle} vs registry {registry})")]
    HandleIdMismatch {
        /// Id carried by the handle.
        handle: u32,
        /// Id currently stored in the slot.
        registry: u32,
    },

    /// The handle carries the reserved id 0.
    #[error("invalid handle: id is 0 (reserved for invalid)")]
    HandleIdZero,

    /// Creating one more handle would exceed the configured maximum.
    #[error("registry at capacity ({max} live handles)")]
    Capacity {
        /// Configured maximum number of live handles.
        max: usize,
    },

    /// The parallel input arrays passed to statusbar creation differ in
    /// length.
    #[error(
        "parallel arrays differ in length: positions {positions}, widths {widths}, \
         prefixes {prefixes}, postfixes {postfixes}"
    )]
    ShapeMismatch {
        /// Length of the positions array.
        positions: usize,
        /// Length of the widths array.
        widths: usize,
        /// Length of the prefixes array.
        prefixes: usize,
        /// Length of the postfixes array.
        postfixes: usize,
    },

    /// A progress percentage outside `0.0..=100.0` was given.
    #[error("percentage {0} outside the valid range 0.0..=100.0")]
    InvalidPercent(f64),

    /// A bar component index beyond the bar count was given.
    #[error("bar index {index} out of range ({count} bars)")]
    InvalidBarIndex {
        /// Index the caller asked for.
        index: usize,
        /// Number of bar components in the statusbar.
        count: usize,
    },

    /// The file backing an owned-file sink could not be opened at all.
    #[error("failed to open sink file {path:?}")]
    FileOpen {
        /// Path that was given to [`crate::Console::create_file_sink`].
        path: PathBuf,
        /// Underlying open error.
        #[source]
        source: io::Error,
    },

    /// The file opened but is not in a writable-good state.
    #[error("sink file {path:?} opened but is not writable")]
    FileNotWritable {
        /// Path that was given to [`crate::Console::create_file_sink`].
        path: PathBuf,
        /// Underlying metadata/permission error.
        #[source]
        source: io::Error,
    },

    /// The sink wrote fewer bytes than requested.
    #[error("short write: {written} of {requested} bytes")]
    ShortWrite {
        /// Bytes actually written.
        written: usize,
        /// Bytes requested.
        requested: usize,
    },

    /// The sink's target was already closed.
    #[error("sink is closed")]
    SinkClosed,

    /// Closing an owned file failed.
    #[error("failed to close sink file")]
    CloseFailed(#[source] io::Error),

    /// The platform terminal-width query failed; rendering fell back to the
    /// default column count.
    #[error("terminal width detection failed")]
    WidthDetection,

    /// Any other I/O failure on the write/flush path.
    #[error("sink i/o error")]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether this error is one of the four handle-invalidity causes.
    pub const fn is_invalid_handle(&self) -> bool {
        matches!(
            self,
            Self::HandleCleared
                | Self::HandleOutOfBounds { .. }
                | Self::HandleIdMismatch { .. }
                | Self::HandleIdZero
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_handle_classification() {
        assert!(Error::HandleCleared.is_invalid_handle());
        assert!(Error::HandleIdZero.is_invalid_handle());
        assert!(Error::HandleOutOfBounds { index: 9, len: 1 }.is_invalid_handle());
        assert!(Error::HandleIdMismatch { handle: 2, registry: 3 }.is_invalid_handle());
        assert!(!Error::Capacity { max: 4 }.is_invalid_handle());
        assert!(!Error::InvalidPercent(101.0).is_invalid_handle());
    }

    #[test]
    fn test_display_names_cause() {
        let err = Error::HandleIdMismatch { handle: 7, registry: 9 };
        let text = err.to_string();
        assert!(text.contains('7'));
        assert!(text.contains('9'));
        assert!(text.contains("id mismatch"));
    }
}
