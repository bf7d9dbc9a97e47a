//! Platform terminal-size query, reduced to the column count.

use crate::error::{Error, Result};

/// Column count assumed when the platform query fails.
pub const FALLBACK_COLUMNS: u16 = 80;

/// Query the terminal width in columns.
///
/// Callers that can degrade gracefully should fall back to
/// [`FALLBACK_COLUMNS`] on failure while still surfacing the error.
pub fn terminal_columns() -> Result<u16> {
    match crossterm::terminal::size() {
        Ok((columns, _rows)) => Ok(columns),
        Err(_) => Err(Error::WidthDetection),
    }
}
