//! Terminal control: escape-sequence composition and size queries.

mod ansi;
mod size;

pub use ansi::AnsiBuffer;
pub use size::{terminal_columns, FALLBACK_COLUMNS};
