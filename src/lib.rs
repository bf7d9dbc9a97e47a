//! # Pinlog
//!
//! Live, multi-line status bars pinned above scrolling log output, across
//! multiple concurrent callers and multiple output destinations.
//!
//! Pinlog renders one or more multi-component progress bars to a sink
//! (stdout, an owned file, or an arbitrary wrapped stream) while letting
//! ordinary log lines print through the same sink without corrupting the
//! bars: each log line displaces the bars upward and redraws them below
//! itself, so the bars stay put while the log scrolls.
//!
//! ## Core Concepts
//!
//! - **Sinks**: thread-safe, ownership-aware output targets behind
//!   generational handles
//! - **Status bars**: stacked bar components (percent, spinner, prefix and
//!   postfix text) addressed by position above the cursor baseline
//! - **Interleaving**: log emission and bar redraw share a jointly held
//!   lock pair, so concurrent callers can never tear a frame
//!
//! ## Example
//!
//! ```rust,no_run
//! use pinlog::{Console, LogLevel};
//!
//! let console = Console::new();
//! let sink = console.create_stdout_sink()?;
//!
//! // Two stacked bars, topmost first.
//! let bar = console.create_statusbar(
//!     sink,
//!     &[2, 1],
//!     &[30, 30],
//!     &["download ", "verify   "],
//!     &["", ""],
//! )?;
//!
//! console.update_statusbar(bar, 0, 42.0)?;
//! console.log(sink, LogLevel::Info, "net", format_args!("fetched chunk 7"))?;
//! # Ok::<(), pinlog::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod bar;
pub mod config;
pub mod console;
pub mod error;
mod handle;
pub mod log;
pub mod sanitize;
pub mod sink;
pub mod term;

// Re-exports for convenience
pub use bar::{compose, BarComponent, DrawStatus, SPINNER};
pub use config::Config;
pub use console::Console;
pub use error::{Error, Result};
pub use handle::{BarHandle, SinkHandle};
pub use log::LogLevel;
pub use sink::SinkKind;
pub use term::{terminal_columns, AnsiBuffer, FALLBACK_COLUMNS};
