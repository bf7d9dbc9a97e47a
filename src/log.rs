//! Log levels and the fixed log-line format.

use std::fmt;

/// Severity levels for log messages, most severe first.
///
/// A [`crate::Console`] drops every message more verbose than its configured
/// minimum level; `Off` silences logging entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// No logging.
    Off = 0,
    /// Failures that abort the operation that reported them.
    Error,
    /// Recoverable problems and misuse diagnostics.
    Warning,
    /// Normal progress information.
    Info,
    /// Verbose debugging output.
    #[default]
    Debug,
}

impl LogLevel {
    /// Uppercase name used as the log-line prefix.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Off => "",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }

    /// Whether a message at this level passes the given threshold.
    pub fn enabled(self, min_level: Self) -> bool {
        self != Self::Off && self <= min_level
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compose one log line: `"{LEVEL} [{tag}]: {message}\n"`.
///
/// Both `tag` and `message` must already be sanitized.
pub(crate) fn format_line(level: LogLevel, tag: &str, message: &str) -> String {
    format!("{} [{tag}]: {message}\n", level.name())
}

/// Log an error-level message on a [`crate::Console`] sink.
#[macro_export]
macro_rules! log_err {
    ($console:expr, $sink:expr, $tag:expr, $($arg:tt)*) => {
        $console.log($sink, $crate::LogLevel::Error, $tag, format_args!($($arg)*))
    };
}

/// Log a warning-level message on a [`crate::Console`] sink.
#[macro_export]
macro_rules! log_wrn {
    ($console:expr, $sink:expr, $tag:expr, $($arg:tt)*) => {
        $console.log($sink, $crate::LogLevel::Warning, $tag, format_args!($($arg)*))
    };
}

/// Log an info-level message on a [`crate::Console`] sink.
#[macro_export]
macro_rules! log_inf {
    ($console:expr, $sink:expr, $tag:expr, $($arg:tt)*) => {
        $console.log($sink, $crate::LogLevel::Info, $tag, format_args!($($arg)*))
    };
}

/// Log a debug-level message on a [`crate::Console`] sink.
#[macro_export]
macro_rules! log_dbg {
    ($console:expr, $sink:expr, $tag:expr, $($arg:tt)*) => {
        $console.log($sink, $crate::LogLevel::Debug, $tag, format_args!($($arg)*))
    };
}
