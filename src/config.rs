//! Runtime configuration: log threshold, registry capacities, length caps.

use crate::log::LogLevel;

/// Tunable limits and switches for a [`crate::Console`].
///
/// All string limits are in characters and include the three-character
/// truncation marker, so a sanitized string is never longer than its limit.
#[derive(Debug, Clone)]
pub struct Config {
    /// Global minimum log level; messages more verbose than this are dropped.
    pub min_level: LogLevel,
    /// Maximum number of live sink handles.
    pub max_sinks: usize,
    /// Maximum number of live statusbar handles.
    pub max_statusbars: usize,
    /// Maximum length of a bar prefix.
    pub max_prefix_len: usize,
    /// Maximum length of a bar postfix.
    pub max_postfix_len: usize,
    /// Maximum length of a log source tag.
    pub max_tag_len: usize,
    /// Maximum length of a formatted log message.
    pub max_message_len: usize,
    /// Maximum width of a single bar component, in characters.
    pub max_bar_width: u32,
    /// Skip the flush after every write and cursor move (throughput mode).
    pub no_auto_flush: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Debug,
            max_sinks: 16,
            max_statusbars: 16,
            max_prefix_len: 64,
            max_postfix_len: 64,
            max_tag_len: 32,
            max_message_len: 1024,
            max_bar_width: 256,
            no_auto_flush: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_are_sane() {
        let config = Config::default();
        assert_eq!(config.min_level, LogLevel::Debug);
        assert!(config.max_sinks > 0);
        assert!(config.max_statusbars > 0);
        // Truncation reserves three characters for the marker.
        assert!(config.max_tag_len > 3);
        assert!(config.max_message_len > 3);
        assert!(!config.no_auto_flush);
    }
}
