//! `Console`: the process-scoped facade owning both registries.
//!
//! All public operations go through a `Console` so construction and
//! teardown order is controlled by the host application instead of static
//! initialization order. Handles are the only references that cross the API
//! boundary; validity is checked, never assumed, on every operation.
//!
//! # Lock order
//!
//! Three locks exist: the statusbar registry mutex, the sink slot-table
//! mutex, and one mutex per sink. Every path acquires them in the fixed
//! order *bar registry → sink table → sink*, and the sink table lock is
//! released before the per-sink lock is taken (handle resolution returns a
//! shared sink). Log emission and statusbar mutation hold the bar-registry
//! and sink locks jointly, which totally orders them per sink.

use crate::bar::{blank_into, render_into, BarComponent, BarRegistry, DrawStatus};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::handle::{lock_unpoisoned, BarHandle, SinkHandle};
use crate::log::{format_line, LogLevel};
use crate::sanitize::{sanitize, sanitize_multiline};
use crate::sink::{SinkInner, SinkKind, SinkRegistry};
use crate::term::AnsiBuffer;
use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

/// Source tag used for the engine's own diagnostics.
const DIAG_TAG: &str = "pinlog";

/// Registry of sinks and status bars plus the log/interleave coordinator.
///
/// A `Console` is `Send + Sync`; shared-memory threads drive it directly and
/// block on its mutexes. No operation spawns background work or defers
/// completion.
pub struct Console {
    config: Config,
    sinks: SinkRegistry,
    bars: Mutex<BarRegistry>,
}

impl Console {
    /// Create a console with the default [`Config`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a console with a custom [`Config`].
    pub fn with_config(config: Config) -> Self {
        Self {
            sinks: SinkRegistry::new(config.max_sinks),
            bars: Mutex::new(BarRegistry::new(config.max_statusbars)),
            config,
        }
    }

    /// The configuration this console was built with.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    // ---- sinks ----------------------------------------------------------

    /// Bind a sink to the process's standard output.
    pub fn create_stdout_sink(&self) -> Result<SinkHandle> {
        self.register_sink(SinkInner::stdout())
    }

    /// Open `path` in append mode and bind a sink that owns the file.
    pub fn create_file_sink(&self, path: impl AsRef<Path>) -> Result<SinkHandle> {
        let inner = SinkInner::owned_file(path.as_ref()).map_err(|err| {
            self.diag(
                LogLevel::Error,
                format_args!("failed to create file sink: {err}"),
            );
            err
        })?;
        self.register_sink(inner)
    }

    /// Bind a sink to a caller-supplied stream.
    ///
    /// The stream is moved into the sink; callers that need to keep reading
    /// what was written share the underlying storage behind their `Write`
    /// implementation.
    pub fn create_wrapped_sink(&self, stream: Box<dyn Write + Send>) -> Result<SinkHandle> {
        self.register_sink(SinkInner::wrapped(stream))
    }

    fn register_sink(&self, inner: SinkInner) -> Result<SinkHandle> {
        let (handle, wrapped) = self.sinks.create(inner).map_err(|err| {
            self.diag(LogLevel::Error, format_args!("failed to create sink: {err}"));
            err
        })?;
        if wrapped {
            self.diag(
                LogLevel::Warning,
                format_args!("sink id counter exhausted, looping back to 1"),
            );
        }
        Ok(handle)
    }

    /// Write raw bytes to a sink, returning the byte count written.
    pub fn write_sink(&self, handle: SinkHandle, bytes: &[u8]) -> Result<usize> {
        self.with_sink(handle, |sink| sink.write(bytes))
    }

    /// Write a string to a sink.
    pub fn write_str(&self, handle: SinkHandle, text: &str) -> Result<usize> {
        self.write_sink(handle, text.as_bytes())
    }

    /// Flush a sink; a successful no-op for descriptor-backed sinks.
    pub fn flush_sink(&self, handle: SinkHandle) -> Result<()> {
        self.with_sink(handle, SinkInner::flush)
    }

    /// Flush, close, free the slot, and invalidate `handle`.
    pub fn destroy_sink(&self, handle: &mut SinkHandle) -> Result<()> {
        self.sinks.destroy(handle).map_err(|err| {
            self.diag(
                LogLevel::Warning,
                format_args!("failed to destroy sink: {err}"),
            );
            err
        })
    }

    /// What kind of destination `handle` writes to.
    ///
    /// Returns [`SinkKind::Invalid`] for handles that no longer resolve.
    pub fn sink_kind(&self, handle: SinkHandle) -> SinkKind {
        self.with_sink(handle, |sink| Ok(sink.kind()))
            .unwrap_or(SinkKind::Invalid)
    }

    /// Best-effort terminal detection; `false` for invalid handles.
    pub fn is_tty(&self, handle: SinkHandle) -> bool {
        self.with_sink(handle, |sink| Ok(sink.is_tty())).unwrap_or(false)
    }

    /// Relative cursor move: positive = up (`ESC[nA`), negative = down
    /// (that many newlines), 0 = no-op.
    pub fn move_cursor(&self, handle: SinkHandle, lines: i32) -> Result<()> {
        self.write_sequence(handle, |buf| buf.move_vertical(lines))
    }

    /// Save the cursor position on the given sink.
    pub fn save_cursor(&self, handle: SinkHandle) -> Result<()> {
        self.write_sequence(handle, AnsiBuffer::save_cursor)
    }

    /// Restore the previously saved cursor position.
    pub fn restore_cursor(&self, handle: SinkHandle) -> Result<()> {
        self.write_sequence(handle, AnsiBuffer::restore_cursor)
    }

    /// Clear from the cursor to the end of the line.
    pub fn clear_to_end_of_line(&self, handle: SinkHandle) -> Result<()> {
        self.write_sequence(handle, AnsiBuffer::clear_to_end_of_line)
    }

    /// Clear from the start of the line to the cursor.
    pub fn clear_from_start_of_line(&self, handle: SinkHandle) -> Result<()> {
        self.write_sequence(handle, AnsiBuffer::clear_from_start_of_line)
    }

    /// Clear the entire current line.
    pub fn clear_line(&self, handle: SinkHandle) -> Result<()> {
        self.write_sequence(handle, AnsiBuffer::clear_line)
    }

    /// Return to line start and clear the entire line.
    pub fn clear_current_line(&self, handle: SinkHandle) -> Result<()> {
        self.write_sequence(handle, AnsiBuffer::clear_current_line)
    }

    fn with_sink<T>(
        &self,
        handle: SinkHandle,
        operation: impl FnOnce(&mut SinkInner) -> Result<T>,
    ) -> Result<T> {
        let shared = self.sinks.resolve(handle)?;
        let mut sink = lock_unpoisoned(&shared);
        operation(&mut sink)
    }

    fn write_sequence(
        &self,
        handle: SinkHandle,
        compose: impl FnOnce(&mut AnsiBuffer),
    ) -> Result<()> {
        let mut buf = AnsiBuffer::with_capacity(16);
        compose(&mut buf);
        if buf.is_empty() {
            return Ok(());
        }
        self.with_sink(handle, |sink| {
            sink.write(buf.as_bytes())?;
            if self.config.no_auto_flush {
                return Ok(());
            }
            sink.flush()
        })
    }

    // ---- status bars ----------------------------------------------------

    /// Create a statusbar of stacked components on `sink` and draw every
    /// component once at 0%.
    ///
    /// The four arrays are parallel: `positions[i]` lines above the cursor
    /// baseline, a bar `widths[i]` characters wide, with `prefixes[i]` /
    /// `postfixes[i]` around it. Prefixes and postfixes are sanitized and
    /// clamped; widths are clamped to the configured maximum.
    pub fn create_statusbar(
        &self,
        sink: SinkHandle,
        positions: &[u32],
        widths: &[u32],
        prefixes: &[&str],
        postfixes: &[&str],
    ) -> Result<BarHandle> {
        // A statusbar on an invalid sink is rejected outright.
        if let Err(err) = self.sinks.check(sink) {
            self.diag(
                LogLevel::Error,
                format_args!("failed to create statusbar: sink handle invalid: {err}"),
            );
            return Err(err);
        }
        if positions.len() != widths.len()
            || widths.len() != prefixes.len()
            || prefixes.len() != postfixes.len()
        {
            let err = Error::ShapeMismatch {
                positions: positions.len(),
                widths: widths.len(),
                prefixes: prefixes.len(),
                postfixes: postfixes.len(),
            };
            self.diag(LogLevel::Error, format_args!("failed to create statusbar: {err}"));
            return Err(err);
        }

        let components: Vec<BarComponent> = positions
            .iter()
            .zip(widths)
            .zip(prefixes.iter().zip(postfixes))
            .map(|((&position, &width), (&prefix, &postfix))| BarComponent {
                percent: 0.0,
                position,
                width: width.min(self.config.max_bar_width),
                prefix: sanitize(prefix, self.config.max_prefix_len),
                postfix: sanitize(postfix, self.config.max_postfix_len),
                spinner_phase: 0,
            })
            .collect();

        let mut bars = lock_unpoisoned(&self.bars);
        let (handle, wrapped) = bars.create(sink, components).map_err(|err| {
            self.diag(LogLevel::Error, format_args!("failed to create statusbar: {err}"));
            err
        })?;
        if wrapped {
            self.diag(
                LogLevel::Warning,
                format_args!("statusbar id counter exhausted, looping back to 1"),
            );
        }

        // Initial draw is best-effort: the handle is already live, and a
        // sink that cannot take the first draw will fail loudly on update.
        if let Err(err) = self.draw_initial(&mut bars, handle, sink) {
            self.diag(
                LogLevel::Warning,
                format_args!("initial statusbar draw failed: {err}"),
            );
        }
        Ok(handle)
    }

    fn draw_initial(
        &self,
        bars: &mut BarRegistry,
        handle: BarHandle,
        sink: SinkHandle,
    ) -> Result<()> {
        let shared = self.sinks.resolve(sink)?;
        let mut inner = lock_unpoisoned(&shared);
        let is_tty = inner.is_tty();
        let mut buf = AnsiBuffer::new();
        let set = bars.get_mut(handle)?;
        for bar in &set.bars {
            render_into(&mut buf, bar, is_tty)?;
        }
        inner.write(buf.as_bytes())?;
        if self.config.no_auto_flush {
            return Ok(());
        }
        inner.flush()
    }

    /// Store a new percentage for one component, advance its spinner phase,
    /// and redraw only that component.
    ///
    /// Out-of-range `percent` and `bar_index` are hard errors with no
    /// partial update. Degraded draws (clipping, width-query fallback) are
    /// reported in the returned [`DrawStatus`] on every call but logged only
    /// once per statusbar.
    pub fn update_statusbar(
        &self,
        handle: BarHandle,
        bar_index: usize,
        percent: f64,
    ) -> Result<DrawStatus> {
        // Validate before taking any lock.
        if !(0.0..=100.0).contains(&percent) {
            self.diag(
                LogLevel::Error,
                format_args!("failed to update statusbar: percentage {percent} out of range"),
            );
            return Err(Error::InvalidPercent(percent));
        }

        let mut bars = lock_unpoisoned(&self.bars);
        if let Err(err) = bars.check(handle) {
            drop(bars);
            self.diag(
                LogLevel::Warning,
                format_args!("failed to update statusbar: {err}"),
            );
            return Err(err);
        }
        let (sink_handle, count) = {
            let set = bars.get_mut(handle)?;
            (set.sink, set.bars.len())
        };
        if bar_index >= count {
            drop(bars);
            let err = Error::InvalidBarIndex { index: bar_index, count };
            self.diag(
                LogLevel::Error,
                format_args!("failed to update statusbar: {err}"),
            );
            return Err(err);
        }
        let shared = match self.sinks.resolve(sink_handle) {
            Ok(shared) => shared,
            Err(err) => {
                drop(bars);
                self.diag(
                    LogLevel::Warning,
                    format_args!("failed to update statusbar: sink gone: {err}"),
                );
                return Err(err);
            }
        };

        let set = bars.get_mut(handle)?;
        let bar = &mut set.bars[bar_index];
        bar.percent = percent;
        bar.spinner_phase = bar.spinner_phase.wrapping_add(1);

        let mut buf = AnsiBuffer::new();
        let mut inner = lock_unpoisoned(&shared);
        let status = render_into(&mut buf, bar, inner.is_tty())?;
        inner.write(buf.as_bytes())?;
        if !self.config.no_auto_flush {
            inner.flush()?;
        }
        drop(inner);

        if !status.is_clean() && !set.error_reported {
            set.error_reported = true;
            self.diag(
                LogLevel::Error,
                format_args!(
                    "{} on statusbar with id {} at bar index {bar_index}",
                    status.describe(),
                    handle.id(),
                ),
            );
        }
        Ok(status)
    }

    /// Blank every component's screen line, flush the sink, free the slot,
    /// and invalidate `handle`.
    pub fn destroy_statusbar(&self, handle: &mut BarHandle) -> Result<()> {
        let mut bars = lock_unpoisoned(&self.bars);
        let set = match bars.destroy(handle) {
            Ok(set) => set,
            Err(err) => {
                drop(bars);
                self.diag(
                    LogLevel::Warning,
                    format_args!("failed to destroy statusbar: {err}"),
                );
                return Err(err);
            }
        };

        // The slot is freed either way; a sink destroyed before its bars
        // simply has nothing left to blank.
        if let Ok(shared) = self.sinks.resolve(set.sink) {
            let mut inner = lock_unpoisoned(&shared);
            let mut buf = AnsiBuffer::new();
            for bar in &set.bars {
                blank_into(&mut buf, bar.position);
            }
            inner.write(buf.as_bytes())?;
            inner.flush()?;
        }
        Ok(())
    }

    // ---- logging --------------------------------------------------------

    /// Print a log line on `sink` without corrupting its status bars.
    ///
    /// The bars above the cursor baseline are overwritten by the log line
    /// (which scrolls everything up one row) and then redrawn below it, so
    /// they stay visually pinned while log output scrolls.
    pub fn log(
        &self,
        sink: SinkHandle,
        level: LogLevel,
        tag: &str,
        message: fmt::Arguments<'_>,
    ) -> Result<()> {
        if !level.enabled(self.config.min_level) {
            return Ok(());
        }
        let tag = sanitize(tag, self.config.max_tag_len);
        let text = sanitize_multiline(&message.to_string(), self.config.max_message_len);

        let bars = lock_unpoisoned(&self.bars);
        let shared = match self.sinks.resolve(sink) {
            Ok(shared) => shared,
            Err(err) => {
                drop(bars);
                self.diag(LogLevel::Warning, format_args!("log on invalid sink: {err}"));
                return Err(err);
            }
        };
        let mut inner = lock_unpoisoned(&shared);
        let is_tty = inner.is_tty();
        let bars_active = bars.sets_for(sink).next().is_some();
        let move_up = bars.max_position_for(sink);

        let mut buf = AnsiBuffer::with_capacity(512);
        buf.cursor_up(move_up);
        if bars_active {
            buf.clear_current_line();
        }
        buf.write_str(&format_line(level, &tag, &text));
        buf.cursor_down(move_up);

        // Redraw every bar on this sink below the line just printed. Stored
        // percentages are already validated, so rendering cannot fail.
        for set in bars.sets_for(sink) {
            for bar in &set.bars {
                render_into(&mut buf, bar, is_tty)?;
            }
        }

        inner.write(buf.as_bytes())?;
        if self.config.no_auto_flush {
            return Ok(());
        }
        inner.flush()
    }

    /// Engine-internal diagnostics go to stderr, never to a caller's sink,
    /// so a diagnostic cannot deadlock against the sink it complains about.
    fn diag(&self, level: LogLevel, message: fmt::Arguments<'_>) {
        if !level.enabled(self.config.min_level) {
            return;
        }
        let text = sanitize_multiline(&message.to_string(), self.config.max_message_len);
        let line = format_line(level, DIAG_TAG, &text);
        let _ = io::stderr().write_all(line.as_bytes());
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{log_dbg, log_err, log_inf, log_wrn};
    use std::sync::{Arc, Mutex as StdMutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<StdMutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> Vec<u8> {
            self.0.lock().unwrap().clone()
        }

        fn text(&self) -> String {
            String::from_utf8(self.contents()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn console_with_sink() -> (Console, SinkHandle, SharedBuf) {
        let console = Console::new();
        let buf = SharedBuf::default();
        let sink = console.create_wrapped_sink(Box::new(buf.clone())).unwrap();
        (console, sink, buf)
    }

    #[test]
    fn test_statusbar_round_trip() {
        let (console, sink, _buf) = console_with_sink();
        let mut handle = console
            .create_statusbar(sink, &[2, 1], &[10, 10], &["a ", "b "], &["", ""])
            .unwrap();
        assert!(handle.is_valid());
        assert_ne!(handle.id(), 0);

        let status = console.update_statusbar(handle, 0, 50.0).unwrap();
        assert!(status.is_clean());

        console.destroy_statusbar(&mut handle).unwrap();
        assert!(!handle.is_valid());
        assert_eq!(handle.id(), 0);

        let err = console.destroy_statusbar(&mut handle).unwrap_err();
        assert!(matches!(err, Error::HandleCleared));
    }

    #[test]
    fn test_stale_statusbar_copy_rejected() {
        let (console, sink, _buf) = console_with_sink();
        let mut handle = console
            .create_statusbar(sink, &[1], &[10], &[""], &[""])
            .unwrap();
        let stale = handle;
        console.destroy_statusbar(&mut handle).unwrap();

        // Slot gets reused with a fresh id; the stale copy must never reach
        // the new occupant.
        let fresh = console
            .create_statusbar(sink, &[1], &[10], &[""], &[""])
            .unwrap();
        assert_eq!(fresh.index(), stale.index());
        let err = console.update_statusbar(stale, 0, 10.0).unwrap_err();
        assert!(matches!(err, Error::HandleIdMismatch { .. }));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let (console, sink, _buf) = console_with_sink();
        let err = console
            .create_statusbar(sink, &[1, 2], &[10], &["", ""], &["", ""])
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_statusbar_requires_valid_sink() {
        let console = Console::new();
        let err = console
            .create_statusbar(SinkHandle::invalid(), &[1], &[10], &[""], &[""])
            .unwrap_err();
        assert!(err.is_invalid_handle());
    }

    #[test]
    fn test_percent_bounds() {
        let (console, sink, _buf) = console_with_sink();
        let handle = console
            .create_statusbar(sink, &[1], &[10], &[""], &[""])
            .unwrap();

        assert!(matches!(
            console.update_statusbar(handle, 0, -1.0),
            Err(Error::InvalidPercent(_))
        ));
        assert!(matches!(
            console.update_statusbar(handle, 0, 101.0),
            Err(Error::InvalidPercent(_))
        ));
        console.update_statusbar(handle, 0, 0.0).unwrap();
        console.update_statusbar(handle, 0, 100.0).unwrap();
    }

    #[test]
    fn test_bar_index_bounds() {
        let (console, sink, _buf) = console_with_sink();
        let handle = console
            .create_statusbar(sink, &[1], &[10], &[""], &[""])
            .unwrap();
        let err = console.update_statusbar(handle, 1, 50.0).unwrap_err();
        assert!(matches!(err, Error::InvalidBarIndex { index: 1, count: 1 }));
    }

    #[test]
    fn test_statusbar_capacity() {
        let config = Config {
            max_statusbars: 2,
            ..Config::default()
        };
        let console = Console::with_config(config);
        let buf = SharedBuf::default();
        let sink = console.create_wrapped_sink(Box::new(buf)).unwrap();

        let mut first = console.create_statusbar(sink, &[1], &[5], &[""], &[""]).unwrap();
        console.create_statusbar(sink, &[1], &[5], &[""], &[""]).unwrap();
        let err = console
            .create_statusbar(sink, &[1], &[5], &[""], &[""])
            .unwrap_err();
        assert!(matches!(err, Error::Capacity { max: 2 }));

        console.destroy_statusbar(&mut first).unwrap();
        console.create_statusbar(sink, &[1], &[5], &[""], &[""]).unwrap();
    }

    #[test]
    fn test_update_writes_bar_line() {
        let (console, sink, buf) = console_with_sink();
        let handle = console
            .create_statusbar(sink, &[1], &[20], &["dl "], &[" done"])
            .unwrap();
        buf.0.lock().unwrap().clear();

        console.update_statusbar(handle, 0, 50.0).unwrap();
        let text = buf.text();
        // Spinner advanced to phase 1 ('/') on the first update.
        assert_eq!(text, "\x1b[1A\r\x1b[2Kdl [##########/         ]  50.00 done\n");
    }

    #[test]
    fn test_prefix_sanitized_and_clamped() {
        let config = Config {
            max_prefix_len: 8,
            ..Config::default()
        };
        let console = Console::with_config(config);
        let buf = SharedBuf::default();
        let sink = console.create_wrapped_sink(Box::new(buf.clone())).unwrap();

        console
            .create_statusbar(sink, &[1], &[4], &["ab\x07cdefghij"], &[""])
            .unwrap();
        let text = buf.text();
        assert!(text.contains("ab\u{FFFD}cd..."));
        assert!(!text.contains('\x07'));
    }

    #[test]
    fn test_width_clamped_to_config() {
        let config = Config {
            max_bar_width: 4,
            ..Config::default()
        };
        let console = Console::with_config(config);
        let buf = SharedBuf::default();
        let sink = console.create_wrapped_sink(Box::new(buf.clone())).unwrap();

        console.create_statusbar(sink, &[1], &[100], &[""], &[""]).unwrap();
        assert!(buf.text().contains("[|   ] "));
    }

    #[test]
    fn test_log_plain_when_no_bars() {
        let (console, sink, buf) = console_with_sink();
        console
            .log(sink, LogLevel::Info, "demo", format_args!("{} items", 3))
            .unwrap();
        assert_eq!(buf.text(), "INFO [demo]: 3 items\n");
    }

    #[test]
    fn test_log_below_threshold_is_noop() {
        let config = Config {
            min_level: LogLevel::Warning,
            ..Config::default()
        };
        let console = Console::with_config(config);
        let buf = SharedBuf::default();
        let sink = console.create_wrapped_sink(Box::new(buf.clone())).unwrap();

        console
            .log(sink, LogLevel::Info, "demo", format_args!("dropped"))
            .unwrap();
        console
            .log(sink, LogLevel::Off, "demo", format_args!("dropped"))
            .unwrap();
        assert!(buf.contents().is_empty());
    }

    #[test]
    fn test_log_displaces_and_redraws_bars() {
        let (console, sink, buf) = console_with_sink();
        console
            .create_statusbar(sink, &[2, 1], &[4, 4], &["a ", "b "], &["", ""])
            .unwrap();
        buf.0.lock().unwrap().clear();

        console
            .log(sink, LogLevel::Warning, "net", format_args!("retrying"))
            .unwrap();
        let text = buf.text();
        // Up to the topmost bar, clear, log line, back down, both redraws.
        assert!(text.starts_with("\x1b[2A\r\x1b[2KWARNING [net]: retrying\n\n\n"));
        assert!(text.contains("a [|   ]   0.00"));
        assert!(text.contains("b [|   ]   0.00"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_log_tag_sanitized() {
        let (console, sink, buf) = console_with_sink();
        console
            .log(sink, LogLevel::Error, "bad\ntag", format_args!("x"))
            .unwrap();
        assert_eq!(buf.text(), "ERROR [bad\u{FFFD}tag]: x\n");
    }

    #[test]
    fn test_log_on_destroyed_sink_fails() {
        let (console, mut sink, _buf) = console_with_sink();
        let stale = sink;
        console.destroy_sink(&mut sink).unwrap();
        let err = console
            .log(stale, LogLevel::Info, "demo", format_args!("x"))
            .unwrap_err();
        assert!(err.is_invalid_handle());
    }

    #[test]
    fn test_move_cursor_bytes() {
        let (console, sink, buf) = console_with_sink();
        console.move_cursor(sink, 3).unwrap();
        console.move_cursor(sink, -2).unwrap();
        console.move_cursor(sink, 0).unwrap();
        assert_eq!(buf.text(), "\x1b[3A\n\n");
    }

    #[test]
    fn test_cursor_helpers_bit_exact() {
        let (console, sink, buf) = console_with_sink();
        console.save_cursor(sink).unwrap();
        console.restore_cursor(sink).unwrap();
        console.clear_to_end_of_line(sink).unwrap();
        console.clear_from_start_of_line(sink).unwrap();
        console.clear_line(sink).unwrap();
        console.clear_current_line(sink).unwrap();
        assert_eq!(buf.text(), "\x1b[s\x1b[u\x1b[0K\x1b[1K\x1b[2K\r\x1b[2K");
    }

    #[test]
    fn test_wrapped_sink_is_not_tty() {
        let (console, sink, _buf) = console_with_sink();
        assert!(!console.is_tty(sink));
        assert!(!console.is_tty(SinkHandle::invalid()));
    }

    #[test]
    fn test_sink_kind() {
        let (console, mut sink, _buf) = console_with_sink();
        assert_eq!(console.sink_kind(sink), SinkKind::Wrapped);
        console.destroy_sink(&mut sink).unwrap();
        assert_eq!(console.sink_kind(sink), SinkKind::Invalid);
        assert_eq!(console.sink_kind(SinkHandle::invalid()), SinkKind::Invalid);
    }

    #[test]
    fn test_sink_write_round_trip() {
        let (console, mut sink, buf) = console_with_sink();
        assert_eq!(console.write_str(sink, "hello").unwrap(), 5);
        console.flush_sink(sink).unwrap();
        assert_eq!(buf.text(), "hello");

        console.destroy_sink(&mut sink).unwrap();
        assert!(!sink.is_valid());
        assert!(matches!(
            console.destroy_sink(&mut sink),
            Err(Error::HandleCleared)
        ));
    }

    #[test]
    fn test_destroy_statusbar_blanks_lines() {
        let (console, sink, buf) = console_with_sink();
        let mut handle = console
            .create_statusbar(sink, &[2, 1], &[4, 4], &["", ""], &["", ""])
            .unwrap();
        buf.0.lock().unwrap().clear();

        console.destroy_statusbar(&mut handle).unwrap();
        assert_eq!(buf.text(), "\x1b[2A\r\x1b[2K\n\n\x1b[1A\r\x1b[2K\n");
    }

    #[test]
    fn test_destroy_statusbar_survives_dead_sink() {
        let (console, mut sink, _buf) = console_with_sink();
        let mut handle = console
            .create_statusbar(sink, &[1], &[4], &[""], &[""])
            .unwrap();
        console.destroy_sink(&mut sink).unwrap();
        // Nothing left to blank, but the slot must still be reclaimed.
        console.destroy_statusbar(&mut handle).unwrap();
        assert!(!handle.is_valid());
    }

    #[test]
    fn test_log_macros() {
        let (console, sink, buf) = console_with_sink();
        log_err!(console, sink, "m", "a {}", 1).unwrap();
        log_wrn!(console, sink, "m", "b").unwrap();
        log_inf!(console, sink, "m", "c").unwrap();
        log_dbg!(console, sink, "m", "d").unwrap();
        assert_eq!(
            buf.text(),
            "ERROR [m]: a 1\nWARNING [m]: b\nINFO [m]: c\nDEBUG [m]: d\n"
        );
    }
}
