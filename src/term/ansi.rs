//! `AnsiBuffer`: Single-syscall output buffer for cursor-control sequences.

use std::io::Write;

/// Pre-allocated buffer for building ANSI escape sequences.
///
/// A full bar redraw or log interleave is accumulated here, then handed to
/// the sink as one `write()` so a concurrent writer can never land between
/// the cursor movement and the text it positions.
pub struct AnsiBuffer {
    data: Vec<u8>,
}

impl AnsiBuffer {
    /// Create a new buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Create a buffer sized for a typical bar line (256 bytes).
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Clear the buffer for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Get the buffer contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get the buffer length.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if buffer is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write raw bytes.
    #[inline]
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write a string.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Move the cursor up by `lines` (no-op at 0).
    #[inline]
    pub fn cursor_up(&mut self, lines: u32) {
        if lines > 0 {
            // CSI n A
            write!(self.data, "\x1b[{lines}A").unwrap();
        }
    }

    /// Move the cursor down by `lines`, realized as literal newlines so the
    /// terminal scrolls instead of clipping at the bottom row.
    #[inline]
    pub fn cursor_down(&mut self, lines: u32) {
        for _ in 0..lines {
            self.data.push(b'\n');
        }
    }

    /// Relative vertical move: positive = up, negative = down, 0 = no-op.
    #[inline]
    pub fn move_vertical(&mut self, lines: i32) {
        if lines > 0 {
            self.cursor_up(lines.unsigned_abs());
        } else {
            self.cursor_down(lines.unsigned_abs());
        }
    }

    /// Save the cursor position.
    #[inline]
    pub fn save_cursor(&mut self) {
        self.data.extend_from_slice(b"\x1b[s");
    }

    /// Restore the saved cursor position.
    #[inline]
    pub fn restore_cursor(&mut self) {
        self.data.extend_from_slice(b"\x1b[u");
    }

    /// Clear from the cursor to the end of the line.
    #[inline]
    pub fn clear_to_end_of_line(&mut self) {
        self.data.extend_from_slice(b"\x1b[0K");
    }

    /// Clear from the start of the line to the cursor.
    #[inline]
    pub fn clear_from_start_of_line(&mut self) {
        self.data.extend_from_slice(b"\x1b[1K");
    }

    /// Clear the entire current line without moving the cursor.
    #[inline]
    pub fn clear_line(&mut self) {
        self.data.extend_from_slice(b"\x1b[2K");
    }

    /// Return the cursor to the start of the line.
    #[inline]
    pub fn carriage_return(&mut self) {
        self.data.push(b'\r');
    }

    /// Return to line start and clear the entire line.
    #[inline]
    pub fn clear_current_line(&mut self) {
        self.carriage_return();
        self.clear_line();
    }
}

impl Default for AnsiBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_up_sequence() {
        let mut buf = AnsiBuffer::new();
        buf.cursor_up(3);
        assert_eq!(buf.as_bytes(), b"\x1b[3A");
    }

    #[test]
    fn test_cursor_up_zero_is_noop() {
        let mut buf = AnsiBuffer::new();
        buf.cursor_up(0);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_cursor_down_is_newlines() {
        let mut buf = AnsiBuffer::new();
        buf.cursor_down(2);
        assert_eq!(buf.as_bytes(), b"\n\n");
    }

    #[test]
    fn test_move_vertical_signs() {
        let mut buf = AnsiBuffer::new();
        buf.move_vertical(2);
        buf.move_vertical(-2);
        buf.move_vertical(0);
        assert_eq!(buf.as_bytes(), b"\x1b[2A\n\n");
    }

    #[test]
    fn test_clear_sequences_bit_exact() {
        let mut buf = AnsiBuffer::new();
        buf.save_cursor();
        buf.restore_cursor();
        buf.clear_to_end_of_line();
        buf.clear_from_start_of_line();
        buf.clear_line();
        buf.clear_current_line();
        assert_eq!(buf.as_bytes(), b"\x1b[s\x1b[u\x1b[0K\x1b[1K\x1b[2K\r\x1b[2K");
    }

    #[test]
    fn test_reuse_after_clear() {
        let mut buf = AnsiBuffer::new();
        buf.write_str("hello");
        assert_eq!(buf.len(), 5);
        buf.clear();
        assert!(buf.is_empty());
        buf.write_raw(b"\r");
        assert_eq!(buf.as_bytes(), b"\r");
    }
}
