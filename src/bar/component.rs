//! The single-bar drawing algorithm: composition, truncation, emission.
//!
//! Composition is a pure function from `(percent, width, prefix, postfix,
//! spinner phase)` to the fixed-format line
//! `"{prefix}[{'#' * fill}{spinner}{spaces}] {percent:6.2}{postfix}"`.
//! Emission positions that line `position` rows above the caller's cursor
//! baseline with cursor-movement sequences, clipping to the terminal width
//! on TTY sinks.

use crate::error::{Error, Result};
use crate::term::{terminal_columns, AnsiBuffer, FALLBACK_COLUMNS};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Four-phase spinner cycle advanced once per update.
pub const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// One progress indicator within a statusbar.
#[derive(Debug, Clone)]
pub struct BarComponent {
    /// Progress in percent, always within `0.0..=100.0`.
    pub percent: f64,
    /// Lines above the caller's cursor baseline where this bar lives.
    pub position: u32,
    /// Interior width of the bar in characters (between the brackets).
    pub width: u32,
    /// Sanitized text drawn before the bar.
    pub prefix: String,
    /// Sanitized text drawn after the percentage.
    pub postfix: String,
    /// Rotating index into [`SPINNER`].
    pub spinner_phase: usize,
}

/// Non-fatal conditions of a completed draw.
///
/// The bar is on screen in every case; these report that it was clipped,
/// that the width query failed (and the fallback width was used), or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawStatus {
    /// Drawn at full length with a known terminal width.
    #[default]
    Clean,
    /// The composed line exceeded the terminal width and was clipped.
    Truncated,
    /// The terminal-width query failed; drawn against the fallback width.
    WidthUnknown,
    /// Width query failed and the line still needed clipping.
    WidthUnknownTruncated,
}

impl DrawStatus {
    /// Whether the draw completed without any degradation.
    pub const fn is_clean(self) -> bool {
        matches!(self, Self::Clean)
    }

    const fn with_truncation(self) -> Self {
        match self {
            Self::Clean | Self::Truncated => Self::Truncated,
            Self::WidthUnknown | Self::WidthUnknownTruncated => Self::WidthUnknownTruncated,
        }
    }

    /// Human-readable failure cause for the one-time diagnostic.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Clean => "clean draw",
            Self::Truncated => "truncation was needed",
            Self::WidthUnknown => "terminal width detection failed",
            Self::WidthUnknownTruncated => {
                "terminal width detection failed and truncation was needed"
            }
        }
    }
}

/// Compose the bar line without touching any terminal state.
///
/// `fill = floor(percent * width / 100)`; when any interior space remains,
/// the first empty cell carries the spinner glyph.
pub fn compose(
    percent: f64,
    width: u32,
    prefix: &str,
    postfix: &str,
    spinner_phase: usize,
) -> Result<String> {
    if !(0.0..=100.0).contains(&percent) {
        return Err(Error::InvalidPercent(percent));
    }
    let spin_char = SPINNER[spinner_phase % SPINNER.len()];

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let fill = ((percent * f64::from(width)) / 100.0).floor() as u32;
    let empty = width - fill;

    let mut line = String::with_capacity(prefix.len() + postfix.len() + width as usize + 10);
    line.push_str(prefix);
    line.push('[');
    for _ in 0..fill {
        line.push('#');
    }
    if empty > 0 {
        line.push(spin_char);
        for _ in 1..empty {
            line.push(' ');
        }
    }
    line.push_str("] ");
    line.push_str(&format!("{percent:6.2}"));
    line.push_str(postfix);
    Ok(line)
}

/// Clip `line` to at most `max_columns` display columns, whole graphemes.
fn clip_to_columns(line: &str, max_columns: usize) -> String {
    let mut used = 0;
    let mut output = String::with_capacity(line.len().min(max_columns * 4));
    for grapheme in line.graphemes(true) {
        let grapheme_width = grapheme.width();
        if used + grapheme_width > max_columns {
            break;
        }
        used += grapheme_width;
        output.push_str(grapheme);
    }
    output
}

/// Append a full positioned redraw of `bar` to `buf`.
///
/// The sequence is: cursor up to the bar's row, clear the whole line, the
/// (possibly clipped) bar text, cursor back down to the baseline. Callers
/// write the buffer to the sink in one piece while holding its lock.
pub(crate) fn render_into(
    buf: &mut AnsiBuffer,
    bar: &BarComponent,
    is_tty: bool,
) -> Result<DrawStatus> {
    let mut line = compose(bar.percent, bar.width, &bar.prefix, &bar.postfix, bar.spinner_phase)?;
    let mut status = DrawStatus::Clean;

    // Only a real terminal imposes a column budget; files and wrapped
    // streams take the line unbounded.
    if is_tty {
        let columns = match terminal_columns() {
            Ok(columns) => columns,
            Err(_) => {
                status = DrawStatus::WidthUnknown;
                FALLBACK_COLUMNS
            }
        };
        let columns = usize::from(columns);
        if line.width() > columns {
            line = clip_to_columns(&line, columns.saturating_sub(1));
            status = status.with_truncation();
        }
    }

    buf.cursor_up(bar.position);
    buf.clear_current_line();
    buf.write_str(&line);
    buf.cursor_down(bar.position);
    Ok(status)
}

/// Append a blanking sequence for `position`: move up, clear, move back.
pub(crate) fn blank_into(buf: &mut AnsiBuffer, position: u32) {
    buf.cursor_up(position);
    buf.clear_current_line();
    buf.cursor_down(position);
}
