// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit. The canvas decides when to move the
// cursor; the style formatter decides which SGR codes make up a tag. This
// module only knows the bytes.
//
// All functions return `io::Result` propagated from the underlying writer.
// Writing into a `Vec<u8>` never fails.
use std::io::{self, Write};

use crate::style::{Attr, Color};

/// The full-reset code (SGR 0). Clears every color and attribute.
pub const RESET: &str = "\x1b[0m";

/// Cursor up by one row (CUU 1).
pub const CURSOR_UP: &str = "\x1b[1A";

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor up `n` rows, one CUU 1 sequence per row.
///
/// The canvas redraw relies on this exact shape: one code per previously
/// rendered row, so the count of codes equals the count of rows.
pub fn cursor_up(w: &mut impl Write, n: u16) -> io::Result<()> {
    for _ in 0..n {
        w.write_all(CURSOR_UP.as_bytes())?;
    }
    Ok(())
}

// ─── Reset ───────────────────────────────────────────────────────────────────

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(RESET.as_bytes())
}

// ─── Foreground Color ────────────────────────────────────────────────────────

/// Set the foreground (text) color.
///
/// Named colors use the compact codes (30-37, 90-97), palette indices use the
/// 256-color form, and RGB uses 24-bit `TrueColor`.
pub fn fg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color {
        Color::Default => w.write_all(b"\x1b[39m"),
        Color::Ansi256(idx) => write!(w, "\x1b[38;5;{idx}m"),
        Color::Rgb(r, g, b) => write!(w, "\x1b[38;2;{r};{g};{b}m"),
        named => match named.index() {
            Some(idx) if idx < 8 => write!(w, "\x1b[{}m", 30 + u16::from(idx)),
            Some(idx) => write!(w, "\x1b[{}m", 82 + u16::from(idx)),
            None => Ok(()),
        },
    }
}

// ─── Background Color ────────────────────────────────────────────────────────

/// Set the background color.
///
/// Same encoding strategy as [`fg`] with the background codes
/// (40–47, 100–107, 48;5;N, 48;2;R;G;B).
pub fn bg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color {
        Color::Default => w.write_all(b"\x1b[49m"),
        Color::Ansi256(idx) => write!(w, "\x1b[48;5;{idx}m"),
        Color::Rgb(r, g, b) => write!(w, "\x1b[48;2;{r};{g};{b}m"),
        named => match named.index() {
            Some(idx) if idx < 8 => write!(w, "\x1b[{}m", 40 + u16::from(idx)),
            Some(idx) => write!(w, "\x1b[{}m", 92 + u16::from(idx)),
            None => Ok(()),
        },
    }
}

// ─── Text Attributes ─────────────────────────────────────────────────────────

/// Emit SGR codes for text attributes as a single CSI sequence.
///
/// Multiple attributes are semicolon-separated: `\x1b[1;3;9m` for
/// bold + italic + strikethrough. Does nothing if no attributes are set.
pub fn attrs(w: &mut impl Write, attr: Attr) -> io::Result<()> {
    if attr.is_empty() {
        return Ok(());
    }

    w.write_all(b"\x1b[")?;
    let mut first = true;

    macro_rules! emit {
        ($flag:expr, $code:expr) => {
            if attr.contains($flag) {
                if !first {
                    w.write_all(b";")?;
                }
                w.write_all($code)?;
                first = false;
            }
        };
    }

    emit!(Attr::BOLD, b"1");
    emit!(Attr::DIM, b"2");
    emit!(Attr::ITALIC, b"3");
    emit!(Attr::UNDERLINE, b"4");
    emit!(Attr::BLINK, b"5");
    emit!(Attr::INVERSE, b"7");
    emit!(Attr::HIDDEN, b"8");
    emit!(Attr::STRIKETHROUGH, b"9");
    let _ = first; // Last expansion sets first; suppress dead-write warning.

    w.write_all(b"m")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
