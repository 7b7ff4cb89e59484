// SPDX-License-Identifier: MIT
//
// Style — the closed vocabulary behind escape tags.
//
// The canvas and the mirror treat styling as opaque strings ("tags"): an
// escape prefix written before a glyph and cancelled by the full reset that
// follows it. This module is the one place that knows how to build such a
// tag from something typed.
//
// Color and attribute names are closed enumerations parsed with `FromStr`,
// so an unknown name is rejected once at construction instead of being
// checked against a runtime allow-list wherever it is used.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use thiserror::Error;

use crate::ansi;

// ─── Errors ─────────────────────────────────────────────────────────────────

/// A style name that is not part of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    #[error("unknown color name '{0}'")]
    UnknownColor(String),

    #[error("unknown attribute name '{0}'")]
    UnknownAttr(String),

    #[error("unknown frame style '{0}' (expected empty, ascii or box)")]
    UnknownFrame(String),
}

// ─── Color ──────────────────────────────────────────────────────────────────

/// A terminal color.
///
/// The sixteen named colors map to the compact SGR codes; `Ansi256` and
/// `Rgb` cover the extended palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Color {
    /// The terminal's own default color.
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    /// A palette index in the 256-color table.
    Ansi256(u8),
    /// A 24-bit color.
    Rgb(u8, u8, u8),
}

/// Name table for the sixteen named colors, in palette order.
const COLOR_NAMES: [(&str, Color); 16] = [
    ("black", Color::Black),
    ("red", Color::Red),
    ("green", Color::Green),
    ("yellow", Color::Yellow),
    ("blue", Color::Blue),
    ("magenta", Color::Magenta),
    ("cyan", Color::Cyan),
    ("white", Color::White),
    ("bright_black", Color::BrightBlack),
    ("bright_red", Color::BrightRed),
    ("bright_green", Color::BrightGreen),
    ("bright_yellow", Color::BrightYellow),
    ("bright_blue", Color::BrightBlue),
    ("bright_magenta", Color::BrightMagenta),
    ("bright_cyan", Color::BrightCyan),
    ("bright_white", Color::BrightWhite),
];

impl Color {
    /// Palette index (0–15) of a named color, `None` for the others.
    #[must_use]
    pub fn index(self) -> Option<u8> {
        COLOR_NAMES
            .iter()
            .position(|&(_, c)| c == self)
            .and_then(|i| u8::try_from(i).ok())
    }
}

impl FromStr for Color {
    type Err = StyleError;

    /// Parse a color name. Case-insensitive; `-` and `_` are interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace('-', "_");
        if name == "default" {
            return Ok(Self::Default);
        }
        COLOR_NAMES
            .iter()
            .find(|&&(n, _)| n == name)
            .map(|&(_, c)| c)
            .ok_or_else(|| StyleError::UnknownColor(s.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Ansi256(idx) => write!(f, "ansi256({idx})"),
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            named => {
                let name = COLOR_NAMES
                    .iter()
                    .find(|&&(_, c)| c == *named)
                    .map_or("default", |&(n, _)| n);
                f.write_str(name)
            }
        }
    }
}

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes stored as a compact bitfield.
    ///
    /// Each flag maps to one SGR parameter. Combine with bitwise OR:
    ///
    /// ```
    /// use osm_term::style::Attr;
    ///
    /// let style = Attr::BOLD | Attr::UNDERLINE;
    /// assert!(style.contains(Attr::BOLD));
    /// assert!(!style.contains(Attr::DIM));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1 — increased intensity.
        const BOLD          = 1 << 0;
        /// SGR 2 — decreased intensity (faint).
        const DIM           = 1 << 1;
        /// SGR 3 — italic.
        const ITALIC        = 1 << 2;
        /// SGR 4 — underline.
        const UNDERLINE     = 1 << 3;
        /// SGR 5 — blink.
        const BLINK         = 1 << 4;
        /// SGR 7 — swap foreground and background.
        const INVERSE       = 1 << 5;
        /// SGR 8 — invisible text.
        const HIDDEN        = 1 << 6;
        /// SGR 9 — crossed-out text.
        const STRIKETHROUGH = 1 << 7;
    }
}

impl FromStr for Attr {
    type Err = StyleError;

    /// Parse a single attribute name (`"bold"`, `"underline"`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bold" => Ok(Self::BOLD),
            "dim" | "faint" => Ok(Self::DIM),
            "italic" => Ok(Self::ITALIC),
            "underline" | "underlined" => Ok(Self::UNDERLINE),
            "blink" => Ok(Self::BLINK),
            "inverse" | "reverse" => Ok(Self::INVERSE),
            "hidden" => Ok(Self::HIDDEN),
            "strikethrough" | "crossed" => Ok(Self::STRIKETHROUGH),
            _ => Err(StyleError::UnknownAttr(s.to_string())),
        }
    }
}

// ─── Style ──────────────────────────────────────────────────────────────────

/// A foreground, background and attribute set that renders to a tag.
///
/// # Examples
///
/// ```
/// use osm_term::style::{Attr, Color, Style};
///
/// let tag = Style::new().fg(Color::Red).attrs(Attr::BOLD).tag();
/// assert_eq!(tag, "\x1b[1m\x1b[31m");
/// assert_eq!(Style::new().tag(), "");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub attrs: Attr,
}

impl Style {
    /// The empty style. Its tag is the empty string.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            attrs: Attr::empty(),
        }
    }

    #[must_use]
    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    #[must_use]
    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    /// Add attributes to the set already present.
    #[must_use]
    pub const fn attrs(mut self, attrs: Attr) -> Self {
        self.attrs = self.attrs.union(attrs);
        self
    }

    /// Whether the style changes nothing.
    #[must_use]
    pub const fn is_plain(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.attrs.is_empty()
    }

    /// Write the escape prefix: attributes, then foreground, then background.
    ///
    /// # Errors
    ///
    /// Returns the first error from `w`.
    pub fn write_tag(&self, w: &mut impl Write) -> io::Result<()> {
        ansi::attrs(w, self.attrs)?;
        if let Some(fg) = self.fg {
            ansi::fg(w, fg)?;
        }
        if let Some(bg) = self.bg {
            ansi::bg(w, bg)?;
        }
        Ok(())
    }

    /// The escape prefix as a string, for storing in cells.
    #[must_use]
    pub fn tag(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        if let Err(e) = self.write_tag(&mut buf) {
            unreachable!("in-memory tag write failed: {e}");
        }
        // Every code is ASCII.
        String::from_utf8_lossy(&buf).into_owned()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
