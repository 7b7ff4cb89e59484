// SPDX-License-Identifier: MIT
//
// Frame glyphs — the fixed border table.
//
// A frame is drawn over the outer ring of the canvas. Each style supplies
// eight glyphs; the canvas picks one per ring position.
//
//   top_left     top      top_right
//   left                  right
//   bottom_left  bottom   bottom_right

use std::fmt;
use std::str::FromStr;

use crate::style::StyleError;

/// Border style of a canvas frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum FrameStyle {
    /// Blank glyphs: the frame reserves the ring but draws spaces.
    #[default]
    Empty,
    /// `+`, `-` and `|`.
    Ascii,
    /// Unicode box-drawing lines.
    Box,
}

/// The eight glyphs of one frame style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGlyphs {
    pub top_left: &'static str,
    pub top: &'static str,
    pub top_right: &'static str,
    pub left: &'static str,
    pub right: &'static str,
    pub bottom_left: &'static str,
    pub bottom: &'static str,
    pub bottom_right: &'static str,
}

impl FrameGlyphs {
    /// Build a glyph set from the table's column order:
    /// top-left, top, top-right, left, right, bottom-left, bottom, bottom-right.
    const fn from_row(row: [&'static str; 8]) -> Self {
        Self {
            top_left: row[0],
            top: row[1],
            top_right: row[2],
            left: row[3],
            right: row[4],
            bottom_left: row[5],
            bottom: row[6],
            bottom_right: row[7],
        }
    }

    /// The glyphs in table order.
    #[must_use]
    pub const fn as_array(&self) -> [&'static str; 8] {
        [
            self.top_left,
            self.top,
            self.top_right,
            self.left,
            self.right,
            self.bottom_left,
            self.bottom,
            self.bottom_right,
        ]
    }
}

#[rustfmt::skip]
const EMPTY: FrameGlyphs = FrameGlyphs::from_row([" ", " ", " ", " ", " ", " ", " ", " "]);
#[rustfmt::skip]
const ASCII: FrameGlyphs = FrameGlyphs::from_row(["+", "-", "+", "|", "|", "+", "-", "+"]);
#[rustfmt::skip]
const BOX: FrameGlyphs = FrameGlyphs::from_row(["┌", "─", "┐", "│", "│", "└", "─", "┘"]);

impl FrameStyle {
    /// Every style, in declaration order.
    pub const ALL: [Self; 3] = [Self::Empty, Self::Ascii, Self::Box];

    /// The glyph set for this style.
    #[must_use]
    pub const fn glyphs(self) -> &'static FrameGlyphs {
        match self {
            Self::Empty => &EMPTY,
            Self::Ascii => &ASCII,
            Self::Box => &BOX,
        }
    }

    /// Lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Ascii => "ascii",
            Self::Box => "box",
        }
    }
}

impl fmt::Display for FrameStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FrameStyle {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|style| style.name() == wanted)
            .ok_or_else(|| StyleError::UnknownFrame(s.to_string()))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
