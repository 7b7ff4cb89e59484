// SPDX-License-Identifier: MIT
//
// Canvas — a character grid that redraws itself in place.
//
// The canvas is a fixed-size 2D grid of cells, each holding one character
// and an opaque style tag. Mutators only touch memory; nothing reaches the
// terminal until `refresh()`, which writes the whole grid at once.
//
// Redraw model:
//
//   The first refresh writes `height` lines at the current cursor position.
//   Every later refresh first moves the cursor up one row per line (one
//   CUU 1 per row) and then writes the grid again over the old one. This
//   assumes nobody else moved the cursor in between: the canvas owns the
//   cursor for the whole session.
//
//   The cursor-up count is the *current* height. Changing the height between
//   two refreshes therefore repositions the redraw by the difference. That
//   is a known limitation kept on purpose; see the
//   `height_change_between_refreshes_uses_new_height` test.
//
// Styling:
//
//   Every glyph is written as `tag + glyph + RESET`. The reset is
//   unconditional, even for untagged cells, so no cell's style can leak into
//   its neighbour.
//
// Frame:
//
//   An enabled frame is drawn over the outer ring of the grid. It does not
//   add rows or columns; the drawable interior shrinks to
//   `(width - 2) × (height - 2)` visually while the stored cells under the
//   ring are kept untouched.

use std::io::{self, Write};

use thiserror::Error;

use crate::ansi;
use crate::glyph::FrameStyle;
use crate::style::Style;

// ─── Errors ─────────────────────────────────────────────────────────────────

/// A canvas mutation that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanvasError {
    #[error("position ({x}, {y}) is outside the {width}x{height} canvas")]
    OutOfBounds { x: u16, y: u16, width: u16, height: u16 },
}

// ─── Cell ───────────────────────────────────────────────────────────────────

/// One grid position: a character and the tag written before it.
///
/// An empty tag means no styling.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    pub ch: char,
    pub tag: String,
}

impl Cell {
    #[must_use]
    pub fn new(ch: char, tag: impl Into<String>) -> Self {
        Self { ch, tag: tag.into() }
    }
}

// ─── Canvas ─────────────────────────────────────────────────────────────────

/// A character grid with optional frame, rendered with cursor-up redraws.
///
/// Flat `Vec<Cell>` with row-major indexing: `index = y * width + x`.
///
/// # Examples
///
/// ```
/// use osm_term::canvas::Canvas;
///
/// let mut canvas = Canvas::new(3, 1);
/// canvas.put(1, 0, 'X', "").unwrap();
///
/// let mut out = Vec::new();
/// canvas.refresh(&mut out).unwrap();
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     " \x1b[0mX\x1b[0m \x1b[0m\n"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    frame_enabled: bool,
    frame_style: FrameStyle,
    frame_tag: String,
    background: char,
    background_tag: String,
    drawn: bool,
}

impl Canvas {
    // ─── Construction ────────────────────────────────────────────────────

    /// Create a canvas filled with the default background (space, no tag).
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let mut canvas = Self {
            width,
            height,
            cells: Vec::new(),
            frame_enabled: false,
            frame_style: FrameStyle::Empty,
            frame_tag: String::new(),
            background: ' ',
            background_tag: String::new(),
            drawn: false,
        };
        canvas.reallocate();
        canvas
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The character used to fill cleared cells.
    #[inline]
    #[must_use]
    pub const fn background(&self) -> char {
        self.background
    }

    #[inline]
    #[must_use]
    pub fn background_tag(&self) -> &str {
        &self.background_tag
    }

    #[inline]
    #[must_use]
    pub const fn is_frame_enabled(&self) -> bool {
        self.frame_enabled
    }

    #[inline]
    #[must_use]
    pub const fn frame_style(&self) -> FrameStyle {
        self.frame_style
    }

    #[inline]
    #[must_use]
    pub fn frame_tag(&self) -> &str {
        &self.frame_tag
    }

    /// Whether a refresh has already been written.
    #[inline]
    #[must_use]
    pub const fn has_drawn(&self) -> bool {
        self.drawn
    }

    /// Whether `(x, y)` is within the grid.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    /// Convert `(x, y)` to a flat index.
    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get a cell reference, or `None` if out of bounds.
    #[must_use]
    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// The raw row-major cell slice.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    // ─── Configuration ───────────────────────────────────────────────────

    /// Set the fill used by [`clear`](Self::clear) and by resizes.
    ///
    /// Existing cells keep their content until the next clear.
    pub fn set_background(&mut self, ch: char, tag: impl Into<String>) {
        self.background = ch;
        self.background_tag = tag.into();
    }

    /// Turn the frame on or off.
    pub const fn enable_frame(&mut self, enabled: bool) {
        self.frame_enabled = enabled;
    }

    /// Choose the frame glyphs and the tag written before each of them.
    pub fn set_frame(&mut self, style: FrameStyle, tag: impl Into<String>) {
        self.frame_style = style;
        self.frame_tag = tag.into();
    }

    /// Change the width. All content is discarded.
    pub fn set_width(&mut self, width: u16) {
        self.width = width;
        self.reallocate();
    }

    /// Change the height. All content is discarded.
    ///
    /// The next refresh still moves the cursor up by the new height, not by
    /// the number of rows drawn last time.
    pub fn set_height(&mut self, height: u16) {
        self.height = height;
        self.reallocate();
    }

    fn reallocate(&mut self) {
        let size = usize::from(self.width) * usize::from(self.height);
        self.cells.clear();
        self.cells
            .resize(size, Cell::new(self.background, self.background_tag.clone()));
    }

    // ─── Drawing ─────────────────────────────────────────────────────────

    /// Reset every cell to the background.
    pub fn clear(&mut self) {
        let fill = Cell::new(self.background, self.background_tag.clone());
        self.cells.fill(fill);
    }

    /// Overwrite one cell.
    ///
    /// # Errors
    ///
    /// [`CanvasError::OutOfBounds`] if `x >= width` or `y >= height`. The
    /// grid is left untouched.
    pub fn put(&mut self, x: u16, y: u16, ch: char, tag: impl Into<String>) -> Result<(), CanvasError> {
        if !self.in_bounds(x, y) {
            return Err(CanvasError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let idx = self.index(x, y);
        self.cells[idx] = Cell::new(ch, tag);
        Ok(())
    }

    /// [`put`](Self::put) with a typed [`Style`].
    ///
    /// # Errors
    ///
    /// Same as [`put`](Self::put).
    pub fn put_styled(&mut self, x: u16, y: u16, ch: char, style: &Style) -> Result<(), CanvasError> {
        self.put(x, y, ch, style.tag())
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Write the redraw for the current state to `w`.
    ///
    /// Includes the cursor-up prefix when a previous refresh exists. Does not
    /// mark the canvas as drawn.
    ///
    /// An enabled frame always draws its top border, so a framed canvas of
    /// height 0 still produces one row. A border row is the left corner,
    /// `width - 2` edge glyphs and the right corner, whatever the width.
    ///
    /// # Errors
    ///
    /// Returns the first error from `w`.
    pub fn render_to(&self, w: &mut impl Write) -> io::Result<()> {
        if self.drawn {
            ansi::cursor_up(w, self.height)?;
        }

        let glyphs = self.frame_style.glyphs();
        if self.frame_enabled {
            self.write_border_row(w, glyphs.top_left, glyphs.top, glyphs.top_right)?;
        }

        for y in u16::from(self.frame_enabled)..self.height {
            if self.frame_enabled && y == self.height - 1 {
                self.write_border_row(w, glyphs.bottom_left, glyphs.bottom, glyphs.bottom_right)?;
            } else {
                self.write_cell_row(w, y, glyphs.left, glyphs.right)?;
            }
        }
        Ok(())
    }

    /// Write the redraw to `out` in one piece, flush it, and remember that a
    /// frame exists.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to or flushing `out` fails. The canvas is
    /// not marked as drawn in that case.
    pub fn refresh(&mut self, out: &mut impl Write) -> io::Result<()> {
        let mut frame = Vec::with_capacity(self.cells.len() * (ansi::RESET.len() + 2));
        self.render_to(&mut frame)?;
        tracing::trace!(
            width = self.width,
            height = self.height,
            redraw = self.drawn,
            bytes = frame.len(),
            "canvas refresh"
        );
        out.write_all(&frame)?;
        out.flush()?;
        self.drawn = true;
        Ok(())
    }

    fn write_border_row(&self, w: &mut impl Write, left: &str, edge: &str, right: &str) -> io::Result<()> {
        self.write_frame_glyph(w, left)?;
        for _ in 2..self.width {
            self.write_frame_glyph(w, edge)?;
        }
        self.write_frame_glyph(w, right)?;
        w.write_all(b"\n")
    }

    fn write_cell_row(&self, w: &mut impl Write, y: u16, left: &str, right: &str) -> io::Result<()> {
        let last_col = self.width.saturating_sub(1);
        for x in 0..self.width {
            if self.frame_enabled && x == 0 {
                self.write_frame_glyph(w, left)?;
            } else if self.frame_enabled && x == last_col {
                self.write_frame_glyph(w, right)?;
            } else {
                let cell = &self.cells[self.index(x, y)];
                write!(w, "{}{}", cell.tag, cell.ch)?;
                ansi::reset(w)?;
            }
        }
        w.write_all(b"\n")
    }

    fn write_frame_glyph(&self, w: &mut impl Write, glyph: &str) -> io::Result<()> {
        w.write_all(self.frame_tag.as_bytes())?;
        w.write_all(glyph.as_bytes())?;
        ansi::reset(w)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
