// SPDX-License-Identifier: MIT
//
// osm-term — terminal canvas and escape-run handling.
//
// The pieces every other part of the workspace builds on: the byte-level
// encoding of the few control codes we emit, a closed style vocabulary that
// turns into opaque escape "tags", a classifier that tells whether a chunk of
// output is nothing but control codes, the fixed frame glyph table, and the
// canvas that redraws itself in place with cursor-up moves.
//
// Nothing here owns the terminal beyond its cursor. The canvas writes to any
// `impl Write`; the console capability is a no-op on platforms that already
// speak ANSI.

pub mod ansi;
pub mod canvas;
pub mod console;
pub mod escape;
pub mod glyph;
pub mod style;

pub use canvas::{Canvas, CanvasError, Cell};
pub use escape::is_escape_run;
pub use glyph::{FrameGlyphs, FrameStyle};
pub use style::{Attr, Color, Style};
