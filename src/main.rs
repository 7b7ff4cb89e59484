// SPDX-License-Identifier: MIT
//
// osm — bounce a glyph around a canvas, optionally mirroring it to a file.
//
// This is the binary that wires the two crates together:
//
//   osm-term     → canvas, frame glyphs, styles, console capability
//   osm-redirect → stdout capture and the escape-aware file mirror
//
// Each animation frame is one canvas refresh, and each refresh is one flush,
// so the mirror sees one chunk per frame:
//
//   canvas.refresh → OutputRedirector ──▶ stdout
//                          │
//                        flush
//                          ▼
//                     FileMirror ──▶ output/redirected_output.txt
//
// Logging goes to stderr and is filtered with RUST_LOG.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use clap::Parser;
use osm_redirect::{OutputRedirector, RedirectError};
use osm_term::console::{self, ConsoleGuard, NoopConsole};
use osm_term::style::StyleError;
use osm_term::{Attr, Canvas, CanvasError, Color, FrameStyle, Style};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ─── Styles ─────────────────────────────────────────────────────────────────

const FRAME: Style = Style::new().fg(Color::Cyan);
const BACKGROUND: Style = Style::new().fg(Color::BrightBlack).attrs(Attr::DIM);
const BALL: Style = Style::new().fg(Color::Yellow).attrs(Attr::BOLD);

const BALL_GLYPH: char = 'o';
const BACKGROUND_GLYPH: char = '.';

// ─── CLI ────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "osm", version)]
#[command(about = "Animate a terminal canvas and mirror the output to a file")]
struct Cli {
    /// Canvas width in cells.
    #[arg(long, default_value_t = 24)]
    width: u16,

    /// Canvas height in cells.
    #[arg(long, default_value_t = 8)]
    height: u16,

    /// Frame drawn over the outer ring of cells: none, empty, ascii or box.
    #[arg(long, value_name = "STYLE", default_value = "box")]
    frame: FrameArg,

    /// Number of refreshes to draw.
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Pause between refreshes.
    #[arg(long, value_name = "MS", default_value_t = 50)]
    delay_ms: u64,

    /// Mirror everything drawn into a file.
    #[arg(long)]
    mirror: bool,

    /// Mirror directory, relative to the working directory.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Mirror file name.
    #[arg(long, value_name = "NAME")]
    filename: Option<String>,
}

/// A frame style, or `none` for no frame at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameArg(Option<FrameStyle>);

impl FrameArg {
    const fn style(self) -> Option<FrameStyle> {
        self.0
    }
}

impl FromStr for FrameArg {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("none") {
            return Ok(Self(None));
        }
        s.parse().map(|style| Self(Some(style)))
    }
}

// ─── Errors ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Redirect(#[from] RedirectError),

    #[error(transparent)]
    Canvas(#[from] CanvasError),
}

// ─── Bouncer ────────────────────────────────────────────────────────────────

/// A glyph moving diagonally inside a rectangle, reflecting off its edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bouncer {
    x: Axis,
    y: Axis,
}

/// Position and direction along one axis, within `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Axis {
    pos: u16,
    forward: bool,
    min: u16,
    max: u16,
}

impl Axis {
    /// The span `inset..size - inset`, if it holds at least one cell.
    fn inside(size: u16, inset: u16) -> Option<Self> {
        let max = size.checked_sub(inset + 1)?;
        (max >= inset).then_some(Self {
            pos: inset,
            forward: true,
            min: inset,
            max,
        })
    }

    const fn step(&mut self) {
        if self.min == self.max {
            return;
        }
        if (self.forward && self.pos >= self.max) || (!self.forward && self.pos <= self.min) {
            self.forward = !self.forward;
        }
        if self.forward {
            self.pos += 1;
        } else {
            self.pos -= 1;
        }
    }
}

impl Bouncer {
    /// Start in the top-left free cell of `canvas`, heading down-right.
    ///
    /// `None` when the frame leaves no room.
    fn inside(canvas: &Canvas) -> Option<Self> {
        let inset = u16::from(canvas.is_frame_enabled());
        Some(Self {
            x: Axis::inside(canvas.width(), inset)?,
            y: Axis::inside(canvas.height(), inset)?,
        })
    }

    const fn position(&self) -> (u16, u16) {
        (self.x.pos, self.y.pos)
    }

    const fn step(&mut self) {
        self.x.step();
        self.y.step();
    }
}

// ─── Animation ──────────────────────────────────────────────────────────────

fn build_canvas(cli: &Cli) -> Canvas {
    let mut canvas = Canvas::new(cli.width, cli.height);
    canvas.set_background(BACKGROUND_GLYPH, BACKGROUND.tag());
    canvas.clear();
    if let Some(style) = cli.frame.style() {
        canvas.enable_frame(true);
        canvas.set_frame(style, FRAME.tag());
    }
    canvas
}

/// Draw `cli.frames` refreshes through `out`, capturing them if asked.
fn animate<W: Write>(cli: &Cli, out: &mut OutputRedirector<W>) -> Result<(), AppError> {
    if let Some(dir) = &cli.output_dir {
        out.set_directory(dir);
    }
    if let Some(name) = &cli.filename {
        out.set_filename(name.as_str());
    }

    let mut canvas = build_canvas(cli);
    let mut ball = Bouncer::inside(&canvas);
    if ball.is_none() {
        tracing::warn!(
            width = cli.width,
            height = cli.height,
            "canvas has no room inside the frame; drawing it empty"
        );
    }

    if cli.mirror {
        out.begin()?;
    }

    let delay = Duration::from_millis(cli.delay_ms);
    for frame in 0..cli.frames {
        canvas.clear();
        if let Some(ball) = &ball {
            let (x, y) = ball.position();
            canvas.put_styled(x, y, BALL_GLYPH, &BALL)?;
        }
        canvas.refresh(out)?;

        if let Some(ball) = &mut ball {
            ball.step();
        }
        if frame + 1 < cli.frames && !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    if cli.mirror {
        out.end()?;
        tracing::info!(path = %out.filepath().display(), "mirror written");
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let _console = ConsoleGuard::new(NoopConsole)?;
    tracing::debug!(tty = console::is_tty(), "console ready");

    let mut out = OutputRedirector::stdout()?;
    animate(cli, &mut out)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(&cli) {
        eprintln!("osm: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use osm_redirect::MirrorConfig;
    use osm_term::ansi;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("osm").chain(args.iter().copied())).unwrap()
    }

    // ── CLI ─────────────────────────────────────────────────────────────

    #[test]
    fn defaults() {
        let cli = cli(&[]);
        assert_eq!((cli.width, cli.height), (24, 8));
        assert_eq!(cli.frame.style(), Some(FrameStyle::Box));
        assert!(!cli.mirror);
        assert!(cli.output_dir.is_none());
        assert!(cli.filename.is_none());
    }

    #[test]
    fn frame_names() {
        assert_eq!(cli(&["--frame", "none"]).frame.style(), None);
        assert_eq!(cli(&["--frame", "empty"]).frame.style(), Some(FrameStyle::Empty));
        assert_eq!(cli(&["--frame", "ascii"]).frame.style(), Some(FrameStyle::Ascii));
        assert_eq!(cli(&["--frame", "NONE"]).frame.style(), None);
    }

    #[test]
    fn unknown_frame_is_rejected_with_the_style_error() {
        let err = Cli::try_parse_from(["osm", "--frame", "double"]).unwrap_err();
        assert!(err.to_string().contains("unknown frame style 'double'"));
    }

    // ── Bouncer ─────────────────────────────────────────────────────────

    #[test]
    fn bouncer_reflects_at_the_frame() {
        let canvas = build_canvas(&cli(&["--width", "4", "--height", "4"]));
        let mut ball = Bouncer::inside(&canvas).unwrap();
        let mut path = vec![ball.position()];
        for _ in 0..3 {
            ball.step();
            path.push(ball.position());
        }
        assert_eq!(path, [(1, 1), (2, 2), (1, 1), (2, 2)]);
    }

    #[test]
    fn bouncer_never_leaves_the_interior() {
        let canvas = build_canvas(&cli(&["--width", "7", "--height", "4"]));
        let mut ball = Bouncer::inside(&canvas).unwrap();
        for _ in 0..100 {
            let (x, y) = ball.position();
            assert!((1..=5).contains(&x), "x = {x}");
            assert!((1..=2).contains(&y), "y = {y}");
            ball.step();
        }
    }

    #[test]
    fn single_cell_interior_stays_put() {
        let canvas = build_canvas(&cli(&["--width", "3", "--height", "3"]));
        let mut ball = Bouncer::inside(&canvas).unwrap();
        ball.step();
        assert_eq!(ball.position(), (1, 1));
    }

    #[test]
    fn no_room_inside_small_frames() {
        for (w, h) in [("2", "5"), ("5", "2"), ("0", "0")] {
            let canvas = build_canvas(&cli(&["--width", w, "--height", h]));
            assert!(Bouncer::inside(&canvas).is_none(), "{w}x{h}");
        }
        let canvas = build_canvas(&cli(&["--width", "1", "--height", "1", "--frame", "none"]));
        assert!(Bouncer::inside(&canvas).is_some());
    }

    // ── Animation ───────────────────────────────────────────────────────

    #[test]
    fn mirrored_animation_matches_what_was_drawn() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = cli(&[
            "--width", "6", "--height", "4", "--frames", "3", "--delay-ms", "0", "--mirror",
            "--filename", "anim.txt",
        ]);
        let mut out = OutputRedirector::new(Vec::new(), MirrorConfig::for_working_dir(tmp.path()));
        animate(&cli, &mut out).unwrap();

        assert!(!out.is_enabled());
        let path = tmp.path().join("output").join("anim.txt");
        assert_eq!(out.filepath(), path);
        let mirrored = fs::read(&path).unwrap();
        assert_eq!(mirrored, out.get_ref().as_slice());

        let text = String::from_utf8(mirrored).unwrap();
        assert_eq!(text.matches(ansi::CURSOR_UP).count(), 2 * 4);
        assert_eq!(text.matches(BALL_GLYPH).count(), 3);
        assert!(text.starts_with(&FRAME.tag()));
    }

    #[test]
    fn without_mirror_nothing_is_written() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = cli(&["--frames", "2", "--delay-ms", "0", "--output-dir", "elsewhere"]);
        let mut out = OutputRedirector::new(Vec::new(), MirrorConfig::for_working_dir(tmp.path()));
        animate(&cli, &mut out).unwrap();

        assert!(!out.get_ref().is_empty());
        assert_eq!(out.filepath(), tmp.path().join("elsewhere").join("redirected_output.txt"));
        assert!(!out.filepath().exists());
    }

    #[test]
    fn frameless_canvas_draws_the_ball_on_the_edge() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = cli(&["--width", "3", "--height", "1", "--frame", "none", "--frames", "1", "--delay-ms", "0"]);
        let mut out = OutputRedirector::new(Vec::new(), MirrorConfig::for_working_dir(tmp.path()));
        animate(&cli, &mut out).unwrap();

        let drawn = String::from_utf8(out.get_ref().clone()).unwrap();
        let expected = format!(
            "{}{BALL_GLYPH}{reset}{bg}{BACKGROUND_GLYPH}{reset}{bg}{BACKGROUND_GLYPH}{reset}\n",
            BALL.tag(),
            bg = BACKGROUND.tag(),
            reset = ansi::RESET,
        );
        assert_eq!(drawn, expected);
    }
}
