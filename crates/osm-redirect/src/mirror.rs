// SPDX-License-Identifier: MIT
//
// FileMirror — reconciles captured output chunks into a file.
//
// Each flush of the capture hands one chunk to `reconcile`, which:
//
//   1. makes sure the directory and the file exist,
//   2. reads the whole file (the file, not memory, is the source of truth,
//      so edits made by someone else between flushes are respected),
//   3. merges the chunk,
//   4. truncates the file and writes the merged contents back.
//
// Merge policy:
//
//   A chunk made only of control sequences (an escape run) is collapsible.
//   If the previous chunk was one too, the new run overwrites the old one in
//   place: a redraw loop that keeps sending cursor moves and style changes
//   leaves one run in the file, not thousands. Any visible chunk is appended
//   and ends the collapsible streak, because the next run no longer abuts
//   the previous one.
//
// The remembered run is a byte range into the file. If the file shrank
// under us and the range no longer fits, the run is forgotten and the new
// chunk is appended.
//
// Locking: one mutex guards the path configuration and the remembered run
// for the whole of every public operation. It is not reentrant; internal
// helpers take the already-locked state.

use std::fs::{self, OpenOptions};
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use osm_term::escape::is_escape_run;

use crate::config::MirrorConfig;
use crate::error::RedirectError;

#[derive(Debug)]
struct MirrorState {
    config: MirrorConfig,
    /// Byte range of the last escape run written, if it is still collapsible.
    last_run: Option<Range<usize>>,
}

/// A file that mirrors an escape-coded stream, collapsing repeated runs.
#[derive(Debug)]
pub struct FileMirror {
    state: Mutex<MirrorState>,
}

impl FileMirror {
    #[must_use]
    pub const fn new(config: MirrorConfig) -> Self {
        Self {
            state: Mutex::new(MirrorState {
                config,
                last_run: None,
            }),
        }
    }

    /// A mirror at the default location for the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined.
    pub fn from_current_dir() -> io::Result<Self> {
        Ok(Self::new(MirrorConfig::from_current_dir()?))
    }

    /// The state is plain data; a panic elsewhere cannot leave it torn.
    fn lock(&self) -> MutexGuard<'_, MirrorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ─── Configuration ───────────────────────────────────────────────────

    /// A snapshot of the current location.
    #[must_use]
    pub fn config(&self) -> MirrorConfig {
        self.lock().config.clone()
    }

    #[must_use]
    pub fn filename(&self) -> String {
        self.lock().config.filename().to_string()
    }

    #[must_use]
    pub fn directory(&self) -> PathBuf {
        self.lock().config.directory().to_path_buf()
    }

    #[must_use]
    pub fn filepath(&self) -> PathBuf {
        self.lock().config.filepath()
    }

    /// Range of the escape run the next run would overwrite, if any.
    #[must_use]
    pub fn last_run(&self) -> Option<Range<usize>> {
        self.lock().last_run.clone()
    }

    /// Point the mirror at another file in the same directory.
    ///
    /// Forgets the remembered run: its offsets belong to the old file.
    pub fn set_filename(&self, filename: impl Into<String>) {
        let mut state = self.lock();
        state.config.set_filename(filename);
        state.last_run = None;
    }

    /// Point the mirror at another directory, composed onto the base
    /// directory. Forgets the remembered run.
    pub fn set_directory(&self, directory: impl AsRef<Path>) {
        let mut state = self.lock();
        state.config.set_directory(directory);
        state.last_run = None;
    }

    // ─── Operations ──────────────────────────────────────────────────────

    /// Create the directory and an empty file if they are missing.
    ///
    /// Idempotent: an existing file is left exactly as it is.
    ///
    /// # Errors
    ///
    /// [`RedirectError::Io`] if the directory or file cannot be created.
    pub fn touch(&self) -> Result<(), RedirectError> {
        let state = self.lock();
        touch_locked(&state.config)
    }

    /// Merge `chunk` into the file.
    ///
    /// An empty chunk only ensures the file exists.
    ///
    /// # Errors
    ///
    /// [`RedirectError::Io`] naming the path if the file cannot be created,
    /// read or written. The remembered run is left unchanged, so a later
    /// reconcile continues from the last successful one.
    pub fn reconcile(&self, chunk: &[u8]) -> Result<(), RedirectError> {
        let mut state = self.lock();
        touch_locked(&state.config)?;
        if chunk.is_empty() {
            return Ok(());
        }

        let path = state.config.filepath();
        let mut contents = fs::read(&path).map_err(RedirectError::io("read file", &path))?;

        let mut collapsed = false;
        let run = if is_escape_run(chunk) {
            let prev = state
                .last_run
                .clone()
                .filter(|prev| prev.end <= contents.len());
            let start = match prev {
                Some(prev) => {
                    collapsed = true;
                    let start = prev.start;
                    contents.splice(prev, chunk.iter().copied());
                    start
                }
                None => {
                    let start = contents.len();
                    contents.extend_from_slice(chunk);
                    start
                }
            };
            Some(start..start + chunk.len())
        } else {
            contents.extend_from_slice(chunk);
            None
        };

        tracing::trace!(
            path = %path.display(),
            chunk = chunk.len(),
            collapsed,
            total = contents.len(),
            "mirror reconcile"
        );

        fs::write(&path, &contents).map_err(RedirectError::io("write file", &path))?;
        state.last_run = run;
        Ok(())
    }
}

fn touch_locked(config: &MirrorConfig) -> Result<(), RedirectError> {
    let dir = config.directory();
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(RedirectError::io("create directory", dir))?;
        tracing::debug!(dir = %dir.display(), "created mirror directory");
    }

    let path = config.filepath();
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(RedirectError::io("open file", &path))?;
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::thread;

    fn mirror_in(dir: &Path) -> FileMirror {
        FileMirror::new(MirrorConfig::for_working_dir(dir))
    }

    fn contents(mirror: &FileMirror) -> String {
        String::from_utf8(fs::read(mirror.filepath()).unwrap()).unwrap()
    }

    fn feed(mirror: &FileMirror, chunks: &[&str]) {
        for chunk in chunks {
            mirror.reconcile(chunk.as_bytes()).unwrap();
        }
    }

    // ── touch ───────────────────────────────────────────────────────────

    #[test]
    fn touch_creates_directory_and_empty_file_once() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = mirror_in(tmp.path());
        assert!(!mirror.directory().exists());

        mirror.touch().unwrap();
        assert!(mirror.directory().is_dir());
        assert_eq!(contents(&mirror), "");

        fs::write(mirror.filepath(), "kept").unwrap();
        mirror.touch().unwrap();
        assert_eq!(contents(&mirror), "kept");
    }

    #[test]
    fn touch_reports_path_on_failure() {
        let tmp = tempfile::tempdir().unwrap();
        // A regular file where the directory should be.
        fs::write(tmp.path().join("output"), "").unwrap();
        let mirror = mirror_in(tmp.path());

        let err = mirror.touch().unwrap_err();
        assert!(matches!(err, RedirectError::Io { .. }));
        assert!(err.to_string().contains("output"));
    }

    // ── merge policy ────────────────────────────────────────────────────

    #[test]
    fn visible_text_on_empty_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = mirror_in(tmp.path());
        feed(&mirror, &["hello"]);
        assert_eq!(contents(&mirror), "hello");
        assert_eq!(mirror.last_run(), None);
    }

    #[test]
    fn consecutive_runs_collapse_in_place() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = mirror_in(tmp.path());
        feed(&mirror, &["\x1b[1m"]);
        assert_eq!(mirror.last_run(), Some(0..4));

        feed(&mirror, &["\x1b[0m"]);
        assert_eq!(contents(&mirror), "\x1b[0m");
        assert_eq!(mirror.last_run(), Some(0..4));
    }

    #[test]
    fn visible_write_never_collapses() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = mirror_in(tmp.path());
        feed(&mirror, &["A", "\x1b[1m", "B"]);
        assert_eq!(contents(&mirror), "A\x1b[1mB");
        assert_eq!(mirror.last_run(), None);
    }

    #[test]
    fn run_after_text_is_replaced_by_next_run() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = mirror_in(tmp.path());
        feed(&mirror, &["A", "\x1b[1A\x1b[1A", "\x1b[0m", "B"]);
        assert_eq!(contents(&mirror), "A\x1b[0mB");
    }

    #[test]
    fn longer_run_replaces_shorter_run() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = mirror_in(tmp.path());
        feed(&mirror, &["A", "\x1b[H", "\x1b[38;2;1;2;3m"]);
        assert_eq!(contents(&mirror), "A\x1b[38;2;1;2;3m");
        assert_eq!(mirror.last_run(), Some(1..14));
    }

    #[test]
    fn runs_separated_by_text_all_survive() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = mirror_in(tmp.path());
        feed(&mirror, &["\x1b[1m", "X", "\x1b[0m"]);
        assert_eq!(contents(&mirror), "\x1b[1mX\x1b[0m");
    }

    #[test]
    fn mixed_chunk_counts_as_visible() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = mirror_in(tmp.path());
        feed(&mirror, &["\x1b[1m", "\x1b[31mred\x1b[0m", "\x1b[2m"]);
        assert_eq!(contents(&mirror), "\x1b[1m\x1b[31mred\x1b[0m\x1b[2m");
    }

    #[test]
    fn empty_chunk_changes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = mirror_in(tmp.path());
        feed(&mirror, &["\x1b[1m", "", "\x1b[0m"]);
        assert_eq!(contents(&mirror), "\x1b[0m");
    }

    // ── file as source of truth ─────────────────────────────────────────

    #[test]
    fn existing_content_is_preserved() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = mirror_in(tmp.path());
        mirror.touch().unwrap();
        fs::write(mirror.filepath(), "previous session\n").unwrap();

        feed(&mirror, &["next"]);
        assert_eq!(contents(&mirror), "previous session\nnext");
    }

    #[test]
    fn external_truncation_forgets_the_run() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = mirror_in(tmp.path());
        feed(&mirror, &["abc", "\x1b[1m"]);

        fs::write(mirror.filepath(), "").unwrap();
        feed(&mirror, &["\x1b[0m"]);
        assert_eq!(contents(&mirror), "\x1b[0m");
        assert_eq!(mirror.last_run(), Some(0..4));
    }

    // ── configuration ───────────────────────────────────────────────────

    #[test]
    fn changing_file_forgets_the_run() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = mirror_in(tmp.path());
        feed(&mirror, &["x", "\x1b[1m"]);

        mirror.set_filename("second.txt");
        assert_eq!(mirror.last_run(), None);
        assert_eq!(mirror.filename(), "second.txt");

        feed(&mirror, &["yz", "\x1b[0m"]);
        assert_eq!(contents(&mirror), "yz\x1b[0m");
        assert_eq!(
            fs::read_to_string(tmp.path().join("output/redirected_output.txt")).unwrap(),
            "x\x1b[1m"
        );
    }

    #[test]
    fn set_directory_moves_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = mirror_in(tmp.path());
        mirror.set_directory("logs/../transcripts");
        feed(&mirror, &["hi"]);

        assert_eq!(mirror.directory(), tmp.path().join("transcripts"));
        assert_eq!(
            fs::read_to_string(tmp.path().join("transcripts/redirected_output.txt")).unwrap(),
            "hi"
        );
        assert_eq!(mirror.config().filepath(), mirror.filepath());
    }

    // ── failures ────────────────────────────────────────────────────────

    #[test]
    fn failed_reconcile_keeps_state() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = mirror_in(tmp.path());
        feed(&mirror, &["A", "\x1b[1m"]);
        let before = mirror.last_run();

        // Replace the file with a directory so reading it fails.
        let path = mirror.filepath();
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        let err = mirror.reconcile(b"\x1b[0m").unwrap_err();
        assert!(err.to_string().contains("redirected_output.txt"));
        assert_eq!(mirror.last_run(), before);
    }

    // ── concurrency ─────────────────────────────────────────────────────

    #[test]
    fn concurrent_reconciles_lose_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = Arc::new(mirror_in(tmp.path()));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let mirror = Arc::clone(&mirror);
                thread::spawn(move || {
                    for _ in 0..25 {
                        mirror.reconcile(format!("{t}").as_bytes()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let text = contents(&mirror);
        assert_eq!(text.len(), 100);
        for t in 0..4 {
            assert_eq!(text.matches(&t.to_string()).count(), 25);
        }
    }
}
