// SPDX-License-Identifier: MIT
//
// OutputRedirector — a writer that tees its output into a file mirror.
//
// Everything written goes to the inner sink (normally stdout) unchanged.
// Between `begin()` and `end()` the same bytes are also collected, and each
// flush hands the collected chunk to the `FileMirror`, which merges it into
// the file. The chunk boundary is the flush: whatever was written between
// two flushes is classified as one unit (escape run or visible text).
//
// Lifecycle:
//
//   Disabled ──begin()──▶ Enabled ──end()──▶ Disabled
//
//   begin() while Enabled and end() while Disabled are usage errors and
//   leave the state alone. Dropping an Enabled redirector flushes once more
//   so no captured byte is lost.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::MirrorConfig;
use crate::error::RedirectError;
use crate::mirror::FileMirror;

/// Captured bytes waiting for the next flush.
#[derive(Debug, Default)]
struct CaptureState {
    enabled: bool,
    pending: Vec<u8>,
}

/// A writer that mirrors what passes through it into a file.
///
/// # Example
///
/// ```no_run
/// use std::io::Write;
/// use osm_redirect::OutputRedirector;
///
/// let mut out = OutputRedirector::stdout()?;
/// out.begin()?;
/// write!(out, "\x1b[1mbold\x1b[0m")?;
/// out.end()?; // flushed into output/redirected_output.txt
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct OutputRedirector<W: Write> {
    inner: W,
    mirror: FileMirror,
    capture: CaptureState,
}

impl OutputRedirector<io::Stdout> {
    /// Wrap stdout, mirroring to the default file for the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined.
    pub fn stdout() -> io::Result<Self> {
        Ok(Self::new(io::stdout(), MirrorConfig::from_current_dir()?))
    }
}

impl OutputRedirector<io::Sink> {
    /// Capture without forwarding anywhere: the file is the only output.
    #[must_use]
    pub fn file_only(config: MirrorConfig) -> Self {
        Self::new(io::sink(), config)
    }
}

impl<W: Write> OutputRedirector<W> {
    /// Wrap `inner`, mirroring to the file described by `config`.
    ///
    /// Capture starts disabled.
    #[must_use]
    pub fn new(inner: W, config: MirrorConfig) -> Self {
        Self {
            inner,
            mirror: FileMirror::new(config),
            capture: CaptureState::default(),
        }
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Start capturing.
    ///
    /// # Errors
    ///
    /// [`RedirectError::Usage`] if capture is already enabled.
    pub fn begin(&mut self) -> Result<(), RedirectError> {
        if self.capture.enabled {
            return Err(RedirectError::Usage(
                "begin() called while capture is already enabled; missing end()?",
            ));
        }
        self.capture.enabled = true;
        tracing::debug!(path = %self.mirror.filepath().display(), "capture enabled");
        Ok(())
    }

    /// Flush the captured bytes into the mirror and stop capturing.
    ///
    /// # Errors
    ///
    /// [`RedirectError::Usage`] if capture is not enabled.
    /// [`RedirectError::Flush`] or [`RedirectError::Io`] if the inner sink or
    /// the mirror fails; capture then stays enabled with its bytes kept, so
    /// `end()` can be retried.
    pub fn end(&mut self) -> Result<(), RedirectError> {
        if !self.capture.enabled {
            return Err(RedirectError::Usage(
                "end() called while capture is disabled; missing begin()?",
            ));
        }
        self.inner.flush().map_err(RedirectError::Flush)?;
        self.sync()?;
        self.capture.enabled = false;
        tracing::debug!("capture disabled");
        Ok(())
    }

    /// Whether bytes are currently being captured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.capture.enabled
    }

    /// Bytes captured since the last flush.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.capture.pending
    }

    /// Hand the pending chunk to the mirror. Bytes are only dropped once the
    /// mirror accepted them.
    fn sync(&mut self) -> Result<(), RedirectError> {
        if self.capture.pending.is_empty() {
            return Ok(());
        }
        self.mirror.reconcile(&self.capture.pending)?;
        self.capture.pending.clear();
        Ok(())
    }

    // ─── Mirror configuration ────────────────────────────────────────────

    #[must_use]
    pub const fn mirror(&self) -> &FileMirror {
        &self.mirror
    }

    /// Ensure the mirror directory and file exist.
    ///
    /// # Errors
    ///
    /// [`RedirectError::Io`] if they cannot be created.
    pub fn touch(&self) -> Result<(), RedirectError> {
        self.mirror.touch()
    }

    pub fn set_filename(&self, filename: impl Into<String>) {
        self.mirror.set_filename(filename);
    }

    pub fn set_directory(&self, directory: impl AsRef<Path>) {
        self.mirror.set_directory(directory);
    }

    #[must_use]
    pub fn filename(&self) -> String {
        self.mirror.filename()
    }

    #[must_use]
    pub fn filepath(&self) -> PathBuf {
        self.mirror.filepath()
    }

    // ─── Inner writer ────────────────────────────────────────────────────

    #[must_use]
    pub const fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Writing through this reference bypasses capture.
    pub const fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }
}

impl<W: Write> Write for OutputRedirector<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        if self.capture.enabled {
            self.capture.pending.extend_from_slice(&buf[..n]);
        }
        Ok(n)
    }

    /// Flush the inner sink, then merge the captured chunk into the mirror.
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()?;
        if self.capture.enabled {
            self.sync()?;
        }
        Ok(())
    }
}

impl<W: Write> Drop for OutputRedirector<W> {
    fn drop(&mut self) {
        if self.capture.enabled {
            if let Err(e) = self.flush() {
                tracing::warn!(
                    error = %e,
                    path = %self.mirror.filepath().display(),
                    "final mirror flush failed"
                );
            }
            self.capture.enabled = false;
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
