// SPDX-License-Identifier: MIT
//
// Platform console capability.
//
// Some consoles need a switch flipped before they interpret ANSI sequences
// or print UTF-8 (box-drawing frames, for one). Those switches are modelled
// as a capability trait so the canvas and the mirror never branch on the
// operating system. Unix terminals need nothing: `NoopConsole` is the
// implementation there, and the default everywhere.
//
// `ConsoleGuard` is the RAII wrapper: it enables both features on creation
// and restores them on drop, so an early return cannot leave the console
// half-configured.
//
// Safety: `is_tty` calls `isatty`, the standard POSIX query. The unsafe
// block is a single FFI call on a constant descriptor.
#![allow(unsafe_code)]

use std::io;

// ─── Capability ─────────────────────────────────────────────────────────────

/// Console mode switches a platform may require.
pub trait PlatformConsole {
    /// Make the console interpret ANSI escape sequences.
    ///
    /// # Errors
    ///
    /// Returns an error if the console mode cannot be changed.
    fn enable_ansi(&mut self) -> io::Result<()>;

    /// Restore the console's original escape handling.
    ///
    /// # Errors
    ///
    /// Returns an error if the console mode cannot be changed.
    fn disable_ansi(&mut self) -> io::Result<()>;

    /// Switch console output to UTF-8.
    ///
    /// # Errors
    ///
    /// Returns an error if the output encoding cannot be changed.
    fn enable_unicode(&mut self) -> io::Result<()>;

    /// Restore the console's original output encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the output encoding cannot be changed.
    fn disable_unicode(&mut self) -> io::Result<()>;
}

/// A console that already speaks ANSI and UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoopConsole;

impl PlatformConsole for NoopConsole {
    fn enable_ansi(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn disable_ansi(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn enable_unicode(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn disable_unicode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Guard ──────────────────────────────────────────────────────────────────

/// Enables ANSI and UTF-8 output for its lifetime.
///
/// # Example
///
/// ```
/// use osm_term::console::{ConsoleGuard, NoopConsole};
///
/// let guard = ConsoleGuard::new(NoopConsole)?;
/// // ... draw ...
/// drop(guard); // console restored
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct ConsoleGuard<C: PlatformConsole> {
    console: C,
}

impl<C: PlatformConsole> ConsoleGuard<C> {
    /// Enable ANSI processing, then UTF-8 output.
    ///
    /// # Errors
    ///
    /// Returns the first failure. If UTF-8 cannot be enabled, ANSI handling
    /// is restored before returning.
    pub fn new(mut console: C) -> io::Result<Self> {
        console.enable_ansi()?;
        if let Err(e) = console.enable_unicode() {
            // The enable error is the one returned; a failed rollback is logged.
            if let Err(rollback) = console.disable_ansi() {
                tracing::warn!(error = %rollback, "failed to restore console escape handling");
            }
            return Err(e);
        }
        Ok(Self { console })
    }
}

impl<C: PlatformConsole> Drop for ConsoleGuard<C> {
    fn drop(&mut self) {
        if let Err(e) = self.console.disable_unicode() {
            tracing::warn!(error = %e, "failed to restore console encoding");
        }
        if let Err(e) = self.console.disable_ansi() {
            tracing::warn!(error = %e, "failed to restore console escape handling");
        }
    }
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Check whether stdout is connected to a terminal.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDOUT_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Tests ───────────────────────────────────────────────────────────────────
