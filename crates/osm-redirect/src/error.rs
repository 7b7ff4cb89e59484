// SPDX-License-Identifier: MIT

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the output redirector and its file mirror.
#[derive(Debug, Error)]
pub enum RedirectError {
    /// Lifecycle misuse: `begin` while capturing, `end` while not.
    #[error("{0}")]
    Usage(&'static str),

    /// The mirror directory or file could not be created, read or written.
    #[error("could not {op} '{}': {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The wrapped output stream failed to flush.
    #[error("could not flush output: {0}")]
    Flush(#[source] io::Error),
}

impl RedirectError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { op, path, source }
    }
}

impl From<RedirectError> for io::Error {
    /// Keeps the underlying error kind so `Write::flush` callers can still
    /// match on it.
    fn from(err: RedirectError) -> Self {
        let kind = match &err {
            RedirectError::Usage(_) => io::ErrorKind::Other,
            RedirectError::Io { source, .. } | RedirectError::Flush(source) => source.kind(),
        };
        Self::new(kind, err)
    }
}
