// SPDX-License-Identifier: MIT
//
// osm-redirect — mirror terminal output into a file.
//
// A program that draws with escape sequences can wrap its output stream in
// an `OutputRedirector` and get a file copy of what it printed. Each flushed
// chunk is merged into the file by a `FileMirror`: visible text is appended,
// and a chunk made only of escape sequences replaces the escape-only chunk
// written just before it, so runs of style and cursor codes do not pile up.
//
//   caller ──write──▶ OutputRedirector ──▶ inner sink (stdout)
//                           │
//                         flush
//                           ▼
//                      FileMirror ──touch/read/merge/write──▶ file
//
// Where the file lives is a `MirrorConfig`: `output/redirected_output.txt`
// relative to the working directory by default.

pub mod capture;
pub mod config;
pub mod error;
pub mod mirror;

pub use capture::OutputRedirector;
pub use config::MirrorConfig;
pub use error::RedirectError;
pub use mirror::FileMirror;
