// SPDX-License-Identifier: MIT
//
// Escape-run classification.
//
// An "escape run" is a chunk of output made of terminal control sequences and
// nothing else: no visible character anywhere in it. The output mirror needs
// this distinction to decide whether a chunk may overwrite the previous
// control-only chunk in place or must be appended.
//
// The grammar is the generic ECMA-48 one, not a list of known codes:
//
//   CSI   ESC [  params(0x30–0x3F)*  intermediates(0x20–0x2F)*  final(0x40–0x7E)
//   OSC   ESC ]  payload  (BEL | ESC \)
//   other ESC    intermediates(0x20–0x2F)*  final(0x30–0x7E, except [ and ])
//
// Anything else, including a lone or truncated ESC, is visible text.

use std::sync::OnceLock;

use regex::bytes::Regex;

/// One control sequence, unanchored.
const SEQUENCE: &str = r"(?:\x1b\[[\x30-\x3f]*[\x20-\x2f]*[\x40-\x7e]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[\x20-\x2f]*[\x30-\x5a\x5c\x5e-\x7e])";

fn run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"\A{SEQUENCE}+\z")).unwrap_or_else(|e| {
            unreachable!("escape-run pattern is a constant: {e}")
        })
    })
}

fn sequence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(SEQUENCE)
            .unwrap_or_else(|e| unreachable!("escape pattern is a constant: {e}"))
    })
}

/// Whether `text` consists entirely of control sequences.
///
/// Empty input is not an escape run: there is nothing to collapse.
///
/// # Examples
///
/// ```
/// use osm_term::escape::is_escape_run;
///
/// assert!(is_escape_run("\x1b[1m"));
/// assert!(is_escape_run("\x1b[1A\x1b[1A\x1b[0m"));
/// assert!(!is_escape_run("\x1b[1mhello"));
/// assert!(!is_escape_run(""));
/// ```
#[must_use]
pub fn is_escape_run(text: impl AsRef<[u8]>) -> bool {
    let bytes = text.as_ref();
    !bytes.is_empty() && run_regex().is_match(bytes)
}

/// Remove every control sequence, keeping only the visible bytes.
///
/// Truncated sequences are left in place, matching [`is_escape_run`]'s view
/// of them as visible text.
#[must_use]
pub fn strip_escapes(text: impl AsRef<[u8]>) -> Vec<u8> {
    sequence_regex()
        .replace_all(text.as_ref(), &b""[..])
        .into_owned()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
