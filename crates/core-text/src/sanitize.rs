//! Line sanitization applied before a source line is cached for display.
//!
//! Rules, in order:
//! 1. Lines without control characters are returned borrowed (fast path).
//! 2. Escape sequences (CSI, OSC, DCS/PM/APC/SOS strings, two-byte escapes and a
//!    dangling ESC) are stripped.
//! 3. Tabs expand with spaces to the next tab stop (display columns, not bytes).
//! 4. Every other control character (C0, DEL, C1) is dropped.

use crate::width::egc_width;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

pub const DEFAULT_TAB_WIDTH: usize = 4;

static ESCAPE_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\x1b(?:",
        r"\[[0-?]*[ -/]*[@-~]",            // CSI
        r"|\][^\x07\x1b]*(?:\x07|\x1b\\)?", // OSC, BEL or ST terminated
        r"|[P^_X][^\x1b]*(?:\x1b\\)?",      // DCS / PM / APC / SOS
        r"|[ -/]*[0-~]",                    // two-byte / nF escapes
        r")?",
    ))
    .expect("escape sequence pattern compiles")
});

/// Sanitize one raw line for display using `tab_width` columns per tab stop.
pub fn sanitize_line(raw: &str, tab_width: usize) -> Cow<'_, str> {
    if !raw.chars().any(char::is_control) {
        return Cow::Borrowed(raw);
    }
    let stripped = if raw.contains('\x1b') {
        ESCAPE_SEQUENCE.replace_all(raw, "")
    } else {
        Cow::Borrowed(raw)
    };
    if !stripped.chars().any(char::is_control) {
        return stripped;
    }
    Cow::Owned(expand_controls(&stripped, tab_width))
}

fn expand_controls(text: &str, tab_width: usize) -> String {
    let tab = tab_width.max(1);
    let mut out = String::with_capacity(text.len() + tab);
    let mut col = 0usize;
    for g in text.graphemes(true) {
        if g == "\t" {
            let pad = tab - col % tab;
            out.extend(std::iter::repeat_n(' ', pad));
            col += pad;
        } else if g.chars().any(char::is_control) {
            // "\r\n" and similar clusters: keep whatever printable part remains.
            let kept: String = g.chars().filter(|c| !c.is_control()).collect();
            if !kept.is_empty() {
                col += egc_width(&kept);
                out.push_str(&kept);
            }
        } else {
            col += egc_width(g);
            out.push_str(g);
        }
    }
    out
}
