//! Core data model shared by every tailview crate.
//!
//! Two independent streams flow through the runtime:
//! * `Change` batches travel from the tailer through each pipeline stage to the
//!   viewport cache.
//! * `TerminalEvent`s are produced by the input decoder from raw terminal bytes
//!   and consumed by the event loop's key bindings.
//!
//! `LineSource` is the minimal contract the viewport needs from whatever feeds
//! it (in practice the last pipeline stage).

use std::fmt;
use std::sync::atomic::AtomicU64;

// -------------------------------------------------------------------------------------------------
// Telemetry
// -------------------------------------------------------------------------------------------------
// Relaxed atomic counters. Producers bump them from their own task/thread; the status line and
// tests read them. No locking, no ordering guarantees beyond eventual visibility.
// -------------------------------------------------------------------------------------------------
pub static TAIL_BATCHES: AtomicU64 = AtomicU64::new(0); // Append batches emitted by tailers
pub static TAIL_LINES: AtomicU64 = AtomicU64::new(0); // lines carried by those batches
pub static TAIL_RESETS: AtomicU64 = AtomicU64::new(0); // Clear signals emitted (open + truncation)
pub static DECODED_EVENTS: AtomicU64 = AtomicU64::new(0);
pub static DECODE_ERRORS: AtomicU64 = AtomicU64::new(0);

/// Distinguishes ordinary file content from status/error notices injected by producers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineKind {
    #[default]
    Content,
    /// Status or error message (waiting for file, file deleted, ...). Rendered with a
    /// distinct style; filters never drop it.
    Notice,
}

/// One line of text flowing through the pipeline (no trailing newline).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Line {
    pub text: String,
    pub kind: LineKind,
}

impl Line {
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: LineKind::Content,
        }
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: LineKind::Notice,
        }
    }

    #[inline]
    pub fn is_notice(&self) -> bool {
        self.kind == LineKind::Notice
    }
}

/// Unit of data flow between producers and pipeline stages.
///
/// Immutable once built. `Append` batches are ordered; `Clear` tells every consumer to
/// discard what it has materialized so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Append(Vec<Line>),
    Clear,
}

impl Change {
    pub fn append(lines: Vec<Line>) -> Self {
        Change::Append(lines)
    }

    /// Build an `Append` of content lines from plain strings.
    pub fn append_text<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Change::Append(texts.into_iter().map(Line::content).collect())
    }

    /// Single-notice `Append`.
    pub fn notice(text: impl Into<String>) -> Self {
        Change::Append(vec![Line::notice(text)])
    }

    pub fn clear() -> Self {
        Change::Clear
    }

    #[inline]
    pub fn is_clear(&self) -> bool {
        matches!(self, Change::Clear)
    }

    /// Lines carried by an `Append`; empty for `Clear`.
    pub fn lines(&self) -> &[Line] {
        match self {
            Change::Append(lines) => lines,
            Change::Clear => &[],
        }
    }
}

/// Read access to a materialized, versioned sequence of lines.
///
/// `version` changes whenever previously exposed lines may have been replaced; a stable
/// version with a larger `len` means lines were only appended.
pub trait LineSource {
    fn version(&self) -> u64;
    fn len(&self) -> usize;
    fn line(&self, index: usize) -> Option<&Line>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Esc,
    Backspace,
    Tab,
    F(u8),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
}

/// One decoded user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalEvent {
    Char { ch: char, mods: KeyModifiers },
    Key { key: NamedKey, mods: KeyModifiers },
}

impl TerminalEvent {
    pub const fn char(ch: char) -> Self {
        TerminalEvent::Char {
            ch,
            mods: KeyModifiers::empty(),
        }
    }

    pub const fn key(key: NamedKey) -> Self {
        TerminalEvent::Key {
            key,
            mods: KeyModifiers::empty(),
        }
    }

    /// Same event with `extra` modifiers added.
    pub const fn with_mods(self, extra: KeyModifiers) -> Self {
        match self {
            TerminalEvent::Char { ch, mods } => TerminalEvent::Char {
                ch,
                mods: mods.union(extra),
            },
            TerminalEvent::Key { key, mods } => TerminalEvent::Key {
                key,
                mods: mods.union(extra),
            },
        }
    }

    pub fn mods(&self) -> KeyModifiers {
        match self {
            TerminalEvent::Char { mods, .. } | TerminalEvent::Key { mods, .. } => *mods,
        }
    }
}

impl fmt::Display for TerminalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mods = self.mods();
        if mods.contains(KeyModifiers::CTRL) {
            f.write_str("C-")?;
        }
        if mods.contains(KeyModifiers::ALT) {
            f.write_str("A-")?;
        }
        if mods.contains(KeyModifiers::SHIFT) {
            f.write_str("S-")?;
        }
        match self {
            TerminalEvent::Char { ch, .. } => write!(f, "{ch}"),
            TerminalEvent::Key { key, .. } => write!(f, "<{key:?}>"),
        }
    }
}
