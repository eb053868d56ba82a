//! Static control-sequence mapping table.
//!
//! Each entry maps one exact byte pattern to a terminal event. Lookup is prefix
//! based against the bytes currently buffered:
//! * `Exact`: the buffered bytes begin with a full pattern; consume its length.
//! * `Partial`: the buffered bytes are a strict prefix of at least one pattern, so
//!   more input is needed before deciding.
//! * `NoMatch`: neither.
//!
//! Table invariant (checked by tests): no pattern is a prefix of another, so an
//! exact match is never ambiguous. The table is small enough that a linear scan
//! is the whole algorithm.

use core_events::{KeyModifiers, NamedKey, TerminalEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlMapping {
    pub pattern: &'static [u8],
    pub event: TerminalEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingMatch {
    Exact { len: usize, event: TerminalEvent },
    Partial,
    NoMatch,
}

const fn key(pattern: &'static [u8], key: NamedKey) -> ControlMapping {
    ControlMapping {
        pattern,
        event: TerminalEvent::key(key),
    }
}

const fn key_mod(pattern: &'static [u8], key: NamedKey, mods: KeyModifiers) -> ControlMapping {
    ControlMapping {
        pattern,
        event: TerminalEvent::key(key).with_mods(mods),
    }
}

const SHIFT: KeyModifiers = KeyModifiers::SHIFT;
const CTRL: KeyModifiers = KeyModifiers::CTRL;

pub static CONTROL_MAPPINGS: &[ControlMapping] = &[
    // C0 keys
    key(b"\r", NamedKey::Enter),
    key(b"\t", NamedKey::Tab),
    key(b"\x7f", NamedKey::Backspace),
    key(b"\x08", NamedKey::Backspace),
    // CSI cursor keys
    key(b"\x1b[A", NamedKey::Up),
    key(b"\x1b[B", NamedKey::Down),
    key(b"\x1b[C", NamedKey::Right),
    key(b"\x1b[D", NamedKey::Left),
    key(b"\x1b[H", NamedKey::Home),
    key(b"\x1b[F", NamedKey::End),
    // SS3 cursor keys (application cursor mode)
    key(b"\x1bOA", NamedKey::Up),
    key(b"\x1bOB", NamedKey::Down),
    key(b"\x1bOC", NamedKey::Right),
    key(b"\x1bOD", NamedKey::Left),
    key(b"\x1bOH", NamedKey::Home),
    key(b"\x1bOF", NamedKey::End),
    // VT editing keys
    key(b"\x1b[1~", NamedKey::Home),
    key(b"\x1b[2~", NamedKey::Insert),
    key(b"\x1b[3~", NamedKey::Delete),
    key(b"\x1b[4~", NamedKey::End),
    key(b"\x1b[5~", NamedKey::PageUp),
    key(b"\x1b[6~", NamedKey::PageDown),
    key_mod(b"\x1b[Z", NamedKey::Tab, SHIFT),
    // xterm modified cursor keys
    key_mod(b"\x1b[1;2A", NamedKey::Up, SHIFT),
    key_mod(b"\x1b[1;2B", NamedKey::Down, SHIFT),
    key_mod(b"\x1b[1;2C", NamedKey::Right, SHIFT),
    key_mod(b"\x1b[1;2D", NamedKey::Left, SHIFT),
    key_mod(b"\x1b[1;5A", NamedKey::Up, CTRL),
    key_mod(b"\x1b[1;5B", NamedKey::Down, CTRL),
    key_mod(b"\x1b[1;5C", NamedKey::Right, CTRL),
    key_mod(b"\x1b[1;5D", NamedKey::Left, CTRL),
    // Function keys
    key(b"\x1bOP", NamedKey::F(1)),
    key(b"\x1bOQ", NamedKey::F(2)),
    key(b"\x1bOR", NamedKey::F(3)),
    key(b"\x1bOS", NamedKey::F(4)),
    key(b"\x1b[15~", NamedKey::F(5)),
    key(b"\x1b[17~", NamedKey::F(6)),
    key(b"\x1b[18~", NamedKey::F(7)),
    key(b"\x1b[19~", NamedKey::F(8)),
    key(b"\x1b[20~", NamedKey::F(9)),
    key(b"\x1b[21~", NamedKey::F(10)),
    key(b"\x1b[23~", NamedKey::F(11)),
    key(b"\x1b[24~", NamedKey::F(12)),
];

/// Match `buffered` against `table`.
pub fn lookup(table: &[ControlMapping], buffered: &[u8]) -> MappingMatch {
    if buffered.is_empty() {
        return MappingMatch::NoMatch;
    }
    let mut partial = false;
    for entry in table {
        if buffered.starts_with(entry.pattern) {
            return MappingMatch::Exact {
                len: entry.pattern.len(),
                event: entry.event,
            };
        }
        if entry.pattern.len() > buffered.len() && entry.pattern.starts_with(buffered) {
            partial = true;
        }
    }
    if partial {
        MappingMatch::Partial
    } else {
        MappingMatch::NoMatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_pattern_prefixes_another() {
        for (i, a) in CONTROL_MAPPINGS.iter().enumerate() {
            for (j, b) in CONTROL_MAPPINGS.iter().enumerate() {
                if i != j {
                    assert!(
                        !b.pattern.starts_with(a.pattern),
                        "{:?} is a prefix of {:?}",
                        a.pattern,
                        b.pattern
                    );
                }
            }
        }
    }

    #[test]
    fn exact_match_ignores_trailing_bytes() {
        let m = lookup(CONTROL_MAPPINGS, b"\x1b[Axyz");
        assert_eq!(
            m,
            MappingMatch::Exact {
                len: 3,
                event: TerminalEvent::key(NamedKey::Up)
            }
        );
    }

    #[test]
    fn prefixes_are_partial() {
        assert_eq!(lookup(CONTROL_MAPPINGS, b"\x1b"), MappingMatch::Partial);
        assert_eq!(lookup(CONTROL_MAPPINGS, b"\x1b["), MappingMatch::Partial);
        assert_eq!(lookup(CONTROL_MAPPINGS, b"\x1b[1;"), MappingMatch::Partial);
        assert_eq!(lookup(CONTROL_MAPPINGS, b"\x1b[2"), MappingMatch::Partial);
    }

    #[test]
    fn unrelated_bytes_do_not_match() {
        assert_eq!(lookup(CONTROL_MAPPINGS, b"\x1bx"), MappingMatch::NoMatch);
        assert_eq!(lookup(CONTROL_MAPPINGS, b"\x03"), MappingMatch::NoMatch);
        assert_eq!(lookup(CONTROL_MAPPINGS, b""), MappingMatch::NoMatch);
    }
}
