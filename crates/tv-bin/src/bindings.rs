//! Key bindings: decoded terminal events to viewer actions.
//!
//! Two tables, selected by whether the filter prompt is open. Unbound events
//! map to `None` and are ignored by the caller.

use core_events::{KeyModifiers, NamedKey, TerminalEvent};

/// Columns moved per horizontal scroll step.
pub const HSCROLL_STEP: isize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Vertical scroll by lines (negative: up).
    ScrollLines(isize),
    /// Vertical scroll by screens (negative: up).
    ScrollPages(isize),
    Top,
    /// Jump to the end of data and resume following.
    Bottom,
    ScrollColumns(isize),
    ToggleFollow,
    CycleWrap,
    ToggleVirtualSpace,
    FilterStart,
    PromptInsert(char),
    PromptBackspace,
    PromptAccept,
    PromptCancel,
}

fn is_ctrl_c(event: TerminalEvent) -> bool {
    matches!(event, TerminalEvent::Char { ch: 'c', mods } if mods.contains(KeyModifiers::CTRL))
}

/// Binding while browsing.
pub fn normal_action(event: TerminalEvent) -> Option<Action> {
    if is_ctrl_c(event) {
        return Some(Action::Quit);
    }
    match event {
        TerminalEvent::Char { ch, mods } if mods.is_empty() => match ch {
            'q' => Some(Action::Quit),
            'j' => Some(Action::ScrollLines(1)),
            'k' => Some(Action::ScrollLines(-1)),
            ' ' => Some(Action::ScrollPages(1)),
            'g' => Some(Action::Top),
            'G' => Some(Action::Bottom),
            'h' => Some(Action::ScrollColumns(-HSCROLL_STEP)),
            'l' => Some(Action::ScrollColumns(HSCROLL_STEP)),
            'f' => Some(Action::ToggleFollow),
            'w' => Some(Action::CycleWrap),
            'v' => Some(Action::ToggleVirtualSpace),
            '/' => Some(Action::FilterStart),
            _ => None,
        },
        TerminalEvent::Key { key, .. } => match key {
            NamedKey::Down => Some(Action::ScrollLines(1)),
            NamedKey::Up => Some(Action::ScrollLines(-1)),
            NamedKey::PageDown => Some(Action::ScrollPages(1)),
            NamedKey::PageUp => Some(Action::ScrollPages(-1)),
            NamedKey::Home => Some(Action::Top),
            NamedKey::End => Some(Action::Bottom),
            NamedKey::Left => Some(Action::ScrollColumns(-HSCROLL_STEP)),
            NamedKey::Right => Some(Action::ScrollColumns(HSCROLL_STEP)),
            _ => None,
        },
        _ => None,
    }
}

/// Binding while the filter prompt is open.
pub fn prompt_action(event: TerminalEvent) -> Option<Action> {
    if is_ctrl_c(event) {
        return Some(Action::Quit);
    }
    match event {
        TerminalEvent::Char { ch, mods } if !mods.intersects(KeyModifiers::CTRL | KeyModifiers::ALT) => {
            Some(Action::PromptInsert(ch))
        }
        TerminalEvent::Key { key, .. } => match key {
            NamedKey::Enter => Some(Action::PromptAccept),
            NamedKey::Esc => Some(Action::PromptCancel),
            NamedKey::Backspace => Some(Action::PromptBackspace),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_c_quits_in_both_tables() {
        let ev = TerminalEvent::char('c').with_mods(KeyModifiers::CTRL);
        assert_eq!(normal_action(ev), Some(Action::Quit));
        assert_eq!(prompt_action(ev), Some(Action::Quit));
    }

    #[test]
    fn letters_are_text_in_prompt() {
        assert_eq!(normal_action(TerminalEvent::char('q')), Some(Action::Quit));
        assert_eq!(
            prompt_action(TerminalEvent::char('q')),
            Some(Action::PromptInsert('q'))
        );
        assert_eq!(
            prompt_action(TerminalEvent::char('E').with_mods(KeyModifiers::SHIFT)),
            Some(Action::PromptInsert('E'))
        );
    }

    #[test]
    fn alt_letters_are_unbound() {
        let ev = TerminalEvent::char('j').with_mods(KeyModifiers::ALT);
        assert_eq!(normal_action(ev), None);
        assert_eq!(prompt_action(ev), None);
    }

    #[test]
    fn navigation_keys() {
        let key = |k| normal_action(TerminalEvent::key(k));
        assert_eq!(key(NamedKey::PageUp), Some(Action::ScrollPages(-1)));
        assert_eq!(key(NamedKey::End), Some(Action::Bottom));
        assert_eq!(key(NamedKey::Right), Some(Action::ScrollColumns(HSCROLL_STEP)));
        assert_eq!(key(NamedKey::Tab), None);
    }

    #[test]
    fn prompt_editing_keys() {
        let key = |k| prompt_action(TerminalEvent::key(k));
        assert_eq!(key(NamedKey::Enter), Some(Action::PromptAccept));
        assert_eq!(key(NamedKey::Esc), Some(Action::PromptCancel));
        assert_eq!(key(NamedKey::Backspace), Some(Action::PromptBackspace));
    }
}
