use core_events::Line;
use std::any::Any;

/// Per-line mapping applied by a stage: zero or one output line per input line.
///
/// Transforms with tunable parameters report a `revision` that changes whenever a
/// parameter changes; the owning stage compares it on every pipeline update and
/// recomputes its whole output when it moved.
pub trait LineTransform: Send {
    /// Stable identifier for logs and the status line.
    fn name(&self) -> &'static str;
    fn transform(&self, line: &Line) -> Option<Line>;
    fn revision(&self) -> u64 {
        0
    }
    /// Typed access for parameter reads and updates (see `Stage::transform_mut`).
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Forwards every line unchanged. Used as stage 0 to materialize the raw feed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl LineTransform for PassThrough {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn transform(&self, line: &Line) -> Option<Line> {
        Some(line.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Keeps lines containing `needle`, ignoring case.
///
/// An empty needle keeps everything. Notice lines always pass so status messages
/// stay visible while a filter is active.
#[derive(Debug, Clone, Default)]
pub struct SubstringFilter {
    needle: String,
    folded: String,
    revision: u64,
}

impl SubstringFilter {
    pub fn new(needle: impl Into<String>) -> Self {
        let needle = needle.into();
        let folded = needle.to_lowercase();
        Self {
            needle,
            folded,
            revision: 0,
        }
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// Replace the needle. Returns `false` (and keeps the revision) when unchanged.
    pub fn set_needle(&mut self, needle: impl Into<String>) -> bool {
        let needle = needle.into();
        if needle == self.needle {
            return false;
        }
        self.folded = needle.to_lowercase();
        self.needle = needle;
        self.revision += 1;
        true
    }

    pub fn matches(&self, text: &str) -> bool {
        self.folded.is_empty() || text.to_lowercase().contains(&self.folded)
    }
}

impl LineTransform for SubstringFilter {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn transform(&self, line: &Line) -> Option<Line> {
        (line.is_notice() || self.matches(&line.text)).then(|| line.clone())
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_ignores_case() {
        let f = SubstringFilter::new("ErRoR");
        assert!(f.transform(&Line::content("fatal error: disk")).is_some());
        assert!(f.transform(&Line::content("ERROR")).is_some());
        assert!(f.transform(&Line::content("warning")).is_none());
    }

    #[test]
    fn empty_needle_keeps_everything() {
        let f = SubstringFilter::default();
        assert!(f.transform(&Line::content("")).is_some());
        assert!(f.transform(&Line::content("anything")).is_some());
    }

    #[test]
    fn notices_always_pass() {
        let f = SubstringFilter::new("zzz");
        assert!(f.transform(&Line::notice("waiting for app.log")).is_some());
    }

    #[test]
    fn revision_moves_only_on_real_change() {
        let mut f = SubstringFilter::new("a");
        assert!(!f.set_needle("a"));
        assert_eq!(f.revision(), 0);
        assert!(f.set_needle("b"));
        assert_eq!(f.revision(), 1);
        assert_eq!(f.needle(), "b");
    }
}
