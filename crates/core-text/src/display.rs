//! Display line slicing.
//!
//! A `DisplayLine` is an immutable view onto one sanitized source line: the line
//! index plus a half-open byte range `[begin, end)` that fits in one terminal row.
//! `more_after` tells the painter to draw the right-hand truncation marker;
//! `more_before` records that the row starts past column zero of its line
//! (a wrap continuation or a horizontal scroll). Rows past the end of data are not represented here; the viewport cache
//! models them separately as virtual rows.

use crate::width::take_columns;
use unicode_segmentation::UnicodeSegmentation;

/// Policy mapping source lines to screen rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    /// One source line per row, horizontally scrollable.
    #[default]
    None,
    /// Lines continue on following rows at exactly the viewport width.
    Exact,
    /// Word-boundary wrapping. Currently resolves rows exactly like `Exact`.
    Nice,
}

impl WrapMode {
    /// Cycle order used by the wrap toggle key.
    pub fn next(self) -> Self {
        match self {
            WrapMode::None => WrapMode::Exact,
            WrapMode::Exact => WrapMode::Nice,
            WrapMode::Nice => WrapMode::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WrapMode::None => "nowrap",
            WrapMode::Exact => "wrap",
            WrapMode::Nice => "nicewrap",
        }
    }

    #[inline]
    pub fn wraps(self) -> bool {
        !matches!(self, WrapMode::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DisplayLine {
    line: usize,
    begin: usize,
    end: usize,
    more_before: bool,
    more_after: bool,
}

impl DisplayLine {
    /// Slice of `text` starting at byte `begin` that fits in `width` columns.
    ///
    /// When the rest of the line does not fit, the slice is shortened so that a
    /// truncation marker of `marker_width` columns fits after it. A non-empty remainder
    /// always yields at least one cluster (given `width > 0`) so wrapping makes progress.
    pub fn fit(line: usize, text: &str, begin: usize, width: usize, marker_width: usize) -> Self {
        let begin = begin.min(text.len());
        debug_assert!(text.is_char_boundary(begin), "begin must be a char boundary");
        let rest = &text[begin..];
        let whole = take_columns(rest, width);
        let taken = if whole == rest.len() {
            whole
        } else {
            let mut n = take_columns(rest, width.saturating_sub(marker_width));
            if n == 0 && width > 0 {
                n = rest.graphemes(true).next().map_or(0, str::len);
            }
            n
        };
        let end = begin + taken;
        Self {
            line,
            begin,
            end,
            more_before: begin > 0,
            more_after: end < text.len(),
        }
    }

    /// Next row's slice of the same line, if anything is left after `end`.
    pub fn continuation(&self, text: &str, width: usize, marker_width: usize) -> Option<Self> {
        self.more_after
            .then(|| Self::fit(self.line, text, self.end, width, marker_width))
    }

    /// The visible part of `text` (which must be the text this view was built from).
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.begin..self.end).unwrap_or("")
    }

    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }
    #[inline]
    pub fn begin(&self) -> usize {
        self.begin
    }
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }
    #[inline]
    pub fn more_before(&self) -> bool {
        self.more_before
    }
    #[inline]
    pub fn more_after(&self) -> bool {
        self.more_after
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }
}
