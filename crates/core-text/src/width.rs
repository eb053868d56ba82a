//! Display width engine.
//!
//! Every width decision in the workspace flows through `egc_width`. Clusters are
//! measured with `unicode-width` and clamped to `1..=2` columns: zero-width
//! leftovers (a lone combining mark) still occupy a cell so a row never contains
//! content that takes no room, and nothing is ever wider than a CJK/emoji cell.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Terminal column width of one extended grapheme cluster.
#[inline]
pub fn egc_width(egc: &str) -> usize {
    UnicodeWidthStr::width(egc).clamp(1, 2)
}

/// Total display width of `text`.
pub fn display_width(text: &str) -> usize {
    text.graphemes(true).map(egc_width).sum()
}

/// Number of leading bytes of `text` whose clusters fit in `columns`.
pub fn take_columns(text: &str, columns: usize) -> usize {
    let mut used = 0usize;
    let mut bytes = 0usize;
    for g in text.graphemes(true) {
        let w = egc_width(g);
        if used + w > columns {
            break;
        }
        used += w;
        bytes += g.len();
    }
    bytes
}

/// Byte offset of the first cluster starting at or after display `column`.
///
/// A wide cluster straddling `column` is skipped entirely. Returns `text.len()` when
/// the line is narrower than `column`.
pub fn offset_at_column(text: &str, column: usize) -> usize {
    if column == 0 {
        return 0;
    }
    let mut col = 0usize;
    for (idx, g) in text.grapheme_indices(true) {
        if col >= column {
            return idx;
        }
        col += egc_width(g);
    }
    text.len()
}
