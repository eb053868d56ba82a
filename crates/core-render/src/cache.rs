//! Scrolling viewport cache.
//!
//! Holds one `RowSlot` per visible text row plus a parallel validity flag. Rows are
//! computed lazily by `refresh`, which fills only invalid rows and reports their
//! indices so the renderer can repaint exactly those.
//!
//! Invalidation rules:
//! * Source version changed (lines replaced): every row.
//! * Source grew under the same version: only rows that were past the end of data.
//! * Vertical scroll without wrapping by less than a screen: surviving rows are
//!   rotated into their new positions and only the exposed ones are invalidated.
//!   The net row shift is accumulated for the renderer (`take_pending_shift`).
//! * Vertical scroll in a wrap mode, any horizontal scroll, wrap change, resize:
//!   every row.
//!
//! Scroll position is a source line index (`scroll_y`) plus a display column
//! (`scroll_x`, only meaningful without wrapping).

use core_events::{LineKind, LineSource};
use core_text::{DEFAULT_TAB_WIDTH, DisplayLine, WrapMode, offset_at_column, sanitize_line};
use tracing::{debug, trace};

/// Content of one viewport row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RowSlot {
    Text {
        display: DisplayLine,
        /// Sanitized text of the whole source line; `display` slices into it.
        text: String,
        kind: LineKind,
    },
    /// Past the end of data.
    #[default]
    Virtual,
}

impl RowSlot {
    /// Visible part of the row (empty for virtual rows).
    pub fn visible_text(&self) -> &str {
        match self {
            RowSlot::Text { display, text, .. } => display.slice(text),
            RowSlot::Virtual => "",
        }
    }

    pub fn display(&self) -> Option<&DisplayLine> {
        match self {
            RowSlot::Text { display, .. } => Some(display),
            RowSlot::Virtual => None,
        }
    }

    #[inline]
    pub fn is_virtual(&self) -> bool {
        matches!(self, RowSlot::Virtual)
    }
}

/// Result of a scroll request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    Unchanged,
    /// Rows were rotated by this many rows (positive: content moved up).
    Shifted(isize),
    Invalidated,
}

/// Result of `ViewportCache::sync`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Unchanged,
    /// Source lines were replaced; every row invalidated.
    Reset,
    /// Source grew; virtual rows invalidated.
    Grown,
}

#[derive(Debug)]
pub struct ViewportCache {
    rows: Vec<RowSlot>,
    valid: Vec<bool>,
    width: usize,
    height: usize,
    scroll_x: usize,
    scroll_y: usize,
    wrap: WrapMode,
    follow: bool,
    virtual_space: bool,
    tab_width: usize,
    marker_width: usize,
    source_version: Option<u64>,
    source_len: usize,
    pending_shift: isize,
}

impl ViewportCache {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            rows: vec![RowSlot::Virtual; height],
            valid: vec![false; height],
            width,
            height,
            scroll_x: 0,
            scroll_y: 0,
            wrap: WrapMode::None,
            follow: false,
            virtual_space: false,
            tab_width: DEFAULT_TAB_WIDTH,
            marker_width: 1,
            source_version: None,
            source_len: 0,
            pending_shift: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }
    pub fn height(&self) -> usize {
        self.height
    }
    pub fn scroll_x(&self) -> usize {
        self.scroll_x
    }
    pub fn scroll_y(&self) -> usize {
        self.scroll_y
    }
    pub fn wrap(&self) -> WrapMode {
        self.wrap
    }
    pub fn follow(&self) -> bool {
        self.follow
    }
    pub fn virtual_space(&self) -> bool {
        self.virtual_space
    }
    /// Line count of the source as of the last `sync`.
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    pub fn rows(&self) -> &[RowSlot] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&RowSlot> {
        self.rows.get(index)
    }

    pub fn is_valid(&self, index: usize) -> bool {
        self.valid.get(index).copied().unwrap_or(false)
    }

    pub fn set_tab_width(&mut self, tab_width: usize) {
        if tab_width != self.tab_width {
            self.tab_width = tab_width;
            self.invalidate_all();
        }
    }

    pub fn set_marker_width(&mut self, marker_width: usize) {
        if marker_width != self.marker_width {
            self.marker_width = marker_width;
            self.invalidate_all();
        }
    }

    /// Follow mode keeps the view pinned to the end of data as it grows. Turning it
    /// on does not move the view by itself; see `scroll_to_bottom`.
    pub fn set_follow(&mut self, follow: bool) {
        self.follow = follow;
    }

    /// With virtual space the view may scroll until only the last line is left on
    /// screen; without it the last line stops at the bottom row.
    pub fn set_virtual_space(&mut self, enabled: bool) {
        self.virtual_space = enabled;
    }

    pub fn set_wrap(&mut self, wrap: WrapMode) -> bool {
        if wrap == self.wrap {
            return false;
        }
        debug!(target: "render.viewport", wrap = wrap.label(), "set_wrap");
        self.wrap = wrap;
        if wrap.wraps() {
            self.scroll_x = 0;
        }
        self.invalidate_all();
        true
    }

    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        if width == self.width && height == self.height {
            return false;
        }
        debug!(target: "render.viewport", width, height, "resize");
        self.width = width;
        self.height = height;
        self.rows = vec![RowSlot::Virtual; height];
        self.valid = vec![false; height];
        self.pending_shift = 0;
        true
    }

    /// Mark every row stale. Drops any pending shift: nothing on screen has moved
    /// that a full repaint will not overwrite.
    pub fn invalidate_all(&mut self) {
        self.valid.fill(false);
        self.pending_shift = 0;
    }

    /// Net row shift applied to the cache since the last call.
    pub fn take_pending_shift(&mut self) -> isize {
        std::mem::take(&mut self.pending_shift)
    }

    /// Observe the source's version and length.
    pub fn sync<S: LineSource + ?Sized>(&mut self, source: &S) -> SyncOutcome {
        let version = source.version();
        let len = source.len();
        if self.source_version != Some(version) || len < self.source_len {
            trace!(target: "render.viewport", version, len, "source_reset");
            self.source_version = Some(version);
            self.source_len = len;
            self.scroll_y = if self.follow {
                self.max_scroll_y(source)
            } else {
                0
            };
            self.invalidate_all();
            return SyncOutcome::Reset;
        }
        if len <= self.source_len {
            return SyncOutcome::Unchanged;
        }
        self.source_len = len;
        for (slot, valid) in self.rows.iter().zip(self.valid.iter_mut()) {
            if slot.is_virtual() {
                *valid = false;
            }
        }
        if self.follow {
            self.scroll_to_bottom(source);
        }
        SyncOutcome::Grown
    }

    /// Largest allowed `scroll_y` for the current source and settings.
    pub fn max_scroll_y<S: LineSource + ?Sized>(&self, source: &S) -> usize {
        let len = source.len();
        if self.virtual_space {
            return len.saturating_sub(1);
        }
        if !self.wrap.wraps() {
            return len.saturating_sub(self.height);
        }
        // Wrapped: the first line from which the rest of the data fills the screen,
        // counted in screen rows rather than source lines.
        let mut used = 0;
        let mut first = len;
        while first > 0 {
            let needed = self.rows_for_line(source, first - 1);
            if used + needed > self.height {
                break;
            }
            used += needed;
            first -= 1;
        }
        first.min(len.saturating_sub(1))
    }

    pub fn scroll_to<S: LineSource + ?Sized>(
        &mut self,
        source: &S,
        target: usize,
    ) -> ScrollOutcome {
        let target = target.min(self.max_scroll_y(source));
        if target == self.scroll_y {
            return ScrollOutcome::Unchanged;
        }
        let delta = target as isize - self.scroll_y as isize;
        self.scroll_y = target;
        let distance = delta.unsigned_abs();
        // scroll_y counts source lines; with wrapping one line may span several rows.
        if self.wrap.wraps() || distance >= self.height {
            self.invalidate_all();
            return ScrollOutcome::Invalidated;
        }
        if delta > 0 {
            self.rows.rotate_left(distance);
            self.valid.rotate_left(distance);
            let exposed = self.height - distance;
            self.valid[exposed..].fill(false);
        } else {
            self.rows.rotate_right(distance);
            self.valid.rotate_right(distance);
            self.valid[..distance].fill(false);
        }
        self.pending_shift += delta;
        ScrollOutcome::Shifted(delta)
    }

    pub fn scroll_by<S: LineSource + ?Sized>(
        &mut self,
        source: &S,
        delta: isize,
    ) -> ScrollOutcome {
        let target = self.scroll_y.saturating_add_signed(delta);
        self.scroll_to(source, target)
    }

    pub fn scroll_to_bottom<S: LineSource + ?Sized>(&mut self, source: &S) -> ScrollOutcome {
        let bottom = self.max_scroll_y(source);
        self.scroll_to(source, bottom)
    }

    /// Re-apply the clamp after a settings change (virtual space, resize).
    pub fn clamp<S: LineSource + ?Sized>(&mut self, source: &S) -> ScrollOutcome {
        self.scroll_to(source, self.scroll_y)
    }

    /// Horizontal scroll; ignored while wrapping.
    pub fn scroll_x_to(&mut self, column: usize) -> ScrollOutcome {
        if self.wrap.wraps() || column == self.scroll_x {
            return ScrollOutcome::Unchanged;
        }
        self.scroll_x = column;
        self.invalidate_all();
        ScrollOutcome::Invalidated
    }

    pub fn scroll_x_by(&mut self, delta: isize) -> ScrollOutcome {
        self.scroll_x_to(self.scroll_x.saturating_add_signed(delta))
    }

    /// Recompute invalid rows and return their indices in ascending order.
    pub fn refresh<S: LineSource + ?Sized>(&mut self, source: &S) -> Vec<usize> {
        let updated = if self.wrap.wraps() {
            // Nice wrapping resolves rows exactly like Exact.
            self.refresh_wrapped(source)
        } else {
            self.refresh_unwrapped(source)
        };
        if !updated.is_empty() {
            trace!(target: "render.viewport", rows = updated.len(), "refresh");
        }
        updated
    }

    fn refresh_unwrapped<S: LineSource + ?Sized>(&mut self, source: &S) -> Vec<usize> {
        let mut updated = Vec::new();
        for row in 0..self.height {
            if self.valid[row] {
                continue;
            }
            let index = self.scroll_y + row;
            self.rows[row] = match source.line(index) {
                Some(line) => {
                    let text = sanitize_line(&line.text, self.tab_width).into_owned();
                    let begin = offset_at_column(&text, self.scroll_x);
                    let display =
                        DisplayLine::fit(index, &text, begin, self.width, self.marker_width);
                    RowSlot::Text {
                        display,
                        text,
                        kind: line.kind,
                    }
                }
                None => RowSlot::Virtual,
            };
            self.valid[row] = true;
            updated.push(row);
        }
        updated
    }

    /// Rows chain into each other, so everything from the first invalid row down is
    /// recomputed in sequence.
    fn refresh_wrapped<S: LineSource + ?Sized>(&mut self, source: &S) -> Vec<usize> {
        let Some(first) = self.valid.iter().position(|v| !v) else {
            return Vec::new();
        };
        let mut next = match first.checked_sub(1).map(|prev| &self.rows[prev]) {
            None => self.start_of(source, self.scroll_y),
            Some(RowSlot::Virtual) => None,
            Some(RowSlot::Text { display, text, kind }) => {
                match display.continuation(text, self.width, self.marker_width) {
                    Some(cont) => Some(RowSlot::Text {
                        display: cont,
                        text: text.clone(),
                        kind: *kind,
                    }),
                    None => self.start_of(source, display.line() + 1),
                }
            }
        };

        for row in first..self.height {
            let slot = next.take().unwrap_or(RowSlot::Virtual);
            next = match &slot {
                RowSlot::Text { display, text, kind } => {
                    match display.continuation(text, self.width, self.marker_width) {
                        Some(cont) => Some(RowSlot::Text {
                            display: cont,
                            text: text.clone(),
                            kind: *kind,
                        }),
                        None => self.start_of(source, display.line() + 1),
                    }
                }
                RowSlot::Virtual => None,
            };
            self.rows[row] = slot;
            self.valid[row] = true;
        }
        (first..self.height).collect()
    }

    /// First row of source line `index`, if it exists.
    fn start_of<S: LineSource + ?Sized>(&self, source: &S, index: usize) -> Option<RowSlot> {
        let line = source.line(index)?;
        let text = sanitize_line(&line.text, self.tab_width).into_owned();
        let display = DisplayLine::fit(index, &text, 0, self.width, self.marker_width);
        Some(RowSlot::Text {
            display,
            text,
            kind: line.kind,
        })
    }

    /// Rows line `index` occupies when wrapped, capped just past the viewport height.
    fn rows_for_line<S: LineSource + ?Sized>(&self, source: &S, index: usize) -> usize {
        let Some(line) = source.line(index) else {
            return 0;
        };
        let text = sanitize_line(&line.text, self.tab_width);
        let mut display = DisplayLine::fit(index, &text, 0, self.width, self.marker_width);
        let mut rows = 1;
        while rows <= self.height {
            match display.continuation(&text, self.width, self.marker_width) {
                Some(next) => {
                    display = next;
                    rows += 1;
                }
                None => break,
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::Line;

    /// Minimal in-memory source.
    struct Lines {
        version: u64,
        lines: Vec<Line>,
    }

    impl Lines {
        fn new(texts: &[&str]) -> Self {
            Self {
                version: 1,
                lines: texts.iter().map(|t| Line::content(*t)).collect(),
            }
        }

        fn numbered(count: usize) -> Self {
            Self {
                version: 1,
                lines: (0..count).map(|i| Line::content(format!("line {i}"))).collect(),
            }
        }
    }

    impl LineSource for Lines {
        fn version(&self) -> u64 {
            self.version
        }
        fn len(&self) -> usize {
            self.lines.len()
        }
        fn line(&self, index: usize) -> Option<&Line> {
            self.lines.get(index)
        }
    }

    fn texts(cache: &ViewportCache) -> Vec<&str> {
        cache.rows().iter().map(RowSlot::visible_text).collect()
    }

    #[test]
    fn refresh_is_idempotent() {
        let src = Lines::numbered(10);
        let mut cache = ViewportCache::new(20, 4);
        cache.sync(&src);
        assert_eq!(cache.refresh(&src), vec![0, 1, 2, 3]);
        assert!(cache.refresh(&src).is_empty());
        assert_eq!(cache.sync(&src), SyncOutcome::Unchanged);
        assert!(cache.refresh(&src).is_empty());
    }

    #[test]
    fn short_source_leaves_virtual_rows_then_fills_them() {
        let mut src = Lines::new(&["a", "b", "c"]);
        let mut cache = ViewportCache::new(10, 5);
        cache.sync(&src);
        assert_eq!(cache.refresh(&src), vec![0, 1, 2, 3, 4]);
        assert_eq!(texts(&cache), vec!["a", "b", "c", "", ""]);
        assert!(cache.row(3).unwrap().is_virtual());
        assert!(cache.row(4).unwrap().is_virtual());

        src.lines.push(Line::content("d"));
        assert_eq!(cache.sync(&src), SyncOutcome::Grown);
        assert!(cache.is_valid(0) && cache.is_valid(2));
        assert_eq!(cache.refresh(&src), vec![3, 4]);
        assert_eq!(texts(&cache), vec!["a", "b", "c", "d", ""]);
    }

    #[test]
    fn version_change_invalidates_everything_and_returns_to_top() {
        let mut src = Lines::numbered(20);
        let mut cache = ViewportCache::new(10, 3);
        cache.sync(&src);
        cache.scroll_to(&src, 5);
        cache.refresh(&src);

        src.version += 1;
        src.lines.truncate(4);
        assert_eq!(cache.sync(&src), SyncOutcome::Reset);
        assert_eq!(cache.scroll_y(), 0);
        assert_eq!(cache.refresh(&src), vec![0, 1, 2]);
        assert_eq!(texts(&cache), vec!["line 0", "line 1", "line 2"]);
    }

    #[test]
    fn scroll_clamps_to_data() {
        let src = Lines::numbered(10);
        let mut cache = ViewportCache::new(10, 4);
        cache.sync(&src);
        cache.scroll_to(&src, 100);
        assert_eq!(cache.scroll_y(), 6);
        cache.scroll_by(&src, -100);
        assert_eq!(cache.scroll_y(), 0);
        assert_eq!(cache.scroll_by(&src, -1), ScrollOutcome::Unchanged);
    }

    #[test]
    fn short_source_cannot_scroll() {
        let src = Lines::numbered(3);
        let mut cache = ViewportCache::new(10, 5);
        cache.sync(&src);
        assert_eq!(cache.scroll_to(&src, 2), ScrollOutcome::Unchanged);
        assert_eq!(cache.scroll_y(), 0);
    }

    #[test]
    fn virtual_space_allows_scrolling_to_last_line() {
        let src = Lines::numbered(10);
        let mut cache = ViewportCache::new(10, 4);
        cache.set_virtual_space(true);
        cache.sync(&src);
        cache.scroll_to(&src, 100);
        assert_eq!(cache.scroll_y(), 9);
        cache.refresh(&src);
        assert_eq!(texts(&cache), vec!["line 9", "", "", ""]);

        cache.set_virtual_space(false);
        cache.clamp(&src);
        assert_eq!(cache.scroll_y(), 6);
    }

    #[test]
    fn small_scroll_rotates_and_exposes_rows() {
        let src = Lines::numbered(20);
        let mut cache = ViewportCache::new(10, 5);
        cache.sync(&src);
        cache.refresh(&src);

        assert_eq!(cache.scroll_by(&src, 2), ScrollOutcome::Shifted(2));
        assert!(cache.is_valid(0) && cache.is_valid(2));
        assert!(!cache.is_valid(3) && !cache.is_valid(4));
        assert_eq!(cache.refresh(&src), vec![3, 4]);
        assert_eq!(texts(&cache)[0], "line 2");
        assert_eq!(texts(&cache)[4], "line 6");

        assert_eq!(cache.scroll_by(&src, -1), ScrollOutcome::Shifted(-1));
        assert_eq!(cache.refresh(&src), vec![0]);
        assert_eq!(texts(&cache)[0], "line 1");
        assert_eq!(cache.take_pending_shift(), 1);
        assert_eq!(cache.take_pending_shift(), 0);
    }

    #[test]
    fn screenful_scroll_invalidates_all() {
        let src = Lines::numbered(30);
        let mut cache = ViewportCache::new(10, 5);
        cache.sync(&src);
        cache.refresh(&src);
        assert_eq!(cache.scroll_by(&src, 5), ScrollOutcome::Invalidated);
        assert_eq!(cache.refresh(&src), vec![0, 1, 2, 3, 4]);
        assert_eq!(cache.take_pending_shift(), 0);
    }

    #[test]
    fn follow_tracks_growth() {
        let mut src = Lines::numbered(3);
        let mut cache = ViewportCache::new(10, 3);
        cache.set_follow(true);
        cache.sync(&src);
        cache.refresh(&src);

        src.lines.push(Line::content("line 3"));
        assert_eq!(cache.sync(&src), SyncOutcome::Grown);
        assert_eq!(cache.scroll_y(), 1);
        cache.refresh(&src);
        assert_eq!(texts(&cache), vec!["line 1", "line 2", "line 3"]);
    }

    #[test]
    fn follow_jumps_to_bottom_after_reset() {
        let mut src = Lines::numbered(10);
        let mut cache = ViewportCache::new(10, 4);
        cache.set_follow(true);
        src.version = 7;
        assert_eq!(cache.sync(&src), SyncOutcome::Reset);
        assert_eq!(cache.scroll_y(), 6);
        assert!((0..4).all(|row| !cache.is_valid(row)));
        assert_eq!(cache.take_pending_shift(), 0);
    }

    #[test]
    fn reset_without_follow_returns_to_top() {
        let mut src = Lines::numbered(10);
        let mut cache = ViewportCache::new(10, 4);
        cache.sync(&src);
        cache.scroll_to(&src, 5);
        src.version = 8;
        assert_eq!(cache.sync(&src), SyncOutcome::Reset);
        assert_eq!(cache.scroll_y(), 0);
        assert_eq!(cache.take_pending_shift(), 0);
    }

    #[test]
    fn horizontal_scroll_skips_columns() {
        let src = Lines::new(&["0123456789"]);
        let mut cache = ViewportCache::new(4, 1);
        cache.sync(&src);
        cache.refresh(&src);
        assert_eq!(texts(&cache), vec!["012"]);
        assert_eq!(cache.scroll_x_to(3), ScrollOutcome::Invalidated);
        cache.refresh(&src);
        assert_eq!(texts(&cache), vec!["345"]);
        let display = cache.row(0).unwrap().display().unwrap();
        assert!(display.more_before());
        assert!(display.more_after());
    }

    #[test]
    fn exact_wrap_continues_lines() {
        let src = Lines::new(&["abcdefgh", "xy"]);
        let mut cache = ViewportCache::new(4, 5);
        cache.set_wrap(WrapMode::Exact);
        cache.sync(&src);
        assert_eq!(cache.refresh(&src), vec![0, 1, 2, 3, 4]);
        assert_eq!(texts(&cache), vec!["abc", "def", "gh", "xy", ""]);
        assert!(cache.row(4).unwrap().is_virtual());
    }

    #[test]
    fn nice_wrap_matches_exact() {
        let src = Lines::new(&["the quick brown fox", "jumps"]);
        let mut exact = ViewportCache::new(6, 6);
        exact.set_wrap(WrapMode::Exact);
        exact.sync(&src);
        exact.refresh(&src);
        let mut nice = ViewportCache::new(6, 6);
        nice.set_wrap(WrapMode::Nice);
        nice.sync(&src);
        nice.refresh(&src);
        assert_eq!(exact.rows(), nice.rows());
    }

    #[test]
    fn wrapped_growth_continues_after_last_row() {
        let mut src = Lines::new(&["abcdef"]);
        let mut cache = ViewportCache::new(4, 4);
        cache.set_wrap(WrapMode::Exact);
        cache.sync(&src);
        cache.refresh(&src);
        assert_eq!(texts(&cache), vec!["abc", "def", "", ""]);

        src.lines.push(Line::content("gh"));
        cache.sync(&src);
        assert_eq!(cache.refresh(&src), vec![2, 3]);
        assert_eq!(texts(&cache), vec!["abc", "def", "gh", ""]);
    }

    #[test]
    fn wrapped_scroll_invalidates_all_rows() {
        let src = Lines::numbered(10);
        let mut cache = ViewportCache::new(20, 3);
        cache.set_wrap(WrapMode::Exact);
        cache.sync(&src);
        cache.refresh(&src);
        assert_eq!(cache.scroll_by(&src, 1), ScrollOutcome::Invalidated);
        assert_eq!(cache.refresh(&src), vec![0, 1, 2]);
    }

    #[test]
    fn wrapped_bottom_keeps_last_line_visible() {
        let src = Lines::new(&["a", "b", "cccccccc"]);
        let mut cache = ViewportCache::new(4, 3);
        cache.set_wrap(WrapMode::Exact);
        cache.sync(&src);
        // "cccccccc" needs three rows at width 4
        assert_eq!(cache.max_scroll_y(&src), 2);
    }

    #[test]
    fn sanitized_text_is_cached() {
        let src = Lines::new(&["\x1b[31mred\x1b[0m\tx"]);
        let mut cache = ViewportCache::new(20, 1);
        cache.sync(&src);
        cache.refresh(&src);
        assert_eq!(texts(&cache), vec!["red x"]);
    }

    #[test]
    fn resize_invalidates_and_resizes_rows() {
        let src = Lines::numbered(5);
        let mut cache = ViewportCache::new(10, 2);
        cache.sync(&src);
        cache.refresh(&src);
        assert!(cache.resize(10, 4));
        assert!(!cache.resize(10, 4));
        assert_eq!(cache.refresh(&src), vec![0, 1, 2, 3]);
    }

    #[test]
    fn zero_height_is_inert() {
        let src = Lines::numbered(5);
        let mut cache = ViewportCache::new(10, 0);
        cache.sync(&src);
        assert!(cache.refresh(&src).is_empty());
        assert_eq!(cache.scroll_by(&src, 1), ScrollOutcome::Invalidated);
    }
}
