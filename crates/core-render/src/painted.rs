//! What is currently on screen, per text row.
//!
//! Stores a (hash, len) pair for the last content painted on each row so a
//! revalidated row that renders identically can be skipped. `None` means the row's
//! screen content is unknown (cold start, just scrolled in, after a resize).
//!
//! Hashing strategy: ahash64 over everything that affects the row's appearance
//! (visible text, truncation marker, line kind, virtual filler), plus the text
//! length to short-circuit obvious mismatches.

use crate::cache::RowSlot;
use ahash::AHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHash {
    pub hash: u64,
    pub len: usize,
}

impl RowHash {
    pub fn of(slot: &RowSlot) -> Self {
        let mut hasher = AHasher::default();
        match slot {
            RowSlot::Text { display, kind, .. } => {
                let visible = slot.visible_text();
                0u8.hash(&mut hasher);
                visible.hash(&mut hasher);
                display.more_after().hash(&mut hasher);
                kind.hash(&mut hasher);
                Self {
                    hash: hasher.finish(),
                    len: visible.len(),
                }
            }
            RowSlot::Virtual => {
                1u8.hash(&mut hasher);
                Self {
                    hash: hasher.finish(),
                    len: 0,
                }
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct PaintedRows {
    rows: Vec<Option<RowHash>>,
}

impl PaintedRows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Forget everything and size for `rows` rows.
    pub fn reset(&mut self, rows: usize) {
        self.rows.clear();
        self.rows.resize(rows, None);
    }

    pub fn get(&self, row: usize) -> Option<RowHash> {
        self.rows.get(row).copied().flatten()
    }

    pub fn set(&mut self, row: usize, hash: RowHash) {
        if let Some(slot) = self.rows.get_mut(row) {
            *slot = Some(hash);
        }
    }

    /// Mirror a terminal scroll of `delta` rows (positive: content moved up).
    /// Rows scrolled in become unknown.
    pub fn shift_for_scroll(&mut self, delta: isize) {
        let visible = self.rows.len();
        let entering = delta.unsigned_abs();
        if entering >= visible {
            self.reset(visible);
            return;
        }
        if delta > 0 {
            self.rows.rotate_left(entering);
            self.rows[visible - entering..].fill(None);
        } else if delta < 0 {
            self.rows.rotate_right(entering);
            self.rows[..entering].fill(None);
        }
    }
}
