//! Render path metrics.
//!
//! Counts what the engine actually did per frame. Relaxed atomics so a snapshot
//! can be taken from anywhere without locking.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RenderMetrics {
    /// Frames that repainted every row (first frame, resize, forced).
    pub full_frames: AtomicU64,
    pub partial_frames: AtomicU64,
    pub rows_painted: AtomicU64,
    /// Revalidated rows whose content matched what was already on screen.
    pub rows_skipped: AtomicU64,
    pub scroll_region_shifts: AtomicU64,
    /// Pending shifts that could not use a scroll region and repainted instead.
    pub scroll_shift_degraded_full: AtomicU64,
    pub status_skipped: AtomicU64,
    pub print_commands: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderMetricsSnapshot {
    pub full_frames: u64,
    pub partial_frames: u64,
    pub rows_painted: u64,
    pub rows_skipped: u64,
    pub scroll_region_shifts: u64,
    pub scroll_shift_degraded_full: u64,
    pub status_skipped: u64,
    pub print_commands: u64,
}

impl RenderMetrics {
    pub fn snapshot(&self) -> RenderMetricsSnapshot {
        RenderMetricsSnapshot {
            full_frames: self.full_frames.load(Ordering::Relaxed),
            partial_frames: self.partial_frames.load(Ordering::Relaxed),
            rows_painted: self.rows_painted.load(Ordering::Relaxed),
            rows_skipped: self.rows_skipped.load(Ordering::Relaxed),
            scroll_region_shifts: self.scroll_region_shifts.load(Ordering::Relaxed),
            scroll_shift_degraded_full: self.scroll_shift_degraded_full.load(Ordering::Relaxed),
            status_skipped: self.status_skipped.load(Ordering::Relaxed),
            print_commands: self.print_commands.load(Ordering::Relaxed),
        }
    }
}
