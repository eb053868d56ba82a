//! Frame production.
//!
//! `RenderEngine::render` turns the viewport cache's state into terminal output:
//! 1. Full frame when the engine was invalidated (first frame, resize) or its row
//!    bookkeeping no longer matches the viewport height: clear the screen, forget
//!    what was painted, invalidate every cache row.
//! 2. Otherwise apply the cache's pending row shift with a terminal scroll region
//!    so rows that survived the scroll move without being repainted. Without
//!    scroll-region support, or when the shift covers the whole screen, degrade to
//!    repainting every row.
//! 3. Refresh the cache and paint the revalidated rows, skipping rows whose content
//!    hash equals what is already on screen.
//! 4. Repaint the status row (below the text rows) when its text changed.
//!
//! Everything is queued in one `Writer` and flushed once per frame.

use crate::cache::{RowSlot, ViewportCache};
use crate::metrics::{RenderMetrics, RenderMetricsSnapshot};
use crate::painted::{PaintedRows, RowHash};
use crate::writer::Writer;
use anyhow::Result;
use core_events::{LineKind, LineSource};
use core_terminal::TerminalCapabilities;
use core_text::{display_width, take_columns};
use crossterm::style::{Attribute, Color};
use std::io::Write;
use std::sync::atomic::Ordering::Relaxed;
use tracing::trace;

/// How rows are decorated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowStyle {
    /// Painted on rows past the end of data.
    pub filler: String,
    /// Painted after a row whose line continues past the right edge.
    pub marker: String,
}

impl Default for RowStyle {
    fn default() -> Self {
        Self {
            filler: "~".to_string(),
            marker: ">".to_string(),
        }
    }
}

impl RowStyle {
    pub fn marker_width(&self) -> usize {
        display_width(&self.marker)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Full,
    Partial,
    /// Nothing to emit.
    Idle,
}

#[derive(Debug)]
pub struct RenderEngine {
    capabilities: TerminalCapabilities,
    style: RowStyle,
    painted: PaintedRows,
    prev_status: Option<String>,
    needs_full: bool,
    metrics: RenderMetrics,
    last_repaint_rows: Vec<usize>,
}

impl RenderEngine {
    pub fn new(capabilities: TerminalCapabilities) -> Self {
        Self {
            capabilities,
            style: RowStyle::default(),
            painted: PaintedRows::new(),
            prev_status: None,
            needs_full: true,
            metrics: RenderMetrics::default(),
            last_repaint_rows: Vec::new(),
        }
    }

    pub fn with_style(mut self, style: RowStyle) -> Self {
        self.style = style;
        self
    }

    pub fn style(&self) -> &RowStyle {
        &self.style
    }

    pub fn capabilities(&self) -> TerminalCapabilities {
        self.capabilities
    }

    /// Force the next frame to repaint everything (e.g. after a terminal resize).
    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }

    pub fn metrics_snapshot(&self) -> RenderMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Text rows painted by the last frame.
    pub fn last_repaint_rows(&self) -> &[usize] {
        &self.last_repaint_rows
    }

    pub fn render<S, W>(
        &mut self,
        cache: &mut ViewportCache,
        source: &S,
        status: &str,
        out: &mut W,
    ) -> Result<FrameKind>
    where
        S: LineSource + ?Sized,
        W: Write,
    {
        let height = cache.height();
        let width = cache.width();
        let mut writer = Writer::new();

        let full = self.needs_full || self.painted.len() != height;
        if full {
            self.needs_full = false;
            self.painted.reset(height);
            self.prev_status = None;
            cache.invalidate_all();
            writer.clear_all();
        } else {
            self.apply_shift(cache, &mut writer, height);
        }

        self.last_repaint_rows.clear();
        let mut skipped = 0u64;
        for row in cache.refresh(source) {
            let Some(slot) = cache.row(row) else {
                continue;
            };
            let hash = RowHash::of(slot);
            if self.painted.get(row) == Some(hash) {
                skipped += 1;
                continue;
            }
            self.paint_row(&mut writer, row, slot);
            self.painted.set(row, hash);
            self.last_repaint_rows.push(row);
        }

        if self.prev_status.as_deref() == Some(status) {
            self.metrics.status_skipped.fetch_add(1, Relaxed);
        } else {
            paint_status(&mut writer, height, width, status);
            self.prev_status = Some(status.to_string());
        }

        let kind = if full {
            FrameKind::Full
        } else if writer.is_empty() {
            FrameKind::Idle
        } else {
            FrameKind::Partial
        };
        let prints = if writer.is_empty() {
            0
        } else {
            writer.flush_to(out)?
        };

        match kind {
            FrameKind::Full => self.metrics.full_frames.fetch_add(1, Relaxed),
            FrameKind::Partial => self.metrics.partial_frames.fetch_add(1, Relaxed),
            FrameKind::Idle => 0,
        };
        let painted = self.last_repaint_rows.len() as u64;
        self.metrics.rows_painted.fetch_add(painted, Relaxed);
        self.metrics.rows_skipped.fetch_add(skipped, Relaxed);
        self.metrics.print_commands.fetch_add(prints, Relaxed);
        if kind != FrameKind::Idle {
            trace!(target: "render.engine", ?kind, painted, skipped, "frame");
        }
        Ok(kind)
    }

    fn apply_shift(&mut self, cache: &mut ViewportCache, writer: &mut Writer, height: usize) {
        let shift = cache.take_pending_shift();
        if shift == 0 {
            return;
        }
        if self.capabilities.supports_scroll_region && shift.unsigned_abs() < height {
            writer.scroll_rows(height as u16, shift);
            self.painted.shift_for_scroll(shift);
            self.metrics.scroll_region_shifts.fetch_add(1, Relaxed);
        } else {
            self.painted.reset(height);
            cache.invalidate_all();
            self.metrics.scroll_shift_degraded_full.fetch_add(1, Relaxed);
        }
    }

    fn paint_row(&self, writer: &mut Writer, row: usize, slot: &RowSlot) {
        writer.move_to(0, row as u16);
        writer.clear_line();
        match slot {
            RowSlot::Text { display, kind, .. } => {
                let notice = *kind == LineKind::Notice;
                if notice {
                    writer.foreground(Color::Yellow);
                }
                writer.print(slot.visible_text());
                if notice {
                    writer.reset_style();
                }
                if display.more_after() {
                    writer.foreground(Color::DarkGrey);
                    writer.print(self.style.marker.as_str());
                    writer.reset_style();
                }
            }
            RowSlot::Virtual => {
                writer.attribute(Attribute::Dim);
                writer.print(self.style.filler.as_str());
                writer.reset_style();
            }
        }
    }
}

fn paint_status(writer: &mut Writer, row: usize, width: usize, status: &str) {
    let visible = &status[..take_columns(status, width)];
    let pad = width.saturating_sub(display_width(visible));
    writer.move_to(0, row as u16);
    writer.clear_line();
    writer.attribute(Attribute::Reverse);
    writer.print(format!("{visible}{}", " ".repeat(pad)));
    writer.reset_style();
}
