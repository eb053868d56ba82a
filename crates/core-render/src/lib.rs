//! Viewport cache and terminal rendering.
//!
//! * `cache`: the scrolling viewport cache. Decides which rows are stale and
//!   recomputes them lazily from a `LineSource`.
//! * `render_engine`: turns cache state into terminal output, moving surviving rows
//!   with a scroll region and skipping rows whose content did not change.
//! * `painted`: per-row hashes of what is on screen.
//! * `writer`: ordered terminal command list flushed once per frame.
//! * `status`: status line segments and formatting.
//! * `metrics`: render path counters.

pub mod cache;
pub mod metrics;
pub mod painted;
pub mod render_engine;
pub mod status;
pub mod writer;

pub use cache::{RowSlot, ScrollOutcome, SyncOutcome, ViewportCache};
pub use metrics::{RenderMetrics, RenderMetricsSnapshot};
pub use render_engine::{FrameKind, RenderEngine, RowStyle};
pub use status::{FilterView, StatusContext, StatusSegment, build_status, compose_status, format_status};
pub use writer::{Command, Writer};
