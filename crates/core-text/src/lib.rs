//! Text helpers for turning raw log lines into terminal rows.
//!
//! * `sanitize` removes what a terminal must never receive verbatim from a log file
//!   (escape sequences, control characters) and expands tabs.
//! * `width` is the single place display widths are computed (grapheme clusters,
//!   `unicode-width`).
//! * `display` holds `DisplayLine`, the immutable slice view used to build one row,
//!   and `WrapMode`.
//!
//! All offsets are byte offsets into the sanitized line text and always fall on
//! grapheme cluster boundaries.

pub mod display;
pub mod sanitize;
pub mod width;

pub use display::{DisplayLine, WrapMode};
pub use sanitize::{DEFAULT_TAB_WIDTH, sanitize_line};
pub use width::{display_width, egc_width, offset_at_column, take_columns};
