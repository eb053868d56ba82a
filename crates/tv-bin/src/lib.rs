//! tailview: follow a growing log file in a terminal viewport.
//!
//! The binary wires three producers into one consumer loop: the file tailer
//! (`core-tail`), the raw terminal byte reader (`core-input`) and a resize
//! tick. Everything the loop mutates lives in `App`.

pub mod app;
pub mod bindings;
pub mod feed;

pub use app::{App, STATUS_ROWS, ViewSettings};
pub use bindings::Action;
pub use feed::StashedChanges;
