//! File tailing: turns a growing file into a stream of `Change` batches.

mod error;
mod tailer;

pub use error::TailError;
pub use tailer::{POLL_INTERVAL, TailConfig, TailExit, TailHandle, TailShutdown, spawn_tailer};
