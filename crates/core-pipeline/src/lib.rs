//! Versioned processing pipeline.
//!
//! A `Pipeline` is an ordered list of `Stage`s. Each stage materializes the output
//! of one `LineTransform` over its upstream's output and carries a version that
//! bumps whenever that output is thrown away. The pipeline remembers the version
//! it last saw for every stage; a mismatch means the stage and everything after it
//! must be rebuilt before new `Change`s flow through.

mod pipeline;
mod source;
mod stage;
mod transform;

pub use pipeline::{Pipeline, UpdateReport};
pub use source::{ChangeSource, SourcePoll};
pub use stage::Stage;
pub use transform::{LineTransform, PassThrough, SubstringFilter};
