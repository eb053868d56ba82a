//! Terminal input: raw byte capture and decoding into `TerminalEvent`s.
//!
//! Bytes arrive from a blocking reader thread (`spawn_byte_reader`), accumulate in a
//! `RawInputBuffer`, and are turned into events by `InputDecoder` using the static
//! `CONTROL_MAPPINGS` table plus the standalone-ESC timeout.

mod buffer;
mod decoder;
mod error;
mod mapping;
mod reader;

pub use buffer::{INITIAL_CAPACITY, RawInputBuffer};
pub use decoder::{DecoderState, ESCAPE_TIMEOUT, InputDecoder};
pub use error::{BufferError, DecodeError};
pub use mapping::{CONTROL_MAPPINGS, ControlMapping, MappingMatch, lookup};
pub use reader::spawn_byte_reader;
