use thiserror::Error;

/// Misuse of `RawInputBuffer` (a caller defect, not a runtime condition).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("read past the end of buffered input")]
    Underflow,
    #[error("skip of {requested} bytes exceeds the {available} buffered")]
    SkipPastEnd { requested: usize, available: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Multi-byte text encodings are not decoded; the segment containing the byte
    /// is discarded.
    #[error("unsupported input byte 0x{byte:02x} (multi-byte encodings are not decoded)")]
    UnsupportedByte { byte: u8, discarded: usize },
    #[error(transparent)]
    Buffer(#[from] BufferError),
}
