//! Raw input byte queue.
//!
//! Index-based queue holding bytes received from the terminal that the decoder
//! has not consumed yet (typically the first bytes of an escape sequence).
//!
//! Contract:
//! * `read <= write <= capacity` at all times.
//! * Capacity grows geometrically (doubling, starting at `INITIAL_CAPACITY`) and
//!   never shrinks.
//! * When the read cursor catches up with the write cursor the queue is empty and
//!   both cursors return to the origin so the same storage is reused.
//! * Reading or skipping past the buffered bytes is a caller defect and reported
//!   as `BufferError`.

use crate::error::BufferError;

pub const INITIAL_CAPACITY: usize = 64;

#[derive(Debug)]
pub struct RawInputBuffer {
    data: Vec<u8>,
    read: usize,
    write: usize,
}

impl Default for RawInputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl RawInputBuffer {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity.max(1)],
            read: 0,
            write: 0,
        }
    }

    /// Number of unread bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.write - self.read
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.read == self.write
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Append `bytes` after the write cursor, growing storage if needed.
    pub fn write(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let needed = self.write + bytes.len();
        if needed > self.data.len() {
            let mut capacity = self.data.len();
            while capacity < needed {
                capacity *= 2;
            }
            tracing::trace!(
                target: "input.buffer",
                from = self.data.len(),
                to = capacity,
                "grow"
            );
            self.data.resize(capacity, 0);
        }
        self.data[self.write..needed].copy_from_slice(bytes);
        self.write = needed;
    }

    /// Unread bytes in order.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.read..self.write]
    }

    /// Next unread byte without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    /// Unread byte at `offset` from the read cursor.
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        if offset < self.len() {
            Some(self.data[self.read + offset])
        } else {
            None
        }
    }

    /// Consume and return the next byte.
    pub fn read_byte(&mut self) -> Result<u8, BufferError> {
        let byte = self.peek().ok_or(BufferError::Underflow)?;
        self.read += 1;
        self.reset_if_drained();
        Ok(byte)
    }

    /// Consume `count` bytes.
    pub fn skip(&mut self, count: usize) -> Result<(), BufferError> {
        let available = self.len();
        if count > available {
            return Err(BufferError::SkipPastEnd {
                requested: count,
                available,
            });
        }
        self.read += count;
        self.reset_if_drained();
        Ok(())
    }

    /// Drop every unread byte.
    pub fn clear(&mut self) {
        self.read = 0;
        self.write = 0;
    }

    #[inline]
    fn reset_if_drained(&mut self) {
        if self.read == self.write {
            self.read = 0;
            self.write = 0;
        }
    }
}
