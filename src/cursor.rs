//! Bounds-checked cursor over a chain of aligned records.
//!
//! Message records inside a datagram and attributes inside a message share
//! the same framing: every entry starts on an [`ALIGNTO`](crate::types::ALIGNTO)
//! boundary measured from the previous entry, and the chain is limited by a
//! declared total length that may be shorter than the buffer.

use crate::types::align;

/// A cursor over `buf[start..start + len]`.
#[derive(Debug, Clone)]
pub struct Cursor<B> {
    buf: B,
    pos: usize,
    remaining: usize,
}

impl<B: AsRef<[u8]>> Cursor<B> {
    /// Create a cursor over `len` bytes starting at `start`.
    ///
    /// The window is clamped to the buffer.
    pub fn new(buf: B, start: usize, len: usize) -> Self {
        let available = buf.as_ref().len().saturating_sub(start);
        Self {
            pos: start.min(buf.as_ref().len()),
            remaining: len.min(available),
            buf,
        }
    }

    /// Create a cursor over the whole buffer.
    pub fn whole(buf: B) -> Self {
        let len = buf.as_ref().len();
        Self::new(buf, 0, len)
    }

    /// Offset of the cursor from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left in the chain.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Get a reference to the underlying buffer.
    pub fn get_ref(&self) -> &B {
        &self.buf
    }

    /// Peek at the next `len` bytes without moving.
    ///
    /// Returns `None` when fewer than `len` bytes remain.
    pub fn peek(&self, len: usize) -> Option<&[u8]> {
        if len > self.remaining {
            return None;
        }
        Some(&self.buf.as_ref()[self.pos..self.pos + len])
    }

    /// Advance past an entry of `len` bytes plus its alignment padding.
    ///
    /// Padding missing at the end of the chain is tolerated; the cursor is
    /// left exhausted.
    pub fn advance_aligned(&mut self, len: usize) {
        let step = align(len);
        if step >= self.remaining {
            self.exhaust();
        } else {
            self.pos += step;
            self.remaining -= step;
        }
    }

    /// Drop whatever is left in the chain.
    pub fn exhaust(&mut self) {
        self.pos += self.remaining;
        self.remaining = 0;
    }
}
