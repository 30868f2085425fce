//! Datagram framing: packing and unpacking message records.
//!
//! A single datagram may carry several messages back to back, each starting
//! on an aligned offset from the previous one.

use bytes::{BufMut, Bytes, BytesMut};

use crate::cursor::Cursor;
use crate::header::{MessageHeader, HEADER_SIZE};
use crate::message::Message;
use crate::types::align;

/// Iterator over the message records of one datagram.
///
/// Yields records in buffer order and stops at the first record whose
/// declared length is below the header size or runs past the datagram.
#[derive(Debug, Clone)]
#[must_use = "the reply is only read when the iterator is driven"]
pub struct Records {
    cursor: Cursor<Bytes>,
}

impl Records {
    /// Iterate the records packed in `datagram`.
    pub fn new(datagram: impl Into<Bytes>) -> Self {
        Self {
            cursor: Cursor::whole(datagram.into()),
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }
}

impl Iterator for Records {
    type Item = Message;

    fn next(&mut self) -> Option<Self::Item> {
        let header = MessageHeader::from_bytes(self.cursor.peek(HEADER_SIZE)?).ok()?;
        let len = header.length as usize;

        if len < HEADER_SIZE || len > self.cursor.remaining() {
            self.cursor.exhaust();
            return None;
        }

        let start = self.cursor.position();
        let data = self.cursor.get_ref().slice(start..start + len);
        self.cursor.advance_aligned(len);

        Some(Message::from_parts(header, data))
    }
}

/// A writer that packs messages into one datagram.
#[derive(Debug)]
pub struct MessageWriter {
    buffer: BytesMut,
}

impl MessageWriter {
    /// Create a new message writer.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Append a message, padding the previous contents to alignment first.
    pub fn encode(&mut self, message: &Message) {
        let padded = align(self.buffer.len());
        self.buffer.resize(padded, 0);
        self.buffer.put_slice(message.as_bytes());
    }

    /// Get the encoded data.
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Take the encoded data, clearing the internal buffer.
    pub fn take(&mut self) -> Bytes {
        std::mem::take(&mut self.buffer).freeze()
    }

    /// Clear the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Get the number of encoded bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if nothing has been encoded.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for MessageWriter {
    fn default() -> Self {
        Self::new()
    }
}
