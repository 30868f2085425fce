//! Attribute (TLV) chains.
//!
//! Each attribute is a 4-byte header followed by its value:
//!
//! ```text
//! +--------+--------+--------+--------+--------+---------+
//! |  Length (16)    |   Type (16)     | Value  | Padding |
//! +--------+--------+--------+--------+--------+---------+
//! ```
//!
//! The length covers header and value but never the padding. The next
//! attribute starts at the aligned end of the previous one.
//!
//! Lookups never fail hard: a malformed entry ends the chain, and the
//! attribute is reported as absent.

use crate::cursor::Cursor;
use crate::error::{NetlinkError, Result};
use crate::family::{AttrFamily, NetfilterFamily, RouteFamily};
use crate::message::Message;

/// Size of an attribute header in bytes.
pub const ATTR_HEADER_SIZE: usize = 4;

/// Largest value the 16-bit length field can describe.
pub const ATTR_MAX_PAYLOAD: usize = u16::MAX as usize - ATTR_HEADER_SIZE;

/// Attribute header (`rtattr` / `nfattr` / `nlattr`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttrHeader {
    /// Header plus value length, unaligned.
    pub len: u16,
    /// Attribute type.
    pub attr_type: u16,
}

impl AttrHeader {
    /// Build the header of an attribute carrying `payload_size` bytes.
    ///
    /// Fails with [`NetlinkError::PayloadTooLarge`] if the length does not
    /// fit the header.
    pub fn new(payload_size: usize, attr_type: u16) -> Result<Self> {
        let len = ATTR_HEADER_SIZE
            .checked_add(payload_size)
            .and_then(|len| u16::try_from(len).ok())
            .ok_or(NetlinkError::PayloadTooLarge {
                size: payload_size,
                max: ATTR_MAX_PAYLOAD,
            })?;
        Ok(Self { len, attr_type })
    }

    /// Parse from the start of `data`. Returns `None` if `data` is too short.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        let bytes = data.get(..ATTR_HEADER_SIZE)?;
        Some(Self {
            len: u16::from_ne_bytes([bytes[0], bytes[1]]),
            attr_type: u16::from_ne_bytes([bytes[2], bytes[3]]),
        })
    }

    /// Serialize to bytes.
    pub fn to_bytes(&self) -> [u8; ATTR_HEADER_SIZE] {
        let mut buf = [0u8; ATTR_HEADER_SIZE];
        buf[0..2].copy_from_slice(&self.len.to_ne_bytes());
        buf[2..4].copy_from_slice(&self.attr_type.to_ne_bytes());
        buf
    }
}

/// An attribute borrowed from a message buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Attribute header.
    pub header: AttrHeader,
    /// Value bytes, without header or padding.
    pub value: &'a [u8],
}

impl<'a> Attribute<'a> {
    /// Attribute type.
    pub fn attr_type(&self) -> u16 {
        self.header.attr_type
    }

    /// Read the value as a native-endian `u32`.
    pub fn value_as_u32(&self) -> Option<u32> {
        let bytes: [u8; 4] = self.value.get(..4)?.try_into().ok()?;
        Some(u32::from_ne_bytes(bytes))
    }

    /// Read the value as a string, stopping at the first NUL.
    pub fn value_as_str(&self) -> Option<&'a str> {
        let end = self
            .value
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.value.len());
        std::str::from_utf8(&self.value[..end]).ok()
    }
}

/// Iterator over an attribute chain.
#[derive(Debug, Clone)]
pub struct Attrs<'a> {
    cursor: Cursor<&'a [u8]>,
    header_size: usize,
}

impl<'a> Attrs<'a> {
    /// Walk `chain_len` bytes of `buf` starting at `start`, with attribute
    /// headers of `header_size` bytes.
    pub fn new(buf: &'a [u8], start: usize, chain_len: usize, header_size: usize) -> Self {
        Self {
            cursor: Cursor::new(buf, start, chain_len),
            header_size: header_size.max(ATTR_HEADER_SIZE),
        }
    }

    /// Walk the attribute chain of `message` laid out as family `F`.
    pub fn of<F: AttrFamily>(message: &'a Message) -> Self {
        let offset = F::chain_offset();
        let chain_len = (message.header.length as usize).saturating_sub(offset);
        Self::new(message.as_bytes(), offset, chain_len, F::ATTR_HEADER_SIZE)
    }

    /// Bytes left in the chain.
    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }
}

impl<'a> Iterator for Attrs<'a> {
    type Item = Attribute<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let header = AttrHeader::from_bytes(self.cursor.peek(self.header_size)?)?;
        let len = header.len as usize;

        if len < self.header_size || len > self.cursor.remaining() {
            self.cursor.exhaust();
            return None;
        }

        let start = self.cursor.position();
        let buf: &'a [u8] = *self.cursor.get_ref();
        let attr = Attribute {
            header,
            value: &buf[start + self.header_size..start + len],
        };

        self.cursor.advance_aligned(len);
        Some(attr)
    }
}

/// Find the first attribute of type `want` in a chain.
pub fn find_attr(
    buf: &[u8],
    start: usize,
    chain_len: usize,
    header_size: usize,
    want: u16,
) -> Option<Attribute<'_>> {
    Attrs::new(buf, start, chain_len, header_size).find(|attr| attr.attr_type() == want)
}

/// Iterate the routing attributes of a link message.
pub fn rt_attrs(message: &Message) -> Attrs<'_> {
    Attrs::of::<RouteFamily>(message)
}

/// Find a routing attribute in a link message.
pub fn find_rt_attr(message: &Message, want: u16) -> Option<Attribute<'_>> {
    rt_attrs(message).find(|attr| attr.attr_type() == want)
}

/// Iterate the netfilter attributes of a netfilter message.
pub fn nf_attrs(message: &Message) -> Attrs<'_> {
    Attrs::of::<NetfilterFamily>(message)
}

/// Find a netfilter attribute in a netfilter message.
pub fn find_nf_attr(message: &Message, want: u16) -> Option<Attribute<'_>> {
    nf_attrs(message).find(|attr| attr.attr_type() == want)
}
