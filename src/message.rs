//! Netlink message handling.

use bytes::{BufMut, Bytes, BytesMut};

use crate::attr::{AttrHeader, ATTR_HEADER_SIZE};
use crate::error::{NetlinkError, Result};
use crate::header::{MessageHeader, HEADER_SIZE};
use crate::types::{align, MessageFlags, MessageType};

/// A complete netlink message record.
///
/// `data` holds the whole record, header included, exactly `header.length`
/// bytes long. Received messages share the datagram buffer they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Parsed message header.
    pub header: MessageHeader,
    data: Bytes,
}

impl Message {
    /// Create a message builder for the given type.
    pub fn builder(message_type: MessageType) -> MessageBuilder {
        MessageBuilder::new(message_type)
    }

    /// Create a request message builder (`NLM_F_REQUEST` set).
    pub fn request(message_type: MessageType) -> MessageBuilder {
        MessageBuilder::new(message_type).flags(MessageFlags::REQUEST)
    }

    /// Create a dump request message builder (`NLM_F_REQUEST | NLM_F_DUMP`).
    pub fn dump_request(message_type: MessageType) -> MessageBuilder {
        MessageBuilder::new(message_type).flags(MessageFlags::REQUEST | MessageFlags::DUMP)
    }

    /// Create an `NLMSG_DONE` message terminating a multi-part reply.
    ///
    /// The payload carries the dump status integer.
    pub fn done(seq: u32, port_id: u32, status: i32) -> Self {
        Message::builder(MessageType::DONE)
            .flags(MessageFlags::MULTI)
            .seq(seq)
            .port_id(port_id)
            .body(status.to_ne_bytes())
            .build()
    }

    /// Parse a message from the start of `data`.
    ///
    /// Bytes past the declared length are ignored.
    pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        let header = MessageHeader::from_bytes(&data)?;
        let length = header.length as usize;

        if length < HEADER_SIZE || length > data.len() {
            return Err(NetlinkError::LengthMismatch {
                header_length: header.length,
                actual_length: data.len(),
            });
        }

        Ok(Self {
            header,
            data: data.slice(..length),
        })
    }

    /// Wrap a record whose header was already validated against `data`.
    pub(crate) fn from_parts(header: MessageHeader, data: Bytes) -> Self {
        Self { header, data }
    }

    /// The whole record, header included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Serialize the message to bytes.
    pub fn to_bytes(&self) -> Bytes {
        self.data.clone()
    }

    /// The payload following the header.
    pub fn payload(&self) -> &[u8] {
        &self.data[HEADER_SIZE..]
    }

    /// Get the total message size.
    pub fn total_size(&self) -> usize {
        self.data.len()
    }

    /// Get the message type.
    pub fn message_type(&self) -> MessageType {
        self.header.message_type
    }

    /// Get the sequence number.
    pub fn seq(&self) -> u32 {
        self.header.seq
    }

    /// Check if this is an `NLMSG_DONE` message.
    pub fn is_done(&self) -> bool {
        self.header.message_type == MessageType::DONE
    }

    /// Check if this is an `NLMSG_ERROR` message.
    pub fn is_error(&self) -> bool {
        self.header.message_type == MessageType::ERROR
    }

    /// Check if this message is part of a multi-part reply.
    pub fn is_multipart(&self) -> bool {
        self.header.flags.contains(MessageFlags::MULTI)
    }
}

/// Builder for netlink messages.
///
/// The payload is a family header followed by attributes; every piece is
/// padded to the alignment unit as it is appended.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    message_type: MessageType,
    flags: MessageFlags,
    seq: u32,
    port_id: u32,
    payload: BytesMut,
}

impl MessageBuilder {
    /// Create a new builder.
    pub fn new(message_type: MessageType) -> Self {
        Self {
            message_type,
            flags: MessageFlags::empty(),
            seq: 0,
            port_id: 0,
            payload: BytesMut::new(),
        }
    }

    /// Set the header flags.
    pub fn flags(mut self, flags: MessageFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the sequence number.
    pub fn seq(mut self, seq: u32) -> Self {
        self.seq = seq;
        self
    }

    /// Set the originator port ID.
    pub fn port_id(mut self, port_id: u32) -> Self {
        self.port_id = port_id;
        self
    }

    /// Append raw payload bytes, typically a family header.
    pub fn body(mut self, body: impl AsRef<[u8]>) -> Self {
        self.payload.put_slice(body.as_ref());
        self.pad();
        self
    }

    /// Append an attribute.
    ///
    /// Fails with [`NetlinkError::PayloadTooLarge`] if `value` is longer
    /// than [`ATTR_MAX_PAYLOAD`](crate::attr::ATTR_MAX_PAYLOAD) bytes.
    pub fn attr(mut self, attr_type: u16, value: impl AsRef<[u8]>) -> Result<Self> {
        let value = value.as_ref();
        let header = AttrHeader::new(value.len(), attr_type)?;
        self.put_attr(header, value);
        Ok(self)
    }

    /// Append a NUL-terminated string attribute.
    pub fn attr_str(self, attr_type: u16, value: &str) -> Result<Self> {
        let mut bytes = Vec::with_capacity(value.len() + 1);
        bytes.extend_from_slice(value.as_bytes());
        bytes.push(0);
        self.attr(attr_type, bytes)
    }

    /// Append a native-endian `u32` attribute.
    pub fn attr_u32(mut self, attr_type: u16, value: u32) -> Self {
        let header = AttrHeader {
            len: (ATTR_HEADER_SIZE + size_of::<u32>()) as u16,
            attr_type,
        };
        self.put_attr(header, &value.to_ne_bytes());
        self
    }

    fn put_attr(&mut self, header: AttrHeader, value: &[u8]) {
        self.payload.put_slice(&header.to_bytes());
        self.payload.put_slice(value);
        self.pad();
    }

    fn pad(&mut self) {
        let padded = align(self.payload.len());
        self.payload.resize(padded, 0);
    }

    /// Build the message.
    pub fn build(self) -> Message {
        let mut header =
            MessageHeader::new(self.payload.len(), self.message_type, self.seq, self.flags);
        header.port_id = self.port_id;

        let mut data = BytesMut::with_capacity(header.length as usize);
        data.put_slice(&header.to_bytes());
        data.put_slice(&self.payload);
        data.resize(header.length as usize, 0);

        Message::from_parts(header, data.freeze())
    }
}
