//! Error submessages (`nlmsgerr`) carried by `NLMSG_ERROR` replies.
//!
//! A status of zero is an acknowledgement; a negative status is `-errno`.

use crate::error::{NetlinkError, ProtocolViolation, Result};
use crate::header::{MessageHeader, HEADER_SIZE};
use crate::message::Message;
use crate::types::{Errno, MessageType};

/// Size of the error submessage: status plus the echoed request header.
pub const ERROR_MESSAGE_SIZE: usize = 4 + HEADER_SIZE;

/// Decoded `nlmsgerr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorMessage {
    /// Zero for success, `-errno` for failure.
    pub error: i32,
    /// Header of the request being answered.
    pub request: MessageHeader,
}

impl ErrorMessage {
    /// Create an error submessage answering `request`.
    pub fn new(error: i32, request: MessageHeader) -> Self {
        Self { error, request }
    }

    /// Create a successful acknowledgement of `request`.
    pub fn ack(request: MessageHeader) -> Self {
        Self::new(0, request)
    }

    /// Decode the submessage of an `NLMSG_ERROR` message.
    pub fn from_message(message: &Message) -> Result<Self> {
        if !message.is_error() {
            return Err(ProtocolViolation::UnexpectedType {
                expected: MessageType::ERROR,
                actual: message.message_type(),
            }
            .into());
        }

        let payload = message.payload();
        if payload.len() < ERROR_MESSAGE_SIZE {
            return Err(ProtocolViolation::ErrorTooShort {
                length: message.header.length,
            }
            .into());
        }

        Self::from_bytes(payload)
    }

    /// Parse from the start of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < ERROR_MESSAGE_SIZE {
            return Err(NetlinkError::MessageTooShort {
                expected: ERROR_MESSAGE_SIZE,
                actual: data.len(),
            });
        }

        Ok(Self {
            error: i32::from_ne_bytes([data[0], data[1], data[2], data[3]]),
            request: MessageHeader::from_bytes(&data[4..ERROR_MESSAGE_SIZE])?,
        })
    }

    /// Serialize to bytes.
    pub fn to_bytes(&self) -> [u8; ERROR_MESSAGE_SIZE] {
        let mut buf = [0u8; ERROR_MESSAGE_SIZE];
        buf[0..4].copy_from_slice(&self.error.to_ne_bytes());
        buf[4..].copy_from_slice(&self.request.to_bytes());
        buf
    }

    /// Wrap into an `NLMSG_ERROR` message addressed to `port_id`, echoing the
    /// request sequence number.
    pub fn to_message(&self, port_id: u32) -> Message {
        Message::builder(MessageType::ERROR)
            .seq(self.request.seq)
            .port_id(port_id)
            .body(self.to_bytes())
            .build()
    }

    /// Check if this is a successful acknowledgement.
    pub fn is_ack(&self) -> bool {
        self.error == 0
    }

    /// Fold the status into a result: `Ok` for zero, the negated status as
    /// [`Errno`] otherwise.
    pub fn status(&self) -> std::result::Result<(), Errno> {
        match self.error {
            0 => Ok(()),
            error => Err(Errno(error.wrapping_neg())),
        }
    }
}
