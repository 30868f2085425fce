//! Error types for netlink exchanges.

use crate::types::{Errno, MessageType};
use std::io;
use thiserror::Error;

/// Errors that can occur during a netlink exchange.
#[derive(Error, Debug)]
pub enum NetlinkError {
    /// I/O error during send or receive.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A datagram did not fit in the receive buffer.
    #[error("Received truncated datagram: response exceeds {capacity} byte receive buffer")]
    Truncated { capacity: usize },

    /// Buffer too short to contain a header.
    #[error("Message too short: expected at least {expected} bytes, got {actual}")]
    MessageTooShort { expected: usize, actual: usize },

    /// Declared message length does not fit the received bytes.
    #[error("Message length mismatch: header says {header_length} bytes, got {actual_length}")]
    LengthMismatch {
        header_length: u32,
        actual_length: usize,
    },

    /// Value too large for its length field.
    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The peer broke the exchange protocol.
    #[error("Protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    /// The peer answered with a non-zero error status.
    #[error("Kernel returned error: {0}")]
    Kernel(Errno),
}

/// Ways a peer can break the request/response protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// Reply sequence number does not match the request.
    #[error("sequence mismatch: expected {expected}, got {actual}")]
    SequenceMismatch { expected: u32, actual: u32 },

    /// Reply has a type other than the one required.
    #[error("unexpected message type: expected {expected}, got {actual}")]
    UnexpectedType {
        expected: MessageType,
        actual: MessageType,
    },

    /// Exchange ended on the wrong message type.
    #[error("exchange terminated on {}, expected {expected}", DisplayLast(.actual))]
    UnexpectedTerminal {
        expected: MessageType,
        actual: Option<MessageType>,
    },

    /// `NLMSG_DONE` too short to carry its status integer.
    #[error("NLMSG_DONE length {length} too short for status")]
    DoneTooShort { length: u32 },

    /// `NLMSG_ERROR` too short to carry the error submessage.
    #[error("NLMSG_ERROR length {length} too short for error submessage")]
    ErrorTooShort { length: u32 },

    /// Exchange finished without any acknowledgement.
    #[error("no acknowledgement received")]
    MissingAck,
}

struct DisplayLast<'a>(&'a Option<MessageType>);

impl std::fmt::Display for DisplayLast<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(ty) => write!(f, "{ty}"),
            None => f.write_str("no message"),
        }
    }
}

/// Result type alias for netlink operations.
pub type Result<T> = std::result::Result<T, NetlinkError>;

impl NetlinkError {
    /// Check if this is an I/O-class failure (transport error or truncation).
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Truncated { .. })
    }

    /// Check if the peer broke the protocol.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }

    /// The decoded errno, if the peer answered with an error status.
    pub fn errno(&self) -> Option<Errno> {
        match self {
            Self::Kernel(errno) => Some(*errno),
            _ => None,
        }
    }

    /// Check if this error is recoverable (transient).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Io(e) if e.kind() == io::ErrorKind::WouldBlock
                || e.kind() == io::ErrorKind::TimedOut
                || e.kind() == io::ErrorKind::Interrupted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NetlinkError::MessageTooShort {
            expected: 16,
            actual: 8,
        };
        assert_eq!(
            format!("{err}"),
            "Message too short: expected at least 16 bytes, got 8"
        );

        let err = NetlinkError::from(ProtocolViolation::SequenceMismatch {
            expected: 7,
            actual: 8,
        });
        assert_eq!(
            format!("{err}"),
            "Protocol violation: sequence mismatch: expected 7, got 8"
        );
    }

    #[test]
    fn test_unexpected_terminal_display() {
        let violation = ProtocolViolation::UnexpectedTerminal {
            expected: MessageType::DONE,
            actual: None,
        };
        assert_eq!(
            format!("{violation}"),
            "exchange terminated on no message, expected NLMSG_DONE"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "test");
        let err: NetlinkError = io_err.into();
        assert!(matches!(err, NetlinkError::Io(_)));
        assert!(err.is_io());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_classification() {
        assert!(NetlinkError::Truncated { capacity: 4096 }.is_io());
        assert!(NetlinkError::from(ProtocolViolation::MissingAck).is_protocol_violation());
        assert_eq!(NetlinkError::Kernel(Errno(13)).errno(), Some(Errno(13)));
        assert_eq!(NetlinkError::Truncated { capacity: 1 }.errno(), None);
    }
}
