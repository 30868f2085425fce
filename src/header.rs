//! Netlink message header (`nlmsghdr`).

use crate::error::{NetlinkError, Result};
use crate::types::{align, MessageFlags, MessageType};

/// Size of the netlink message header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Length of a message carrying `payload_len` bytes, without trailing padding.
pub const fn message_length(payload_len: usize) -> usize {
    HEADER_SIZE + payload_len
}

/// Aligned space taken by a message carrying `payload_len` bytes.
pub const fn message_space(payload_len: usize) -> usize {
    align(message_length(payload_len))
}

/// Netlink message header (16 bytes, native byte order).
///
/// ```text
/// +----------------+----------------+----------------+----------------+
/// |           Length (32 bits) - header + payload                     |
/// +----------------+----------------+----------------+----------------+
/// |   Type (16 bits)                |   Flags (16 bits)               |
/// +----------------+----------------+----------------+----------------+
/// |           Sequence number (32 bits)                               |
/// +----------------+----------------+----------------+----------------+
/// |           Port ID (32 bits)                                       |
/// +----------------+----------------+----------------+----------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
    /// Total length of the message, header included.
    pub length: u32,
    /// Message type.
    pub message_type: MessageType,
    /// Header flags.
    pub flags: MessageFlags,
    /// Sequence number correlating requests and replies.
    pub seq: u32,
    /// Port ID of the originator.
    pub port_id: u32,
}

impl MessageHeader {
    /// Build a header for a message carrying `payload_len` bytes.
    ///
    /// The stored length is aligned; the port ID is left at zero.
    pub fn new(
        payload_len: usize,
        message_type: MessageType,
        seq: u32,
        flags: MessageFlags,
    ) -> Self {
        Self {
            length: message_space(payload_len) as u32,
            message_type,
            flags,
            seq,
            port_id: 0,
        }
    }

    /// Get the payload length (length field minus the header).
    pub fn payload_length(&self) -> usize {
        (self.length as usize).saturating_sub(HEADER_SIZE)
    }

    /// Parse a header from bytes.
    ///
    /// Unknown flag bits are kept.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(NetlinkError::MessageTooShort {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }

        let length = u32::from_ne_bytes([data[0], data[1], data[2], data[3]]);
        let message_type = MessageType(u16::from_ne_bytes([data[4], data[5]]));
        let flags = MessageFlags::from_bits_retain(u16::from_ne_bytes([data[6], data[7]]));
        let seq = u32::from_ne_bytes([data[8], data[9], data[10], data[11]]);
        let port_id = u32::from_ne_bytes([data[12], data[13], data[14], data[15]]);

        Ok(Self {
            length,
            message_type,
            flags,
            seq,
            port_id,
        })
    }

    /// Serialize the header to bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];

        buf[0..4].copy_from_slice(&self.length.to_ne_bytes());
        buf[4..6].copy_from_slice(&self.message_type.0.to_ne_bytes());
        buf[6..8].copy_from_slice(&self.flags.bits().to_ne_bytes());
        buf[8..12].copy_from_slice(&self.seq.to_ne_bytes());
        buf[12..16].copy_from_slice(&self.port_id.to_ne_bytes());

        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip() {
        let header = MessageHeader {
            length: 36,
            message_type: MessageType::RTM_NEWLINK,
            flags: MessageFlags::MULTI,
            seq: 0xDEADBEEF,
            port_id: 4242,
        };

        let bytes = header.to_bytes();
        let parsed = MessageHeader::from_bytes(&bytes).unwrap();

        assert_eq!(header, parsed);
    }

    #[test]
    fn test_new_aligns_length() {
        for payload_len in 0..12 {
            let header = MessageHeader::new(
                payload_len,
                MessageType::RTM_GETLINK,
                9,
                MessageFlags::REQUEST | MessageFlags::DUMP,
            );
            assert_eq!(header.length as usize, align(HEADER_SIZE + payload_len));
            assert_eq!(header.length % 4, 0);

            let parsed = MessageHeader::from_bytes(&header.to_bytes()).unwrap();
            assert_eq!(parsed.message_type, MessageType::RTM_GETLINK);
            assert_eq!(parsed.seq, 9);
            assert_eq!(parsed.flags, MessageFlags::REQUEST | MessageFlags::DUMP);
        }
    }

    #[test]
    fn test_header_byte_order() {
        let header = MessageHeader::new(0, MessageType::DONE, 1, MessageFlags::MULTI);
        let bytes = header.to_bytes();

        assert_eq!(&bytes[0..4], &16u32.to_ne_bytes());
        assert_eq!(&bytes[4..6], &3u16.to_ne_bytes());
        assert_eq!(&bytes[6..8], &2u16.to_ne_bytes());
    }

    #[test]
    fn test_unknown_flags_preserved() {
        let mut bytes = MessageHeader::default().to_bytes();
        bytes[6..8].copy_from_slice(&0x8002u16.to_ne_bytes());

        let parsed = MessageHeader::from_bytes(&bytes).unwrap();
        assert!(parsed.flags.contains(MessageFlags::MULTI));
        assert_eq!(parsed.flags.bits(), 0x8002);
    }

    #[test]
    fn test_message_space() {
        assert_eq!(message_length(4), 20);
        assert_eq!(message_space(1), 20);
        assert_eq!(message_space(16), 32);
    }

    #[test]
    fn test_parse_too_short() {
        let data = [0u8; 10];
        let result = MessageHeader::from_bytes(&data);
        assert!(matches!(result, Err(NetlinkError::MessageTooShort { .. })));
    }
}
