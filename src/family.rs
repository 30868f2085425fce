//! Family headers that sit between the message header and the attributes.

use crate::error::{NetlinkError, Result};
use crate::header::HEADER_SIZE;
use crate::types::align;

/// Attribute chain layout of a message family.
///
/// The chain starts after the message header and the family header, aligned,
/// and runs to the end of the message.
pub trait AttrFamily {
    /// Size of the family header preceding the attributes.
    const FAMILY_HEADER_SIZE: usize;

    /// Size of one attribute header.
    const ATTR_HEADER_SIZE: usize = crate::attr::ATTR_HEADER_SIZE;

    /// Offset of the first attribute from the start of the message.
    fn chain_offset() -> usize {
        align(HEADER_SIZE + Self::FAMILY_HEADER_SIZE)
    }
}

/// Routing attributes (`rtattr`) following an [`IfInfoMsg`].
#[derive(Debug, Clone, Copy)]
pub struct RouteFamily;

impl AttrFamily for RouteFamily {
    const FAMILY_HEADER_SIZE: usize = IfInfoMsg::SIZE;
}

/// Netfilter attributes (`nfattr`) following an [`NfGenMsg`].
#[derive(Debug, Clone, Copy)]
pub struct NetfilterFamily;

impl AttrFamily for NetfilterFamily {
    const FAMILY_HEADER_SIZE: usize = NfGenMsg::SIZE;
}

/// Link message header (`ifinfomsg`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IfInfoMsg {
    /// Address family, `AF_UNSPEC` for link requests.
    pub family: u8,
    /// Device type (`ARPHRD_*`).
    pub if_type: u16,
    /// Interface index.
    pub index: i32,
    /// Device flags (`IFF_*`).
    pub flags: u32,
    /// Change mask.
    pub change: u32,
}

impl IfInfoMsg {
    /// Encoded size in bytes.
    pub const SIZE: usize = 16;

    /// Parse from the start of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(NetlinkError::MessageTooShort {
                expected: Self::SIZE,
                actual: data.len(),
            });
        }

        Ok(Self {
            family: data[0],
            if_type: u16::from_ne_bytes([data[2], data[3]]),
            index: i32::from_ne_bytes([data[4], data[5], data[6], data[7]]),
            flags: u32::from_ne_bytes([data[8], data[9], data[10], data[11]]),
            change: u32::from_ne_bytes([data[12], data[13], data[14], data[15]]),
        })
    }

    /// Serialize to bytes.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0] = self.family;
        buf[2..4].copy_from_slice(&self.if_type.to_ne_bytes());
        buf[4..8].copy_from_slice(&self.index.to_ne_bytes());
        buf[8..12].copy_from_slice(&self.flags.to_ne_bytes());
        buf[12..16].copy_from_slice(&self.change.to_ne_bytes());
        buf
    }
}

/// Netfilter message header (`nfgenmsg`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NfGenMsg {
    /// Address family.
    pub family: u8,
    /// Netfilter protocol version.
    pub version: u8,
    /// Resource ID, big-endian on the wire.
    pub res_id: u16,
}

impl NfGenMsg {
    /// Encoded size in bytes.
    pub const SIZE: usize = 4;

    /// `NFNETLINK_V0`.
    pub const VERSION_0: u8 = 0;

    /// Parse from the start of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(NetlinkError::MessageTooShort {
                expected: Self::SIZE,
                actual: data.len(),
            });
        }

        Ok(Self {
            family: data[0],
            version: data[1],
            res_id: u16::from_be_bytes([data[2], data[3]]),
        })
    }

    /// Serialize to bytes.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let res_id = self.res_id.to_be_bytes();
        [self.family, self.version, res_id[0], res_id[1]]
    }
}
