//! Core netlink types and constants.

use bitflags::bitflags;

/// Alignment unit for message records and attributes.
pub const ALIGNTO: usize = 4;

/// Round `len` up to the next multiple of [`ALIGNTO`].
pub const fn align(len: usize) -> usize {
    (len + ALIGNTO - 1) & !(ALIGNTO - 1)
}

/// Netlink message type.
///
/// Values below 16 are reserved for control messages; everything above is
/// owned by the protocol family the socket was opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MessageType(pub u16);

impl MessageType {
    /// Nothing, ignore.
    pub const NOOP: Self = Self(1);
    /// Error or acknowledgement, carries an [`ErrorMessage`](crate::ack::ErrorMessage).
    pub const ERROR: Self = Self(2);
    /// End of a multi-part dump.
    pub const DONE: Self = Self(3);
    /// Data lost.
    pub const OVERRUN: Self = Self(4);

    /// `RTM_NEWLINK`.
    pub const RTM_NEWLINK: Self = Self(16);
    /// `RTM_DELLINK`.
    pub const RTM_DELLINK: Self = Self(17);
    /// `RTM_GETLINK`.
    pub const RTM_GETLINK: Self = Self(18);
    /// `RTM_SETLINK`.
    pub const RTM_SETLINK: Self = Self(19);

    /// Compose a netfilter message type from a subsystem id and a
    /// subsystem-local message type.
    pub const fn subsystem(subsys_id: u8, msg_type: u8) -> Self {
        Self(((subsys_id as u16) << 8) | msg_type as u16)
    }

    /// Check if this is one of the reserved control types.
    pub fn is_control(&self) -> bool {
        self.0 < 16
    }

    /// Check if this type terminates a multi-part exchange.
    pub fn is_terminal(&self) -> bool {
        *self == Self::DONE || *self == Self::ERROR
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::NOOP => f.write_str("NLMSG_NOOP"),
            Self::ERROR => f.write_str("NLMSG_ERROR"),
            Self::DONE => f.write_str("NLMSG_DONE"),
            Self::OVERRUN => f.write_str("NLMSG_OVERRUN"),
            Self(other) => write!(f, "0x{other:04X}"),
        }
    }
}

bitflags! {
    /// Flags carried in the message header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MessageFlags: u16 {
        /// It is a request message.
        const REQUEST = 0x01;
        /// Multi-part message, terminated by `NLMSG_DONE`.
        const MULTI = 0x02;
        /// Reply with an acknowledgement, on success.
        const ACK = 0x04;
        /// Echo this request.
        const ECHO = 0x08;
        /// Dump was inconsistent due to sequence change.
        const DUMP_INTR = 0x10;
        /// Dump was filtered as requested.
        const DUMP_FILTERED = 0x20;

        // Modifiers to GET requests.

        /// Return the complete table instead of a single entry.
        const ROOT = 0x100;
        /// Return all entries matching the criteria in the request.
        const MATCH = 0x200;
        /// Return an atomic snapshot of the table.
        const ATOMIC = 0x400;
        /// `ROOT | MATCH`.
        const DUMP = Self::ROOT.bits() | Self::MATCH.bits();
    }
}

/// A positive system error number decoded from an error submessage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Errno(pub i32);

impl Errno {
    /// The raw errno value.
    pub fn code(&self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for Errno {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", std::io::Error::from_raw_os_error(self.0), self.0)
    }
}

impl From<Errno> for std::io::Error {
    fn from(errno: Errno) -> Self {
        std::io::Error::from_raw_os_error(errno.0)
    }
}
