//! Synchronous netlink request/response exchanges.
//!
//! This crate provides the client side of the netlink protocol: building
//! request messages, sending them over a datagram transport, reading the
//! reply (including multi-part dumps that span several datagrams),
//! decoding acknowledgement and error submessages, and walking the
//! attribute chains embedded in reply messages.
//!
//! # Features
//!
//! - Bit-exact message and attribute headers with alignment handling
//! - Lazy iteration over multi-part replies with termination checks
//! - `NLMSG_ERROR` decoding into typed errno results
//! - One bounds-checked attribute walker for routing and netfilter layouts
//! - An `AF_NETLINK` socket transport on Linux
//!
//! # Example
//!
//! ```no_run
//! use netlink_exchange::{Exchange, Expect, IfInfoMsg, Message, MessageType};
//! use netlink_exchange::attr::find_rt_attr;
//! use netlink_exchange::transport::{NetlinkProtocol, NetlinkSocket};
//!
//! const IFLA_IFNAME: u16 = 3;
//!
//! let mut socket = NetlinkSocket::bind(NetlinkProtocol::Route).unwrap();
//! let request = Message::dump_request(MessageType::RTM_GETLINK)
//!     .seq(1)
//!     .body(IfInfoMsg::default().to_bytes())
//!     .build();
//!
//! let mut exchange = Exchange::new(&mut socket);
//! for message in exchange.request_response(&request, Expect::Data).unwrap() {
//!     let message = message.unwrap();
//!     if let Some(name) = find_rt_attr(&message, IFLA_IFNAME) {
//!         println!("link: {:?}", name.value_as_str());
//!     }
//! }
//! ```
//!
//! # Protocol Overview
//!
//! Every netlink message starts with a 16-byte header in native byte order.
//! Several messages may share one datagram, each aligned to 4 bytes:
//!
//! ```text
//! +--------+--------+--------+--------+
//! |            Length                 |  (4 bytes)
//! +--------+--------+--------+--------+
//! |      Type       |     Flags       |  (4 bytes)
//! +--------+--------+--------+--------+
//! |        Sequence number            |  (4 bytes)
//! +--------+--------+--------+--------+
//! |            Port ID                |  (4 bytes)
//! +--------+--------+--------+--------+
//! |  Family header, attributes ...    |  (variable)
//! +--------+--------+--------+--------+
//! ```

pub mod ack;
pub mod attr;
pub mod codec;
pub mod config;
pub mod cursor;
pub mod dump;
pub mod error;
pub mod exchange;
pub mod family;
pub mod header;
pub mod message;
pub mod transport;
pub mod types;

// Re-export commonly used types at the crate root
pub use ack::{ErrorMessage, ERROR_MESSAGE_SIZE};
pub use attr::{
    find_attr, find_nf_attr, find_rt_attr, AttrHeader, Attribute, Attrs, ATTR_HEADER_SIZE,
    ATTR_MAX_PAYLOAD,
};
pub use codec::{MessageWriter, Records};
pub use config::{ExchangeConfig, DEFAULT_RECV_BUFFER_SIZE};
pub use dump::{DumpReader, Expect};
pub use error::{NetlinkError, ProtocolViolation, Result};
pub use exchange::Exchange;
pub use family::{AttrFamily, IfInfoMsg, NetfilterFamily, NfGenMsg, RouteFamily};
pub use header::{MessageHeader, HEADER_SIZE};
pub use message::{Message, MessageBuilder};
pub use transport::{Datagram, Transport};
pub use types::{align, Errno, MessageFlags, MessageType, ALIGNTO};
