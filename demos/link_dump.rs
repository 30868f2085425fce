//! Link dump example.
//!
//! This example sends an `RTM_GETLINK` dump request over a routing netlink
//! socket and prints every interface in the reply.
//!
//! Run: cargo run --example link_dump

use netlink_exchange::attr::find_rt_attr;
use netlink_exchange::transport::{NetlinkProtocol, NetlinkSocket};
use netlink_exchange::{Exchange, Expect, IfInfoMsg, Message, MessageType};
use std::time::Duration;

const IFLA_IFNAME: u16 = 3;
const IFLA_MTU: u16 = 4;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut socket = NetlinkSocket::bind(NetlinkProtocol::Route)?;
    socket.set_read_timeout(Some(Duration::from_secs(5)))?;
    println!("Bound routing socket, port ID {}", socket.port_id()?);

    let request = Message::dump_request(MessageType::RTM_GETLINK)
        .seq(1)
        .body(IfInfoMsg::default().to_bytes())
        .build();

    let mut exchange = Exchange::new(&mut socket);
    let mut reader = exchange.request_response(&request, Expect::Data)?;

    for message in reader.by_ref() {
        let message = message?;
        if message.message_type() != MessageType::RTM_NEWLINK {
            continue;
        }

        let info = IfInfoMsg::from_bytes(message.payload())?;
        let name = find_rt_attr(&message, IFLA_IFNAME).and_then(|a| a.value_as_str());
        let mtu = find_rt_attr(&message, IFLA_MTU).and_then(|a| a.value_as_u32());

        println!(
            "{:>3}: {:<16} mtu {:<6} flags {:#x}",
            info.index,
            name.unwrap_or("?"),
            mtu.map_or_else(|| "-".to_string(), |m| m.to_string()),
            info.flags
        );
    }

    println!("Dump complete in {} datagram(s)", reader.datagrams());
    Ok(())
}
