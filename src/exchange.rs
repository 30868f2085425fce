//! Request/response exchanges over a borrowed transport.

use crate::ack::ErrorMessage;
use crate::codec::Records;
use crate::config::ExchangeConfig;
use crate::dump::{DumpReader, Expect};
use crate::error::{NetlinkError, ProtocolViolation, Result};
use crate::message::Message;
use crate::transport::{retry_interrupted, Transport};
use crate::types::MessageType;

/// Runs request/response exchanges on a transport owned by the caller.
///
/// Exchanges are strictly sequential: each one is drained before the next
/// request goes out, so replies are never interleaved.
#[derive(Debug)]
pub struct Exchange<'t, T: Transport + ?Sized> {
    transport: &'t mut T,
    config: ExchangeConfig,
}

impl<'t, T: Transport + ?Sized> Exchange<'t, T> {
    /// Create an exchange with the default configuration.
    pub fn new(transport: &'t mut T) -> Self {
        Self::with_config(transport, ExchangeConfig::default())
    }

    /// Create an exchange with a custom configuration.
    pub fn with_config(transport: &'t mut T, config: ExchangeConfig) -> Self {
        Self { transport, config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// Get a mutable reference to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut *self.transport
    }

    /// Send `request` as one datagram.
    pub fn send(&mut self, request: &Message) -> Result<()> {
        let data = request.as_bytes();
        let transport = &mut *self.transport;
        retry_interrupted(&self.config, || transport.send(data))?;

        tracing::debug!(
            message_type = %request.header.message_type,
            seq = request.header.seq,
            len = data.len(),
            "sent netlink request"
        );
        Ok(())
    }

    /// Read the reply to a request that was already sent.
    pub fn response(&mut self, expect: Expect) -> DumpReader<'_, T> {
        DumpReader::new(&mut *self.transport, self.config.clone(), expect)
    }

    /// Send `request` and iterate over every message of the reply,
    /// following multi-part replies to their end.
    pub fn request_response(
        &mut self,
        request: &Message,
        expect: Expect,
    ) -> Result<DumpReader<'_, T>> {
        self.send(request)?;
        Ok(self.response(expect))
    }

    /// Send `request` and return the messages of exactly one reply datagram.
    ///
    /// No multi-part handling and no terminal type checks are done.
    pub fn request_response_single(&mut self, request: &Message) -> Result<Records> {
        self.send(request)?;

        let mut buffer = vec![0u8; self.config.recv_buffer_size];
        let transport = &mut *self.transport;
        let datagram = retry_interrupted(&self.config, || transport.recv(&mut buffer))?;

        if datagram.truncated {
            tracing::warn!(capacity = buffer.len(), "received truncated netlink datagram");
            return Err(NetlinkError::Truncated {
                capacity: buffer.len(),
            });
        }

        tracing::debug!(len = datagram.len, "received netlink datagram");
        buffer.truncate(datagram.len);
        Ok(Records::new(buffer))
    }

    /// Send `request` and wait for its acknowledgement.
    ///
    /// Every reply must be an `NLMSG_ERROR` carrying `seq`. A zero status is
    /// success; a non-zero status is returned as [`NetlinkError::Kernel`].
    pub fn request_ack(&mut self, seq: u32, request: &Message) -> Result<()> {
        let mut status = None;

        for message in self.request_response(request, Expect::Error)? {
            let message = message?;

            if message.message_type() != MessageType::ERROR {
                return Err(ProtocolViolation::UnexpectedType {
                    expected: MessageType::ERROR,
                    actual: message.message_type(),
                }
                .into());
            }
            if message.seq() != seq {
                return Err(ProtocolViolation::SequenceMismatch {
                    expected: seq,
                    actual: message.seq(),
                }
                .into());
            }

            status = Some(ErrorMessage::from_message(&message)?.status());
        }

        match status {
            Some(Ok(())) => Ok(()),
            Some(Err(errno)) => {
                tracing::debug!(seq, %errno, "netlink request rejected");
                Err(NetlinkError::Kernel(errno))
            }
            None => Err(ProtocolViolation::MissingAck.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MessageWriter;
    use crate::family::IfInfoMsg;
    use crate::header::MessageHeader;
    use crate::transport::mock::MockTransport;
    use crate::types::MessageFlags;
    use std::io;

    fn setlink(seq: u32) -> Message {
        Message::request(MessageType::RTM_SETLINK)
            .flags(MessageFlags::REQUEST | MessageFlags::ACK)
            .seq(seq)
            .body(IfInfoMsg::default().to_bytes())
            .build()
    }

    fn error_reply(request: &Message, error: i32) -> Message {
        ErrorMessage::new(error, request.header).to_message(0)
    }

    #[test]
    fn test_request_ack_success() {
        let request = setlink(10);
        let mut transport = MockTransport::new().reply(error_reply(&request, 0).to_bytes());

        let mut exchange = Exchange::new(&mut transport);
        exchange.request_ack(10, &request).unwrap();

        assert_eq!(transport.sent.len(), 1);
        assert_eq!(transport.sent[0], request.to_bytes());
    }

    #[test]
    fn test_request_ack_errno() {
        let request = setlink(11);
        let mut transport = MockTransport::new().reply(error_reply(&request, -13).to_bytes());

        let err = Exchange::new(&mut transport).request_ack(11, &request).unwrap_err();
        assert_eq!(err.errno(), Some(crate::types::Errno(13)));
    }

    #[test]
    fn test_request_ack_sequence_mismatch() {
        let request = setlink(12);
        let other = setlink(13);
        let mut transport = MockTransport::new().reply(error_reply(&other, 0).to_bytes());

        let err = Exchange::new(&mut transport).request_ack(12, &request).unwrap_err();
        assert!(matches!(
            err,
            NetlinkError::Protocol(ProtocolViolation::SequenceMismatch {
                expected: 12,
                actual: 13
            })
        ));
    }

    #[test]
    fn test_request_ack_wrong_type() {
        let request = setlink(14);
        let reply = Message::builder(MessageType::RTM_NEWLINK).seq(14).build();
        let mut transport = MockTransport::new().reply(reply.to_bytes());

        let err = Exchange::new(&mut transport).request_ack(14, &request).unwrap_err();
        assert!(matches!(
            err,
            NetlinkError::Protocol(ProtocolViolation::UnexpectedType {
                actual: MessageType::RTM_NEWLINK,
                ..
            })
        ));
    }

    #[test]
    fn test_request_ack_empty_reply() {
        let request = setlink(15);
        let mut transport = MockTransport::new().reply(bytes::Bytes::new());

        let err = Exchange::new(&mut transport).request_ack(15, &request).unwrap_err();
        assert!(matches!(
            err,
            NetlinkError::Protocol(ProtocolViolation::UnexpectedTerminal {
                expected: MessageType::ERROR,
                actual: None
            })
        ));
    }

    #[test]
    fn test_request_response_single_ignores_multi() {
        let request = Message::dump_request(MessageType::RTM_GETLINK).seq(1).build();
        let mut writer = MessageWriter::new();
        writer.encode(
            &Message::builder(MessageType::RTM_NEWLINK)
                .flags(MessageFlags::MULTI)
                .seq(1)
                .build(),
        );
        writer.encode(
            &Message::builder(MessageType::RTM_NEWLINK)
                .flags(MessageFlags::MULTI)
                .seq(1)
                .build(),
        );
        let mut transport = MockTransport::new()
            .reply(writer.take())
            .reply(Message::done(1, 0, 0).to_bytes());

        let records = Exchange::new(&mut transport).request_response_single(&request).unwrap();
        assert_eq!(records.count(), 2);
        assert_eq!(transport.recv_calls, 1);
    }

    #[test]
    fn test_request_response_single_truncated() {
        let request = Message::request(MessageType::RTM_GETLINK).build();
        let big = Message::builder(MessageType::RTM_NEWLINK)
            .body(vec![0u8; 64])
            .build();
        let mut transport = MockTransport::new().reply(big.to_bytes());
        let config = ExchangeConfig::default().with_recv_buffer_size(32);

        let result =
            Exchange::with_config(&mut transport, config).request_response_single(&request);
        assert!(matches!(result, Err(NetlinkError::Truncated { capacity: 32 })));
    }

    #[test]
    fn test_send_error_propagated() {
        #[derive(Debug)]
        struct Refusing;

        impl Transport for Refusing {
            fn send(&mut self, _data: &[u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::PermissionDenied))
            }

            fn recv(&mut self, _buf: &mut [u8]) -> io::Result<crate::transport::Datagram> {
                unreachable!("nothing was sent")
            }

            fn local_port_id(&self) -> io::Result<u32> {
                Ok(0)
            }
        }

        let request = setlink(1);
        let err = Exchange::new(&mut Refusing).request_ack(1, &request).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_response_without_request() {
        let header = MessageHeader::new(0, MessageType::RTM_GETLINK, 3, MessageFlags::REQUEST);
        let mut transport =
            MockTransport::new().reply(ErrorMessage::ack(header).to_message(0).to_bytes());

        let mut exchange = Exchange::new(&mut transport);
        let messages: Vec<Message> = exchange
            .response(Expect::Error)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(messages.len(), 1);
        assert!(transport.sent.is_empty());
    }
}
