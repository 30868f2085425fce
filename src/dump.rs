//! Multi-part reply reassembly.
//!
//! A reply to a request is one or more datagrams. When the messages carry
//! `NLM_F_MULTI`, more datagrams follow until an `NLMSG_DONE` (normal end
//! of a dump) or `NLMSG_ERROR` (abnormal end) arrives. Without the flag the
//! reply ends after its first datagram.
//!
//! [`DumpReader`] receives datagrams lazily as the caller pulls messages,
//! so messages come out in arrival order, and in buffer order within a
//! datagram.

use bytes::Bytes;

use crate::codec::Records;
use crate::config::ExchangeConfig;
use crate::error::{NetlinkError, ProtocolViolation, Result};
use crate::header::message_length;
use crate::message::Message;
use crate::transport::{retry_interrupted, Transport};
use crate::types::{MessageFlags, MessageType};

/// Which terminal message the caller requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expect {
    /// Data reply; a multi-part reply must end with `NLMSG_DONE`.
    #[default]
    Data,
    /// The reply must end with `NLMSG_ERROR` (an acknowledgement).
    Error,
}

#[derive(Debug)]
enum State {
    /// Waiting for the next datagram.
    Receiving,
    /// Yielding the records of the current datagram.
    Draining(Records),
    /// Exchange over, nothing more to yield.
    Finished,
}

/// Iterator over the messages of one reply, spanning as many datagrams as
/// the multi-part protocol requires.
///
/// Yields `Err` at most once, after which it is fused. A protocol violation
/// found once the reply has ended is reported as the final item.
#[derive(Debug)]
#[must_use = "the reply is only read when the iterator is driven"]
pub struct DumpReader<'t, T: Transport + ?Sized> {
    transport: &'t mut T,
    config: ExchangeConfig,
    expect: Expect,
    buffer: Vec<u8>,
    state: State,
    last_type: Option<MessageType>,
    last_flags: MessageFlags,
    multipart: bool,
    datagrams: usize,
}

impl<'t, T: Transport + ?Sized> DumpReader<'t, T> {
    /// Read the reply to a request already sent on `transport`.
    pub fn new(transport: &'t mut T, config: ExchangeConfig, expect: Expect) -> Self {
        let buffer = vec![0u8; config.recv_buffer_size];
        Self {
            transport,
            config,
            expect,
            buffer,
            state: State::Receiving,
            last_type: None,
            last_flags: MessageFlags::empty(),
            multipart: false,
            datagrams: 0,
        }
    }

    /// Type of the last message seen, if any.
    pub fn last_type(&self) -> Option<MessageType> {
        self.last_type
    }

    /// Flags of the last message seen.
    pub fn last_flags(&self) -> MessageFlags {
        self.last_flags
    }

    /// Whether any message of the reply carried `NLM_F_MULTI`.
    pub fn is_multipart(&self) -> bool {
        self.multipart
    }

    /// Number of datagrams received so far.
    pub fn datagrams(&self) -> usize {
        self.datagrams
    }

    /// Drain the reply, discarding messages, and report the outcome.
    pub fn finish(self) -> Result<()> {
        for message in self {
            message?;
        }
        Ok(())
    }

    fn receive(&mut self) -> Result<Records> {
        let config = &self.config;
        let transport = &mut *self.transport;
        let buffer = &mut self.buffer;
        let datagram = retry_interrupted(config, || transport.recv(buffer))?;

        if datagram.truncated {
            tracing::warn!(
                capacity = self.buffer.len(),
                "received truncated netlink datagram"
            );
            return Err(NetlinkError::Truncated {
                capacity: self.buffer.len(),
            });
        }

        self.datagrams += 1;
        tracing::debug!(
            len = datagram.len,
            datagram = self.datagrams,
            "received netlink datagram"
        );

        Ok(Records::new(Bytes::copy_from_slice(
            &self.buffer[..datagram.len],
        )))
    }

    fn observe(&mut self, message: &Message) -> Result<()> {
        self.last_type = Some(message.header.message_type);
        self.last_flags = message.header.flags;
        self.multipart |= message.is_multipart();

        tracing::trace!(
            message_type = %message.header.message_type,
            flags = message.header.flags.bits(),
            seq = message.header.seq,
            len = message.header.length,
            "netlink reply message"
        );

        // The dump status integer of `NLMSG_DONE` is checked by some peers.
        if message.is_done()
            && self.config.strict_done_length
            && (message.header.length as usize) < message_length(size_of::<i32>())
        {
            return Err(ProtocolViolation::DoneTooShort {
                length: message.header.length,
            }
            .into());
        }

        Ok(())
    }

    fn wants_more(&self) -> bool {
        self.last_flags.contains(MessageFlags::MULTI)
            && !self.last_type.is_some_and(|ty| ty.is_terminal())
    }

    fn check_terminal(&self) -> Result<()> {
        let expected = match self.expect {
            Expect::Error => MessageType::ERROR,
            // Once a reply went multi-part it must end with DONE, even if
            // later messages dropped the flag.
            Expect::Data if self.multipart => MessageType::DONE,
            Expect::Data => return Ok(()),
        };

        if self.last_type != Some(expected) {
            return Err(ProtocolViolation::UnexpectedTerminal {
                expected,
                actual: self.last_type,
            }
            .into());
        }

        Ok(())
    }

    fn fail(&mut self, err: NetlinkError) -> Option<Result<Message>> {
        if err.is_protocol_violation() {
            tracing::warn!(error = %err, "netlink protocol violation");
        }
        self.state = State::Finished;
        Some(Err(err))
    }
}

impl<T: Transport + ?Sized> Iterator for DumpReader<'_, T> {
    type Item = Result<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match &mut self.state {
                State::Finished => return None,
                State::Receiving => match self.receive() {
                    Ok(records) => self.state = State::Draining(records),
                    Err(e) => return self.fail(e),
                },
                State::Draining(records) => match records.next() {
                    Some(message) => {
                        return match self.observe(&message) {
                            Ok(()) => Some(Ok(message)),
                            Err(e) => self.fail(e),
                        };
                    }
                    None if self.wants_more() => self.state = State::Receiving,
                    None => {
                        self.state = State::Finished;
                        return self.check_terminal().err().map(Err);
                    }
                },
            }
        }
    }
}
