//! Scripted in-memory transport for unit tests.

use std::collections::VecDeque;
use std::io;

use bytes::Bytes;

use super::{Datagram, Transport};

/// What the next `recv` call returns.
#[derive(Debug)]
pub(crate) enum Reply {
    Datagram(Bytes),
    Error(io::ErrorKind),
}

#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    pub sent: Vec<Bytes>,
    pub replies: VecDeque<Reply>,
    pub recv_calls: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, datagram: impl Into<Bytes>) -> Self {
        self.replies.push_back(Reply::Datagram(datagram.into()));
        self
    }

    pub fn fail(mut self, kind: io::ErrorKind) -> Self {
        self.replies.push_back(Reply::Error(kind));
        self
    }
}

impl Transport for MockTransport {
    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        self.sent.push(Bytes::copy_from_slice(data));
        Ok(data.len())
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<Datagram> {
        self.recv_calls += 1;
        match self.replies.pop_front() {
            Some(Reply::Datagram(data)) => {
                let len = data.len().min(buf.len());
                buf[..len].copy_from_slice(&data[..len]);
                Ok(Datagram {
                    len,
                    truncated: data.len() > buf.len(),
                })
            }
            Some(Reply::Error(kind)) => Err(io::Error::from(kind)),
            None => Err(io::Error::from(io::ErrorKind::WouldBlock)),
        }
    }

    fn local_port_id(&self) -> io::Result<u32> {
        Ok(4242)
    }
}
