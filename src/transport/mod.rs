//! Datagram transport consumed by the exchange engine.
//!
//! The engine only needs to send a datagram, receive one into a fixed
//! buffer (learning whether it was truncated) and know its own port ID.
//! [`NetlinkSocket`] provides this over a real `AF_NETLINK` socket on Linux.

use std::io;

use crate::config::ExchangeConfig;

#[cfg(target_os = "linux")]
pub mod socket;

#[cfg(target_os = "linux")]
pub use socket::{NetlinkProtocol, NetlinkSocket};

#[cfg(test)]
pub(crate) mod mock;

/// Outcome of a single receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Datagram {
    /// Bytes written into the receive buffer.
    pub len: usize,
    /// The datagram was larger than the buffer and got cut.
    pub truncated: bool,
}

/// A connectionless datagram endpoint.
pub trait Transport {
    /// Send one datagram.
    fn send(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Receive one datagram into `buf`.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<Datagram>;

    /// Port ID the endpoint is bound to.
    fn local_port_id(&self) -> io::Result<u32>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).send(data)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<Datagram> {
        (**self).recv(buf)
    }

    fn local_port_id(&self) -> io::Result<u32> {
        (**self).local_port_id()
    }
}

/// Run `op`, retrying while it fails with [`io::ErrorKind::Interrupted`].
pub(crate) fn retry_interrupted<R>(
    config: &ExchangeConfig,
    mut op: impl FnMut() -> io::Result<R>,
) -> io::Result<R> {
    let mut attempt = 0;
    loop {
        match op() {
            Err(e)
                if e.kind() == io::ErrorKind::Interrupted
                    && config.should_retry_interrupt(attempt) =>
            {
                tracing::trace!(attempt, "retrying interrupted call");
                attempt += 1;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_interrupted_until_success() {
        let mut calls = 0;
        let result = retry_interrupted(&ExchangeConfig::default(), || {
            calls += 1;
            if calls < 4 {
                Err(io::Error::from(io::ErrorKind::Interrupted))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result.unwrap(), 4);
    }

    #[test]
    fn test_retry_interrupted_gives_up() {
        let config = ExchangeConfig::default().with_interrupt_retries(Some(2));
        let mut calls = 0;
        let result: io::Result<()> = retry_interrupted(&config, || {
            calls += 1;
            Err(io::Error::from(io::ErrorKind::Interrupted))
        });
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::Interrupted);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_other_errors_not_retried() {
        let mut calls = 0;
        let result: io::Result<()> = retry_interrupted(&ExchangeConfig::default(), || {
            calls += 1;
            Err(io::Error::from(io::ErrorKind::ConnectionRefused))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
