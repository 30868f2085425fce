//! `AF_NETLINK` datagram socket.

use std::io;
use std::mem;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd};
use std::time::Duration;

use super::{Datagram, Transport};

/// Netlink protocol (socket family member) to bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum NetlinkProtocol {
    /// Routing and link updates.
    Route = 0,
    /// Socket monitoring.
    SockDiag = 4,
    /// Auditing.
    Audit = 9,
    /// Netfilter subsystems.
    Netfilter = 12,
    /// Kernel object events.
    KobjectUevent = 15,
    /// Generic netlink.
    Generic = 16,
}

/// A netlink socket bound to a kernel-assigned port ID.
///
/// Requests are sent without a destination, which addresses the kernel.
#[derive(Debug)]
pub struct NetlinkSocket {
    fd: OwnedFd,
    protocol: NetlinkProtocol,
}

impl NetlinkSocket {
    /// Open a raw netlink socket for `protocol` and bind it, letting the
    /// kernel pick the port ID.
    pub fn bind(protocol: NetlinkProtocol) -> io::Result<Self> {
        // SAFETY: plain syscall with constant arguments; the result is checked.
        let raw = unsafe {
            libc::socket(
                libc::AF_NETLINK,
                libc::SOCK_RAW | libc::SOCK_CLOEXEC,
                protocol as libc::c_int,
            )
        };
        if raw < 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: `raw` is a freshly opened descriptor owned by nobody else.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        // SAFETY: `sockaddr_nl` is plain data; all-zero is a valid value.
        let mut addr: libc::sockaddr_nl = unsafe { mem::zeroed() };
        addr.nl_family = libc::AF_NETLINK as libc::sa_family_t;

        // SAFETY: `addr` outlives the call and the length matches its type.
        let rc = unsafe {
            libc::bind(
                fd.as_raw_fd(),
                std::ptr::addr_of!(addr).cast(),
                mem::size_of::<libc::sockaddr_nl>() as libc::socklen_t,
            )
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }

        tracing::debug!(?protocol, fd = fd.as_raw_fd(), "bound netlink socket");
        Ok(Self { fd, protocol })
    }

    /// The protocol this socket was opened for.
    pub fn protocol(&self) -> NetlinkProtocol {
        self.protocol
    }

    /// Port ID assigned by the kernel at bind time.
    pub fn port_id(&self) -> io::Result<u32> {
        // SAFETY: `sockaddr_nl` is plain data; all-zero is a valid value.
        let mut addr: libc::sockaddr_nl = unsafe { mem::zeroed() };
        let mut len = mem::size_of::<libc::sockaddr_nl>() as libc::socklen_t;

        // SAFETY: `addr` and `len` are live, writable and sized for `sockaddr_nl`.
        let rc = unsafe {
            libc::getsockname(
                self.fd.as_raw_fd(),
                std::ptr::addr_of_mut!(addr).cast(),
                &mut len,
            )
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(addr.nl_pid)
    }

    /// Set read timeout. A timed-out receive fails with `WouldBlock`.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        let tv = match timeout {
            Some(d) => libc::timeval {
                tv_sec: d.as_secs() as libc::time_t,
                tv_usec: d.subsec_micros() as libc::suseconds_t,
            },
            None => libc::timeval {
                tv_sec: 0,
                tv_usec: 0,
            },
        };

        // SAFETY: `tv` outlives the call and the length matches `timeval`.
        let rc = unsafe {
            libc::setsockopt(
                self.fd.as_raw_fd(),
                libc::SOL_SOCKET,
                libc::SO_RCVTIMEO,
                std::ptr::addr_of!(tv).cast(),
                mem::size_of::<libc::timeval>() as libc::socklen_t,
            )
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl Transport for NetlinkSocket {
    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut iov = libc::iovec {
            iov_base: data.as_ptr() as *mut libc::c_void,
            iov_len: data.len(),
        };
        // SAFETY: `msghdr` is plain data; null pointers with zero lengths are valid.
        let mut msg: libc::msghdr = unsafe { mem::zeroed() };
        msg.msg_iov = &mut iov;
        msg.msg_iovlen = 1;

        // SAFETY: `iov` points into `data`, which stays borrowed for the call;
        // the kernel only reads through it.
        let sent = unsafe { libc::sendmsg(self.fd.as_raw_fd(), &msg, 0) };
        if sent < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(sent as usize)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<Datagram> {
        let mut iov = libc::iovec {
            iov_base: buf.as_mut_ptr().cast(),
            iov_len: buf.len(),
        };
        // SAFETY: `msghdr` is plain data; null pointers with zero lengths are valid.
        let mut msg: libc::msghdr = unsafe { mem::zeroed() };
        msg.msg_iov = &mut iov;
        msg.msg_iovlen = 1;

        // SAFETY: `iov` covers exactly `buf`, which is mutably borrowed for the call.
        let received = unsafe { libc::recvmsg(self.fd.as_raw_fd(), &mut msg, 0) };
        if received < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Datagram {
            len: (received as usize).min(buf.len()),
            truncated: msg.msg_flags & libc::MSG_TRUNC == libc::MSG_TRUNC,
        })
    }

    fn local_port_id(&self) -> io::Result<u32> {
        self.port_id()
    }
}

impl AsFd for NetlinkSocket {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl AsRawFd for NetlinkSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}
