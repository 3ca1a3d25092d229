use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

/// A connectionless endpoint that sends discrete datagrams.
///
/// Implement this together with [`ChannelFactory`] to route datagrams somewhere
/// other than a real socket.
pub trait DatagramChannel {
    /// Sends `buf` as one datagram to `destination`.
    ///
    /// # Errors
    /// Returns the I/O error reported by the underlying endpoint.
    fn send_to(&self, buf: &[u8], destination: SocketAddr) -> io::Result<usize>;

    /// Releases the channel.
    ///
    /// # Errors
    /// Returns any error surfaced while tearing the channel down.
    fn close(self) -> io::Result<()>;
}

/// Opens a fresh [`DatagramChannel`] for each batch.
pub trait ChannelFactory {
    /// The channel type produced by this factory.
    type Channel: DatagramChannel;

    /// Opens a new channel.
    ///
    /// # Errors
    /// Returns the I/O error that prevented the channel from being created.
    fn open(&self) -> io::Result<Self::Channel>;
}

impl<T> ChannelFactory for &T
where
    T: ChannelFactory,
{
    type Channel = T::Channel;

    fn open(&self) -> io::Result<Self::Channel> {
        (*self).open()
    }
}

/// A [`DatagramChannel`] backed by a bound [`UdpSocket`].
#[derive(Debug)]
pub struct UdpChannel {
    sock: UdpSocket,
}

impl UdpChannel {
    /// Local address the socket is bound to.
    ///
    /// # Errors
    /// Returns the error from [`UdpSocket::local_addr`].
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.sock.local_addr()
    }
}

impl DatagramChannel for UdpChannel {
    fn send_to(&self, buf: &[u8], destination: SocketAddr) -> io::Result<usize> {
        self.sock.send_to(buf, destination)
    }

    fn close(self) -> io::Result<()> {
        // pending asynchronous errors (e.g. ICMP port unreachable) surface here,
        // the descriptor itself is closed on drop
        match self.sock.take_error()? {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Binds a new [`UdpSocket`] every time a channel is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpChannelFactory {
    bind_addr: SocketAddr,
}

impl UdpChannelFactory {
    /// Creates a factory binding sockets to `bind_addr`.
    #[must_use]
    pub const fn new(bind_addr: SocketAddr) -> Self {
        Self { bind_addr }
    }

    /// Creates a factory binding an ephemeral port on the unspecified address
    /// of the same family as `destination`.
    #[must_use]
    pub fn for_destination(destination: SocketAddr) -> Self {
        let bind_addr = match destination {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
        };
        Self::new(bind_addr)
    }

    /// Address new sockets are bound to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

impl ChannelFactory for UdpChannelFactory {
    type Channel = UdpChannel;

    fn open(&self) -> io::Result<UdpChannel> {
        Ok(UdpChannel {
            sock: UdpSocket::bind(self.bind_addr)?,
        })
    }
}
