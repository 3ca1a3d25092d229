use std::net::{SocketAddr, ToSocketAddrs};

use crate::{MetricResult, MetricsError};

/// Default port of the InfluxDB UDP listener.
pub const DEFAULT_UDP_PORT: u16 = 8089;

/// Describes where measurements are sent: a host name or address and a port.
///
/// The host is resolved once, when a sender is built from the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdpInfluxdbProtocol {
    host: String,
    port: u16,
}

impl UdpInfluxdbProtocol {
    /// Creates a descriptor for `host:port`.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The destination host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The destination port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Resolves the descriptor into the first matching socket address.
    ///
    /// # Errors
    /// Returns [`MetricsError::UnresolvedDestination`] if the lookup fails or
    /// yields no address.
    pub fn resolve(&self) -> MetricResult<SocketAddr> {
        let unresolved = || MetricsError::UnresolvedDestination {
            host: self.host.clone(),
            port: self.port,
        };
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|err| {
                tracing::debug!("lookup of {}:{} failed: {err}", self.host, self.port);
                unresolved()
            })?
            .next()
            .ok_or_else(unresolved)
    }
}

impl Default for UdpInfluxdbProtocol {
    fn default() -> Self {
        Self::new("127.0.0.1", DEFAULT_UDP_PORT)
    }
}
