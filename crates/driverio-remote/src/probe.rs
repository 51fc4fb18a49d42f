//! Reachability probe for the Driver IO board.
//!
//! A bounded-timeout TCP connect to the board's administrative port. No
//! bytes are exchanged; the stream is dropped as soon as the connect
//! resolves. Every failure (resolution, timeout, refusal) reads as
//! unreachable.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::settings::ProbeSettings;

/// Result of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    /// Whether a connection was established within the timeout.
    pub reachable: bool,
}

/// Connectivity check against a host.
pub trait ReachabilityProbe: Send {
    /// Probe `host`. Never fails; failures report `reachable = false`.
    fn probe(&self, host: &str) -> ProbeResult;
}

/// TCP connect probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpProbe {
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    /// Administrative (SSH) port probed by default.
    pub const ADMIN_PORT: u16 = 22;
    /// Connect timeout used by default.
    pub const TIMEOUT: Duration = Duration::from_secs(5);

    /// Probe `port` with the given connect timeout.
    #[must_use]
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    /// Probe configured by the `[probe]` settings section.
    #[must_use]
    pub fn from_settings(settings: &ProbeSettings) -> Self {
        Self::new(settings.port, settings.timeout)
    }

    /// Port being probed.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    fn resolve(&self, host: &str) -> Vec<SocketAddr> {
        match (host, self.port).to_socket_addrs() {
            Ok(addrs) => addrs.collect(),
            Err(err) => {
                debug!(host, %err, "probe address resolution failed");
                Vec::new()
            }
        }
    }

    /// Try `addrs` in order. The timeout bounds all attempts together.
    fn connect_any(&self, addrs: &[SocketAddr]) -> bool {
        let deadline = Instant::now() + self.timeout;
        for addr in addrs {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                debug!(%addr, "probe deadline reached");
                break;
            }
            match TcpStream::connect_timeout(addr, remaining) {
                Ok(_stream) => return true,
                Err(err) => debug!(%addr, %err, "probe connect failed"),
            }
        }
        false
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(Self::ADMIN_PORT, Self::TIMEOUT)
    }
}

impl ReachabilityProbe for TcpProbe {
    fn probe(&self, host: &str) -> ProbeResult {
        let reachable = self.connect_any(&self.resolve(host));
        info!(host, port = self.port, reachable, "driver io probe");
        ProbeResult { reachable }
    }
}
