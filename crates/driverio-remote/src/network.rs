//! Network association.
//!
//! The host operating system owns the radio. [`HostNetwork`] only waits for
//! the host to hold a routable IPv4 address and reports it.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::WifiCredentials;
use crate::error::RemoteError;
use crate::settings::NetworkSettings;

/// Brings the network up and reports the local address.
pub trait NetworkLink {
    /// Associate with the network named in `credentials`, waiting at most
    /// `timeout` for an address.
    fn associate(
        &mut self,
        credentials: &WifiCredentials,
        timeout: Duration,
    ) -> Result<IpAddr, RemoteError>;
}

/// Link backed by the host's own network stack.
#[derive(Debug, Clone, Copy)]
pub struct HostNetwork {
    poll_interval: Duration,
}

impl HostNetwork {
    /// Link polling at the configured interval.
    #[must_use]
    pub fn new(settings: &NetworkSettings) -> Self {
        Self {
            poll_interval: settings.poll_interval,
        }
    }
}

impl NetworkLink for HostNetwork {
    fn associate(
        &mut self,
        credentials: &WifiCredentials,
        timeout: Duration,
    ) -> Result<IpAddr, RemoteError> {
        info!(ssid = %credentials.ssid, "waiting for network");
        let started = Instant::now();
        loop {
            if let Some(addr) = local_address() {
                info!(%addr, "network connected");
                return Ok(addr);
            }
            if started.elapsed() >= timeout {
                return Err(RemoteError::Network(
                    format!(
                        "no address on network '{}' after {}s",
                        credentials.ssid,
                        timeout.as_secs()
                    )
                    .into(),
                ));
            }
            thread::sleep(self.poll_interval);
        }
    }
}

/// Address the host would use for outbound traffic, if it has a route.
/// Connecting a UDP socket sends nothing; it only selects a source address.
fn local_address() -> Option<IpAddr> {
    let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))).ok()?;
    if let Err(err) = socket.connect(SocketAddr::from((Ipv4Addr::new(192, 0, 2, 1), 9))) {
        debug!(%err, "no route yet");
        return None;
    }
    let addr = socket.local_addr().ok()?.ip();
    (!addr.is_unspecified() && !addr.is_loopback()).then_some(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> WifiCredentials {
        WifiCredentials {
            ssid: "lab".into(),
            password: "pw".into(),
        }
    }

    #[test]
    fn host_network_gives_up_after_timeout() {
        let mut link = HostNetwork::new(&NetworkSettings {
            timeout: Duration::ZERO,
            poll_interval: Duration::from_millis(1),
        });
        let started = Instant::now();
        // Either the host has a route or the zero timeout fails at once.
        match link.associate(&credentials(), Duration::ZERO) {
            Ok(addr) => assert!(!addr.is_loopback()),
            Err(err) => {
                assert!(matches!(err, RemoteError::Network(_)));
                assert!(err.is_startup());
            }
        }
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
