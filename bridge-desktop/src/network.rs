//! Network Monitoring Implementation

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    network::{NetworkInfo, NetworkMonitor, NetworkStatus, NetworkType},
};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

const DEFAULT_PROBE_ADDRESS: &str = "1.1.1.1:53";
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Desktop network monitor implementation
///
/// Reachability is checked with a TCP connect to a probe address and cached
/// for a short time, so a progress tick does not pay for a probe every time.
/// Desktop connections are reported as unmetered; platform metering APIs
/// (NetworkManager, SystemConfiguration, Windows cost API) are not consulted.
pub struct DesktopNetworkMonitor {
    probe_address: String,
    cache_ttl: Duration,
    cached: Mutex<Option<(Instant, NetworkInfo)>>,
}

impl DesktopNetworkMonitor {
    /// Create a new network monitor
    pub fn new() -> Self {
        Self::with_probe_address(DEFAULT_PROBE_ADDRESS)
    }

    /// Probe a specific `host:port`, typically the media server itself
    pub fn with_probe_address(address: impl Into<String>) -> Self {
        Self {
            probe_address: address.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cached: Mutex::new(None),
        }
    }

    /// Override how long a probe result is reused
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    async fn check_connectivity(&self) -> NetworkStatus {
        match tokio::time::timeout(
            PROBE_TIMEOUT,
            tokio::net::TcpStream::connect(self.probe_address.as_str()),
        )
        .await
        {
            Ok(Ok(_)) => NetworkStatus::Connected,
            Ok(Err(_)) => NetworkStatus::Disconnected,
            Err(_) => NetworkStatus::Indeterminate,
        }
    }
}

impl Default for DesktopNetworkMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NetworkMonitor for DesktopNetworkMonitor {
    async fn get_network_info(&self) -> Result<NetworkInfo> {
        let mut cached = self.cached.lock().await;

        if let Some((checked_at, info)) = cached.as_ref() {
            if checked_at.elapsed() < self.cache_ttl {
                return Ok(info.clone());
            }
        }

        let status = self.check_connectivity().await;
        let info = NetworkInfo {
            status,
            network_type: (status == NetworkStatus::Connected).then_some(NetworkType::Other),
            is_metered: false,
        };

        *cached = Some((Instant::now(), info.clone()));
        debug!(status = ?status, probe = %self.probe_address, "Network info updated");

        Ok(info)
    }
}
