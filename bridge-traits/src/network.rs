//! Network Monitoring Abstraction
//!
//! Provides connectivity and metering information. The progress syncer uses
//! it to decide how often it may contact the server.

use async_trait::async_trait;

use crate::error::Result;

/// Network connection type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkType {
    /// Cellular/mobile data connection
    Cellular,
    /// WiFi connection
    WiFi,
    /// Ethernet connection
    Ethernet,
    /// Other or unknown connection type
    Other,
}

/// Network connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    /// Connected to network
    Connected,
    /// Not connected to any network
    Disconnected,
    /// Connection status unknown or indeterminate
    Indeterminate,
}

/// Network information
#[derive(Debug, Clone)]
pub struct NetworkInfo {
    pub status: NetworkStatus,
    pub network_type: Option<NetworkType>,
    /// Whether the connection is metered (has data limits/costs)
    pub is_metered: bool,
}

impl NetworkInfo {
    /// Connected and free of data caps.
    pub fn is_unmetered(&self) -> bool {
        self.status == NetworkStatus::Connected && !self.is_metered
    }
}

/// Network monitor trait
///
/// # Platform Support
///
/// - **Desktop**: Connectivity probe, connections assumed unmetered
/// - **Android**: ConnectivityManager `NET_CAPABILITY_NOT_METERED`
/// - **iOS**: `NWPath.isExpensive` / `isConstrained`
///
/// # Example
///
/// ```ignore
/// use bridge_traits::network::NetworkMonitor;
///
/// async fn may_push_now(monitor: &dyn NetworkMonitor) -> bool {
///     monitor.is_unmetered().await
/// }
/// ```
#[async_trait]
pub trait NetworkMonitor: Send + Sync {
    /// Get current network information
    async fn get_network_info(&self) -> Result<NetworkInfo>;

    /// Check if currently connected to any network
    async fn is_connected(&self) -> bool {
        matches!(
            self.get_network_info().await,
            Ok(NetworkInfo {
                status: NetworkStatus::Connected,
                ..
            })
        )
    }

    /// Check if the active connection is unmetered
    ///
    /// Lookup failures count as metered.
    async fn is_unmetered(&self) -> bool {
        self.get_network_info()
            .await
            .map(|info| info.is_unmetered())
            .unwrap_or(false)
    }
}
