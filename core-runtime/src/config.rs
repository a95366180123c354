//! # Core Configuration Module
//!
//! Builder-based configuration holding the bridges and server connection the
//! listening-progress core runs with.
//!
//! ## Required Dependencies
//!
//! - `HttpClient` - Remote progress pushes
//! - `FileSystemAccess` - Local progress and session documents
//!
//! ## Optional Dependencies
//!
//! - `NetworkMonitor` - Metered-network detection (absent: network treated as unmetered)
//! - `Clock` - Wall-clock source (default: [`SystemClock`])
//! - `ServerConnectionConfig` - The server the user is currently connected to
//!
//! When the `desktop-shims` feature is enabled, desktop defaults for the HTTP
//! client, file system and network monitor are injected if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, ServerConnectionConfig};
//!
//! let config = CoreConfig::builder()
//!     .data_dir("/home/me/.local/share/listen-sync")
//!     .server(ServerConnectionConfig::new("srv_1", "https://abs.example.com", "user_1", "token"))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // Without desktop shims and without injected bridges this fails fast
//! # #[cfg(feature = "desktop-shims")]
//! # panic!("desktop shims inject defaults");
//! let config = CoreConfig::builder()
//!     .data_dir("/tmp/listen-sync")
//!     .build()
//!     .expect("Should fail - missing required bridges");
//! ```

use crate::error::{Error, Result};
use crate::logging::redact_if_sensitive;
use bridge_traits::{Clock, FileSystemAccess, HttpClient, NetworkMonitor, SystemClock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Connection details of the media server the user is signed in to.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConnectionConfig {
    /// Stable identifier of this connection; sessions reference it.
    pub id: String,
    /// Base URL, e.g. `https://abs.example.com`
    pub address: String,
    pub user_id: String,
    /// Bearer token
    pub token: String,
}

impl ServerConnectionConfig {
    pub fn new(
        id: impl Into<String>,
        address: impl Into<String>,
        user_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            user_id: user_id.into(),
            token: token.into(),
        }
    }

    /// Join an API path onto the server address.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.address.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Config(
                "Server connection id cannot be empty".to_string(),
            ));
        }
        if !(self.address.starts_with("http://") || self.address.starts_with("https://")) {
            return Err(Error::Config(format!(
                "Server address must start with http:// or https://, got '{}'",
                self.address
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for ServerConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConnectionConfig")
            .field("id", &self.id)
            .field("address", &self.address)
            .field("user_id", &self.user_id)
            .field("token", &redact_if_sensitive("token", &self.token))
            .finish()
    }
}

/// Fully resolved core configuration.
#[derive(Clone)]
pub struct CoreConfig {
    /// Root directory for local progress and session documents
    pub data_dir: PathBuf,

    pub server: Option<ServerConnectionConfig>,

    pub http_client: Arc<dyn HttpClient>,

    pub file_system: Arc<dyn FileSystemAccess>,

    pub network_monitor: Option<Arc<dyn NetworkMonitor>>,

    pub clock: Arc<dyn Clock>,

    /// Capacity of the event bus created for the syncer
    pub event_buffer_size: usize,
}

impl fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreConfig")
            .field("data_dir", &self.data_dir)
            .field("server", &self.server)
            .field("http_client", &"HttpClient { ... }")
            .field("file_system", &"FileSystemAccess { ... }")
            .field(
                "network_monitor",
                &self
                    .network_monitor
                    .as_ref()
                    .map(|_| "NetworkMonitor { ... }"),
            )
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(Error::Config("Data directory cannot be empty".to_string()));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if let Some(server) = &self.server {
            server.validate()?;
        }

        Ok(())
    }
}

fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required to push progress to the server. \
                 Desktop: enable the 'desktop-shims' feature to use ReqwestHttpClient. \
                 Mobile: inject the platform HTTP stack."
            .to_string(),
    }
}

fn file_system_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "FileSystemAccess".to_string(),
        message: "FileSystemAccess implementation is required to persist local progress. \
                 Desktop: enable the 'desktop-shims' feature to use TokioFileSystem. \
                 Mobile: inject sandboxed app storage."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Ok(Arc::new(bridge_desktop::ReqwestHttpClient::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_file_system(data_dir: &std::path::Path) -> Result<Arc<dyn FileSystemAccess>> {
    Ok(Arc::new(bridge_desktop::TokioFileSystem::with_data_dir(
        data_dir,
    )))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_file_system(_data_dir: &std::path::Path) -> Result<Arc<dyn FileSystemAccess>> {
    Err(file_system_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_network_monitor() -> Option<Arc<dyn NetworkMonitor>> {
    Some(Arc::new(bridge_desktop::DesktopNetworkMonitor::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_network_monitor() -> Option<Arc<dyn NetworkMonitor>> {
    None
}

#[derive(Default)]
pub struct CoreConfigBuilder {
    data_dir: Option<PathBuf>,
    server: Option<ServerConnectionConfig>,
    http_client: Option<Arc<dyn HttpClient>>,
    file_system: Option<Arc<dyn FileSystemAccess>>,
    network_monitor: Option<Arc<dyn NetworkMonitor>>,
    clock: Option<Arc<dyn Clock>>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    pub fn data_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    pub fn server(mut self, server: ServerConnectionConfig) -> Self {
        self.server = Some(server);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn file_system(mut self, fs: Arc<dyn FileSystemAccess>) -> Self {
        self.file_system = Some(fs);
        self
    }

    pub fn network_monitor(mut self, monitor: Arc<dyn NetworkMonitor>) -> Self {
        self.network_monitor = Some(monitor);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Resolve defaults, check required capabilities and validate.
    pub fn build(self) -> Result<CoreConfig> {
        let data_dir = self
            .data_dir
            .ok_or_else(|| Error::Config("Data directory is required".to_string()))?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let file_system = match self.file_system {
            Some(fs) => fs,
            None => provide_default_file_system(&data_dir)?,
        };

        let config = CoreConfig {
            data_dir,
            server: self.server,
            http_client,
            file_system,
            network_monitor: self
                .network_monitor
                .or_else(provide_default_network_monitor),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            event_buffer_size: self
                .event_buffer_size
                .unwrap_or(crate::events::DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpRequest, HttpResponse};
    use std::path::Path;

    struct NoopHttp;

    #[async_trait::async_trait]
    impl HttpClient for NoopHttp {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Err(bridge_traits::BridgeError::NotAvailable("http".to_string()))
        }
    }

    struct NoopFs;

    #[async_trait::async_trait]
    impl FileSystemAccess for NoopFs {
        async fn get_data_directory(&self) -> BridgeResult<PathBuf> {
            Ok(PathBuf::from("/tmp"))
        }
        async fn exists(&self, _path: &Path) -> BridgeResult<bool> {
            Ok(false)
        }
        async fn create_dir_all(&self, _path: &Path) -> BridgeResult<()> {
            Ok(())
        }
        async fn read_file(&self, _path: &Path) -> BridgeResult<bytes::Bytes> {
            Err(bridge_traits::BridgeError::NotAvailable("fs".to_string()))
        }
        async fn write_file(&self, _path: &Path, _data: bytes::Bytes) -> BridgeResult<()> {
            Ok(())
        }
        async fn delete_file(&self, _path: &Path) -> BridgeResult<()> {
            Ok(())
        }
    }

    fn server() -> ServerConnectionConfig {
        ServerConnectionConfig::new("srv_1", "https://abs.example.com/", "user_1", "s3cr3t")
    }

    #[test]
    fn test_builder_with_injected_bridges() {
        let config = CoreConfig::builder()
            .data_dir("/tmp/listen-sync")
            .server(server())
            .http_client(Arc::new(NoopHttp))
            .file_system(Arc::new(NoopFs))
            .event_buffer_size(16)
            .build()
            .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/listen-sync"));
        assert_eq!(config.event_buffer_size, 16);
        assert_eq!(config.server.as_ref().unwrap().id, "srv_1");
    }

    #[test]
    fn test_missing_data_dir() {
        let result = CoreConfig::builder()
            .http_client(Arc::new(NoopHttp))
            .file_system(Arc::new(NoopFs))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_http_client_fails_fast() {
        let result = CoreConfig::builder()
            .data_dir("/tmp/listen-sync")
            .file_system(Arc::new(NoopFs))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "HttpClient")
            }
            other => panic!("expected CapabilityMissing, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_invalid_server_address() {
        let result = CoreConfig::builder()
            .data_dir("/tmp/listen-sync")
            .server(ServerConnectionConfig::new("srv_1", "abs.local", "u", "t"))
            .http_client(Arc::new(NoopHttp))
            .file_system(Arc::new(NoopFs))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_server_endpoint_and_redacted_debug() {
        let server = server();
        assert_eq!(
            server.endpoint("/api/session/local"),
            "https://abs.example.com/api/session/local"
        );

        let debug = format!("{:?}", server);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("s3cr3t"));
    }
}
