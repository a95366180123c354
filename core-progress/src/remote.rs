//! # Remote Sync Client
//!
//! Pushes listening progress to the media server.
//!
//! Two calls exist, matching the two kinds of session:
//!
//! - server-backed sessions report a [`SyncSample`] against the open server
//!   session (`POST /api/session/{id}/sync`)
//! - local sessions linked to a server item upload the whole session
//!   (`POST /api/session/local`)
//!
//! Requests are made once. The progress tick is the retry loop, and repeated
//! failures surface to the user through the syncer's alert counter.

use crate::error::{ProgressError, Result};
use crate::session::{PlaybackSession, SyncSample};
use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use core_runtime::config::ServerConnectionConfig;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

/// Network side of progress synchronization.
#[async_trait]
pub trait RemoteSyncClient: Send + Sync {
    /// Id of the server connection currently in use, if any.
    async fn connected_server_id(&self) -> Option<String>;

    /// Report progress for a server-backed session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it
    async fn send_progress_sync(&self, session_id: &str, sample: &SyncSample) -> Result<()>;

    /// Upload a local session for an item that also lives on the server.
    async fn send_local_progress_sync(&self, session: &PlaybackSession) -> Result<()>;
}

/// [`RemoteSyncClient`] over the host [`HttpClient`] bridge.
pub struct HttpRemoteSyncClient {
    http_client: Arc<dyn HttpClient>,
    server: RwLock<Option<ServerConnectionConfig>>,
    timeout: Duration,
}

impl HttpRemoteSyncClient {
    pub fn new(http_client: Arc<dyn HttpClient>, timeout: Duration) -> Self {
        Self {
            http_client,
            server: RwLock::new(None),
            timeout,
        }
    }

    pub fn with_server(self, server: Option<ServerConnectionConfig>) -> Self {
        Self {
            server: RwLock::new(server),
            ..self
        }
    }

    /// Switch to another server connection.
    pub async fn connect(&self, server: ServerConnectionConfig) {
        debug!(server_id = %server.id, address = %server.address, "Connected remote sync client");
        *self.server.write().await = Some(server);
    }

    pub async fn disconnect(&self) {
        *self.server.write().await = None;
    }

    async fn post<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<HttpResponse> {
        let server = self
            .server
            .read()
            .await
            .clone()
            .ok_or(ProgressError::NotConnected)?;

        let request = HttpRequest::post_json(server.endpoint(path), body)
            .map_err(|e| ProgressError::Remote(e.to_string()))?
            .bearer_token(&server.token)
            .timeout(self.timeout);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| ProgressError::Remote(e.to_string()))?;

        if response.is_success() {
            Ok(response)
        } else {
            let error = ProgressError::RemoteStatus {
                status: response.status,
                message: response.error_message(),
            };
            warn!(path, status = response.status, "Progress sync rejected by server");
            Err(error)
        }
    }
}

#[async_trait]
impl RemoteSyncClient for HttpRemoteSyncClient {
    async fn connected_server_id(&self) -> Option<String> {
        self.server.read().await.as_ref().map(|server| server.id.clone())
    }

    #[instrument(skip(self, sample), fields(time_listened = sample.time_listened))]
    async fn send_progress_sync(&self, session_id: &str, sample: &SyncSample) -> Result<()> {
        self.post(&format!("/api/session/{}/sync", session_id), sample)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, session), fields(session_id = %session.id))]
    async fn send_local_progress_sync(&self, session: &PlaybackSession) -> Result<()> {
        self.post("/api/session/local", session).await?;
        Ok(())
    }
}
