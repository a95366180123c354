use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("Progress store error: {0}")]
    Store(String),

    #[error("Remote sync failed: {0}")]
    Remote(String),

    #[error("Server rejected progress sync (status {status}): {message}")]
    RemoteStatus { status: u16, message: String },

    #[error("Not connected to a server")]
    NotConnected,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Progress syncer has shut down")]
    SyncerClosed,

    #[error("Invalid syncer configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Runtime(#[from] core_runtime::Error),
}

pub type Result<T> = std::result::Result<T, ProgressError>;
