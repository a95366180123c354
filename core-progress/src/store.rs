//! # Local Progress Store
//!
//! Persistence of local progress records and local playback sessions.
//!
//! [`FileProgressStore`] keeps one JSON document per record under the data
//! directory:
//!
//! ```text
//! <data_dir>/progress/<progress-id>.json
//! <data_dir>/sessions/<session-id>.json
//! ```

use crate::error::{ProgressError, Result};
use crate::session::{LocalProgressRecord, PlaybackSession};
use async_trait::async_trait;
use bridge_traits::storage::FileSystemAccess;
use bytes::Bytes;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const PROGRESS_DIR: &str = "progress";
const SESSIONS_DIR: &str = "sessions";

/// Storage for on-device progress.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Load a local progress record by id
    ///
    /// # Errors
    ///
    /// Returns an error if the record exists but cannot be read or decoded
    async fn get_local_progress(&self, id: &str) -> Result<Option<LocalProgressRecord>>;

    /// Insert or replace a local progress record
    async fn save_local_progress(&self, record: &LocalProgressRecord) -> Result<()>;

    /// Insert or replace a local playback session
    async fn save_session(&self, session: &PlaybackSession) -> Result<()>;
}

/// JSON-file implementation of [`ProgressStore`].
pub struct FileProgressStore {
    file_system: Arc<dyn FileSystemAccess>,
    root: PathBuf,
}

impl FileProgressStore {
    pub fn new(file_system: Arc<dyn FileSystemAccess>, root: impl Into<PathBuf>) -> Self {
        Self {
            file_system,
            root: root.into(),
        }
    }

    fn progress_path(&self, id: &str) -> PathBuf {
        document_path(&self.root, PROGRESS_DIR, id)
    }

    fn session_path(&self, id: &str) -> PathBuf {
        document_path(&self.root, SESSIONS_DIR, id)
    }

    async fn write_json<T: serde::Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let data = serde_json::to_vec(value)?;
        self.file_system
            .write_file(path, Bytes::from(data))
            .await
            .map_err(|e| ProgressError::Store(format!("Failed to write {}: {}", path.display(), e)))
    }
}

fn document_path(root: &Path, dir: &str, id: &str) -> PathBuf {
    root.join(dir).join(format!("{}.json", file_stem(id)))
}

/// Percent-encode an identifier into a file stem.
///
/// Distinct ids always map to distinct stems, and separators never survive.
fn file_stem(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

#[async_trait]
impl ProgressStore for FileProgressStore {
    async fn get_local_progress(&self, id: &str) -> Result<Option<LocalProgressRecord>> {
        let path = self.progress_path(id);
        let data = self
            .file_system
            .read_file_if_exists(&path)
            .await
            .map_err(|e| ProgressError::Store(format!("Failed to read {}: {}", path.display(), e)))?;

        match data {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn save_local_progress(&self, record: &LocalProgressRecord) -> Result<()> {
        let path = self.progress_path(&record.id);
        self.write_json(&path, record).await?;
        debug!(progress_id = %record.id, current_time = record.current_time, "Saved local progress");
        Ok(())
    }

    async fn save_session(&self, session: &PlaybackSession) -> Result<()> {
        let path = self.session_path(&session.id);
        self.write_json(&path, session).await?;
        debug!(session_id = %session.id, "Saved local playback session");
        Ok(())
    }
}
