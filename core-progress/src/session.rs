//! # Session Data Model
//!
//! - [`PlaybackSession`]: one continuous listening session, mutated in place
//!   by every sync
//! - [`SyncSample`]: what a single sync reports (listened seconds, duration,
//!   position)
//! - [`LocalProgressRecord`]: durable per-media progress kept on device
//! - [`RemoteProgress`]: progress fetched from the server
//!
//! All types serialize in camelCase to match the server's session API.

use core_runtime::events::{ProgressEvent, SessionSummary};
use serde::{Deserialize, Serialize};

/// Progress fraction at which a local record counts as finished.
pub const FINISHED_THRESHOLD: f64 = 0.99;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSession {
    pub id: String,
    pub display_title: String,
    /// Server library item, also set for local copies of server items
    pub library_item_id: Option<String>,
    pub episode_id: Option<String>,
    /// Seconds; authoritative media length
    pub duration: f64,
    /// Seconds
    pub current_time: f64,
    /// Seconds listened during this session
    #[serde(default)]
    pub time_listening: u64,
    /// Media file lives on this device
    pub is_local: bool,
    /// Server connection the local item was downloaded from
    pub server_connection_config_id: Option<String>,
    pub local_library_item_id: Option<String>,
    pub started_at: i64,
    pub updated_at: i64,
}

impl PlaybackSession {
    /// A server-backed session at position zero.
    pub fn new(id: impl Into<String>, display_title: impl Into<String>, duration: f64) -> Self {
        Self {
            id: id.into(),
            display_title: display_title.into(),
            library_item_id: None,
            episode_id: None,
            duration,
            current_time: 0.0,
            time_listening: 0,
            is_local: false,
            server_connection_config_id: None,
            local_library_item_id: None,
            started_at: 0,
            updated_at: 0,
        }
    }

    /// Fraction of the media consumed; NaN when the duration is unusable.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 && self.duration.is_finite() {
            self.current_time / self.duration
        } else {
            f64::NAN
        }
    }

    /// Identifier of the local progress record for this session's media.
    ///
    /// Podcast episodes get one record per episode.
    pub fn local_media_progress_id(&self) -> String {
        let item = self
            .local_library_item_id
            .clone()
            .unwrap_or_else(|| format!("session-{}", self.id));

        match self.episode_id.as_deref() {
            Some(episode) if !episode.is_empty() => format!("{}-{}", item, episode),
            _ => item,
        }
    }

    /// Whether the session is a local copy of an item on a server.
    pub fn is_linked_to_server(&self) -> bool {
        self.library_item_id
            .as_deref()
            .is_some_and(|id| !id.is_empty())
            && self.server_connection_config_id.is_some()
    }

    /// Fold one sync sample into the session.
    pub fn apply_sync(&mut self, sample: &SyncSample, now_millis: i64) {
        self.time_listening += sample.time_listened;
        self.current_time = sample.current_time;
        self.updated_at = now_millis;
    }

    pub fn new_local_progress(&self, now_millis: i64) -> LocalProgressRecord {
        let mut record = LocalProgressRecord {
            id: self.local_media_progress_id(),
            local_library_item_id: self.local_library_item_id.clone(),
            library_item_id: self.library_item_id.clone(),
            episode_id: self.episode_id.clone(),
            server_connection_config_id: self.server_connection_config_id.clone(),
            duration: self.duration,
            current_time: self.current_time,
            progress: 0.0,
            is_finished: false,
            started_at: self.started_at,
            finished_at: None,
            last_update: now_millis,
        };
        record.update_from_session(self, now_millis);
        record
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id.clone(),
            display_title: self.display_title.clone(),
            library_item_id: self.library_item_id.clone(),
            episode_id: self.episode_id.clone(),
            is_local: self.is_local,
            current_time: self.current_time,
            duration: self.duration,
            time_listening: self.time_listening,
            updated_at: self.updated_at,
        }
    }
}

/// Payload of one progress sync.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSample {
    /// Whole seconds listened since the previous sync
    pub time_listened: u64,
    pub duration: f64,
    pub current_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalProgressRecord {
    pub id: String,
    pub local_library_item_id: Option<String>,
    pub library_item_id: Option<String>,
    pub episode_id: Option<String>,
    pub server_connection_config_id: Option<String>,
    pub duration: f64,
    pub current_time: f64,
    /// Fraction in `[0, 1]`
    pub progress: f64,
    pub is_finished: bool,
    pub started_at: i64,
    pub finished_at: Option<i64>,
    pub last_update: i64,
}

impl LocalProgressRecord {
    pub fn update_from_session(&mut self, session: &PlaybackSession, now_millis: i64) {
        self.current_time = session.current_time;
        self.duration = session.duration;
        self.progress = session.progress();
        self.last_update = now_millis;

        let was_finished = self.is_finished;
        self.is_finished = self.progress >= FINISHED_THRESHOLD;
        if self.is_finished && !was_finished {
            self.finished_at = Some(now_millis);
        } else if !self.is_finished {
            self.finished_at = None;
        }
    }

    pub fn progress_percent(&self) -> f64 {
        (self.progress * 100.0).round()
    }

    pub fn to_event(&self) -> ProgressEvent {
        ProgressEvent::LocalProgressUpdated {
            progress_id: self.id.clone(),
            library_item_id: self.library_item_id.clone(),
            episode_id: self.episode_id.clone(),
            current_time: self.current_time,
            duration: self.duration,
            progress: self.progress,
            is_finished: self.is_finished,
            last_update: self.last_update,
        }
    }
}

/// Media progress as reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProgress {
    pub id: String,
    pub library_item_id: String,
    pub episode_id: Option<String>,
    pub duration: f64,
    pub current_time: f64,
    pub progress: f64,
    pub is_finished: bool,
    pub last_update: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_session() -> PlaybackSession {
        PlaybackSession {
            is_local: true,
            local_library_item_id: Some("local_li_1".to_string()),
            library_item_id: Some("li_1".to_string()),
            server_connection_config_id: Some("srv_1".to_string()),
            current_time: 180.0,
            ..PlaybackSession::new("play_1", "Dune", 3600.0)
        }
    }

    #[test]
    fn test_progress_fraction_stays_in_unit_interval() {
        let mut session = PlaybackSession::new("play_1", "Dune", 3600.0);
        for position in [0.0, 0.5, 15.0, 1800.0, 3599.9, 3600.0] {
            session.current_time = position;
            let progress = session.progress();
            assert!(!progress.is_nan());
            assert!((0.0..=1.0).contains(&progress), "{} out of range", progress);
        }
    }

    #[test]
    fn test_progress_is_nan_without_duration() {
        let mut session = PlaybackSession::new("play_1", "Dune", 0.0);
        session.current_time = 10.0;
        assert!(session.progress().is_nan());

        session.duration = f64::NAN;
        assert!(session.progress().is_nan());
    }

    #[test]
    fn test_apply_sync_accumulates_listening_time() {
        let mut session = local_session();
        let sample = SyncSample {
            time_listened: 15,
            duration: 3600.0,
            current_time: 105.0,
        };

        session.apply_sync(&sample, 1_000);
        session.apply_sync(&SyncSample { time_listened: 14, current_time: 119.0, ..sample }, 2_000);

        assert_eq!(session.time_listening, 29);
        assert_eq!(session.current_time, 119.0);
        assert_eq!(session.updated_at, 2_000);
    }

    #[test]
    fn test_local_media_progress_id() {
        let mut session = local_session();
        assert_eq!(session.local_media_progress_id(), "local_li_1");

        session.episode_id = Some("ep_7".to_string());
        assert_eq!(session.local_media_progress_id(), "local_li_1-ep_7");

        session.local_library_item_id = None;
        assert_eq!(session.local_media_progress_id(), "session-play_1-ep_7");
    }

    #[test]
    fn test_server_link_requires_item_and_connection() {
        let mut session = local_session();
        assert!(session.is_linked_to_server());

        session.library_item_id = Some(String::new());
        assert!(!session.is_linked_to_server());

        session.library_item_id = Some("li_1".to_string());
        session.server_connection_config_id = None;
        assert!(!session.is_linked_to_server());
    }

    #[test]
    fn test_local_record_marks_finished_once() {
        let mut session = local_session();
        let mut record = session.new_local_progress(1_000);
        assert_eq!(record.id, "local_li_1");
        assert!(!record.is_finished);
        assert_eq!(record.progress_percent(), 5.0);

        session.current_time = 3590.0;
        record.update_from_session(&session, 2_000);
        assert!(record.is_finished);
        assert_eq!(record.finished_at, Some(2_000));

        session.current_time = 3600.0;
        record.update_from_session(&session, 3_000);
        assert_eq!(record.finished_at, Some(2_000));
        assert_eq!(record.last_update, 3_000);
    }

    #[test]
    fn test_session_serializes_camel_case() {
        let json = serde_json::to_value(local_session()).unwrap();
        assert_eq!(json["displayTitle"], "Dune");
        assert_eq!(json["serverConnectionConfigId"], "srv_1");
        assert_eq!(json["currentTime"], 180.0);

        let sample = SyncSample {
            time_listened: 15,
            duration: 3600.0,
            current_time: 105.0,
        };
        let json = serde_json::to_value(sample).unwrap();
        assert_eq!(json["timeListened"], 15);
    }
}
