//! # Event Bus System
//!
//! Playback lifecycle and progress events, delivered over
//! `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! - **Event Types**: [`CoreEvent`] wraps [`PlaybackEvent`] (session lifecycle,
//!   periodic saves) and [`ProgressEvent`] (local progress record updates)
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Receiver wrapper with optional predicate filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐   emit    ┌───────────┐   subscribe   ┌──────────────────┐
//! │ ProgressSyncer ├──────────>│ EventBus  ├──────────────>│ History recorder │
//! └────────────────┘           │ (broadcast│               └──────────────────┘
//!                              │  channel) │   subscribe   ┌──────────────────┐
//!                              │           ├──────────────>│ Live progress UI │
//!                              └───────────┘               └──────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, SessionSummary};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(32);
//! let mut stream = bus.subscribe();
//!
//! let session = SessionSummary::new("play_1", "Dune");
//! bus.emit(CoreEvent::Playback(PlaybackEvent::Played { session })).ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.description(), "Playback started");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events; it may keep
//!   receiving.
//! - **`RecvError::Closed`**: every sender is gone; treat as shutdown.
//!
//! Emitting with no subscribers returns `Err`; publishers ignore it with
//! `.ok()` because nobody listening is a normal state.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Shared payloads
// ============================================================================

/// Outcome of one progress sync attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    /// Whether the server was contacted.
    pub remote_attempted: bool,
    /// Outcome of the server call; `None` when it was not attempted.
    pub remote_success: Option<bool>,
    /// Error text reported by the remote client.
    pub message: Option<String>,
}

impl SyncResult {
    /// Progress was handled without contacting the server.
    pub fn without_remote() -> Self {
        Self {
            remote_attempted: false,
            remote_success: None,
            message: None,
        }
    }

    /// The server was contacted with the given outcome.
    pub fn remote(success: bool, message: Option<String>) -> Self {
        Self {
            remote_attempted: true,
            remote_success: Some(success),
            message,
        }
    }

    /// True when the server was contacted and the call failed.
    pub fn remote_failed(&self) -> bool {
        self.remote_success == Some(false)
    }
}

/// Lightweight snapshot of a playback session attached to lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub display_title: String,
    pub library_item_id: Option<String>,
    pub episode_id: Option<String>,
    pub is_local: bool,
    /// Position in seconds.
    pub current_time: f64,
    /// Media length in seconds.
    pub duration: f64,
    /// Seconds listened during this session.
    pub time_listening: u64,
    /// Unix millis of the last session update.
    pub updated_at: i64,
}

impl SessionSummary {
    pub fn new(session_id: impl Into<String>, display_title: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            display_title: display_title.into(),
            library_item_id: None,
            episode_id: None,
            is_local: false,
            current_time: 0.0,
            duration: 0.0,
            time_listening: 0,
            updated_at: 0,
        }
    }
}

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum published through the event bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Session lifecycle and periodic sync events
    Playback(PlaybackEvent),
    /// Local progress record events
    Progress(ProgressEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Progress(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(event) if event.sync().is_some_and(SyncResult::remote_failed) => {
                EventSeverity::Warning
            }
            CoreEvent::Playback(PlaybackEvent::Finished { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::ServerProgressApplied { .. }) => {
                EventSeverity::Info
            }
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Playback Events
// ============================================================================

/// Lifecycle events of the tracked listening session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// Playback of a session started or resumed.
    Played { session: SessionSummary },
    /// Playback paused; carries the result of the pause sync if one ran.
    Paused {
        session: SessionSummary,
        sync: Option<SyncResult>,
    },
    /// Session stopped and torn down.
    Stopped {
        session: SessionSummary,
        sync: Option<SyncResult>,
    },
    /// Media was played to the end.
    Finished {
        session: SessionSummary,
        sync: Option<SyncResult>,
    },
    /// Position changed by a seek.
    Seeked { session: SessionSummary },
    /// Periodic progress save completed.
    Saved {
        session: SessionSummary,
        sync: Option<SyncResult>,
    },
    /// Progress received from the server was merged into the session.
    ServerProgressApplied {
        session: SessionSummary,
        /// Identifier of the server progress entry.
        progress_id: String,
        reason: String,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Played { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Stopped { .. } => "Playback stopped",
            PlaybackEvent::Finished { .. } => "Media finished",
            PlaybackEvent::Seeked { .. } => "Playback position changed",
            PlaybackEvent::Saved { .. } => "Listening progress saved",
            PlaybackEvent::ServerProgressApplied { .. } => "Server progress applied",
        }
    }

    /// The session snapshot carried by every playback event.
    pub fn session(&self) -> &SessionSummary {
        match self {
            PlaybackEvent::Played { session }
            | PlaybackEvent::Paused { session, .. }
            | PlaybackEvent::Stopped { session, .. }
            | PlaybackEvent::Finished { session, .. }
            | PlaybackEvent::Seeked { session }
            | PlaybackEvent::Saved { session, .. }
            | PlaybackEvent::ServerProgressApplied { session, .. } => session,
        }
    }

    /// The sync result, for events produced by a sync.
    pub fn sync(&self) -> Option<&SyncResult> {
        match self {
            PlaybackEvent::Paused { sync, .. }
            | PlaybackEvent::Stopped { sync, .. }
            | PlaybackEvent::Finished { sync, .. }
            | PlaybackEvent::Saved { sync, .. } => sync.as_ref(),
            _ => None,
        }
    }
}

// ============================================================================
// Progress Events
// ============================================================================

/// Events about durable per-media progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum ProgressEvent {
    /// A local progress record was written.
    LocalProgressUpdated {
        progress_id: String,
        library_item_id: Option<String>,
        episode_id: Option<String>,
        current_time: f64,
        duration: f64,
        /// Fraction in `[0, 1]`.
        progress: f64,
        is_finished: bool,
        last_update: i64,
    },
}

impl ProgressEvent {
    fn description(&self) -> &str {
        match self {
            ProgressEvent::LocalProgressUpdated { .. } => "Local progress updated",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning the bus yields another publisher on the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscription receiving events emitted from now on.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// Receiver that skips events not matching an optional predicate.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only yield events for which `predicate` returns true.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking receive; `None` when no matching event is buffered.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> SessionSummary {
        SessionSummary {
            current_time: 42.0,
            duration: 3600.0,
            ..SessionSummary::new("play_1", "Dune")
        }
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        let event = CoreEvent::Playback(PlaybackEvent::Seeked { session: summary() });
        assert!(bus.emit(event).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Playback(PlaybackEvent::Paused {
            session: summary(),
            sync: Some(SyncResult::without_remote()),
        });
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Progress(_)));

        bus.emit(CoreEvent::Playback(PlaybackEvent::Played { session: summary() }))
            .ok();
        let progress = CoreEvent::Progress(ProgressEvent::LocalProgressUpdated {
            progress_id: "local_li_1".to_string(),
            library_item_id: Some("li_1".to_string()),
            episode_id: None,
            current_time: 42.0,
            duration: 3600.0,
            progress: 42.0 / 3600.0,
            is_finished: false,
            last_update: 1_700_000_000_000,
        });
        bus.emit(progress.clone()).ok();

        assert_eq!(stream.recv().await.unwrap(), progress);
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for _ in 0..5 {
            bus.emit(CoreEvent::Playback(PlaybackEvent::Seeked { session: summary() }))
                .ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        let failed = CoreEvent::Playback(PlaybackEvent::Saved {
            session: summary(),
            sync: Some(SyncResult::remote(false, Some("timeout".to_string()))),
        });
        assert_eq!(failed.severity(), EventSeverity::Warning);

        let finished = CoreEvent::Playback(PlaybackEvent::Finished {
            session: summary(),
            sync: Some(SyncResult::remote(true, None)),
        });
        assert_eq!(finished.severity(), EventSeverity::Info);

        let seek = CoreEvent::Playback(PlaybackEvent::Seeked { session: summary() });
        assert_eq!(seek.severity(), EventSeverity::Debug);
        assert_eq!(seek.description(), "Playback position changed");
    }

    #[test]
    fn test_sync_result_constructors() {
        let skipped = SyncResult::without_remote();
        assert!(!skipped.remote_attempted);
        assert_eq!(skipped.remote_success, None);
        assert!(!skipped.remote_failed());

        let failed = SyncResult::remote(false, Some("HTTP 500".to_string()));
        assert!(failed.remote_attempted);
        assert!(failed.remote_failed());
    }

    #[test]
    fn test_event_serialization_shape() {
        let event = CoreEvent::Playback(PlaybackEvent::Played { session: summary() });
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "Playback");
        assert_eq!(json["payload"]["event"], "Played");
        assert_eq!(json["payload"]["session"]["sessionId"], "play_1");
    }
}
