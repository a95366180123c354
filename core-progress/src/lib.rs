//! # Listening Progress Module
//!
//! Keeps the listening position of the active playback session in sync with
//! on-device storage and the media server.
//!
//! ## Overview
//!
//! While a session plays, a timer ticks every 15 seconds. Each tick folds the
//! wall-clock time listened since the previous sync into the session and:
//!
//! - for **local media**, always saves the session and its local progress
//!   record, then also uploads the session when it belongs to the server the
//!   user is connected to
//! - for **server media**, reports the progress to the server (every tick on
//!   unmetered networks, at most once a minute otherwise)
//!
//! Two consecutive server failures raise one "sync failing" alert; any success
//! clears the streak.
//!
//! ## Components
//!
//! - **Session model** (`session`): playback session, sync sample, local progress record
//! - **Syncer state** (`state`): explicit Idle / Active / Paused lifecycle
//! - **Progress store** (`store`): local persistence over `FileSystemAccess`
//! - **Remote client** (`remote`): server pushes over `HttpClient`
//! - **Progress syncer** (`syncer`): the actor tying timer, store, remote and events together

pub mod config;
pub mod error;
pub mod remote;
pub mod session;
pub mod state;
pub mod store;
pub mod syncer;

pub use config::SyncerConfig;
pub use error::{ProgressError, Result};
pub use remote::{HttpRemoteSyncClient, RemoteSyncClient};
pub use session::{LocalProgressRecord, PlaybackSession, RemoteProgress, SyncSample};
pub use state::{PhaseKind, SyncerPhase, SyncerSnapshot, SyncerState};
pub use store::{FileProgressStore, ProgressStore};
pub use syncer::{ProgressSyncer, SyncerDependencies};
