//! # Host Bridge Traits
//!
//! Platform abstraction traits that each host application implements so the
//! listening-progress core can run unchanged on desktop and mobile.
//!
//! ## Overview
//!
//! The progress syncer never talks to the operating system, the audio engine
//! or the UI directly. Every capability it needs is expressed here as a trait
//! and injected at construction time.
//!
//! ## Traits
//!
//! ### Networking & I/O
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations used by the remote sync client
//! - [`FileSystemAccess`](storage::FileSystemAccess) - File I/O for the local progress store
//!
//! ### Platform Integration
//! - [`NetworkMonitor`](network::NetworkMonitor) - Connectivity and metered network detection
//! - [`PlayerSignals`](player::PlayerSignals) - Position / is-playing signals from the audio player
//! - [`SyncAlerts`](player::SyncAlerts) - User-facing sync success / failing notifications
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Wall-clock source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ In Progress |
//! | Android  | TBD                 | 📋 Planned |
//! | iOS      | TBD                 | 📋 Planned |
//!
//! `PlayerSignals` and `SyncAlerts` have no desktop default: they belong to
//! whatever player the host embeds.
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should convert their native errors into it and keep the
//! message actionable (include paths, URLs, status codes).
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single implementation can be
//! shared between the syncer actor, its timer task and in-flight remote calls.

pub mod error;
pub mod http;
pub mod network;
pub mod player;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use network::{NetworkInfo, NetworkMonitor, NetworkStatus, NetworkType};
pub use player::{PlayerSignals, SyncAlerts};
pub use storage::FileSystemAccess;
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, SystemClock};
