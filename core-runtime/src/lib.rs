//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the listening-progress core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus carrying playback lifecycle and progress events
//!
//! ## Overview
//!
//! The progress syncer publishes everything observable (play, pause, stop,
//! finish, seek, periodic saves, local record updates) on the [`EventBus`]
//! so history, analytics and live UI can subscribe without coupling to it.
//!
//! [`EventBus`]: events::EventBus

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
