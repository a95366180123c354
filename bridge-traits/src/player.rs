//! Player and user-notification bridges.
//!
//! The audio engine lives in the host. The progress syncer only needs to ask
//! it three questions and, separately, to surface two notifications to the
//! user. Both traits are synchronous: hosts answer from their main thread
//! state without I/O.

/// Signals exposed by the host audio player.
pub trait PlayerSignals: Send + Sync {
    /// Whether audio is currently being rendered.
    fn is_playing(&self) -> bool;

    /// Current playback position in seconds.
    fn current_position_secs(&self) -> f64;

    /// Give the host a chance to arm its automatic sleep timer.
    ///
    /// Called once per progress tick while playing.
    fn check_auto_sleep_timer(&self);
}

/// Fire-and-forget user notifications about remote progress sync.
pub trait SyncAlerts: Send + Sync {
    /// A remote sync went through.
    fn alert_sync_success(&self);

    /// Remote syncs keep failing.
    fn alert_sync_failing(&self);
}
