//! Syncer lifecycle state.
//!
//! ```text
//!          start/play                pause
//!   Idle ─────────────> Active ───────────────> Paused
//!    ^                    │  ^                     │
//!    │  stop/finish/reset │  └──── start/play ─────┤
//!    └────────────────────┘                        │
//!    ^            stop/reset                       │
//!    └─────────────────────────────────────────────┘
//! ```
//!
//! Only the actor task touches [`SyncerState`]; everyone else sees a
//! [`SyncerSnapshot`].

use crate::session::{LocalProgressRecord, PlaybackSession};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum SyncerPhase {
    /// No session, no timer
    Idle,
    /// Session tracked and the tick timer running
    Active {
        session: PlaybackSession,
        timer: CancellationToken,
    },
    /// Session retained, timer stopped
    Paused { session: PlaybackSession },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseKind {
    Idle,
    Active,
    Paused,
}

#[derive(Debug)]
pub struct SyncerState {
    pub phase: SyncerPhase,
    /// Unix millis of the last sync; 0 means no baseline
    pub last_sync_ms: i64,
    pub failed_syncs: u32,
    /// Cached for the lifetime of the session
    pub local_progress: Option<LocalProgressRecord>,
    /// Bumped on every start and reset; async results from another epoch
    /// must not touch counters or timestamps
    pub epoch: u64,
}

impl Default for SyncerState {
    fn default() -> Self {
        Self {
            phase: SyncerPhase::Idle,
            last_sync_ms: 0,
            failed_syncs: 0,
            local_progress: None,
            epoch: 0,
        }
    }
}

impl SyncerState {
    pub fn session(&self) -> Option<&PlaybackSession> {
        match &self.phase {
            SyncerPhase::Active { session, .. } | SyncerPhase::Paused { session } => Some(session),
            SyncerPhase::Idle => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut PlaybackSession> {
        match &mut self.phase {
            SyncerPhase::Active { session, .. } | SyncerPhase::Paused { session } => Some(session),
            SyncerPhase::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, SyncerPhase::Active { .. })
    }

    pub fn kind(&self) -> PhaseKind {
        match self.phase {
            SyncerPhase::Idle => PhaseKind::Idle,
            SyncerPhase::Active { .. } => PhaseKind::Active,
            SyncerPhase::Paused { .. } => PhaseKind::Paused,
        }
    }

    /// Active -> Paused, cancelling the timer. False when not active.
    pub fn pause(&mut self) -> bool {
        match std::mem::replace(&mut self.phase, SyncerPhase::Idle) {
            SyncerPhase::Active { session, timer } => {
                timer.cancel();
                self.phase = SyncerPhase::Paused { session };
                true
            }
            other => {
                self.phase = other;
                false
            }
        }
    }

    /// Cancel the tick timer if one is running.
    pub fn cancel_timer(&self) {
        if let SyncerPhase::Active { timer, .. } = &self.phase {
            timer.cancel();
        }
    }

    /// Count a failed remote sync. Returns true when the streak reaches
    /// `threshold`, in which case the counter starts over.
    pub fn record_failure(&mut self, threshold: u32) -> bool {
        self.failed_syncs += 1;
        if self.failed_syncs >= threshold {
            self.failed_syncs = 0;
            true
        } else {
            false
        }
    }

    /// Drop the session and everything derived from it.
    ///
    /// The timer is left alone; callers cancel it first.
    pub fn reset(&mut self) {
        self.phase = SyncerPhase::Idle;
        self.local_progress = None;
        self.last_sync_ms = 0;
        self.failed_syncs = 0;
        self.epoch += 1;
    }

    pub fn snapshot(&self) -> SyncerSnapshot {
        let session = self.session();
        SyncerSnapshot {
            phase: self.kind(),
            session_id: session.map(|s| s.id.clone()),
            timer_running: self.is_active(),
            last_sync_ms: self.last_sync_ms,
            failed_syncs: self.failed_syncs,
            local_progress_id: self.local_progress.as_ref().map(|r| r.id.clone()),
            current_time: session.map(|s| s.current_time),
            time_listening: session.map(|s| s.time_listening),
        }
    }
}

/// Read-only view of the syncer for hosts and diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncerSnapshot {
    pub phase: PhaseKind,
    pub session_id: Option<String>,
    pub timer_running: bool,
    pub last_sync_ms: i64,
    pub failed_syncs: u32,
    pub local_progress_id: Option<String>,
    pub current_time: Option<f64>,
    pub time_listening: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(id: &str) -> SyncerState {
        SyncerState {
            phase: SyncerPhase::Active {
                session: PlaybackSession::new(id, "Dune", 3600.0),
                timer: CancellationToken::new(),
            },
            last_sync_ms: 1_000,
            ..SyncerState::default()
        }
    }

    #[test]
    fn test_failure_alert_every_second_failure() {
        let mut state = SyncerState::default();
        let alerts: Vec<bool> = (0..5).map(|_| state.record_failure(2)).collect();

        assert_eq!(alerts, vec![false, true, false, true, false]);
        assert_eq!(state.failed_syncs, 1);
    }

    #[test]
    fn test_pause_cancels_timer_and_keeps_session() {
        let mut state = active("play_1");
        let timer = match &state.phase {
            SyncerPhase::Active { timer, .. } => timer.clone(),
            _ => unreachable!(),
        };

        assert!(state.pause());
        assert!(timer.is_cancelled());
        assert_eq!(state.kind(), PhaseKind::Paused);
        assert_eq!(state.session().map(|s| s.id.as_str()), Some("play_1"));

        assert!(!state.pause());
        assert_eq!(state.kind(), PhaseKind::Paused);
    }

    #[test]
    fn test_reset_clears_and_bumps_epoch() {
        let mut state = active("play_1");
        state.failed_syncs = 1;
        state.cancel_timer();
        state.reset();

        let snapshot = state.snapshot();
        assert_eq!(snapshot.phase, PhaseKind::Idle);
        assert_eq!(snapshot.session_id, None);
        assert_eq!(snapshot.last_sync_ms, 0);
        assert_eq!(snapshot.failed_syncs, 0);
        assert_eq!(state.epoch, 1);
    }
}
