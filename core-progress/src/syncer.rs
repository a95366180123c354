//! # Progress Syncer
//!
//! Tracks listening time for the active playback session and reconciles it
//! with local storage and the server.
//!
//! ## Architecture
//!
//! ```text
//!  player callbacks ──┐
//!  (play/pause/stop/  │   Command    ┌──────────────┐  save   ┌───────────────┐
//!   finished/seek)    ├────────────> │ SyncerActor  ├───────> │ ProgressStore │
//!                     │              │ (owns state) │         └───────────────┘
//!  tick timer ────────┤              │              │  spawn  ┌──────────────────┐
//!                     │ <────────────┤              ├───────> │ RemoteSyncClient │
//!  remote completions ┘  RemoteDone  └──────┬───────┘         └──────────────────┘
//!                                           │ emit
//!                                           v
//!                                       EventBus
//! ```
//!
//! [`ProgressSyncer`] is a cheap cloneable handle. Every operation becomes a
//! command on one channel, so session state has a single writer. Remote
//! pushes run in their own tasks over owned snapshots and report back as
//! commands tagged with the epoch they started in; results from an older
//! epoch never touch the failure counter or the sync baseline.
//!
//! ## Usage
//!
//! ```ignore
//! let syncer = ProgressSyncer::from_core_config(&core_config, player, alerts, SyncerConfig::default())?;
//! let mut events = syncer.subscribe();
//!
//! syncer.play(session).await?;
//! // ... ticks every 15 seconds while the player reports playing ...
//! syncer.pause().await?;
//! syncer.stop(true).await?;
//! ```

use crate::config::SyncerConfig;
use crate::error::{ProgressError, Result};
use crate::remote::{HttpRemoteSyncClient, RemoteSyncClient};
use crate::session::{PlaybackSession, RemoteProgress, SyncSample};
use crate::state::{SyncerPhase, SyncerSnapshot, SyncerState};
use crate::store::{FileProgressStore, ProgressStore};
use bridge_traits::{Clock, NetworkMonitor, PlayerSignals, SyncAlerts};
use core_runtime::config::CoreConfig;
use core_runtime::events::{
    CoreEvent, EventBus, PlaybackEvent, Receiver, SessionSummary, SyncResult,
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace, warn};

const SERVER_PROGRESS_REASON: &str =
    "Received from server get media progress request while playback session open";

/// Collaborators the syncer talks to.
pub struct SyncerDependencies {
    pub player: Arc<dyn PlayerSignals>,
    pub alerts: Arc<dyn SyncAlerts>,
    pub store: Arc<dyn ProgressStore>,
    pub remote: Arc<dyn RemoteSyncClient>,
    /// Absent: the network is treated as unmetered
    pub network_monitor: Option<Arc<dyn NetworkMonitor>>,
    pub clock: Arc<dyn Clock>,
    pub event_bus: EventBus,
}

/// Handle to the progress-sync actor.
///
/// Dropping every handle shuts the actor down and cancels the timer.
#[derive(Clone)]
pub struct ProgressSyncer {
    commands: mpsc::UnboundedSender<Command>,
    event_bus: EventBus,
}

impl ProgressSyncer {
    /// Spawn the actor on the current Tokio runtime.
    pub fn new(config: SyncerConfig, deps: SyncerDependencies) -> Result<Self> {
        config.validate()?;

        let (tx, rx) = mpsc::unbounded_channel();
        let event_bus = deps.event_bus.clone();
        let actor = SyncerActor {
            state: SyncerState::default(),
            config,
            player: deps.player,
            alerts: deps.alerts,
            store: deps.store,
            remote: deps.remote,
            network_monitor: deps.network_monitor,
            clock: deps.clock,
            event_bus: deps.event_bus,
            commands: tx.downgrade(),
        };
        tokio::spawn(actor.run(rx));

        Ok(Self {
            commands: tx,
            event_bus,
        })
    }

    /// Wire the file store, HTTP remote client, network monitor and clock
    /// from a resolved [`CoreConfig`].
    pub fn from_core_config(
        core: &CoreConfig,
        player: Arc<dyn PlayerSignals>,
        alerts: Arc<dyn SyncAlerts>,
        config: SyncerConfig,
    ) -> Result<Self> {
        core.validate()?;

        let store = FileProgressStore::new(Arc::clone(&core.file_system), core.data_dir.clone());
        let remote = HttpRemoteSyncClient::new(Arc::clone(&core.http_client), config.remote_timeout)
            .with_server(core.server.clone());

        Self::new(
            config,
            SyncerDependencies {
                player,
                alerts,
                store: Arc::new(store),
                remote: Arc::new(remote),
                network_monitor: core.network_monitor.clone(),
                clock: Arc::clone(&core.clock),
                event_bus: EventBus::new(core.event_buffer_size),
            },
        )
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    /// Emit a play event, then [`start`](Self::start).
    pub async fn play(&self, session: PlaybackSession) -> Result<()> {
        self.request(|reply| Command::Play { session, reply }).await
    }

    /// Begin tracking `session`. A no-op if it is already being tracked.
    pub async fn start(&self, session: PlaybackSession) -> Result<()> {
        self.request(|reply| Command::Start { session, reply }).await
    }

    /// Stop the timer and sync the current position. Resolves once the
    /// sync, including any server push, has completed.
    pub async fn pause(&self) -> Result<()> {
        self.request(|reply| Command::Pause { reply }).await
    }

    /// Tear the session down, syncing first when `should_sync` is set.
    pub async fn stop(&self, should_sync: bool) -> Result<()> {
        self.request(|reply| Command::Stop { should_sync, reply })
            .await
    }

    /// Record the media as fully consumed and tear the session down.
    pub async fn finished(&self) -> Result<()> {
        self.request(|reply| Command::Finished { reply }).await
    }

    pub async fn seek(&self) -> Result<()> {
        self.request(|reply| Command::Seek { reply }).await
    }

    /// Run one sync now.
    ///
    /// `None` means the sync was skipped: no baseline, called within the
    /// minimum interval, no session, or the session progress is invalid.
    pub async fn sync(
        &self,
        should_attempt_remote: bool,
        current_time: f64,
    ) -> Result<Option<SyncResult>> {
        self.request(|reply| Command::Sync {
            should_attempt_remote,
            current_time,
            reply,
        })
        .await
    }

    /// Merge progress fetched from the server into the open session and
    /// persist it locally.
    pub async fn sync_from_server_progress(&self, progress: RemoteProgress) -> Result<()> {
        self.request(|reply| Command::ApplyServerProgress { progress, reply })
            .await
    }

    pub async fn reset(&self) -> Result<()> {
        self.request(|reply| Command::Reset { reply }).await
    }

    pub async fn snapshot(&self) -> Result<SyncerSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(command(tx))
            .map_err(|_| ProgressError::SyncerClosed)?;
        rx.await.map_err(|_| ProgressError::SyncerClosed)
    }
}

type Reply<T> = oneshot::Sender<T>;

enum Command {
    Play {
        session: PlaybackSession,
        reply: Reply<()>,
    },
    Start {
        session: PlaybackSession,
        reply: Reply<()>,
    },
    Pause {
        reply: Reply<()>,
    },
    Stop {
        should_sync: bool,
        reply: Reply<()>,
    },
    Finished {
        reply: Reply<()>,
    },
    Seek {
        reply: Reply<()>,
    },
    Sync {
        should_attempt_remote: bool,
        current_time: f64,
        reply: Reply<Option<SyncResult>>,
    },
    ApplyServerProgress {
        progress: RemoteProgress,
        reply: Reply<()>,
    },
    Reset {
        reply: Reply<()>,
    },
    Snapshot {
        reply: Reply<SyncerSnapshot>,
    },
    Tick {
        epoch: u64,
    },
    RemoteCompleted(RemoteCompletion),
}

/// What happens once a sync has a result.
enum AfterSync {
    Reply(Reply<Option<SyncResult>>),
    Tick,
    Pause(Reply<()>),
    Stop(Reply<()>),
    Finished(Reply<()>),
}

impl AfterSync {
    fn tears_down(&self) -> bool {
        matches!(self, AfterSync::Stop(_) | AfterSync::Finished(_))
    }
}

struct Continuation {
    after: AfterSync,
    /// Session as it was when the sync ran
    session: Option<SessionSummary>,
}

enum RemotePush {
    Progress {
        session_id: String,
        sample: SyncSample,
    },
    LocalSession(PlaybackSession),
}

enum SyncStep {
    Done(Option<SyncResult>),
    Remote(RemotePush),
}

struct RemoteCompletion {
    epoch: u64,
    /// Server-backed pushes move the sync baseline only once they succeed
    advances_baseline: bool,
    outcome: std::result::Result<(), String>,
    continuation: Continuation,
}

struct SyncerActor {
    state: SyncerState,
    config: SyncerConfig,
    player: Arc<dyn PlayerSignals>,
    alerts: Arc<dyn SyncAlerts>,
    store: Arc<dyn ProgressStore>,
    remote: Arc<dyn RemoteSyncClient>,
    network_monitor: Option<Arc<dyn NetworkMonitor>>,
    clock: Arc<dyn Clock>,
    event_bus: EventBus,
    commands: mpsc::WeakUnboundedSender<Command>,
}

impl SyncerActor {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = commands.recv().await {
            self.handle(command).await;
        }

        self.state.cancel_timer();
        debug!("Progress syncer shut down");
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Play { session, reply } => {
                info!(session_id = %session.id, title = %session.display_title, "play");
                self.emit(PlaybackEvent::Played {
                    session: session.summary(),
                });
                self.start(session);
                let _ = reply.send(());
            }
            Command::Start { session, reply } => {
                self.start(session);
                let _ = reply.send(());
            }
            Command::Pause { reply } => self.pause(reply).await,
            Command::Stop { should_sync, reply } => self.stop(should_sync, reply).await,
            Command::Finished { reply } => self.finished(reply).await,
            Command::Seek { reply } => {
                self.seek();
                let _ = reply.send(());
            }
            Command::Sync {
                should_attempt_remote,
                current_time,
                reply,
            } => {
                self.sync(should_attempt_remote, current_time, AfterSync::Reply(reply))
                    .await
            }
            Command::ApplyServerProgress { progress, reply } => {
                self.sync_from_server_progress(progress).await;
                let _ = reply.send(());
            }
            Command::Reset { reply } => {
                self.state.cancel_timer();
                self.state.reset();
                debug!("reset");
                let _ = reply.send(());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.state.snapshot());
            }
            Command::Tick { epoch } => self.tick(epoch).await,
            Command::RemoteCompleted(completion) => self.remote_completed(completion),
        }
    }

    fn start(&mut self, session: PlaybackSession) {
        match &self.state.phase {
            SyncerPhase::Active {
                session: current, ..
            } if current.id == session.id => {
                debug!(session_id = %session.id, "start: timer already running");
                return;
            }
            SyncerPhase::Active {
                session: current,
                timer,
            } => {
                info!(from = %current.id, to = %session.id, "Playback session changed, resetting timer");
                timer.cancel();
                self.state.local_progress = None;
                self.state.last_sync_ms = 0;
                self.state.failed_syncs = 0;
            }
            SyncerPhase::Paused { session: current } if current.id != session.id => {
                self.state.local_progress = None;
            }
            SyncerPhase::Paused { .. } => {}
            SyncerPhase::Idle => {
                self.state.failed_syncs = 0;
            }
        }

        self.state.epoch += 1;
        self.state.last_sync_ms = self.now_ms();
        let timer = self.spawn_timer(self.state.epoch);

        debug!(
            session_id = %session.id,
            last_sync_ms = self.state.last_sync_ms,
            "start: listening timer armed"
        );
        self.state.phase = SyncerPhase::Active { session, timer };
    }

    fn spawn_timer(&self, epoch: u64) -> CancellationToken {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let commands = self.commands.clone();
        let period = self.config.tick_interval;

        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(sender) = commands.upgrade() else { break };
                        if sender.send(Command::Tick { epoch }).is_err() {
                            break;
                        }
                    }
                }
            }
            trace!(epoch, "Listening timer stopped");
        });

        token
    }

    #[instrument(level = "trace", skip(self))]
    async fn tick(&mut self, epoch: u64) {
        if epoch != self.state.epoch || !self.state.is_active() {
            trace!(epoch, "Ignoring tick from a cancelled timer");
            return;
        }
        if !self.player.is_playing() {
            return;
        }

        self.player.check_auto_sleep_timer();

        // Every tick on unmetered networks, otherwise at most once per interval
        let since_last_sync = self.now_ms() - self.state.last_sync_ms;
        let should_sync_server = self.is_unmetered().await
            || since_last_sync >= duration_millis(self.config.metered_sync_interval);

        let current_time = self.player.current_position_secs();
        if current_time > 0.0 {
            self.sync(should_sync_server, current_time, AfterSync::Tick)
                .await;
        }
    }

    async fn is_unmetered(&self) -> bool {
        let Some(monitor) = &self.network_monitor else {
            return true;
        };

        match monitor.get_network_info().await {
            Ok(info) => info.is_unmetered(),
            Err(e) => {
                debug!(error = %e, "Network info unavailable, treating network as metered");
                false
            }
        }
    }

    #[instrument(level = "debug", skip_all)]
    async fn pause(&mut self, reply: Reply<()>) {
        if !self.state.pause() {
            debug!("pause: syncer not active");
            let _ = reply.send(());
            return;
        }

        info!(
            session_id = ?self.state.session().map(|s| &s.id),
            last_sync_ms = self.state.last_sync_ms,
            "Pausing progress syncer"
        );

        let current_time = self.player.current_position_secs();
        if current_time > 0.0 {
            self.sync(true, current_time, AfterSync::Pause(reply)).await;
        } else {
            let continuation = Continuation {
                session: self.state.session().map(PlaybackSession::summary),
                after: AfterSync::Pause(reply),
            };
            self.finish(continuation, None, true);
        }
    }

    #[instrument(level = "debug", skip(self, reply))]
    async fn stop(&mut self, should_sync: bool, reply: Reply<()>) {
        if !self.state.is_active() {
            self.state.reset();
            let _ = reply.send(());
            return;
        }

        self.state.cancel_timer();
        info!(
            session_id = ?self.state.session().map(|s| &s.id),
            should_sync,
            "Stopping progress syncer"
        );

        let current_time = if should_sync {
            self.player.current_position_secs()
        } else {
            0.0
        };

        if current_time > 0.0 {
            self.sync(true, current_time, AfterSync::Stop(reply)).await;
        } else {
            let continuation = Continuation {
                session: self.state.session().map(PlaybackSession::summary),
                after: AfterSync::Stop(reply),
            };
            self.finish(continuation, None, true);
        }
    }

    #[instrument(level = "debug", skip_all)]
    async fn finished(&mut self, reply: Reply<()>) {
        if !self.state.is_active() {
            debug!("finished: syncer not active");
            let _ = reply.send(());
            return;
        }

        self.state.cancel_timer();
        let duration = self.state.session().map_or(0.0, |s| s.duration);
        info!(duration, "Media finished, syncing full duration");

        self.sync(true, duration, AfterSync::Finished(reply)).await;
    }

    fn seek(&mut self) {
        let position = self.player.current_position_secs();
        let Some(session) = self.state.session_mut() else {
            warn!("seek: playback session not set");
            return;
        };

        session.current_time = position;
        debug!(session_id = %session.id, current_time = position, "seek");
        let summary = session.summary();
        self.emit(PlaybackEvent::Seeked { session: summary });
    }

    #[instrument(level = "debug", skip_all, fields(progress_id = %progress.id))]
    async fn sync_from_server_progress(&mut self, progress: RemoteProgress) {
        let Some(session) = self.state.session_mut() else {
            debug!(progress_id = %progress.id, "No open session for server progress");
            return;
        };

        session.updated_at = progress.last_update;
        session.current_time = progress.current_time;
        let session = session.clone();

        info!(
            session_id = %session.id,
            current_time = progress.current_time,
            "Applied server progress to open session"
        );
        self.emit(PlaybackEvent::ServerProgressApplied {
            session: session.summary(),
            progress_id: progress.id,
            reason: SERVER_PROGRESS_REASON.to_string(),
        });

        self.persist_local(&session).await;
    }

    async fn sync(&mut self, should_attempt_remote: bool, current_time: f64, after: AfterSync) {
        let step = self.begin_sync(should_attempt_remote, current_time).await;
        let epoch = self.state.epoch;
        let continuation = Continuation {
            session: self.state.session().map(PlaybackSession::summary),
            after,
        };

        // Session leaves at once; counters and epoch survive until the
        // outcome is applied in finish()
        if continuation.after.tears_down() {
            self.state.phase = SyncerPhase::Idle;
            self.state.local_progress = None;
        }

        match step {
            SyncStep::Done(result) => self.finish(continuation, result, true),
            SyncStep::Remote(push) => self.push_remote(push, epoch, continuation),
        }
    }

    /// Everything in a sync up to the server call.
    #[instrument(level = "debug", skip(self))]
    async fn begin_sync(&mut self, should_attempt_remote: bool, current_time: f64) -> SyncStep {
        let last_sync_ms = self.state.last_sync_ms;
        if last_sync_ms <= 0 {
            warn!(last_sync_ms, "Last sync time is not set");
            return SyncStep::Done(None);
        }

        let now = self.now_ms();
        let elapsed_ms = now - last_sync_ms;
        if elapsed_ms < duration_millis(self.config.min_sync_interval) {
            trace!(elapsed_ms, "Previous sync too recent");
            return SyncStep::Done(None);
        }

        let Some(session) = self.state.session_mut() else {
            warn!("Sync requested without a playback session");
            return SyncStep::Done(None);
        };

        let sample = SyncSample {
            time_listened: (elapsed_ms / 1000) as u64,
            duration: session.duration,
            current_time,
        };
        session.apply_sync(&sample, now);

        if session.progress().is_nan() {
            error!(
                session_id = %session.id,
                current_time = session.current_time,
                duration = session.duration,
                "Playback session has invalid progress"
            );
            return SyncStep::Done(None);
        }

        let session = session.clone();
        if session.is_local {
            self.persist_local(&session).await;
            self.state.last_sync_ms = now;

            if should_attempt_remote && self.is_on_connected_server(&session).await {
                debug!(session_id = %session.id, "Sending local progress to server");
                return SyncStep::Remote(RemotePush::LocalSession(session));
            }
            SyncStep::Done(Some(SyncResult::without_remote()))
        } else if should_attempt_remote {
            SyncStep::Remote(RemotePush::Progress {
                session_id: session.id,
                sample,
            })
        } else {
            SyncStep::Done(Some(SyncResult::without_remote()))
        }
    }

    async fn is_on_connected_server(&self, session: &PlaybackSession) -> bool {
        session.is_linked_to_server()
            && self.remote.connected_server_id().await == session.server_connection_config_id
    }

    fn push_remote(&self, push: RemotePush, epoch: u64, continuation: Continuation) {
        let remote = Arc::clone(&self.remote);
        let commands = self.commands.clone();

        tokio::spawn(async move {
            let (advances_baseline, outcome) = match &push {
                RemotePush::Progress { session_id, sample } => {
                    (true, remote.send_progress_sync(session_id, sample).await)
                }
                RemotePush::LocalSession(session) => {
                    (false, remote.send_local_progress_sync(session).await)
                }
            };

            let completion = RemoteCompletion {
                epoch,
                advances_baseline,
                outcome: outcome.map_err(|e| e.to_string()),
                continuation,
            };
            if let Some(sender) = commands.upgrade() {
                let _ = sender.send(Command::RemoteCompleted(completion));
            }
        });
    }

    fn remote_completed(&mut self, completion: RemoteCompletion) {
        let current = completion.epoch == self.state.epoch;
        let title = completion
            .continuation
            .session
            .as_ref()
            .map(|s| s.display_title.clone())
            .unwrap_or_default();

        let result = match completion.outcome {
            Ok(()) => {
                if current {
                    self.state.failed_syncs = 0;
                    if completion.advances_baseline {
                        self.state.last_sync_ms = self.now_ms();
                    }
                }
                info!(title = %title, "Progress sync sent to server");
                self.alerts.alert_sync_success();
                SyncResult::remote(true, None)
            }
            Err(message) => {
                if current && self.state.record_failure(self.config.failure_alert_threshold) {
                    self.alerts.alert_sync_failing();
                }
                warn!(
                    title = %title,
                    failed_syncs = self.state.failed_syncs,
                    stale = !current,
                    error = %message,
                    "Progress sync to server failed"
                );
                SyncResult::remote(false, Some(message))
            }
        };

        self.finish(completion.continuation, Some(result), current);
    }

    /// Deliver a sync result to whoever asked for it.
    ///
    /// `current` is false for results that arrive after the session they
    /// belong to was restarted or reset.
    fn finish(&mut self, continuation: Continuation, result: Option<SyncResult>, current: bool) {
        let Continuation { after, session } = continuation;

        match after {
            AfterSync::Reply(reply) => {
                let _ = reply.send(result);
            }
            AfterSync::Tick => {
                if let Some(session) = session.filter(|_| current) {
                    self.emit(PlaybackEvent::Saved {
                        session,
                        sync: result,
                    });
                }
            }
            AfterSync::Pause(reply) => {
                if current {
                    self.state.last_sync_ms = 0;
                    self.state.failed_syncs = 0;
                }
                if let Some(session) = session {
                    self.emit(PlaybackEvent::Paused {
                        session,
                        sync: result,
                    });
                }
                let _ = reply.send(());
            }
            AfterSync::Stop(reply) => {
                if current {
                    self.state.reset();
                }
                if let Some(session) = session {
                    self.emit(PlaybackEvent::Stopped {
                        session,
                        sync: result,
                    });
                }
                let _ = reply.send(());
            }
            AfterSync::Finished(reply) => {
                if current {
                    self.state.reset();
                }
                if let Some(session) = session {
                    self.emit(PlaybackEvent::Finished {
                        session,
                        sync: result,
                    });
                }
                let _ = reply.send(());
            }
        }
    }

    async fn persist_local(&mut self, session: &PlaybackSession) {
        if let Err(e) = self.store.save_session(session).await {
            warn!(session_id = %session.id, error = %e, "Failed to save local playback session");
        }
        self.save_local_progress(session).await;
    }

    /// Load the local record once per session, then keep it cached.
    async fn save_local_progress(&mut self, session: &PlaybackSession) {
        let now = self.now_ms();
        let record = match self.state.local_progress.take() {
            Some(mut record) => {
                record.update_from_session(session, now);
                record
            }
            None => match self
                .store
                .get_local_progress(&session.local_media_progress_id())
                .await
            {
                Ok(Some(mut record)) => {
                    record.update_from_session(session, now);
                    record
                }
                Ok(None) => session.new_local_progress(now),
                Err(e) => {
                    warn!(error = %e, "Failed to load local progress, starting a new record");
                    session.new_local_progress(now)
                }
            },
        };

        if record.progress.is_nan() {
            error!(progress_id = %record.id, "Invalid progress on local media progress");
        } else {
            match self.store.save_local_progress(&record).await {
                Ok(()) => {
                    debug!(
                        progress_id = %record.id,
                        current_time = record.current_time,
                        duration = record.duration,
                        percent = record.progress_percent(),
                        "Saved local progress"
                    );
                    self.event_bus
                        .emit(CoreEvent::Progress(record.to_event()))
                        .ok();
                }
                Err(e) => {
                    warn!(progress_id = %record.id, error = %e, "Failed to save local progress")
                }
            }
        }

        self.state.local_progress = Some(record);
    }

    fn emit(&self, event: PlaybackEvent) {
        self.event_bus.emit(CoreEvent::Playback(event)).ok();
    }

    fn now_ms(&self) -> i64 {
        self.clock.unix_timestamp_millis()
    }
}

fn duration_millis(duration: std::time::Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
