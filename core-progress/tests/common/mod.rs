//! Recording fakes shared by the syncer integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::network::{NetworkInfo, NetworkMonitor, NetworkStatus, NetworkType};
use bridge_traits::{Clock, PlayerSignals, SyncAlerts};
use chrono::{DateTime, Utc};
use core_progress::{
    LocalProgressRecord, PlaybackSession, ProgressError, ProgressStore, ProgressSyncer,
    RemoteSyncClient, Result, SyncSample, SyncerConfig, SyncerDependencies,
};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, Receiver};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE_MS: i64 = 1_700_000_000_000;
pub const SERVER_ID: &str = "srv_1";

/// Wall clock driven by Tokio's (pausable) clock.
pub struct TestClock {
    origin: tokio::time::Instant,
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }

    /// Unix millis `secs` after the clock was created.
    pub fn at(secs: f64) -> i64 {
        BASE_MS + (secs * 1000.0) as i64
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = self.origin.elapsed().as_millis() as i64;
        DateTime::<Utc>::from_timestamp_millis(BASE_MS + elapsed).unwrap()
    }
}

/// Wall clock that only moves when told to.
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            millis: AtomicI64::new(BASE_MS),
        }
    }

    pub fn advance(&self, secs: f64) {
        self.millis
            .fetch_add((secs * 1000.0) as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap()
    }
}

#[derive(Default)]
pub struct FakePlayer {
    playing: AtomicBool,
    position: Mutex<f64>,
    pub sleep_timer_checks: AtomicUsize,
}

impl FakePlayer {
    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::SeqCst);
    }

    pub fn set_position(&self, secs: f64) {
        *self.position.lock().unwrap() = secs;
    }
}

impl PlayerSignals for FakePlayer {
    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn current_position_secs(&self) -> f64 {
        *self.position.lock().unwrap()
    }

    fn check_auto_sleep_timer(&self) {
        self.sleep_timer_checks.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingAlerts {
    pub successes: AtomicUsize,
    pub failures: AtomicUsize,
}

impl RecordingAlerts {
    pub fn failing_alerts(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    pub fn success_alerts(&self) -> usize {
        self.successes.load(Ordering::SeqCst)
    }
}

impl SyncAlerts for RecordingAlerts {
    fn alert_sync_success(&self) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    fn alert_sync_failing(&self) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub records: Mutex<HashMap<String, LocalProgressRecord>>,
    pub sessions: Mutex<Vec<PlaybackSession>>,
    pub progress_reads: AtomicUsize,
    pub progress_writes: AtomicUsize,
}

impl MemoryStore {
    pub fn writes(&self) -> usize {
        self.progress_writes.load(Ordering::SeqCst) + self.sessions.lock().unwrap().len()
    }

    pub fn record(&self, id: &str) -> Option<LocalProgressRecord> {
        self.records.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn get_local_progress(&self, id: &str) -> Result<Option<LocalProgressRecord>> {
        self.progress_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.lock().unwrap().get(id).cloned())
    }

    async fn save_local_progress(&self, record: &LocalProgressRecord) -> Result<()> {
        self.progress_writes.fetch_add(1, Ordering::SeqCst);
        self.records
            .lock()
            .unwrap()
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn save_session(&self, session: &PlaybackSession) -> Result<()> {
        self.sessions.lock().unwrap().push(session.clone());
        Ok(())
    }
}

pub struct FakeRemote {
    server_id: Mutex<Option<String>>,
    failing: AtomicBool,
    delay: Mutex<Duration>,
    pub progress_calls: Mutex<Vec<(String, SyncSample)>>,
    pub local_calls: Mutex<Vec<PlaybackSession>>,
}

impl Default for FakeRemote {
    fn default() -> Self {
        Self {
            server_id: Mutex::new(Some(SERVER_ID.to_string())),
            failing: AtomicBool::new(false),
            delay: Mutex::new(Duration::ZERO),
            progress_calls: Mutex::new(Vec::new()),
            local_calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeRemote {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn connect_to(&self, server_id: Option<&str>) {
        *self.server_id.lock().unwrap() = server_id.map(str::to_string);
    }

    pub fn calls(&self) -> usize {
        self.progress_calls.lock().unwrap().len() + self.local_calls.lock().unwrap().len()
    }

    async fn respond(&self) -> Result<()> {
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            Err(ProgressError::RemoteStatus {
                status: 503,
                message: "Service Unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteSyncClient for FakeRemote {
    async fn connected_server_id(&self) -> Option<String> {
        self.server_id.lock().unwrap().clone()
    }

    async fn send_progress_sync(&self, session_id: &str, sample: &SyncSample) -> Result<()> {
        self.progress_calls
            .lock()
            .unwrap()
            .push((session_id.to_string(), *sample));
        self.respond().await
    }

    async fn send_local_progress_sync(&self, session: &PlaybackSession) -> Result<()> {
        self.local_calls.lock().unwrap().push(session.clone());
        self.respond().await
    }
}

pub struct FixedNetwork {
    pub metered: bool,
}

#[async_trait]
impl NetworkMonitor for FixedNetwork {
    async fn get_network_info(&self) -> BridgeResult<NetworkInfo> {
        Ok(NetworkInfo {
            status: NetworkStatus::Connected,
            network_type: Some(if self.metered {
                NetworkType::Cellular
            } else {
                NetworkType::WiFi
            }),
            is_metered: self.metered,
        })
    }
}

pub struct Harness {
    pub syncer: ProgressSyncer,
    pub player: Arc<FakePlayer>,
    pub alerts: Arc<RecordingAlerts>,
    pub store: Arc<MemoryStore>,
    pub remote: Arc<FakeRemote>,
    pub events: Receiver<CoreEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_network(None)
    }

    pub fn metered() -> Self {
        Self::with_network(Some(Arc::new(FixedNetwork { metered: true })))
    }

    pub fn with_store(store: MemoryStore) -> Self {
        Self::build(None, Arc::new(store))
    }

    fn with_network(network: Option<Arc<dyn NetworkMonitor>>) -> Self {
        Self::build(network, Arc::new(MemoryStore::default()))
    }

    fn build(network: Option<Arc<dyn NetworkMonitor>>, store: Arc<MemoryStore>) -> Self {
        let player = Arc::new(FakePlayer::default());
        let alerts = Arc::new(RecordingAlerts::default());
        let remote = Arc::new(FakeRemote::default());
        let event_bus = EventBus::new(256);
        let events = event_bus.subscribe();

        let syncer = ProgressSyncer::new(
            SyncerConfig::default(),
            SyncerDependencies {
                player: player.clone(),
                alerts: alerts.clone(),
                store: store.clone(),
                remote: remote.clone(),
                network_monitor: network,
                clock: Arc::new(TestClock::new()),
                event_bus,
            },
        )
        .unwrap();

        Self {
            syncer,
            player,
            alerts,
            store,
            remote,
            events,
        }
    }

    /// Playback events received so far.
    pub fn playback_events(&mut self) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            if let CoreEvent::Playback(event) = event {
                events.push(event);
            }
        }
        events
    }

    /// Every event received so far.
    pub fn all_events(&mut self) -> Vec<CoreEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

pub async fn advance(secs: f64) {
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;
}

/// Server-backed session with no local copy.
pub fn server_session(id: &str) -> PlaybackSession {
    PlaybackSession {
        library_item_id: Some("li_1".to_string()),
        ..PlaybackSession::new(id, "Dune", 3600.0)
    }
}

/// Downloaded copy of a server item from the connected server.
pub fn linked_local_session(id: &str) -> PlaybackSession {
    PlaybackSession {
        is_local: true,
        local_library_item_id: Some("local_li_1".to_string()),
        server_connection_config_id: Some(SERVER_ID.to_string()),
        ..server_session(id)
    }
}

/// Local-only media with no server counterpart.
pub fn local_only_session(id: &str) -> PlaybackSession {
    PlaybackSession {
        is_local: true,
        local_library_item_id: Some("local_li_9".to_string()),
        ..PlaybackSession::new(id, "Field Recordings", 1200.0)
    }
}
