//! The telemetry channel: session identity, outbound batching, resume state.

use crate::queue::OutboundQueue;
use crate::state::{StateKey, StateStore};
use crate::store::RecordStore;
use learnpulse_core::{SessionId, SessionState, Statement};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Tunable channel constants.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// How often the background flusher drains the queue
    pub flush_interval: Duration,

    /// First retry delay; doubles on each subsequent attempt
    pub retry_base_delay: Duration,

    /// Delivery attempts per batch before it is dropped
    pub max_delivery_attempts: u32,

    /// Outbound queue capacity; oldest entries are dropped beyond this
    pub queue_capacity: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_secs(15),
            retry_base_delay: Duration::from_secs(1),
            max_delivery_attempts: 5,
            queue_capacity: 512,
        }
    }
}

/// Counters describing what the channel has done so far.
///
/// Exhausted-retry drops surface here as a non-fatal observability signal;
/// telemetry loss never propagates as an error to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Statements confirmed delivered
    pub delivered: u64,

    /// Statements dropped after exhausting delivery attempts
    pub dropped_exhausted: u64,

    /// Statements dropped because the queue overflowed
    pub dropped_overflow: u64,

    /// Flush passes that found work to do
    pub flushes: u64,
}

enum FlusherCmd {
    Flush(oneshot::Sender<()>),
    Stop(oneshot::Sender<()>),
}

/// Outbound side of the telemetry pipeline.
///
/// Owns the session identifier, a bounded FIFO queue drained by a background
/// flusher task, and the durable per-unit state slots. `send` never blocks on
/// network I/O; delivery happens on the flusher task, every
/// [`ChannelConfig::flush_interval`] and on explicit [`flush_now`] calls.
///
/// [`flush_now`]: TelemetryChannel::flush_now
pub struct TelemetryChannel {
    session: SessionId,
    queue: Arc<Mutex<OutboundQueue>>,
    stats: Arc<Mutex<ChannelStats>>,
    state_store: Arc<dyn StateStore>,
    cmd_tx: mpsc::Sender<FlusherCmd>,
    flusher: Mutex<Option<JoinHandle<()>>>,
}

impl TelemetryChannel {
    /// Create a channel with a fresh session id and start its flusher.
    pub fn new(
        store: Arc<dyn RecordStore>,
        state_store: Arc<dyn StateStore>,
        config: ChannelConfig,
    ) -> Self {
        let session = SessionId::new();
        let queue = Arc::new(Mutex::new(OutboundQueue::new(config.queue_capacity)));
        let stats = Arc::new(Mutex::new(ChannelStats::default()));
        let (cmd_tx, cmd_rx) = mpsc::channel(16);

        let flusher = tokio::spawn(run_flusher(
            queue.clone(),
            stats.clone(),
            store,
            config,
            cmd_rx,
        ));

        Self {
            session,
            queue,
            stats,
            state_store,
            cmd_tx,
            flusher: Mutex::new(Some(flusher)),
        }
    }

    /// The session id statements of this channel belong to.
    pub fn session_id(&self) -> SessionId {
        self.session
    }

    /// Enqueue a statement for delivery. Returns once queued; never blocks
    /// on network I/O. A full queue drops its oldest entry.
    pub async fn send(&self, statement: Statement) {
        self.queue.lock().await.push(statement);
    }

    /// Flush the queue immediately, bypassing the interval, and wait for the
    /// delivery attempt (including retries) to finish.
    pub async fn flush_now(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.cmd_tx.send(FlusherCmd::Flush(ack_tx)).await.is_err() {
            warn!("Flush requested after channel shutdown");
            return;
        }
        let _ = ack_rx.await;
    }

    /// Flush remaining statements, then stop the flusher task.
    pub async fn shutdown(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.cmd_tx.send(FlusherCmd::Stop(ack_tx)).await.is_ok() {
            let _ = ack_rx.await;
        }
        if let Some(handle) = self.flusher.lock().await.take() {
            let _ = handle.await;
        }
    }

    /// Persist resume state for a unit. Storage failure degrades to a log
    /// line; telemetry must never break the learning experience.
    pub async fn save_state(&self, key: &StateKey, state: &SessionState) {
        if let Err(e) = self.state_store.save(key, state).await {
            warn!("Failed to save session state for {}: {}", key, e);
        }
    }

    /// Load resume state for a unit. A storage failure reads as "no saved
    /// state" so the learner simply starts from the beginning.
    pub async fn load_state(&self, key: &StateKey) -> Option<SessionState> {
        match self.state_store.load(key).await {
            Ok(state) => state,
            Err(e) => {
                warn!("Failed to load session state for {}: {}", key, e);
                None
            }
        }
    }

    /// Snapshot of the channel's delivery counters.
    pub async fn stats(&self) -> ChannelStats {
        let mut stats = *self.stats.lock().await;
        stats.dropped_overflow = self.queue.lock().await.dropped_overflow();
        stats
    }
}

async fn run_flusher(
    queue: Arc<Mutex<OutboundQueue>>,
    stats: Arc<Mutex<ChannelStats>>,
    store: Arc<dyn RecordStore>,
    config: ChannelConfig,
    mut cmd_rx: mpsc::Receiver<FlusherCmd>,
) {
    let mut interval = tokio::time::interval(config.flush_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                flush_batch(&queue, &stats, store.as_ref(), &config).await;
            }
            cmd = cmd_rx.recv() => match cmd {
                Some(FlusherCmd::Flush(ack)) => {
                    flush_batch(&queue, &stats, store.as_ref(), &config).await;
                    let _ = ack.send(());
                }
                Some(FlusherCmd::Stop(ack)) => {
                    flush_batch(&queue, &stats, store.as_ref(), &config).await;
                    let _ = ack.send(());
                    break;
                }
                None => break,
            }
        }
    }
}

/// Drain the queue and deliver one batch, retrying with exponential backoff
/// up to the configured attempt budget. An exhausted batch is dropped.
async fn flush_batch(
    queue: &Mutex<OutboundQueue>,
    stats: &Mutex<ChannelStats>,
    store: &dyn RecordStore,
    config: &ChannelConfig,
) {
    let mut entries = queue.lock().await.drain_batch();
    if entries.is_empty() {
        return;
    }

    let batch: Vec<Statement> = entries.iter().map(|e| e.statement.clone()).collect();
    debug!("Flushing batch of {} statement(s)", batch.len());

    loop {
        for entry in &mut entries {
            entry.attempts += 1;
        }
        let attempts = entries[0].attempts;

        match store.store(&batch).await {
            Ok(()) => {
                let mut s = stats.lock().await;
                s.delivered += batch.len() as u64;
                s.flushes += 1;
                return;
            }
            Err(e) if attempts >= config.max_delivery_attempts => {
                warn!(
                    "Dropping batch of {} statement(s) after {} attempts: {}",
                    batch.len(),
                    attempts,
                    e
                );
                let mut s = stats.lock().await;
                s.dropped_exhausted += batch.len() as u64;
                s.flushes += 1;
                return;
            }
            Err(e) => {
                let delay = config.retry_base_delay * 2u32.saturating_pow(attempts - 1);
                warn!(
                    "Batch delivery failed (attempt {}): {}; retrying in {:?}",
                    attempts, e, delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryStateStore;
    use crate::store::{MemoryRecordStore, StoreError};
    use async_trait::async_trait;
    use learnpulse_core::{Activity, Actor, StatementBuilder, Verb};

    fn statement(name: &str) -> Statement {
        StatementBuilder::new()
            .actor(Actor::account("u-1"))
            .verb(Verb::Interacted)
            .activity(Activity::new("id", name, "type"))
            .build()
            .unwrap()
    }

    fn channel(store: Arc<MemoryRecordStore>, config: ChannelConfig) -> TelemetryChannel {
        TelemetryChannel::new(store, Arc::new(MemoryStateStore::new()), config)
    }

    #[tokio::test]
    async fn flush_preserves_fifo_order() {
        let store = Arc::new(MemoryRecordStore::new());
        let channel = channel(store.clone(), ChannelConfig::default());

        channel.send(statement("first")).await;
        channel.send(statement("second")).await;
        channel.send(statement("third")).await;
        channel.flush_now().await;

        let names: Vec<_> = store
            .delivered()
            .await
            .into_iter()
            .map(|s| s.activity.name)
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_flush_delivers_without_explicit_trigger() {
        let store = Arc::new(MemoryRecordStore::new());
        let config = ChannelConfig {
            flush_interval: Duration::from_millis(100),
            ..Default::default()
        };
        let channel = channel(store.clone(), config);

        channel.send(statement("periodic")).await;
        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(store.delivered().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_batch_is_retried_and_delivered_exactly_once() {
        let store = Arc::new(MemoryRecordStore::failing(3));
        let channel = channel(store.clone(), ChannelConfig::default());

        channel.send(statement("retried")).await;
        channel.flush_now().await;

        // Three failures, then success on the fourth attempt (budget is 5).
        let delivered = store.delivered().await;
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].activity.name, "retried");
        assert_eq!(channel.stats().await.delivered, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_batch_is_dropped_not_fatal() {
        let store = Arc::new(MemoryRecordStore::failing(10));
        let config = ChannelConfig {
            max_delivery_attempts: 3,
            ..Default::default()
        };
        let channel = channel(store.clone(), config);

        channel.send(statement("doomed")).await;
        channel.send(statement("doomed-too")).await;
        channel.flush_now().await;

        assert!(store.delivered().await.is_empty());
        let stats = channel.stats().await;
        assert_eq!(stats.dropped_exhausted, 2);
        assert_eq!(stats.delivered, 0);
    }

    #[tokio::test]
    async fn shutdown_flushes_remaining_statements() {
        let store = Arc::new(MemoryRecordStore::new());
        let channel = channel(store.clone(), ChannelConfig::default());

        channel.send(statement("last-words")).await;
        channel.shutdown().await;

        assert_eq!(store.delivered().await.len(), 1);
    }

    #[tokio::test]
    async fn state_round_trip_via_channel() {
        let store = Arc::new(MemoryRecordStore::new());
        let channel = channel(store, ChannelConfig::default());
        let key = StateKey::new("learner-1", "unit-1");

        let mut state = SessionState::new();
        state.visit(7);
        channel.save_state(&key, &state).await;

        let loaded = channel.load_state(&key).await.unwrap();
        assert_eq!(loaded, state);
    }

    struct BrokenStateStore;

    #[async_trait]
    impl StateStore for BrokenStateStore {
        async fn save(
            &self,
            _key: &StateKey,
            _state: &SessionState,
        ) -> Result<(), crate::state::StateStoreError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk on fire").into())
        }

        async fn load(
            &self,
            _key: &StateKey,
        ) -> Result<Option<SessionState>, crate::state::StateStoreError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk on fire").into())
        }

        async fn delete(&self, _key: &StateKey) -> Result<(), crate::state::StateStoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn broken_state_store_degrades_to_fresh_start() {
        let channel = TelemetryChannel::new(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(BrokenStateStore),
            ChannelConfig::default(),
        );
        let key = StateKey::new("learner-1", "unit-1");

        // Save failure is swallowed; load failure reads as no saved state.
        channel.save_state(&key, &SessionState::new()).await;
        assert!(channel.load_state(&key).await.is_none());
    }

    #[tokio::test]
    async fn queue_overflow_drops_oldest_and_counts() {
        let store = Arc::new(MemoryRecordStore::new());
        let config = ChannelConfig {
            queue_capacity: 2,
            ..Default::default()
        };
        let channel = channel(store.clone(), config);

        channel.send(statement("a")).await;
        channel.send(statement("b")).await;
        channel.send(statement("c")).await;
        channel.flush_now().await;

        let names: Vec<_> = store
            .delivered()
            .await
            .into_iter()
            .map(|s| s.activity.name)
            .collect();
        assert_eq!(names, vec!["b", "c"]);
        assert_eq!(channel.stats().await.dropped_overflow, 1);
    }

    #[tokio::test]
    async fn fresh_channels_get_distinct_sessions() {
        let store = Arc::new(MemoryRecordStore::new());
        let a = channel(store.clone(), ChannelConfig::default());
        let b = channel(store, ChannelConfig::default());
        assert_ne!(a.session_id(), b.session_id());
    }
}
