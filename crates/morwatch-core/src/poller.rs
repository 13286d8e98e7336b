//! Continuous health polling with a bounded snapshot history.
//!
//! One tick fetches health, balance, and providers concurrently, stamps a
//! single wall-clock timestamp taken before dispatch, and appends a
//! [`HealthSnapshot`] to a capped FIFO buffer. The loop runs until
//! cancelled; cancellation is cooperative, so a tick already in flight
//! completes and its snapshot is appended before the task exits.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use time::OffsetDateTime;
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::domain::HealthSnapshot;

/// Maximum number of snapshots retained; oldest entries are evicted first.
pub const HISTORY_CAPACITY: usize = 200;

type SharedHistory = Arc<Mutex<VecDeque<HealthSnapshot>>>;

/// Handle to a running poller: read access to the history plus cooperative
/// cancellation. Dropping the handle does not stop the task; call
/// [`cancel`](PollerHandle::cancel).
pub struct PollerHandle {
    entries: SharedHistory,
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Consistent copy of the whole history, oldest first.
    pub fn snapshots(&self) -> Vec<HealthSnapshot> {
        self.entries
            .lock()
            .expect("history lock is not poisoned")
            .iter()
            .cloned()
            .collect()
    }

    /// Most recent snapshot, if any tick has completed.
    pub fn latest(&self) -> Option<HealthSnapshot> {
        self.entries
            .lock()
            .expect("history lock is not poisoned")
            .back()
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("history lock is not poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Request cancellation. Observed between ticks; an in-flight tick
    /// still completes and appends its snapshot.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Wait for the polling task to observe cancellation and exit.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

/// Spawn the polling loop against a live client.
pub fn spawn(client: Arc<ApiClient>, interval: Duration) -> PollerHandle {
    let entries: SharedHistory = Arc::new(Mutex::new(VecDeque::with_capacity(HISTORY_CAPACITY)));
    let cancelled = Arc::new(AtomicBool::new(false));

    let task = tokio::spawn(run_loop(
        client,
        interval,
        Arc::clone(&entries),
        Arc::clone(&cancelled),
    ));

    PollerHandle {
        entries,
        cancelled,
        task,
    }
}

async fn run_loop(
    client: Arc<ApiClient>,
    interval: Duration,
    entries: SharedHistory,
    cancelled: Arc<AtomicBool>,
) {
    while !cancelled.load(Ordering::Relaxed) {
        let snapshot = poll_once(&client).await;
        if let Some(error) = &snapshot.error {
            tracing::warn!(%error, "poll tick failed");
        } else {
            tracing::debug!("poll tick ok");
        }
        push_snapshot(&entries, snapshot);
        tokio::time::sleep(interval).await;
    }
}

/// One tick: timestamp first, then the three fetches joined concurrently.
/// Whatever succeeded lands in the snapshot; the error slot carries the
/// first non-empty failure in health, balance, providers order.
async fn poll_once(client: &ApiClient) -> HealthSnapshot {
    let ts = OffsetDateTime::now_utc();
    let (health, balance, providers) = tokio::join!(
        client.get_health(),
        client.get_balance(),
        client.get_providers(),
    );

    let error = health
        .as_ref()
        .err()
        .or(balance.as_ref().err())
        .or(providers.as_ref().err())
        .map(ToString::to_string);

    HealthSnapshot {
        ts,
        health: health.ok().flatten(),
        balance: balance.ok(),
        providers: providers.ok(),
        models: None,
        error,
    }
}

/// Append with strict FIFO eviction at [`HISTORY_CAPACITY`].
fn push_snapshot(entries: &SharedHistory, snapshot: HealthSnapshot) {
    let mut buffer = entries.lock().expect("history lock is not poisoned");
    buffer.push_back(snapshot);
    while buffer.len() > HISTORY_CAPACITY {
        buffer.pop_front();
    }
}
