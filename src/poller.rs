//! # Polling cache
//! Holds the last aggregation result for one resource (the market snapshot,
//! or news for one topic) and refreshes it on a timer and on demand.
//!
//! State machine: `Idle → Loading → {Ready, Error}`, then `Ready/Error →
//! Loading` on every tick or manual refetch, until [`Poller::stop`].
//! While loading, the previous data stays visible; only the very first fetch
//! shows an empty, loading state.
//!
//! Every start/stop bumps a generation counter. A cycle captures the
//! generation when it begins and writes its result only if the generation is
//! unchanged when the fetch completes, so late results after `stop()` (or a
//! restart) are dropped.
//!
//! Cycles never overlap: a manual refetch that arrives while the timer's
//! cycle is in flight waits for it, then runs its own. Results therefore land
//! in start order and `lastUpdated` only moves forward.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::model::{AggregationResult, SourceUsed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

/// Read-only view handed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollState<T> {
    pub data: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub status: PollStatus,
    pub source_used: Option<SourceUsed>,
    pub is_partial: bool,
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            loading: false,
            error: None,
            last_updated: None,
            status: PollStatus::Idle,
            source_used: None,
            is_partial: false,
        }
    }
}

/// Settled state for a result produced outside any poller.
impl<T> From<AggregationResult<T>> for PollState<T> {
    fn from(res: AggregationResult<T>) -> Self {
        Self {
            data: res.items,
            loading: false,
            error: None,
            last_updated: Some(res.fetched_at),
            status: PollStatus::Ready,
            source_used: Some(res.source_used),
            is_partial: res.is_partial,
        }
    }
}

/// What a poller calls to get fresh data.
///
/// Aggregators degrade to fallback content instead of failing, so an `Err`
/// here means something unexpected went wrong.
#[async_trait::async_trait]
pub trait Refresh<T>: Send + Sync {
    async fn refresh(&self) -> anyhow::Result<AggregationResult<T>>;
}

pub struct Poller<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Poller<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<T> {
    resource: String,
    source: Arc<dyn Refresh<T>>,
    tx: watch::Sender<PollState<T>>,
    generation: AtomicU64,
    running: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
    cycle: tokio::sync::Mutex<()>,
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        if let Ok(mut g) = self.task.lock() {
            if let Some(h) = g.take() {
                h.abort();
            }
        }
    }
}

impl<T> Poller<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(resource: impl Into<String>, source: Arc<dyn Refresh<T>>) -> Self {
        crate::ingest::ensure_metrics_described();
        let (tx, _rx) = watch::channel(PollState::default());
        Self {
            inner: Arc::new(Inner {
                resource: resource.into(),
                source,
                tx,
                generation: AtomicU64::new(0),
                running: AtomicBool::new(false),
                task: Mutex::new(None),
                cycle: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn resource(&self) -> &str {
        &self.inner.resource
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> PollState<T> {
        self.inner.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState<T>> {
        self.inner.tx.subscribe()
    }

    /// Fetch immediately, then every `every`. Restarting replaces the old
    /// timer and invalidates its in-flight cycle.
    pub fn start(&self, every: Duration) {
        let mut slot = match self.inner.task.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        };
        if let Some(h) = slot.take() {
            h.abort();
        }

        let gen = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.running.store(true, Ordering::SeqCst);

        let weak: Weak<Inner<T>> = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if inner.generation.load(Ordering::SeqCst) != gen {
                    break;
                }
                run_cycle(&inner, gen).await;
            }
        });
        *slot = Some(handle);

        tracing::info!(
            resource = %self.inner.resource,
            every_secs = every.as_secs_f64(),
            "poller started"
        );
    }

    /// Force a refresh now and return the resulting state. Waits for a cycle
    /// already in flight before starting its own. No-op on a stopped poller.
    pub async fn refetch_now(&self) -> PollState<T> {
        if !self.is_running() {
            tracing::warn!(resource = %self.inner.resource, "refetch on stopped poller ignored");
            return self.snapshot();
        }
        let gen = self.inner.generation.load(Ordering::SeqCst);
        run_cycle(&self.inner, gen).await;
        self.snapshot()
    }

    /// Stop the timer. Results of fetches already in flight are discarded.
    pub fn stop(&self) {
        self.inner.running.store(false, Ordering::SeqCst);
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        let mut slot = match self.inner.task.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        };
        if let Some(h) = slot.take() {
            h.abort();
        }
        tracing::info!(resource = %self.inner.resource, "poller stopped");
    }
}

/// One Loading → Ready/Error transition. Returns whether the result was kept.
async fn run_cycle<T>(inner: &Inner<T>, gen: u64) -> bool
where
    T: Clone + Send + Sync + 'static,
{
    let _turn = inner.cycle.lock().await;
    if inner.generation.load(Ordering::SeqCst) != gen {
        return false;
    }

    inner.tx.send_modify(|s| {
        s.loading = true;
        s.error = None;
        s.status = PollStatus::Loading;
    });

    let outcome = inner.source.refresh().await;

    if inner.generation.load(Ordering::SeqCst) != gen {
        tracing::debug!(resource = %inner.resource, gen, "late poll result discarded");
        counter!("feed_poll_discarded_total", "resource" => inner.resource.clone()).increment(1);
        return false;
    }

    match outcome {
        Ok(res) => {
            let count = res.items.len();
            let source = res.source_used.to_string();
            let fetched_at = res.fetched_at;
            inner.tx.send_modify(|s| {
                s.data = res.items;
                s.loading = false;
                s.error = None;
                s.last_updated = Some(fetched_at);
                s.status = PollStatus::Ready;
                s.source_used = Some(res.source_used);
                s.is_partial = res.is_partial;
            });
            counter!(
                "feed_poll_cycles_total",
                "resource" => inner.resource.clone(),
                "outcome" => "ready"
            )
            .increment(1);
            gauge!("feed_poll_last_success_ts", "resource" => inner.resource.clone())
                .set(fetched_at.timestamp() as f64);
            tracing::debug!(resource = %inner.resource, count, source = %source, "poll cycle ready");
        }
        Err(e) => {
            let msg = format!("failed to refresh {}: {e:#}", inner.resource);
            tracing::warn!(resource = %inner.resource, error = %msg, "poll cycle failed");
            inner.tx.send_modify(|s| {
                s.loading = false;
                s.error = Some(msg);
                s.status = PollStatus::Error;
            });
            counter!(
                "feed_poll_cycles_total",
                "resource" => inner.resource.clone(),
                "outcome" => "error"
            )
            .increment(1);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceUsed;
    use std::sync::atomic::AtomicUsize;

    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Refresh<u32> for Counting {
        async fn refresh(&self) -> anyhow::Result<AggregationResult<u32>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as u32 + 1;
            Ok(AggregationResult {
                items: vec![n],
                fetched_at: Utc::now(),
                source_used: SourceUsed::adapter("counting"),
                is_partial: false,
            })
        }
    }

    #[test]
    fn fresh_state_is_idle() {
        let s: PollState<u32> = PollState::default();
        assert_eq!(s.status, PollStatus::Idle);
        assert!(!s.loading);
        assert!(s.data.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_ticks_refresh_until_stopped() {
        let src = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        let p: Poller<u32> = Poller::new("test", src.clone());
        p.start(Duration::from_secs(30));

        // first tick fires immediately
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(src.calls.load(Ordering::SeqCst), 1);
        assert_eq!(p.snapshot().data, vec![1]);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(src.calls.load(Ordering::SeqCst), 2);

        p.stop();
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(src.calls.load(Ordering::SeqCst), 2);
        assert!(!p.is_running());
    }

    #[tokio::test]
    async fn refetch_on_stopped_poller_is_noop() {
        let src = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        let p: Poller<u32> = Poller::new("test", src.clone());
        let s = p.refetch_now().await;
        assert_eq!(s.status, PollStatus::Idle);
        assert_eq!(src.calls.load(Ordering::SeqCst), 0);
    }
}
