//! # Presentation jitter
//! Small random wobble applied to market snapshots so a dashboard looks live
//! between refreshes: `price × U[0.98, 1.02)` and `change24h + U[-1, 1)`.
//!
//! Never applied by the polling cache or an adapter. The market aggregator
//! uses it on the hardcoded fallback snapshot, and [`JitterView`] reapplies
//! it to whatever the market cache currently holds, on a short period and on
//! every cache update.

use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::model::MarketAsset;
use crate::poller::PollState;

pub const PRICE_FACTOR_MIN: f64 = 0.98;
pub const PRICE_FACTOR_MAX: f64 = 1.02;
pub const CHANGE_SPREAD: f64 = 1.0;

pub fn jitter_asset<R: Rng + ?Sized>(asset: &mut MarketAsset, rng: &mut R) {
    asset.price *= rng.random_range(PRICE_FACTOR_MIN..PRICE_FACTOR_MAX);
    asset.change_24h += rng.random_range(-CHANGE_SPREAD..CHANGE_SPREAD);
}

pub fn apply_jitter<R: Rng + ?Sized>(assets: &mut [MarketAsset], rng: &mut R) {
    for a in assets.iter_mut() {
        jitter_asset(a, rng);
    }
}

/// Jittered copy of a market cache, republished every `period` and
/// immediately whenever the cache publishes a new state.
///
/// Each republish starts from the cache's current (unjittered) snapshot, so
/// the wobble never accumulates.
pub struct JitterView {
    rx: watch::Receiver<PollState<MarketAsset>>,
    task: JoinHandle<()>,
}

impl JitterView {
    pub fn spawn(mut source: watch::Receiver<PollState<MarketAsset>>, period: Duration) -> Self {
        let initial = source.borrow_and_update().clone();
        let (tx, rx) = watch::channel(initial);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    changed = source.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
                let mut snap = source.borrow_and_update().clone();
                apply_jitter(&mut snap.data, &mut rand::rng());
                if tx.send(snap).is_err() {
                    break;
                }
            }
        });
        Self { rx, task }
    }

    pub fn snapshot(&self) -> PollState<MarketAsset> {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState<MarketAsset>> {
        self.rx.clone()
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for JitterView {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fallback::market_snapshot;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn jitter_stays_in_bounds() {
        let base = market_snapshot(Utc::now());
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let mut v = base.clone();
            apply_jitter(&mut v, &mut rng);
            for (j, b) in v.iter().zip(base.iter()) {
                let f = j.price / b.price;
                assert!((PRICE_FACTOR_MIN - 1e-9..PRICE_FACTOR_MAX + 1e-9).contains(&f));
                assert!((j.change_24h - b.change_24h).abs() <= CHANGE_SPREAD);
                assert_eq!(j.market_cap, b.market_cap);
                assert_eq!(j.rank, b.rank);
            }
        }
    }
}
