// src/lib.rs
// Public library surface for the server binary, the probe CLI and integration tests.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod format;
pub mod ingest;
pub mod jitter;
pub mod metrics;
pub mod model;
pub mod poller;
pub mod sentiment;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::model::{AggregationResult, MarketAsset, NewsArticle, Sentiment, SourceUsed};
pub use crate::poller::{PollState, PollStatus, Poller};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the default filter; `FEED_LOG_JSON=1` switches to
/// JSON lines. Silently keeps an already installed subscriber (Shuttle
/// installs its own).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("crypto_feed_aggregator=info,warn"));

    let json = std::env::var("FEED_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
