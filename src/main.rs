//! Crypto Feed Aggregator: binary entrypoint.
//! Boots the Axum HTTP server with the market poller running and news
//! pollers created per topic on demand.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;

use crypto_feed_aggregator::{api, config, init_tracing, metrics::Metrics};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = config::load_default().context("loading feed config")?;
    tracing::info!(
        market_every = cfg.market.refresh_secs,
        news_every = cfg.news.refresh_secs,
        live_topics = ?cfg.news.live_topics,
        "feed config loaded"
    );

    let metrics_router = match Metrics::init(&cfg) {
        Ok(m) => Some(m.router()),
        Err(e) => {
            tracing::warn!(error = %e, "prometheus recorder not installed; /metrics disabled");
            None
        }
    };

    let state = api::AppState::from_config(cfg).context("building app state")?;
    let mut router = api::router(state);
    if let Some(m) = metrics_router {
        router = router.merge(m);
    }

    Ok(router.into())
}
