use axum::{routing::get, Router};
use metrics::gauge;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::FeedConfig;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder and publish the configured
    /// refresh cadence as static gauges.
    ///
    /// Fails if another recorder is already installed (e.g. a second call).
    pub fn init(cfg: &FeedConfig) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;

        crate::ingest::ensure_metrics_described();
        gauge!("feed_refresh_interval_secs", "resource" => "market")
            .set(cfg.market.refresh_secs as f64);
        gauge!("feed_refresh_interval_secs", "resource" => "news")
            .set(cfg.news.refresh_secs as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
