// tests/metrics.rs
use std::sync::Arc;
use std::time::Duration;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use crypto_feed_aggregator::aggregate::{NewsAdapter, NewsAggregator};
use crypto_feed_aggregator::config::FeedConfig;
use crypto_feed_aggregator::ingest::providers::cryptopanic::CryptoPanicAdapter;
use crypto_feed_aggregator::metrics::Metrics;
use crypto_feed_aggregator::model::NewsArticle;
use crypto_feed_aggregator::poller::Poller;

#[tokio::test]
async fn metrics_endpoint_contains_expected_series() {
    let metrics = Metrics::init(&FeedConfig::default()).expect("recorder");

    // One poll cycle whose only adapter fails → errors + fallback + cycle series.
    let adapters: Vec<NewsAdapter> =
        vec![Box::new(CryptoPanicAdapter::from_fixture("not json", 6))];
    let agg = NewsAggregator::new(adapters, 6);
    let p: Poller<NewsArticle> = Poller::new("news:BTC", Arc::new(agg));
    p.start(Duration::from_secs(3600));
    let s = p.refetch_now().await;
    assert_eq!(s.data.len(), 6);
    p.stop();

    let resp = metrics
        .router()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "feed_adapter_errors_total",
        "kind=\"shape\"",
        "feed_fallback_items_total",
        "feed_poll_cycles_total",
        "feed_poll_last_success_ts",
        "feed_refresh_interval_secs",
    ] {
        assert!(text.contains(needle), "missing series {needle} in:\n{text}");
    }

    // a second recorder cannot be installed
    assert!(Metrics::init(&FeedConfig::default()).is_err());
}
