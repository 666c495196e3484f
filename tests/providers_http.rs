// tests/providers_http.rs
//
// Adapters against a local mock server: request shape, status handling,
// and the NewsAPI no-key short circuit.

use httpmock::{Method::GET, MockServer};

use crypto_feed_aggregator::config::{
    CryptoCompareConfig, HttpConfig, MarketConfig, NewsApiConfig,
};
use crypto_feed_aggregator::ingest::build_http_client;
use crypto_feed_aggregator::ingest::error::{AdapterError, ErrorKind};
use crypto_feed_aggregator::ingest::providers::{
    coingecko::CoinGeckoAdapter, cryptocompare::CryptoCompareAdapter, newsapi::NewsApiAdapter,
};
use crypto_feed_aggregator::ingest::types::{NewsTopic, SourceAdapter};

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{name}")).unwrap()
}

fn client() -> reqwest::Client {
    build_http_client(&HttpConfig::default()).unwrap()
}

#[tokio::test]
async fn coingecko_sends_market_query_and_parses() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v3/coins/markets")
            .query_param("vs_currency", "usd")
            .query_param("order", "market_cap_desc")
            .query_param("per_page", "10")
            .query_param("page", "1");
        then.status(200)
            .header("content-type", "application/json")
            .body(fixture("coingecko_markets.json"));
    });

    let cfg = MarketConfig {
        base_url: format!("{}/api/v3", server.base_url()),
        ..MarketConfig::default()
    };
    let assets = CoinGeckoAdapter::new(client(), &cfg)
        .fetch_latest()
        .await
        .expect("coingecko ok");
    mock.assert();
    assert_eq!(assets.len(), 3);
    assert_eq!(assets[1].symbol, "ETH");
}

#[tokio::test]
async fn non_2xx_is_status_error() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/coins/markets");
        then.status(429).body("slow down");
    });

    let cfg = MarketConfig {
        base_url: server.base_url(),
        ..MarketConfig::default()
    };
    let err = CoinGeckoAdapter::new(client(), &cfg)
        .fetch_latest()
        .await
        .unwrap_err();
    mock.assert();
    match &err {
        AdapterError::Status { status, provider, .. } => {
            assert_eq!(*status, 429);
            assert_eq!(*provider, "CoinGecko");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    let cfg = MarketConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        ..MarketConfig::default()
    };
    let err = CoinGeckoAdapter::new(client(), &cfg)
        .fetch_latest()
        .await
        .unwrap_err();
    assert!(matches!(err, AdapterError::Transport { .. }));
}

#[tokio::test]
async fn cryptocompare_sends_topic_and_key() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/data/v2/news/")
            .query_param("lang", "EN")
            .query_param("categories", "BTC")
            .query_param("sortOrder", "latest")
            .query_param("limit", "6")
            .query_param("api_key", "secret");
        then.status(200)
            .header("content-type", "application/json")
            .body(fixture("cryptocompare_news.json"));
    });

    let cfg = CryptoCompareConfig {
        base_url: format!("{}/data/v2", server.base_url()),
        api_key: "secret".to_string(),
        ..CryptoCompareConfig::default()
    };
    let items = CryptoCompareAdapter::new(client(), &cfg, &NewsTopic::from_symbol("btc"), 6)
        .fetch_latest()
        .await
        .expect("cryptocompare ok");
    mock.assert();
    assert_eq!(items.len(), 3);
}

#[tokio::test]
async fn newsapi_builds_search_query() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/everything")
            .query_param("q", "Bitcoin OR BTC cryptocurrency")
            .query_param("sources", "coindesk,cointelegraph,bitcoin-magazine,decrypt")
            .query_param("sortBy", "publishedAt")
            .query_param("pageSize", "6")
            .query_param("apiKey", "k");
        then.status(200)
            .header("content-type", "application/json")
            .body(fixture("newsapi_everything.json"));
    });

    let cfg = NewsApiConfig {
        base_url: format!("{}/v2", server.base_url()),
        api_key: "k".to_string(),
        ..NewsApiConfig::default()
    };
    let items = NewsApiAdapter::new(client(), &cfg, &NewsTopic::from_symbol("BTC"), 6)
        .fetch_latest()
        .await
        .expect("newsapi ok");
    mock.assert();
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn newsapi_without_key_makes_no_request() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v2/everything");
        then.status(200).body(r#"{"status":"ok","articles":[]}"#);
    });

    let cfg = NewsApiConfig {
        base_url: format!("{}/v2", server.base_url()),
        api_key: String::new(),
        ..NewsApiConfig::default()
    };
    let items = NewsApiAdapter::new(client(), &cfg, &NewsTopic::from_symbol("BTC"), 6)
        .fetch_latest()
        .await
        .expect("no-key newsapi is not an error");
    assert!(items.is_empty());
    mock.assert_calls(0);
}
