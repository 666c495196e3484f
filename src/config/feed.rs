// src/config/feed.rs
use serde::{Deserialize, Serialize};
use std::env;

fn default_market_base() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}
fn default_per_page() -> u32 {
    10
}
fn default_market_refresh() -> u64 {
    30
}
fn default_jitter_secs() -> u64 {
    5
}
fn default_desired() -> usize {
    6
}
fn default_news_refresh() -> u64 {
    300
}
fn default_live_topics() -> Vec<String> {
    vec!["BTC".to_string()]
}
fn default_true() -> bool {
    true
}
fn default_cryptocompare_base() -> String {
    "https://min-api.cryptocompare.com/data/v2".to_string()
}
fn default_newsapi_base() -> String {
    "https://newsapi.org/v2".to_string()
}
fn default_newsapi_sources() -> Vec<String> {
    ["coindesk", "cointelegraph", "bitcoin-magazine", "decrypt"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_cryptopanic_base() -> String {
    "https://cryptopanic.com/api/v1".to_string()
}
fn default_timeout() -> u64 {
    10
}
fn default_connect_timeout() -> u64 {
    4
}
fn default_user_agent() -> String {
    "crypto-feed-aggregator/0.1".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_market_base")]
    pub base_url: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_market_refresh")]
    pub refresh_secs: u64,
    /// Period of the presentation-only jitter view.
    #[serde(default = "default_jitter_secs")]
    pub jitter_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: default_market_base(),
            per_page: default_per_page(),
            refresh_secs: default_market_refresh(),
            jitter_secs: default_jitter_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// Output size of every news aggregation.
    #[serde(default = "default_desired")]
    pub desired: usize,
    #[serde(default = "default_news_refresh")]
    pub refresh_secs: u64,
    /// Tickers that run the provider cascade; the rest use headline templates.
    #[serde(default = "default_live_topics")]
    pub live_topics: Vec<String>,
    #[serde(default)]
    pub cryptocompare: CryptoCompareConfig,
    #[serde(default)]
    pub newsapi: NewsApiConfig,
    #[serde(default)]
    pub cryptopanic: CryptoPanicConfig,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            desired: default_desired(),
            refresh_secs: default_news_refresh(),
            live_topics: default_live_topics(),
            cryptocompare: CryptoCompareConfig::default(),
            newsapi: NewsApiConfig::default(),
            cryptopanic: CryptoPanicConfig::default(),
        }
    }
}

impl NewsConfig {
    pub fn is_live(&self, symbol: &str) -> bool {
        self.live_topics
            .iter()
            .any(|t| t.trim().eq_ignore_ascii_case(symbol.trim()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoCompareConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cryptocompare_base")]
    pub base_url: String,
    /// Literal key, "ENV" (reads CRYPTOCOMPARE_API_KEY) or empty.
    #[serde(default)]
    pub api_key: String,
}

impl Default for CryptoCompareConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_cryptocompare_base(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsApiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_newsapi_base")]
    pub base_url: String,
    /// Literal key, "ENV" (reads NEWSAPI_API_KEY) or empty. Empty skips the provider.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_newsapi_sources")]
    pub sources: Vec<String>,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_newsapi_base(),
            api_key: String::new(),
            sources: default_newsapi_sources(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoPanicConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cryptopanic_base")]
    pub base_url: String,
    /// Literal token, "ENV" (reads CRYPTOPANIC_API_KEY) or empty.
    #[serde(default)]
    pub api_key: String,
}

impl Default for CryptoPanicConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_cryptopanic_base(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// "ENV" (any case) → value of `var`, missing var → empty.
fn resolve_key(raw: &str, var: &str) -> String {
    if raw.trim().eq_ignore_ascii_case("env") {
        env::var(var).unwrap_or_default()
    } else {
        raw.trim().to_string()
    }
}

impl FeedConfig {
    /// Resolve "ENV" keys and replace zero sizes/intervals with defaults.
    pub fn finalize(mut self) -> Self {
        let n = &mut self.news;
        n.cryptocompare.api_key = resolve_key(&n.cryptocompare.api_key, "CRYPTOCOMPARE_API_KEY");
        n.newsapi.api_key = resolve_key(&n.newsapi.api_key, "NEWSAPI_API_KEY");
        n.cryptopanic.api_key = resolve_key(&n.cryptopanic.api_key, "CRYPTOPANIC_API_KEY");

        if n.desired == 0 {
            n.desired = default_desired();
        }
        if n.refresh_secs == 0 {
            n.refresh_secs = default_news_refresh();
        }

        let m = &mut self.market;
        if m.per_page == 0 {
            m.per_page = default_per_page();
        }
        if m.refresh_secs == 0 {
            m.refresh_secs = default_market_refresh();
        }
        if m.jitter_secs == 0 {
            m.jitter_secs = default_jitter_secs();
        }

        let h = &mut self.http;
        if h.timeout_secs == 0 {
            h.timeout_secs = default_timeout();
        }
        if h.connect_timeout_secs == 0 {
            h.connect_timeout_secs = default_connect_timeout();
        }
        self
    }
}
