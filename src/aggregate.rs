//! # Aggregation
//! Turns adapters into one result set per cycle. Never fails: the worst case
//! is curated fallback content.
//!
//! News runs a short-circuit cascade: adapters are tried in priority order
//! and the first one that yields at least one item wins, even if it yields
//! fewer than `desired`. Short results are then topped up from the curated
//! list and the whole set is cut to `desired`.
//!
//! Market data has a single adapter; on failure or an empty answer the
//! hardcoded snapshot (jittered) is served instead.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use tracing::{info, warn};

use crate::config::FeedConfig;
use crate::ingest::error::AdapterError;
use crate::ingest::fallback;
use crate::ingest::providers::{
    coingecko::CoinGeckoAdapter, cryptocompare::CryptoCompareAdapter,
    cryptopanic::CryptoPanicAdapter, newsapi::NewsApiAdapter,
};
use crate::ingest::types::{NewsTopic, SourceAdapter};
use crate::jitter;
use crate::model::{AggregationResult, MarketAsset, NewsArticle, SourceUsed};
use crate::poller::Refresh;

pub type NewsAdapter = Box<dyn SourceAdapter<NewsArticle>>;
pub type MarketAdapter = Box<dyn SourceAdapter<MarketAsset>>;

fn record_adapter_error(e: &AdapterError) {
    warn!(adapter = e.provider(), kind = e.kind().as_str(), error = %e, "adapter failed");
    counter!(
        "feed_adapter_errors_total",
        "adapter" => e.provider(),
        "kind" => e.kind().as_str()
    )
    .increment(1);
}

/// Ordered news adapters plus curated top-up.
pub struct NewsAggregator {
    adapters: Vec<NewsAdapter>,
    desired: usize,
}

impl NewsAggregator {
    pub fn new(adapters: Vec<NewsAdapter>, desired: usize) -> Self {
        Self { adapters, desired }
    }

    /// CryptoCompare → NewsAPI → CryptoPanic, skipping disabled providers.
    pub fn from_config(cfg: &FeedConfig, client: reqwest::Client, topic: &NewsTopic) -> Self {
        let n = &cfg.news;
        let mut adapters: Vec<NewsAdapter> = Vec::with_capacity(3);
        if n.cryptocompare.enabled {
            adapters.push(Box::new(CryptoCompareAdapter::new(
                client.clone(),
                &n.cryptocompare,
                topic,
                n.desired,
            )));
        }
        if n.newsapi.enabled {
            adapters.push(Box::new(NewsApiAdapter::new(
                client.clone(),
                &n.newsapi,
                topic,
                n.desired,
            )));
        }
        if n.cryptopanic.enabled {
            adapters.push(Box::new(CryptoPanicAdapter::new(
                client,
                &n.cryptopanic,
                topic,
                n.desired,
            )));
        }
        Self::new(adapters, n.desired)
    }

    pub fn desired(&self) -> usize {
        self.desired
    }

    pub async fn aggregate(&self) -> AggregationResult<NewsArticle> {
        crate::ingest::ensure_metrics_described();
        let now = Utc::now();

        let mut items: Vec<NewsArticle> = Vec::new();
        let mut source_used = SourceUsed::Fallback;

        for adapter in &self.adapters {
            match adapter.fetch_latest().await {
                Ok(v) if !v.is_empty() => {
                    info!(adapter = adapter.name(), count = v.len(), "news adapter satisfied request");
                    items = v;
                    source_used = SourceUsed::adapter(adapter.name());
                    break;
                }
                Ok(_) => {
                    tracing::debug!(adapter = adapter.name(), "news adapter returned nothing");
                }
                Err(e) => record_adapter_error(&e),
            }
        }

        let mut seen: HashSet<String> = HashSet::with_capacity(self.desired * 2);
        items.retain(|a| seen.insert(a.url.clone()));
        items.truncate(self.desired);

        let real = items.len();
        if items.len() < self.desired {
            for a in fallback::curated_news(now) {
                if items.len() >= self.desired {
                    break;
                }
                if seen.insert(a.url.clone()) {
                    items.push(a);
                }
            }
        }
        let topped_up = items.len() - real;
        if topped_up > 0 {
            counter!("feed_fallback_items_total", "resource" => "news").increment(topped_up as u64);
        }

        AggregationResult {
            items,
            fetched_at: now,
            source_used,
            is_partial: topped_up > 0,
        }
    }
}

#[async_trait::async_trait]
impl Refresh<NewsArticle> for NewsAggregator {
    async fn refresh(&self) -> anyhow::Result<AggregationResult<NewsArticle>> {
        Ok(self.aggregate().await)
    }
}

/// Headline templates for topics without a live feed.
pub struct TemplatedNews {
    topic: NewsTopic,
}

impl TemplatedNews {
    pub fn new(topic: NewsTopic) -> Self {
        Self { topic }
    }

    pub fn aggregate(&self) -> AggregationResult<NewsArticle> {
        let now = Utc::now();
        AggregationResult {
            items: fallback::templated_news(&self.topic.name, &self.topic.symbol, now),
            fetched_at: now,
            source_used: SourceUsed::Templated,
            is_partial: false,
        }
    }
}

#[async_trait::async_trait]
impl Refresh<NewsArticle> for TemplatedNews {
    async fn refresh(&self) -> anyhow::Result<AggregationResult<NewsArticle>> {
        Ok(self.aggregate())
    }
}

/// Refresh source for one news topic: the live cascade for configured
/// topics, templates for the rest.
pub fn news_source_for(
    cfg: &FeedConfig,
    client: reqwest::Client,
    topic: &NewsTopic,
) -> Arc<dyn Refresh<NewsArticle>> {
    if cfg.news.is_live(&topic.symbol) {
        Arc::new(NewsAggregator::from_config(cfg, client, topic))
    } else {
        Arc::new(TemplatedNews::new(topic.clone()))
    }
}

/// Single market adapter with the hardcoded snapshot as fallback.
pub struct MarketAggregator {
    adapter: MarketAdapter,
}

impl MarketAggregator {
    pub fn new(adapter: MarketAdapter) -> Self {
        Self { adapter }
    }

    pub fn from_config(cfg: &FeedConfig, client: reqwest::Client) -> Self {
        Self::new(Box::new(CoinGeckoAdapter::new(client, &cfg.market)))
    }

    pub async fn aggregate(&self) -> AggregationResult<MarketAsset> {
        crate::ingest::ensure_metrics_described();
        let now = Utc::now();

        let fetched = match self.adapter.fetch_latest().await {
            Ok(v) if !v.is_empty() => Some(v),
            Ok(_) => {
                warn!(adapter = self.adapter.name(), "market adapter returned nothing");
                None
            }
            Err(e) => {
                record_adapter_error(&e);
                None
            }
        };

        let (items, source_used, is_partial) = match fetched {
            Some(v) => (v, SourceUsed::adapter(self.adapter.name()), false),
            None => {
                let mut v = fallback::market_snapshot(now);
                jitter::apply_jitter(&mut v, &mut rand::rng());
                counter!("feed_fallback_items_total", "resource" => "market")
                    .increment(v.len() as u64);
                (v, SourceUsed::Fallback, true)
            }
        };

        AggregationResult {
            items: rerank(items),
            fetched_at: now,
            source_used,
            is_partial,
        }
    }
}

#[async_trait::async_trait]
impl Refresh<MarketAsset> for MarketAggregator {
    async fn refresh(&self) -> anyhow::Result<AggregationResult<MarketAsset>> {
        Ok(self.aggregate().await)
    }
}

/// Drop repeated ids, order by market cap (descending, stable) and assign
/// ranks 1..N.
pub fn rerank(assets: Vec<MarketAsset>) -> Vec<MarketAsset> {
    let mut seen: HashSet<String> = HashSet::with_capacity(assets.len());
    let mut out: Vec<MarketAsset> = assets
        .into_iter()
        .filter(|a| seen.insert(a.id.clone()))
        .collect();
    out.sort_by(|a, b| b.market_cap.total_cmp(&a.market_cap));
    for (i, a) in out.iter_mut().enumerate() {
        a.rank = i as u32 + 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fallback::market_snapshot;

    #[test]
    fn rerank_dedups_and_orders_by_cap() {
        let mut v = market_snapshot(Utc::now());
        v.reverse();
        let dup = v[0].clone();
        v.push(dup);
        let out = rerank(v);
        assert_eq!(out.len(), 10);
        assert_eq!(out[0].id, "bitcoin");
        assert_eq!(out[9].id, "avalanche-2");
        let ranks: Vec<u32> = out.iter().map(|a| a.rank).collect();
        assert_eq!(ranks, (1..=10).collect::<Vec<u32>>());
    }

    #[test]
    fn templated_topic_has_three_items() {
        let t = TemplatedNews::new(NewsTopic::from_symbol("SOL"));
        let r = t.aggregate();
        assert_eq!(r.items.len(), 3);
        assert_eq!(r.source_used, SourceUsed::Templated);
        assert!(r.items[0].title.contains("Solana"));
    }
}
