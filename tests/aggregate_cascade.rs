// tests/aggregate_cascade.rs
//
// News cascade and market fallback with scripted adapters.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crypto_feed_aggregator::aggregate::{MarketAggregator, NewsAggregator};
use crypto_feed_aggregator::ingest::error::AdapterError;
use crypto_feed_aggregator::ingest::fallback::{curated_news, market_snapshot};
use crypto_feed_aggregator::ingest::types::SourceAdapter;
use crypto_feed_aggregator::model::{MarketAsset, NewsArticle, NewsSource, Sentiment, SourceUsed};

enum Script {
    Fail,
    Items(usize),
}

struct Stub {
    name: &'static str,
    script: Script,
    calls: Arc<AtomicUsize>,
}

fn article(tag: &str, i: usize) -> NewsArticle {
    NewsArticle {
        title: format!("{tag} headline {i}"),
        description: String::new(),
        content: String::new(),
        url: format!("https://{tag}.example/{i}"),
        image_url: String::new(),
        published_at: Utc::now(),
        source: NewsSource {
            name: tag.to_string(),
            url: format!("https://{tag}.example"),
        },
        sentiment: Sentiment::NEUTRAL,
    }
}

#[async_trait]
impl SourceAdapter<NewsArticle> for Stub {
    async fn fetch_latest(&self) -> Result<Vec<NewsArticle>, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::Fail => Err(AdapterError::shape(self.name, "scripted failure")),
            Script::Items(n) => Ok((0..n).map(|i| article(self.name, i)).collect()),
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

fn stub(name: &'static str, script: Script) -> (Box<dyn SourceAdapter<NewsArticle>>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let s = Stub {
        name,
        script,
        calls: calls.clone(),
    };
    (Box::new(s), calls)
}

#[tokio::test]
async fn first_non_empty_adapter_wins_and_is_topped_up() {
    let (a, a_calls) = stub("first", Script::Fail);
    let (b, b_calls) = stub("second", Script::Items(1));
    let (c, c_calls) = stub("third", Script::Items(6));

    let agg = NewsAggregator::new(vec![a, b, c], 6);
    let res = agg.aggregate().await;

    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
    assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    assert_eq!(c_calls.load(Ordering::SeqCst), 0, "cascade must stop at the first non-empty adapter");

    assert_eq!(res.items.len(), 6);
    assert_eq!(res.items[0].source.name, "second");
    let curated: Vec<String> = curated_news(Utc::now()).into_iter().map(|a| a.url).collect();
    assert!(res.items[1..].iter().all(|a| curated.contains(&a.url)));
    assert_eq!(res.source_used, SourceUsed::adapter("second"));
    assert!(res.is_partial);
}

#[tokio::test]
async fn oversupply_is_truncated() {
    let (a, _) = stub("big", Script::Items(10));
    let res = NewsAggregator::new(vec![a], 6).aggregate().await;
    assert_eq!(res.items.len(), 6);
    assert!(!res.is_partial);
    assert!(res.items.iter().all(|a| a.source.name == "big"));
}

#[tokio::test]
async fn all_failing_yields_curated_list() {
    let (a, _) = stub("a", Script::Fail);
    let (b, _) = stub("b", Script::Items(0));
    let (c, _) = stub("c", Script::Fail);
    let res = NewsAggregator::new(vec![a, b, c], 6).aggregate().await;

    let curated: Vec<String> = curated_news(Utc::now()).into_iter().map(|a| a.url).collect();
    let got: Vec<String> = res.items.iter().map(|a| a.url.clone()).collect();
    assert_eq!(got, curated);
    assert_eq!(res.source_used, SourceUsed::Fallback);
    assert!(res.is_partial);
}

#[tokio::test]
async fn no_adapters_still_returns_desired_count() {
    let res = NewsAggregator::new(Vec::new(), 4).aggregate().await;
    assert_eq!(res.items.len(), 4);
}

struct CuratedEcho;

#[async_trait]
impl SourceAdapter<NewsArticle> for CuratedEcho {
    async fn fetch_latest(&self) -> Result<Vec<NewsArticle>, AdapterError> {
        let mut v = curated_news(Utc::now());
        v.truncate(2);
        let dup = v[0].clone();
        v.push(dup);
        Ok(v)
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

#[tokio::test]
async fn urls_are_unique_across_real_and_fallback() {
    let adapters: Vec<Box<dyn SourceAdapter<NewsArticle>>> = vec![Box::new(CuratedEcho)];
    let res = NewsAggregator::new(adapters, 6).aggregate().await;
    assert_eq!(res.items.len(), 6);
    let mut urls: Vec<&str> = res.items.iter().map(|a| a.url.as_str()).collect();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), 6);
    assert_eq!(res.items[0].source.name, curated_news(Utc::now())[0].source.name);
}

struct FailingMarket;

#[async_trait]
impl SourceAdapter<MarketAsset> for FailingMarket {
    async fn fetch_latest(&self) -> Result<Vec<MarketAsset>, AdapterError> {
        Err(AdapterError::shape("CoinGecko", "scripted"))
    }

    fn name(&self) -> &'static str {
        "CoinGecko"
    }
}

#[tokio::test]
async fn market_failure_serves_jittered_snapshot() {
    let res = MarketAggregator::new(Box::new(FailingMarket)).aggregate().await;
    let base = market_snapshot(Utc::now());

    assert_eq!(res.items.len(), 10);
    assert_eq!(res.source_used, SourceUsed::Fallback);
    assert!(res.is_partial);

    let ranks: Vec<u32> = res.items.iter().map(|a| a.rank).collect();
    assert_eq!(ranks, (1..=10).collect::<Vec<u32>>());

    for a in &res.items {
        let b = base.iter().find(|b| b.id == a.id).expect("known id");
        let f = a.price / b.price;
        assert!((0.98 - 1e-9..1.02 + 1e-9).contains(&f), "{} factor {f}", a.id);
        assert!((a.change_24h - b.change_24h).abs() <= 1.0);
    }
}

struct Unsorted;

#[async_trait]
impl SourceAdapter<MarketAsset> for Unsorted {
    async fn fetch_latest(&self) -> Result<Vec<MarketAsset>, AdapterError> {
        let mut v = market_snapshot(Utc::now());
        v.swap(0, 3);
        let extra = v[1].clone();
        v.push(extra);
        Ok(v)
    }

    fn name(&self) -> &'static str {
        "unsorted"
    }
}

#[tokio::test]
async fn market_result_is_deduped_and_reranked() {
    let res = MarketAggregator::new(Box::new(Unsorted)).aggregate().await;
    assert_eq!(res.items.len(), 10);
    assert_eq!(res.items[0].id, "bitcoin");
    assert_eq!(res.items[0].rank, 1);
    assert!(res
        .items
        .windows(2)
        .all(|w| w[0].market_cap >= w[1].market_cap));
    assert_eq!(res.source_used, SourceUsed::adapter("unsorted"));
    assert!(!res.is_partial);
}
