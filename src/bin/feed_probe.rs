//! One-shot probe: runs the market aggregator and one news topic once and
//! prints what a dashboard would show.
//!
//! Usage: `feed_probe [SYMBOL]` (default `BTC`).

use anyhow::Context;
use crypto_feed_aggregator::aggregate::{news_source_for, MarketAggregator};
use crypto_feed_aggregator::{config, init_tracing};
use crypto_feed_aggregator::format::{format_change, format_number, format_price};
use crypto_feed_aggregator::ingest::{build_http_client, types::NewsTopic};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let symbol = std::env::args().nth(1).unwrap_or_else(|| "BTC".to_string());
    let cfg = config::load_default().context("loading feed config")?;
    let client = build_http_client(&cfg.http)?;

    let market = MarketAggregator::from_config(&cfg, client.clone())
        .aggregate()
        .await;
    println!(
        "market via {} (partial: {}) at {}",
        market.source_used, market.is_partial, market.fetched_at
    );
    for a in &market.items {
        println!(
            "{:>3}  {:<6} {:>14} {:>9}  vol {:>8}  cap {:>8}",
            a.rank,
            a.symbol,
            format_price(a.price),
            format_change(a.change_24h),
            format_number(a.volume_24h),
            format_number(a.market_cap),
        );
    }

    let topic = NewsTopic::from_symbol(&symbol);
    let news = news_source_for(&cfg, client, &topic)
        .refresh()
        .await
        .context("news refresh")?;
    println!();
    println!(
        "news for {} ({}) via {} (partial: {})",
        topic.name, topic.symbol, news.source_used, news.is_partial
    );
    for n in &news.items {
        println!(
            "[{:?}] {} | {} | {}",
            n.sentiment.label, n.title, n.source.name, n.published_at
        );
    }

    Ok(())
}
