// src/ingest/providers/coingecko.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Deserialize;

use super::Mode;
use crate::config::MarketConfig;
use crate::ingest::error::AdapterError;
use crate::ingest::join_url;
use crate::ingest::types::SourceAdapter;
use crate::model::MarketAsset;

const NAME: &str = "CoinGecko";

#[derive(Debug, Deserialize)]
struct Coin {
    id: Option<String>,
    name: Option<String>,
    symbol: Option<String>,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    total_volume: Option<f64>,
    market_cap: Option<f64>,
    image: Option<String>,
}

/// Top-N coins by market cap in USD (`/coins/markets`).
pub struct CoinGeckoAdapter {
    mode: Mode,
    query: Vec<(&'static str, String)>,
}

impl CoinGeckoAdapter {
    pub fn new(client: reqwest::Client, cfg: &MarketConfig) -> Self {
        let query = vec![
            ("vs_currency", "usd".to_string()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", cfg.per_page.to_string()),
            ("page", "1".to_string()),
            ("sparkline", "false".to_string()),
            ("price_change_percentage", "24h".to_string()),
        ];
        Self {
            mode: Mode::Http {
                client,
                url: join_url(&cfg.base_url, "coins/markets"),
            },
            query,
        }
    }

    pub fn from_fixture(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
            query: Vec::new(),
        }
    }

    /// Provider order is trusted as market-cap order: rank = position + 1.
    fn parse_coins(s: &str, now: DateTime<Utc>) -> Result<Vec<MarketAsset>, AdapterError> {
        let coins: Vec<Coin> = serde_json::from_str(s)
            .map_err(|e| AdapterError::shape(NAME, format!("coin array: {e}")))?;

        let mut out: Vec<MarketAsset> = Vec::with_capacity(coins.len());
        for c in coins {
            let Some(asset) = to_asset(c, out.len() as u32 + 1, now) else {
                counter!("feed_adapter_items_skipped_total", "adapter" => NAME).increment(1);
                continue;
            };
            out.push(asset);
        }
        Ok(out)
    }
}

fn to_asset(c: Coin, rank: u32, now: DateTime<Utc>) -> Option<MarketAsset> {
    let id = c.id.filter(|s| !s.trim().is_empty())?;
    let price = c.current_price.filter(|p| p.is_finite() && *p > 0.0)?;
    let symbol = c.symbol.unwrap_or_default().trim().to_uppercase();
    let name = c
        .name
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| symbol.clone());

    Some(MarketAsset {
        id,
        name,
        symbol,
        price,
        change_24h: c
            .price_change_percentage_24h
            .filter(|v| v.is_finite())
            .unwrap_or(0.0),
        volume_24h: non_negative(c.total_volume),
        market_cap: non_negative(c.market_cap),
        rank,
        image_url: c.image.filter(|u| !u.trim().is_empty()),
        last_updated: now,
    })
}

fn non_negative(v: Option<f64>) -> f64 {
    v.filter(|x| x.is_finite() && *x >= 0.0).unwrap_or(0.0)
}

#[async_trait]
impl SourceAdapter<MarketAsset> for CoinGeckoAdapter {
    async fn fetch_latest(&self) -> Result<Vec<MarketAsset>, AdapterError> {
        let body = self.mode.body(NAME, &self.query).await?;
        Self::parse_coins(&body, Utc::now())
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls_default_to_zero_and_symbol_uppercases() {
        let s = r#"[{"id": "bitcoin", "name": "Bitcoin", "symbol": "btc", "current_price": 43000.5,
                     "price_change_percentage_24h": null, "total_volume": null, "market_cap": 8.5e11}]"#;
        let v = CoinGeckoAdapter::parse_coins(s, Utc::now()).unwrap();
        assert_eq!(v[0].symbol, "BTC");
        assert_eq!(v[0].change_24h, 0.0);
        assert_eq!(v[0].volume_24h, 0.0);
        assert_eq!(v[0].rank, 1);
        assert!(v[0].image_url.is_none());
    }

    #[test]
    fn priceless_coins_are_skipped_and_ranks_stay_dense() {
        let s = r#"[
            {"id": "a", "name": "A", "symbol": "a", "current_price": null, "market_cap": 3},
            {"id": "b", "name": "B", "symbol": "b", "current_price": 2.0, "market_cap": 2},
            {"id": "c", "name": "C", "symbol": "c", "current_price": 1.0, "market_cap": 1}
        ]"#;
        let v = CoinGeckoAdapter::parse_coins(s, Utc::now()).unwrap();
        let ranks: Vec<u32> = v.iter().map(|a| a.rank).collect();
        assert_eq!(ranks, vec![1, 2]);
        assert_eq!(v[0].id, "b");
    }

    #[test]
    fn error_object_is_shape_error() {
        let s = r#"{"status": {"error_code": 429, "error_message": "throttled"}}"#;
        assert!(CoinGeckoAdapter::parse_coins(s, Utc::now()).is_err());
    }
}
