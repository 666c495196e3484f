//! # Canonical model
//! Provider-independent shapes produced by the ingest adapters and served to
//! dashboard consumers. Field names serialize in camelCase (`change24h`,
//! `marketCap`, `publishedAt`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One tradable instrument snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAsset {
    /// Stable slug, unique within a result set (e.g. `bitcoin`).
    pub id: String,
    pub name: String,
    /// Upper-case ticker.
    pub symbol: String,
    /// USD.
    pub price: f64,
    /// Signed percent.
    pub change_24h: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
    /// 1..N by descending market cap.
    pub rank: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentColor {
    Green,
    Red,
    Gray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub color: SentimentColor,
}

impl Sentiment {
    pub const POSITIVE: Sentiment = Sentiment {
        label: SentimentLabel::Positive,
        color: SentimentColor::Green,
    };
    pub const NEGATIVE: Sentiment = Sentiment {
        label: SentimentLabel::Negative,
        color: SentimentColor::Red,
    };
    pub const NEUTRAL: Sentiment = Sentiment {
        label: SentimentLabel::Neutral,
        color: SentimentColor::Gray,
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsSource {
    pub name: String,
    pub url: String,
}

/// One normalized news item, whatever provider it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub title: String,
    pub description: String,
    pub content: String,
    /// Dedup key within a result set.
    pub url: String,
    pub image_url: String,
    pub published_at: DateTime<Utc>,
    pub source: NewsSource,
    pub sentiment: Sentiment,
}

/// Which stage of the pipeline satisfied an aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "name")]
pub enum SourceUsed {
    /// A named upstream adapter produced the real items.
    Adapter(String),
    /// Curated / hardcoded content only.
    Fallback,
    /// Topic served from built-in headline templates.
    Templated,
}

impl SourceUsed {
    pub fn adapter(name: &str) -> Self {
        SourceUsed::Adapter(name.to_string())
    }
}

impl std::fmt::Display for SourceUsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceUsed::Adapter(name) => f.write_str(name),
            SourceUsed::Fallback => f.write_str("fallback"),
            SourceUsed::Templated => f.write_str("templated"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult<T> {
    pub items: Vec<T>,
    pub fetched_at: DateTime<Utc>,
    pub source_used: SourceUsed,
    /// True when fallback content had to be mixed in or substituted.
    pub is_partial: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn market_asset_serializes_camel_case() {
        let a = MarketAsset {
            id: "bitcoin".into(),
            name: "Bitcoin".into(),
            symbol: "BTC".into(),
            price: 1.0,
            change_24h: -2.5,
            volume_24h: 3.0,
            market_cap: 4.0,
            rank: 1,
            image_url: None,
            last_updated: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(v["change24h"], -2.5);
        assert_eq!(v["volume24h"], 3.0);
        assert_eq!(v["marketCap"], 4.0);
        assert!(v.get("imageUrl").is_none());
        assert_eq!(v["lastUpdated"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn sentiment_colors_are_lowercase() {
        let v = serde_json::to_value(Sentiment::NEGATIVE).unwrap();
        assert_eq!(v["label"], "Negative");
        assert_eq!(v["color"], "red");
    }

    #[test]
    fn source_used_display() {
        assert_eq!(SourceUsed::adapter("CryptoCompare").to_string(), "CryptoCompare");
        assert_eq!(SourceUsed::Fallback.to_string(), "fallback");
    }
}
