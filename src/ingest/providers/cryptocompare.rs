// src/ingest/providers/cryptocompare.rs
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;

use super::Mode;
use crate::config::CryptoCompareConfig;
use crate::ingest::error::AdapterError;
use crate::ingest::types::{NewsTopic, SourceAdapter};
use crate::ingest::{join_url, non_empty, unix_to_utc, PLACEHOLDER_IMAGE};
use crate::model::{NewsArticle, NewsSource};
use crate::sentiment;

const NAME: &str = "CryptoCompare";
/// `Type` value of a successful response.
const TYPE_OK: i64 = 100;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Type")]
    kind: Option<i64>,
    #[serde(rename = "Message")]
    message: Option<String>,
    #[serde(rename = "Data")]
    data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    body: Option<String>,
    url: Option<String>,
    imageurl: Option<String>,
    /// Unix seconds.
    published_on: Option<i64>,
    source: Option<String>,
    source_info: Option<SourceInfo>,
}

#[derive(Debug, Deserialize)]
struct SourceInfo {
    name: Option<String>,
}

/// Primary news provider (`/news/` feed, latest first).
pub struct CryptoCompareAdapter {
    mode: Mode,
    query: Vec<(&'static str, String)>,
    limit: usize,
}

impl CryptoCompareAdapter {
    pub fn new(
        client: reqwest::Client,
        cfg: &CryptoCompareConfig,
        topic: &NewsTopic,
        limit: usize,
    ) -> Self {
        let mut query = vec![
            ("lang", "EN".to_string()),
            ("categories", topic.symbol.clone()),
            ("sortOrder", "latest".to_string()),
            ("limit", limit.to_string()),
        ];
        if !cfg.api_key.is_empty() {
            query.push(("api_key", cfg.api_key.clone()));
        }
        Self {
            mode: Mode::Http {
                client,
                url: join_url(&cfg.base_url, "news/"),
            },
            query,
            limit,
        }
    }

    pub fn from_fixture(s: &str, limit: usize) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
            query: Vec::new(),
            limit,
        }
    }

    fn parse_articles(s: &str, limit: usize) -> Result<Vec<NewsArticle>, AdapterError> {
        let env: Envelope = serde_json::from_str(s)
            .map_err(|e| AdapterError::shape(NAME, format!("envelope: {e}")))?;

        if env.kind != Some(TYPE_OK) {
            return Err(AdapterError::shape(
                NAME,
                format!(
                    "Type={:?} message={}",
                    env.kind,
                    env.message.as_deref().unwrap_or("-")
                ),
            ));
        }
        let data = env
            .data
            .ok_or_else(|| AdapterError::shape(NAME, "missing `Data`"))?;
        let items: Vec<Item> = serde_json::from_value(data)
            .map_err(|e| AdapterError::shape(NAME, format!("`Data` items: {e}")))?;

        let mut out = Vec::with_capacity(items.len().min(limit));
        for it in items {
            if out.len() >= limit {
                break;
            }
            match to_article(it) {
                Some(a) => out.push(a),
                None => {
                    counter!("feed_adapter_items_skipped_total", "adapter" => NAME).increment(1);
                }
            }
        }
        Ok(out)
    }
}

fn to_article(it: Item) -> Option<NewsArticle> {
    let title = non_empty(it.title.as_deref())?;
    let url = it.url.filter(|u| !u.trim().is_empty())?;
    let published_at = it.published_on.and_then(unix_to_utc)?;

    let body = non_empty(it.body.as_deref());
    let sentiment = sentiment::classify(&title, body.as_deref());
    let description = body.unwrap_or_else(|| title.clone());

    let source_name = it
        .source_info
        .and_then(|si| si.name)
        .or(it.source)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| NAME.to_string());

    Some(NewsArticle {
        content: description.clone(),
        description,
        image_url: it
            .imageurl
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        published_at,
        source: NewsSource {
            name: source_name,
            url: url.clone(),
        },
        url,
        title,
        sentiment,
    })
}

#[async_trait]
impl SourceAdapter<NewsArticle> for CryptoCompareAdapter {
    async fn fetch_latest(&self) -> Result<Vec<NewsArticle>, AdapterError> {
        let body = self.mode.body(NAME, &self.query).await?;
        Self::parse_articles(&body, self.limit)
    }

    fn name(&self) -> &'static str {
        NAME
    }
}
