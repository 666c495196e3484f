// src/ingest/providers/newsapi.rs
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;

use super::Mode;
use crate::config::NewsApiConfig;
use crate::ingest::error::AdapterError;
use crate::ingest::types::{NewsTopic, SourceAdapter};
use crate::ingest::{join_url, non_empty, parse_iso_utc, PLACEHOLDER_IMAGE};
use crate::model::{NewsArticle, NewsSource};
use crate::sentiment;

const NAME: &str = "NewsAPI";
/// Title NewsAPI puts on withdrawn articles.
const REMOVED: &str = "[Removed]";

#[derive(Debug, Deserialize)]
struct Envelope {
    status: Option<String>,
    message: Option<String>,
    articles: Option<Vec<Item>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Item {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    /// ISO-8601.
    published_at: Option<String>,
    source: Option<Source>,
}

#[derive(Debug, Deserialize)]
struct Source {
    name: Option<String>,
}

/// Secondary news provider (`/everything` search). Without an API key the
/// adapter yields nothing and makes no request.
pub struct NewsApiAdapter {
    mode: Mode,
    api_key: String,
    query: Vec<(&'static str, String)>,
    limit: usize,
}

impl NewsApiAdapter {
    pub fn new(client: reqwest::Client, cfg: &NewsApiConfig, topic: &NewsTopic, limit: usize) -> Self {
        let mut query = vec![
            ("q", format!("{} OR {} cryptocurrency", topic.name, topic.symbol)),
            ("sortBy", "publishedAt".to_string()),
            ("pageSize", limit.to_string()),
        ];
        if !cfg.sources.is_empty() {
            query.push(("sources", cfg.sources.join(",")));
        }
        if !cfg.api_key.is_empty() {
            query.push(("apiKey", cfg.api_key.clone()));
        }
        Self {
            mode: Mode::Http {
                client,
                url: join_url(&cfg.base_url, "everything"),
            },
            api_key: cfg.api_key.clone(),
            query,
            limit,
        }
    }

    pub fn from_fixture(s: &str, limit: usize) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
            api_key: String::new(),
            query: Vec::new(),
            limit,
        }
    }

    fn parse_articles(s: &str, limit: usize) -> Result<Vec<NewsArticle>, AdapterError> {
        let env: Envelope = serde_json::from_str(s)
            .map_err(|e| AdapterError::shape(NAME, format!("envelope: {e}")))?;

        let Some(items) = env.articles else {
            return Err(AdapterError::shape(
                NAME,
                format!(
                    "missing `articles` (status={}, message={})",
                    env.status.as_deref().unwrap_or("-"),
                    env.message.as_deref().unwrap_or("-")
                ),
            ));
        };

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
    let title = non_empty(it.title.as_deref()).filter(|t| t != REMOVED)?;
    let url = it.url.filter(|u| !u.trim().is_empty())?;
    let published_at = it.published_at.as_deref().and_then(parse_iso_utc)?;

    let description_raw = non_empty(it.description.as_deref());
    let sentiment = sentiment::classify(&title, description_raw.as_deref());
    let description = description_raw.unwrap_or_else(|| title.clone());
    let content = non_empty(it.content.as_deref()).unwrap_or_else(|| description.clone());

    let source_name = it
        .source
        .and_then(|s| s.name)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| NAME.to_string());

    Some(NewsArticle {
        description,
        content,
        image_url: it
            .url_to_image
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
impl SourceAdapter<NewsArticle> for NewsApiAdapter {
    async fn fetch_latest(&self) -> Result<Vec<NewsArticle>, AdapterError> {
        if self.mode.is_http() && self.api_key.is_empty() {
            tracing::debug!(adapter = NAME, "no api key configured; skipping");
            return Ok(Vec::new());
        }
        let body = self.mode.body(NAME, &self.query).await?;
        Self::parse_articles(&body, self.limit)
    }

    fn name(&self) -> &'static str {
        NAME
    }
}
