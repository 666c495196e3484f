// src/ingest/providers/cryptopanic.rs
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;

use super::Mode;
use crate::config::CryptoPanicConfig;
use crate::ingest::error::AdapterError;
use crate::ingest::types::{NewsTopic, SourceAdapter};
use crate::ingest::{join_url, non_empty, parse_iso_utc, PLACEHOLDER_IMAGE};
use crate::model::{NewsArticle, NewsSource};
use crate::sentiment;

const NAME: &str = "CryptoPanic";

#[derive(Debug, Deserialize)]
struct Envelope {
    results: Option<Vec<Post>>,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    metadata: Option<Metadata>,
    source: Option<Source>,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    description: Option<String>,
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Source {
    title: Option<String>,
}

/// Tertiary news provider (public `posts/` feed).
pub struct CryptoPanicAdapter {
    mode: Mode,
    query: Vec<(&'static str, String)>,
    limit: usize,
}

impl CryptoPanicAdapter {
    pub fn new(
        client: reqwest::Client,
        cfg: &CryptoPanicConfig,
        topic: &NewsTopic,
        limit: usize,
    ) -> Self {
        let mut query = vec![
            ("currencies", topic.symbol.clone()),
            ("public", "true".to_string()),
            ("kind", "news".to_string()),
        ];
        if !cfg.api_key.is_empty() {
            query.push(("auth_token", cfg.api_key.clone()));
        }
        Self {
            mode: Mode::Http {
                client,
                url: join_url(&cfg.base_url, "posts/"),
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

    /// The feed has no page-size parameter; only the first `limit` posts are read.
    fn parse_posts(s: &str, limit: usize) -> Result<Vec<NewsArticle>, AdapterError> {
        let env: Envelope = serde_json::from_str(s)
            .map_err(|e| AdapterError::shape(NAME, format!("envelope: {e}")))?;
        let posts = env
            .results
            .ok_or_else(|| AdapterError::shape(NAME, "missing `results`"))?;

        let mut out = Vec::with_capacity(limit.min(posts.len()));
        for p in posts.into_iter().take(limit) {
            match to_article(p) {
                Some(a) => out.push(a),
                None => {
                    counter!("feed_adapter_items_skipped_total", "adapter" => NAME).increment(1);
                }
            }
        }
        Ok(out)
    }
}

fn to_article(p: Post) -> Option<NewsArticle> {
    let title = non_empty(p.title.as_deref())?;
    let url = p.url.filter(|u| !u.trim().is_empty())?;
    let published_at = p.published_at.as_deref().and_then(parse_iso_utc)?;

    let (desc_raw, image) = match p.metadata {
        Some(m) => (non_empty(m.description.as_deref()), m.image),
        None => (None, None),
    };
    let sentiment = sentiment::classify(&title, desc_raw.as_deref());
    let description = desc_raw.unwrap_or_else(|| title.clone());

    let source_name = p
        .source
        .and_then(|s| s.title)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| NAME.to_string());

    Some(NewsArticle {
        content: description.clone(),
        description,
        image_url: image
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
impl SourceAdapter<NewsArticle> for CryptoPanicAdapter {
    async fn fetch_latest(&self) -> Result<Vec<NewsArticle>, AdapterError> {
        let body = self.mode.body(NAME, &self.query).await?;
        Self::parse_posts(&body, self.limit)
    }

    fn name(&self) -> &'static str {
        NAME
    }
}
