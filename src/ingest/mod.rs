// src/ingest/mod.rs
pub mod error;
pub mod fallback;
pub mod providers;
pub mod types;

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram};
use once_cell::sync::OnceCell;

use crate::config::HttpConfig;
use crate::ingest::error::AdapterError;

/// Stock image used when a provider omits one.
pub const PLACEHOLDER_IMAGE: &str =
    "https://images.unsplash.com/photo-1518546305927-5a555bb7020d?w=500&auto=format&fit=crop&q=60";

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_adapter_fetch_total", "Adapter fetch attempts.");
        describe_counter!(
            "feed_adapter_errors_total",
            "Adapter failures by kind (transport/shape)."
        );
        describe_histogram!("feed_adapter_fetch_ms", "Adapter round trip in milliseconds.");
        describe_counter!(
            "feed_adapter_items_skipped_total",
            "Provider items dropped for missing title, url, timestamp or price."
        );
        describe_counter!(
            "feed_fallback_items_total",
            "Curated fallback items served instead of provider data."
        );
        describe_counter!("feed_poll_cycles_total", "Completed poll cycles by outcome.");
        describe_counter!(
            "feed_poll_discarded_total",
            "Poll results dropped because the poller was stopped or restarted."
        );
        describe_gauge!(
            "feed_poll_last_success_ts",
            "Unix ts of the last successful poll cycle."
        );
        describe_gauge!(
            "feed_refresh_interval_secs",
            "Configured poll interval per resource."
        );
    });
}

/// Normalize provider text: decode entities, drop tags, fold whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize curly quotes to ASCII
    out = out
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace (incl. NBSP)
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Normalized text, or `None` when nothing is left.
pub(crate) fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(normalize_text).filter(|t| !t.is_empty())
}

pub fn unix_to_utc(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
}

/// RFC 3339 first, then a bare `YYYY-MM-DDTHH:MM:SS` read as UTC.
pub fn parse_iso_utc(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|n| n.and_utc())
}

/// Shared reqwest client for all adapters.
pub fn build_http_client(cfg: &HttpConfig) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(cfg.user_agent.clone())
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()?;
    Ok(client)
}

/// Single GET attempt; non-2xx becomes `AdapterError::Status`.
pub(crate) async fn get_text(
    provider: &'static str,
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<String, AdapterError> {
    ensure_metrics_described();
    counter!("feed_adapter_fetch_total", "adapter" => provider).increment(1);
    let t0 = std::time::Instant::now();

    let resp = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| AdapterError::transport(provider, e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(AdapterError::Status {
            provider,
            status: status.as_u16(),
            url: resp.url().to_string(),
        });
    }

    let body = resp
        .text()
        .await
        .map_err(|e| AdapterError::transport(provider, e))?;

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("feed_adapter_fetch_ms", "adapter" => provider).record(ms);
    Ok(body)
}

/// `base` + `/` + `path` without doubling slashes.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
