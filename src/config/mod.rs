// src/config/mod.rs
pub mod feed;

pub use feed::{
    CryptoCompareConfig, CryptoPanicConfig, FeedConfig, HttpConfig, MarketConfig, NewsApiConfig,
    NewsConfig,
};

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "FEED_CONFIG_PATH";

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_from(path: &Path) -> Result<FeedConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg = parse(&content, ext.as_str())
        .with_context(|| format!("parsing feed config {}", path.display()))?;
    Ok(cfg.finalize())
}

/// Load config using env var + fallbacks:
/// 1) $FEED_CONFIG_PATH
/// 2) config/feed.toml
/// 3) config/feed.json
/// 4) built-in defaults
pub fn load_default() -> Result<FeedConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        } else {
            return Err(anyhow!("FEED_CONFIG_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/feed.toml");
    if toml_p.exists() {
        return load_from(&toml_p);
    }
    let json_p = PathBuf::from("config/feed.json");
    if json_p.exists() {
        return load_from(&json_p);
    }
    Ok(FeedConfig::default().finalize())
}

fn parse(s: &str, hint_ext: &str) -> Result<FeedConfig> {
    if hint_ext == "json" {
        return Ok(serde_json::from_str(s)?);
    }
    if hint_ext == "toml" {
        return Ok(toml::from_str(s)?);
    }
    // Unknown extension: JSON if it looks like an object, else TOML.
    if s.trim_start().starts_with('{') {
        Ok(serde_json::from_str(s)?)
    } else {
        Ok(toml::from_str(s)?)
    }
}
