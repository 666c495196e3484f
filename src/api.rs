use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use shuttle_axum::axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::aggregate::{MarketAggregator, NewsAggregator, TemplatedNews};
use crate::config::FeedConfig;
use crate::ingest::types::NewsTopic;
use crate::jitter::JitterView;
use crate::model::{MarketAsset, NewsArticle};
use crate::poller::{PollState, Poller, Refresh};

/// Shared handles behind the router. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    cfg: Arc<FeedConfig>,
    client: reqwest::Client,
    market: Poller<MarketAsset>,
    market_view: Arc<JitterView>,
    news: Arc<Mutex<HashMap<String, Poller<NewsArticle>>>>,
}

impl AppState {
    /// Wire the market poller and its jitter view. Both are started here;
    /// live news pollers start on first request per topic.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(
        cfg: FeedConfig,
        client: reqwest::Client,
        market_source: Arc<dyn Refresh<MarketAsset>>,
    ) -> Self {
        let market = Poller::new("market", market_source);
        market.start(Duration::from_secs(cfg.market.refresh_secs));
        let market_view = Arc::new(JitterView::spawn(
            market.subscribe(),
            Duration::from_secs(cfg.market.jitter_secs),
        ));
        Self {
            cfg: Arc::new(cfg),
            client,
            market,
            market_view,
            news: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Production wiring: CoinGecko for the market, provider cascade for news.
    pub fn from_config(cfg: FeedConfig) -> anyhow::Result<Self> {
        let client = crate::ingest::build_http_client(&cfg.http)?;
        let market = Arc::new(MarketAggregator::from_config(&cfg, client.clone()));
        Ok(Self::new(cfg, client, market))
    }

    pub fn config(&self) -> &FeedConfig {
        &self.cfg
    }

    pub fn market(&self) -> &Poller<MarketAsset> {
        &self.market
    }

    /// Poller for a live topic, created and started on first use. Topics
    /// outside `news.live_topics` have no poller and yield `None`.
    pub async fn news_poller(&self, symbol: &str) -> Option<Poller<NewsArticle>> {
        let topic = NewsTopic::from_symbol(symbol);
        if !self.cfg.news.is_live(&topic.symbol) {
            return None;
        }
        let mut map = self.news.lock().await;
        if let Some(p) = map.get(&topic.symbol) {
            return Some(p.clone());
        }
        let source = Arc::new(NewsAggregator::from_config(&self.cfg, self.client.clone(), &topic));
        let p = Poller::new(format!("news:{}", topic.symbol), source);
        p.start(Duration::from_secs(self.cfg.news.refresh_secs));
        tracing::info!(topic = %topic.symbol, name = %topic.name, "news poller created");
        map.insert(topic.symbol, p.clone());
        Some(p)
    }

    pub async fn news_poller_count(&self) -> usize {
        self.news.lock().await.len()
    }

    /// Current news for `symbol`: the live poller's state, or templated
    /// headlines built on the spot.
    pub async fn news(&self, symbol: &str) -> PollState<NewsArticle> {
        match self.news_poller(symbol).await {
            Some(p) => p.snapshot(),
            None => TemplatedNews::new(NewsTopic::from_symbol(symbol)).aggregate().into(),
        }
    }

    pub async fn refetch_news(&self, symbol: &str) -> PollState<NewsArticle> {
        match self.news_poller(symbol).await {
            Some(p) => p.refetch_now().await,
            None => TemplatedNews::new(NewsTopic::from_symbol(symbol)).aggregate().into(),
        }
    }

    /// Stop every poller. Used on shutdown and in tests.
    pub async fn shutdown(&self) {
        self.market.stop();
        self.market_view.stop();
        for p in self.news.lock().await.values() {
            p.stop();
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/market", get(market))
        .route("/market/raw", get(market_raw))
        .route("/market/refetch", post(market_refetch))
        .route("/news/{symbol}", get(news))
        .route("/news/{symbol}/refetch", post(news_refetch))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Tickers are short ASCII alphanumerics.
fn valid_symbol(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && s.len() <= 10 && s.chars().all(|c| c.is_ascii_alphanumeric())
}

async fn market(State(state): State<AppState>) -> Json<PollState<MarketAsset>> {
    Json(state.market_view.snapshot())
}

async fn market_raw(State(state): State<AppState>) -> Json<PollState<MarketAsset>> {
    Json(state.market.snapshot())
}

async fn market_refetch(State(state): State<AppState>) -> Json<PollState<MarketAsset>> {
    Json(state.market.refetch_now().await)
}

async fn news(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<PollState<NewsArticle>>, (StatusCode, String)> {
    if !valid_symbol(&symbol) {
        return Err((StatusCode::BAD_REQUEST, format!("invalid symbol '{symbol}'")));
    }
    Ok(Json(state.news(&symbol).await))
}

async fn news_refetch(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<PollState<NewsArticle>>, (StatusCode, String)> {
    if !valid_symbol(&symbol) {
        return Err((StatusCode::BAD_REQUEST, format!("invalid symbol '{symbol}'")));
    }
    Ok(Json(state.refetch_news(&symbol).await))
}

#[cfg(test)]
mod tests {
    use super::valid_symbol;

    #[test]
    fn symbol_validation() {
        assert!(valid_symbol("btc"));
        assert!(valid_symbol("SOL"));
        assert!(!valid_symbol(""));
        assert!(!valid_symbol("../etc"));
        assert!(!valid_symbol("AVERYLONGTICKER"));
    }
}
