// src/ingest/providers/mod.rs
pub mod coingecko;
pub mod cryptocompare;
pub mod cryptopanic;
pub mod newsapi;

use crate::ingest::error::AdapterError;

/// Where an adapter reads its payload from.
pub(crate) enum Mode {
    /// Own copy of a recorded payload (tests, offline runs).
    Fixture(String),
    Http { client: reqwest::Client, url: String },
}

impl Mode {
    pub(crate) async fn body(
        &self,
        provider: &'static str,
        query: &[(&str, String)],
    ) -> Result<String, AdapterError> {
        match self {
            Mode::Fixture(s) => Ok(s.clone()),
            Mode::Http { client, url } => {
                crate::ingest::get_text(provider, client, url, query).await
            }
        }
    }

    pub(crate) fn is_http(&self) -> bool {
        matches!(self, Mode::Http { .. })
    }
}
