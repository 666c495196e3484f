// src/ingest/types.rs
use crate::ingest::error::AdapterError;

/// One upstream provider translated into canonical items.
///
/// Adapters make a single attempt per call; no retries.
#[async_trait::async_trait]
pub trait SourceAdapter<T>: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<T>, AdapterError>;
    fn name(&self) -> &'static str;
}

/// Topic a news pipeline is built for, e.g. `BTC` / `Bitcoin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NewsTopic {
    pub symbol: String,
    pub name: String,
}

impl NewsTopic {
    /// Resolve a ticker to its display name. Unknown tickers map to
    /// `Cryptocurrency`.
    pub fn from_symbol(symbol: &str) -> Self {
        let symbol = symbol.trim().to_ascii_uppercase();
        let name = match symbol.as_str() {
            "BTC" => "Bitcoin",
            "ETH" => "Ethereum",
            "ADA" => "Cardano",
            "SOL" => "Solana",
            "DOT" => "Polkadot",
            _ => "Cryptocurrency",
        };
        Self {
            symbol,
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_lookup_is_case_insensitive() {
        let t = NewsTopic::from_symbol(" eth ");
        assert_eq!(t.symbol, "ETH");
        assert_eq!(t.name, "Ethereum");
        assert_eq!(NewsTopic::from_symbol("DOGE").name, "Cryptocurrency");
    }
}
