// src/ingest/error.rs
use thiserror::Error;

/// Failure of one adapter call. The aggregator treats every variant as
/// "this adapter produced zero results".
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{provider}: request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider}: HTTP {status} from {url}")]
    Status {
        provider: &'static str,
        status: u16,
        url: String,
    },

    #[error("{provider}: unexpected payload shape: {detail}")]
    Shape {
        provider: &'static str,
        detail: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Shape,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Shape => "shape",
        }
    }
}

impl AdapterError {
    pub fn transport(provider: &'static str, source: reqwest::Error) -> Self {
        AdapterError::Transport { provider, source }
    }

    pub fn shape(provider: &'static str, detail: impl Into<String>) -> Self {
        AdapterError::Shape {
            provider,
            detail: detail.into(),
        }
    }

    /// Non-2xx responses count as transport failures.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdapterError::Transport { .. } | AdapterError::Status { .. } => ErrorKind::Transport,
            AdapterError::Shape { .. } => ErrorKind::Shape,
        }
    }

    pub fn provider(&self) -> &'static str {
        match self {
            AdapterError::Transport { provider, .. }
            | AdapterError::Status { provider, .. }
            | AdapterError::Shape { provider, .. } => provider,
        }
    }
}
