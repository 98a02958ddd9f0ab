//! Unified error type for the enrichment pipeline.
//!
//! Per-item errors (decode, transport, constraint, database, cache) are
//! contained by the record pipeline; only `Upstream` is fatal.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the enrichment pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Payload or response body does not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Network call to a predictor or the store failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The store rejected a record.
    #[error("constraint violation [{code}]: {message}")]
    Constraint { code: String, message: String },

    #[error("database error: {0}")]
    Database(String),

    /// The message source itself became unreadable.
    #[error("upstream read error: {0}")]
    Upstream(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn constraint(code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Constraint {
            code: code.into(),
            message: msg.into(),
        }
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Short stable label, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) | Self::Serialization(_) => "decode",
            Self::Transport(_) => "transport",
            Self::Constraint { .. } => "constraint",
            Self::Database(_) => "database",
            Self::Upstream(_) => "upstream",
            Self::Cache(_) => "cache",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether this error must terminate the pipeline.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }
}
