//! Error types shared by the backends and the summarizer

use thiserror::Error;

/// Errors raised while talking to a backend or a language model
#[derive(Debug, Error)]
pub enum TraceError {
    /// Connection, DNS or timeout failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP error: {status}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Language model call failed
    #[error("LLM error: {0}")]
    Llm(String),
}

impl TraceError {
    /// Whether a retry has a chance of succeeding
    ///
    /// Transport failures and 5xx statuses are transient. Client errors and
    /// malformed payloads will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => !e.is_builder() && !e.is_decode(),
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for TraceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TraceError>;
