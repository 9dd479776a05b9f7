//! Trace request model

use serde::{Deserialize, Serialize};

/// One "where is X used?" request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraceRequest {
    /// The raw query string
    pub query: String,
    /// Produce an impact summary
    pub summarize: bool,
    /// Override for the AFS directory depth
    pub max_depth: Option<usize>,
}

impl TraceRequest {
    /// Create a request without summary or overrides
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            summarize: false,
            max_depth: None,
        }
    }

    /// Request an impact summary
    pub fn with_summary(mut self, summarize: bool) -> Self {
        self.summarize = summarize;
        self
    }

    /// Override the AFS depth
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }
}
