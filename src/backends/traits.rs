//! Backend traits and types

use crate::query::CanonicalQuery;
use crate::results::Reference;
use async_trait::async_trait;
use std::time::Duration;

/// Per-query knobs handed to every backend
///
/// Each backend reads only the fields that apply to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum results requested from code search
    pub limit: u32,
    /// Directory levels below the AFS root to descend into (0 = root only)
    pub max_depth: usize,
    /// Wall-clock limit for the filesystem walk
    pub timeout: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 100,
            max_depth: 1,
            timeout: Duration::from_secs(30),
        }
    }
}

impl SearchOptions {
    /// Override the directory depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Override the filesystem timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the result limit
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// A source of references that all backends must implement
///
/// Backends are best-effort: every failure is logged inside the backend and
/// reduces to an empty list, so `search` has no error channel.
#[async_trait]
pub trait ReferenceBackend: Send + Sync {
    /// Backend name used in logs
    fn name(&self) -> &str;

    /// Find references to the query
    async fn search(&self, query: &CanonicalQuery, options: &SearchOptions) -> Vec<Reference>;
}
