//! Query normalization module
//!
//! Turns the raw query string into a [`CanonicalQuery`]. Three shapes are
//! recognized:
//! - Job identifiers: `job:daily_prices`
//! - Table identifiers: `table:analytics.pnl` (schema is dropped for matching)
//! - Anything else is treated as a bare file name

use serde::{Deserialize, Serialize};

const JOB_PREFIX: &str = "job:";
const TABLE_PREFIX: &str = "table:";

/// Kind of asset a query refers to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    FileName,
    Job,
    Table,
}

impl QueryKind {
    /// Get the string representation used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileName => "file",
            Self::Job => "job",
            Self::Table => "table",
        }
    }
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized form of a user query
///
/// `base_name` is the only thing backends match against. The raw input is
/// kept for display and never re-inspected downstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalQuery {
    /// What the query refers to
    pub kind: QueryKind,
    /// Name the backends search for
    pub base_name: String,
    /// Original raw query
    pub raw_query: String,
}

impl CanonicalQuery {
    /// Normalize a raw query string
    pub fn parse(raw: &str) -> Self {
        let (kind, base_name) = if let Some(job) = raw.strip_prefix(JOB_PREFIX) {
            (QueryKind::Job, job)
        } else if let Some(table) = raw.strip_prefix(TABLE_PREFIX) {
            // `analytics.pnl` -> `pnl`
            let name = table.rsplit_once('.').map_or(table, |(_, name)| name);
            (QueryKind::Table, name)
        } else {
            (QueryKind::FileName, raw)
        };

        Self {
            kind,
            base_name: base_name.to_string(),
            raw_query: raw.to_string(),
        }
    }

    /// An empty base name matches nothing
    pub fn is_empty(&self) -> bool {
        self.base_name.is_empty()
    }
}

/// Normalize a raw query string
pub fn normalize(query: &str) -> CanonicalQuery {
    CanonicalQuery::parse(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_passthrough() {
        for raw in ["file.py", "daily_prices", "jobs:x", "Table:a.b", "a.b.c", " spaced "] {
            let query = normalize(raw);
            assert_eq!(query.kind, QueryKind::FileName);
            assert_eq!(query.base_name, raw);
        }
    }

    #[test]
    fn test_job_prefix() {
        let query = normalize("job:daily_prices");
        assert_eq!(query.kind, QueryKind::Job);
        assert_eq!(query.base_name, "daily_prices");
        assert_eq!(query.raw_query, "job:daily_prices");
    }

    #[test]
    fn test_table_prefix() {
        let query = normalize("table:analytics.pnl");
        assert_eq!(query.kind, QueryKind::Table);
        assert_eq!(query.base_name, "pnl");

        assert_eq!(normalize("table:pnl").base_name, "pnl");
        assert_eq!(normalize("table:db.analytics.pnl").base_name, "pnl");
    }

    #[test]
    fn test_empty_remainder() {
        let job = normalize("job:");
        assert_eq!(job.kind, QueryKind::Job);
        assert!(job.is_empty());

        assert!(normalize("table:").is_empty());
        assert!(normalize("table:analytics.").is_empty());
        assert!(normalize("").is_empty());
    }
}
