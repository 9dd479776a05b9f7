//! Merged outcome of one traced query

use super::types::*;
use serde::{Deserialize, Serialize};

/// References gathered from every backend for one query
///
/// Code references always precede AFS references. Each list keeps the order
/// its backend produced; nothing is re-sorted or deduplicated across sources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Raw query as the user typed it
    pub query: String,
    /// References from code search
    pub code_references: Vec<Reference>,
    /// References from the shared filesystem
    pub afs_references: Vec<Reference>,
    /// Impact summary, when one was requested
    pub summary: Option<Summary>,
}

impl SearchOutcome {
    /// Create an empty outcome for a query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// All references, code first
    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.code_references.iter().chain(self.afs_references.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references_are_code_first() {
        let mut outcome = SearchOutcome::new("x.py");
        outcome.afs_references.push(Reference::afs("/afs/x.py", None));
        outcome.code_references.push(Reference::code("x.py", "repo"));

        let sources: Vec<Source> = outcome.references().map(|r| r.source).collect();
        assert_eq!(sources, vec![Source::Code, Source::Afs]);
    }
}
