//! Search execution and orchestration

use super::models::TraceRequest;
use crate::backends::{ReferenceBackend, SearchOptions};
use crate::query::{normalize, CanonicalQuery};
use crate::results::{Reference, SearchOutcome, Summary};
use crate::summarize::Summarizer;
use futures::future::join;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Search executor that fans a query out to the code and AFS backends
pub struct Search {
    /// Remote code search backend
    code: Arc<dyn ReferenceBackend>,
    /// Shared filesystem backend
    afs: Arc<dyn ReferenceBackend>,
    /// Impact summarizer
    summarizer: Arc<Summarizer>,
    /// Default backend options
    options: SearchOptions,
}

impl Search {
    /// Create a new search executor
    pub fn new(
        code: Arc<dyn ReferenceBackend>,
        afs: Arc<dyn ReferenceBackend>,
        summarizer: Summarizer,
    ) -> Self {
        Self {
            code,
            afs,
            summarizer: Arc::new(summarizer),
            options: SearchOptions::default(),
        }
    }

    /// Set default backend options
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Default backend options
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Whether a language model is configured
    pub fn can_summarize(&self) -> bool {
        self.summarizer.is_available()
    }

    /// Trace a query across both backends
    ///
    /// The query is normalized once and both backends run concurrently. A
    /// backend that fails, or even panics, contributes an empty list.
    pub async fn execute(&self, request: &TraceRequest) -> SearchOutcome {
        let query = normalize(&request.query);
        let mut options = self.options.clone();
        if let Some(depth) = request.max_depth {
            options.max_depth = depth;
        }

        info!(
            "Tracing '{}' as {} '{}'",
            request.query, query.kind, query.base_name
        );

        let (code_references, afs_references) = join(
            run_backend(self.code.clone(), query.clone(), options.clone()),
            run_backend(self.afs.clone(), query, options),
        )
        .await;

        let mut outcome = SearchOutcome::new(request.query.clone());
        outcome.code_references = code_references;
        outcome.afs_references = afs_references;

        info!(
            "Found {} code references and {} AFS references",
            outcome.code_references.len(),
            outcome.afs_references.len()
        );

        if request.summarize {
            outcome.summary = Some(self.summary_for(&outcome).await);
        }

        outcome
    }

    /// Impact summary for a finished outcome
    ///
    /// Falls back to plain reference counts when no model is configured.
    async fn summary_for(&self, outcome: &SearchOutcome) -> Summary {
        match self.summarizer.as_ref() {
            Summarizer::Unavailable { .. } => Summary::fallback(
                outcome.code_references.len(),
                outcome.afs_references.len(),
            ),
            summarizer => {
                summarizer
                    .summarize(
                        &outcome.query,
                        &outcome.code_references,
                        &outcome.afs_references,
                    )
                    .await
            }
        }
    }
}

/// Run one backend on its own task and time it
async fn run_backend(
    backend: Arc<dyn ReferenceBackend>,
    query: CanonicalQuery,
    options: SearchOptions,
) -> Vec<Reference> {
    let name = backend.name().to_string();
    let start = Instant::now();

    let handle = tokio::spawn(async move { backend.search(&query, &options).await });
    let references = match handle.await {
        Ok(references) => references,
        Err(e) => {
            error!("Backend {} failed: {}", name, e);
            Vec::new()
        }
    };

    debug!(
        "Backend {} returned {} references in {:?}",
        name,
        references.len(),
        start.elapsed()
    );
    references
}
