//! Invocation context built once at startup

use crate::backends::{AfsBackend, SearchOptions, SourcegraphBackend};
use crate::config::Settings;
use crate::network::{HttpClient, RetryPolicy};
use crate::search::Search;
use crate::summarize::Summarizer;
use std::sync::Arc;
use tracing::debug;

/// Everything one trace needs: settings, the shared HTTP client and the
/// search executor wired to both backends
#[derive(Clone)]
pub struct TraceContext {
    /// Effective settings
    pub settings: Arc<Settings>,
    /// HTTP client shared by code search and the summarizer
    pub client: HttpClient,
    /// Search executor
    pub search: Arc<Search>,
}

impl TraceContext {
    /// Wire up backends and the summarizer from settings
    pub fn new(settings: Settings, verbose: bool) -> anyhow::Result<Self> {
        settings.validate()?;
        let client = HttpClient::with_settings(&settings.performance)?;

        let retry = RetryPolicy::new(settings.performance.max_retries);
        let code = SourcegraphBackend::new(client.clone(), &settings.sourcegraph)
            .with_retry_policy(retry);
        let afs = AfsBackend::from_settings(&settings.afs).with_verbose(verbose);
        debug!(
            "AFS root {} with {} patterns",
            afs.root().display(),
            afs.pattern_count()
        );

        let summarizer = Summarizer::from_settings(&settings.llm, &client);
        let search = Search::new(Arc::new(code), Arc::new(afs), summarizer)
            .with_options(Self::search_options(&settings));

        Ok(Self {
            settings: Arc::new(settings),
            client,
            search: Arc::new(search),
        })
    }

    /// Backend options derived from settings
    pub fn search_options(settings: &Settings) -> SearchOptions {
        SearchOptions::default()
            .with_limit(settings.sourcegraph.limit)
            .with_max_depth(settings.afs.max_depth)
            .with_timeout(settings.afs.timeout())
    }

    /// Whether impact summaries will come from a language model
    pub fn llm_available(&self) -> bool {
        self.search.can_summarize()
    }
}
