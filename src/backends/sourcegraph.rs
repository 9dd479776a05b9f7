//! Sourcegraph code-search backend
//!
//! Uses the GraphQL search API. Only `FileMatch` results become references;
//! the API gives us no modification time or author, so those stay absent.

use super::traits::*;
use crate::config::SourcegraphSettings;
use crate::error::Result;
use crate::network::{HttpClient, HttpRequest, RetryPolicy};
use crate::query::{CanonicalQuery, QueryKind};
use crate::results::Reference;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use url::Url;

const SEARCH_QUERY: &str = r#"
query SearchReferences($query: String!, $first: Int!) {
    search(query: $query, first: $first) {
        results {
            results {
                __typename
                ... on FileMatch {
                    file {
                        path
                        url
                    }
                    repository {
                        name
                    }
                }
            }
        }
    }
}
"#;

/// Sourcegraph code-search client
pub struct SourcegraphBackend {
    client: HttpClient,
    endpoint: String,
    token: Option<String>,
    job_languages: Vec<String>,
    table_languages: Vec<String>,
    retry: RetryPolicy,
}

impl SourcegraphBackend {
    pub fn new(client: HttpClient, settings: &SourcegraphSettings) -> Self {
        Self {
            client,
            endpoint: settings.endpoint.clone(),
            token: settings.token().map(str::to_string),
            job_languages: settings.job_languages.clone(),
            table_languages: settings.table_languages.clone(),
            retry: RetryPolicy::default(),
        }
    }

    /// Set the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Search for code references
    ///
    /// Never fails: errors are logged after retries are exhausted and an
    /// empty list comes back.
    pub async fn search_references(&self, query: &CanonicalQuery, limit: u32) -> Vec<Reference> {
        if query.is_empty() {
            debug!("Empty base name, skipping code search");
            return Vec::new();
        }

        let search_query = self.build_search_query(query);
        debug!("Sourcegraph query: {}", search_query);

        match self.fetch(&search_query, limit).await {
            Ok(response) => self.parse_search_results(&response),
            Err(e) => {
                error!("Error searching Sourcegraph: {}", e);
                Vec::new()
            }
        }
    }

    /// Build the Sourcegraph search string for a query
    ///
    /// Jobs and tables are narrowed to the languages likely to define or
    /// use them; file names are searched unconstrained.
    pub fn build_search_query(&self, query: &CanonicalQuery) -> String {
        let term = format!("type:file \"{}\"", escape_quoted(&query.base_name));
        let languages = match query.kind {
            QueryKind::FileName => return term,
            QueryKind::Job => &self.job_languages,
            QueryKind::Table => &self.table_languages,
        };

        if languages.is_empty() {
            return term;
        }

        let filter = languages
            .iter()
            .map(|lang| format!("lang:{}", lang))
            .collect::<Vec<_>>()
            .join(" OR ");
        format!("{} ({})", term, filter)
    }

    /// POST the GraphQL request with retries
    async fn fetch(&self, search_query: &str, limit: u32) -> Result<Value> {
        let payload = json!({
            "query": SEARCH_QUERY,
            "variables": {
                "query": search_query,
                "first": limit,
            },
        });

        let start = Instant::now();
        let value = self
            .retry
            .run("Sourcegraph request", |_| {
                let mut request = HttpRequest::post(&self.endpoint).json(payload.clone());
                if let Some(token) = &self.token {
                    request = request.authorization("token", token);
                }
                async move {
                    let response = self.client.execute(request).await?.error_for_status()?;
                    response.json::<Value>()
                }
            })
            .await?;

        info!("Sourcegraph responded in {:?}", start.elapsed());
        Ok(value)
    }

    /// Parse a GraphQL response into references
    ///
    /// Tolerates missing nested objects at any level.
    pub fn parse_search_results(&self, response: &Value) -> Vec<Reference> {
        if let Some(errors) = response.get("errors").and_then(|e| e.as_array()) {
            for message in errors
                .iter()
                .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
            {
                warn!("Sourcegraph GraphQL error: {}", message);
            }
        }

        let items = response
            .get("data")
            .and_then(|d| d.get("search"))
            .and_then(|s| s.get("results"))
            .and_then(|r| r.get("results"))
            .and_then(|r| r.as_array())
            .cloned()
            .unwrap_or_default();

        let mut references = Vec::new();

        for item in items {
            if item.get("__typename").and_then(|t| t.as_str()) != Some("FileMatch") {
                continue;
            }

            let file = item.get("file");
            let path = file
                .and_then(|f| f.get("path"))
                .and_then(|p| p.as_str())
                .unwrap_or_default();

            let repo = item
                .get("repository")
                .and_then(|r| r.get("name"))
                .and_then(|n| n.as_str())
                .unwrap_or_default();

            let mut reference = Reference::code(path, repo);

            if let Some(url) = file
                .and_then(|f| f.get("url"))
                .and_then(|u| u.as_str())
                .filter(|u| !u.is_empty())
            {
                reference = reference.with_url(self.absolute_url(url));
            }

            references.push(reference);
        }

        debug!("Parsed {} code references", references.len());
        references
    }

    /// Resolve a result URL against the endpoint origin
    ///
    /// Sourcegraph returns paths like `/github.com/org/repo/-/blob/x.py`.
    fn absolute_url(&self, url: &str) -> String {
        Url::parse(&self.endpoint)
            .and_then(|base| base.join(url))
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string())
    }
}

/// Escape a term for use inside a double-quoted Sourcegraph string
fn escape_quoted(term: &str) -> String {
    term.replace('\\', "\\\\").replace('"', "\\\"")
}

#[async_trait]
impl ReferenceBackend for SourcegraphBackend {
    fn name(&self) -> &str {
        "sourcegraph"
    }

    async fn search(&self, query: &CanonicalQuery, options: &SearchOptions) -> Vec<Reference> {
        self.search_references(query, options.limit).await
    }
}
