//! Settings structures for traceit configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main settings structure matching `config.yaml`
///
/// Every section and every key falls back to its default, so a file that
/// sets a single key inside a section still gets the rest of that section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sourcegraph: SourcegraphSettings,
    pub afs: AfsSettings,
    pub llm: LlmSettings,
    pub logging: LoggingSettings,
    pub performance: PerformanceSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Parse settings from YAML text
    ///
    /// An empty document yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Option<Settings> = serde_yaml::from_str(content)?;
        Ok(settings.unwrap_or_default())
    }

    /// Merge with environment variables
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("TRACEIT_SOURCEGRAPH_TOKEN") {
            self.sourcegraph.token = val;
        }
        if let Ok(val) = std::env::var("TRACEIT_AFS_ROOT") {
            self.afs.root_path = val;
        }
        if let Ok(val) = std::env::var("TRACEIT_LOG_LEVEL") {
            self.logging.level = val;
        }
        if self.llm.api_key.is_empty() {
            if let Ok(val) = std::env::var("LLM_API_KEY") {
                self.llm.api_key = val;
            }
        }
    }

    /// Check values that would otherwise fail later in confusing ways
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.sourcegraph.endpoint).with_context(|| {
            format!(
                "invalid sourcegraph.endpoint: {}",
                self.sourcegraph.endpoint
            )
        })?;
        if !self.llm.base_url.is_empty() {
            url::Url::parse(&self.llm.base_url)
                .with_context(|| format!("invalid llm.base_url: {}", self.llm.base_url))?;
        }
        if self.performance.max_workers == 0 {
            anyhow::bail!("performance.max_workers must be at least 1");
        }
        if seconds(self.afs.timeout).is_none() {
            anyhow::bail!("invalid afs.timeout: {}", self.afs.timeout);
        }
        if seconds(self.performance.request_timeout).is_none() {
            anyhow::bail!(
                "invalid performance.request_timeout: {}",
                self.performance.request_timeout
            );
        }
        Ok(())
    }
}

/// Sourcegraph code-search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcegraphSettings {
    /// GraphQL API endpoint
    pub endpoint: String,
    /// Optional access token (empty = anonymous)
    pub token: String,
    /// Maximum number of results requested
    pub limit: u32,
    /// Languages searched for `job:` queries
    pub job_languages: Vec<String>,
    /// Languages searched for `table:` queries
    pub table_languages: Vec<String>,
}

impl Default for SourcegraphSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://sourcegraph.example.com/.api/graphql".to_string(),
            token: String::new(),
            limit: 100,
            job_languages: vec![
                "python".to_string(),
                "yaml".to_string(),
                "json".to_string(),
            ],
            table_languages: vec!["sql".to_string(), "python".to_string()],
        }
    }
}

impl SourcegraphSettings {
    /// Token, if one is configured
    pub fn token(&self) -> Option<&str> {
        Some(self.token.as_str()).filter(|t| !t.is_empty())
    }
}

/// Shared filesystem settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AfsSettings {
    /// Root directory to search
    pub root_path: String,
    /// File-name regexes; a file must match at least one
    pub search_patterns: Vec<String>,
    /// Directory levels below the root to descend into (0 = root only)
    pub max_depth: usize,
    /// Wall-clock limit for the whole walk in seconds
    pub timeout: f64,
}

impl Default for AfsSettings {
    fn default() -> Self {
        Self {
            root_path: "/afs/project".to_string(),
            search_patterns: default_search_patterns(),
            max_depth: 1,
            timeout: 30.0,
        }
    }
}

impl AfsSettings {
    pub fn timeout(&self) -> Duration {
        seconds(self.timeout).unwrap_or(DEFAULT_TIMEOUT)
    }
}

/// Default file-name patterns: Python, SQL and notebooks
pub fn default_search_patterns() -> Vec<String> {
    vec![
        r".*\.py$".to_string(),
        r".*\.sql$".to_string(),
        r".*\.ipynb$".to_string(),
    ]
}

/// Language model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Enable LLM impact summaries
    pub enabled: bool,
    /// Provider: `openai`, `anthropic` or `local`
    pub provider: String,
    /// Model name
    pub model: String,
    /// API key (falls back to `LLM_API_KEY`)
    pub api_key: String,
    /// Override for the provider's base URL
    pub base_url: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "openai".to_string(),
            model: "gpt-4".to_string(),
            api_key: String::new(),
            base_url: String::new(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,
    /// Output format: `full` or `compact`
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            format: "full".to_string(),
        }
    }
}

/// Performance tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSettings {
    /// Runtime worker threads
    pub max_workers: usize,
    /// HTTP request timeout in seconds
    pub request_timeout: f64,
    /// Attempts per code-search request
    pub max_retries: u32,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            max_workers: 4,
            request_timeout: 30.0,
            max_retries: 3,
        }
    }
}

impl PerformanceSettings {
    pub fn request_timeout(&self) -> Duration {
        seconds(self.request_timeout).unwrap_or(DEFAULT_TIMEOUT)
    }
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Convert a seconds value from YAML; negative, non-finite or oversized
/// values yield `None`
fn seconds(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(
            settings.sourcegraph.endpoint,
            "https://sourcegraph.example.com/.api/graphql"
        );
        assert_eq!(settings.afs.root_path, "/afs/project");
        assert_eq!(settings.afs.search_patterns.len(), 3);
        assert_eq!(settings.logging.level, "INFO");
        assert!(!settings.llm.enabled);
        assert_eq!(settings.performance.max_retries, 3);
        assert_eq!(settings.performance.request_timeout(), Duration::from_secs(30));
        assert!(settings.sourcegraph.token().is_none());
    }

    #[test]
    fn test_partial_section_merges_with_defaults() {
        let yaml = r#"
sourcegraph:
  endpoint: https://custom.sourcegraph.com/.api/graphql
afs:
  root_path: /custom/afs/path
performance:
  max_retries: 5
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(
            settings.sourcegraph.endpoint,
            "https://custom.sourcegraph.com/.api/graphql"
        );
        assert_eq!(settings.sourcegraph.limit, 100);
        assert_eq!(settings.afs.root_path, "/custom/afs/path");
        assert_eq!(settings.afs.search_patterns, default_search_patterns());
        assert_eq!(settings.performance.max_retries, 5);
        assert_eq!(settings.performance.max_workers, 4);
        assert_eq!(settings.logging.level, "INFO");
    }

    #[test]
    fn test_empty_document_is_default() {
        let settings = Settings::from_yaml("").unwrap();
        assert_eq!(settings.afs.max_depth, 1);
        let settings = Settings::from_yaml("---\n").unwrap();
        assert_eq!(settings.afs.max_depth, 1);
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());
        settings.sourcegraph.endpoint = "not a url".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unrepresentable_timeouts() {
        for value in ["1e300", ".inf", "-1", ".nan"] {
            let settings = Settings::from_yaml(&format!("afs:\n  timeout: {}\n", value)).unwrap();
            assert!(settings.validate().is_err(), "afs.timeout {}", value);
            assert_eq!(settings.afs.timeout(), Duration::from_secs(30));

            let yaml = format!("performance:\n  request_timeout: {}\n", value);
            let settings = Settings::from_yaml(&yaml).unwrap();
            assert!(settings.validate().is_err(), "request_timeout {}", value);
            assert_eq!(settings.performance.request_timeout(), Duration::from_secs(30));
        }

        let settings = Settings::from_yaml("afs:\n  timeout: 0.5\n").unwrap();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.afs.timeout(), Duration::from_millis(500));
    }
}
