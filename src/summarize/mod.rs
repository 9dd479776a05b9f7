//! Impact summarization module
//!
//! Turns a reference list into a risk assessment with a language model.
//! Whether a model is usable is decided once, when the [`Summarizer`] is
//! built; callers branch on the variant.

mod prompt;
mod providers;

pub use prompt::{build_prompt, parse_summary, MAX_PROMPT_REFERENCES, SYSTEM_PROMPT};
pub use providers::{Anthropic, OpenAiCompatible, TextGenerator};

use crate::config::LlmSettings;
use crate::network::HttpClient;
use crate::results::{Reference, Summary};
use tracing::{debug, error, info, warn};

/// Impact summarizer, or the reason there is none
pub enum Summarizer {
    Available(Box<dyn TextGenerator>),
    Unavailable { reason: String },
}

impl Summarizer {
    /// Build a summarizer from settings
    ///
    /// Never fails; missing credentials or an unsupported provider produce
    /// [`Summarizer::Unavailable`].
    pub fn from_settings(settings: &LlmSettings, client: &HttpClient) -> Self {
        if !settings.enabled {
            return Self::unavailable("LLM summarization is disabled");
        }

        let base_url = Some(settings.base_url.as_str()).filter(|u| !u.is_empty());
        let api_key = Some(settings.api_key.clone()).filter(|k| !k.is_empty());

        let generator: Box<dyn TextGenerator> = match settings.provider.to_lowercase().as_str() {
            "openai" => match api_key {
                Some(key) => Box::new(OpenAiCompatible::new(
                    client.clone(),
                    base_url,
                    &settings.model,
                    Some(key),
                )),
                None => return Self::unavailable("no API key configured for openai"),
            },
            "local" => match base_url {
                Some(url) => Box::new(OpenAiCompatible::new(
                    client.clone(),
                    Some(url),
                    &settings.model,
                    api_key,
                )),
                None => return Self::unavailable("llm.base_url is required for a local provider"),
            },
            "anthropic" => match api_key {
                Some(key) => Box::new(Anthropic::new(client.clone(), base_url, &settings.model, key)),
                None => return Self::unavailable("no API key configured for anthropic"),
            },
            other => return Self::unavailable(format!("unsupported LLM provider: {}", other)),
        };

        info!(
            "LLM summarizer ready ({} / {})",
            generator.name(),
            settings.model
        );
        Self::Available(generator)
    }

    /// Summarizer that always reports itself unavailable
    pub fn unavailable(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        debug!("LLM summarizer unavailable: {}", reason);
        Self::Unavailable { reason }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Summarize the impact of changing `query`
    ///
    /// Never fails: request errors come back as an unknown-risk summary.
    pub async fn summarize(
        &self,
        query: &str,
        code_refs: &[Reference],
        afs_refs: &[Reference],
    ) -> Summary {
        let generator = match self {
            Self::Available(generator) => generator,
            Self::Unavailable { reason } => {
                warn!("LLM client not available ({}), skipping summarization", reason);
                return Summary::unknown("LLM summarization not available");
            }
        };

        let prompt = build_prompt(query, code_refs, afs_refs);
        match generator.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(text) => parse_summary(&text),
            Err(e) => {
                error!("Error generating LLM summary: {}", e);
                Summary::unknown(format!("Error generating summary: {}", e))
            }
        }
    }
}

impl std::fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available(generator) => write!(f, "Summarizer::Available({})", generator.name()),
            Self::Unavailable { reason } => write!(f, "Summarizer::Unavailable({})", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, TraceError};
    use crate::results::RiskLevel;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Canned {
        reply: std::result::Result<String, String>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TextGenerator for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map_err(TraceError::Llm)
        }
    }

    fn settings(provider: &str, api_key: &str) -> LlmSettings {
        LlmSettings {
            enabled: true,
            provider: provider.to_string(),
            api_key: api_key.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_factory_variants() {
        let client = HttpClient::new().unwrap();

        assert!(!Summarizer::from_settings(&LlmSettings::default(), &client).is_available());
        assert!(!Summarizer::from_settings(&settings("openai", ""), &client).is_available());
        assert!(Summarizer::from_settings(&settings("openai", "sk"), &client).is_available());
        assert!(Summarizer::from_settings(&settings("anthropic", "ak"), &client).is_available());
        assert!(!Summarizer::from_settings(&settings("local", ""), &client).is_available());
        assert!(!Summarizer::from_settings(&settings("mystery", "k"), &client).is_available());

        let mut local = settings("local", "");
        local.base_url = "http://localhost:8080/v1".to_string();
        assert!(Summarizer::from_settings(&local, &client).is_available());
    }

    #[test]
    fn test_unavailable_makes_no_call() {
        let summarizer = Summarizer::unavailable("no key");
        let summary = tokio_test::block_on(summarizer.summarize("x.py", &[], &[]));
        assert_eq!(summary.risk_level, RiskLevel::Unknown);
        assert_eq!(summary.impact_summary, "LLM summarization not available");
    }

    #[tokio::test]
    async fn test_summarize_parses_reply() {
        let calls = Arc::new(AtomicUsize::new(0));
        let summarizer = Summarizer::Available(Box::new(Canned {
            reply: Ok("RISK_LEVEL: LOW\nIMPACT: Only one user.\nSTEPS: Ship it".to_string()),
            calls: calls.clone(),
        }));

        let code = vec![Reference::code("a.py", "repo")];
        let summary = summarizer.summarize("a.py", &code, &[]).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(summary.risk_level, RiskLevel::Low);
        assert_eq!(summary.impact_summary, "Only one user.");
        assert_eq!(summary.suggested_next_steps, vec!["Ship it"]);
    }

    #[tokio::test]
    async fn test_summarize_failure_degrades() {
        let summarizer = Summarizer::Available(Box::new(Canned {
            reply: Err("quota exceeded".to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }));

        let summary = summarizer.summarize("a.py", &[], &[]).await;
        assert_eq!(summary.risk_level, RiskLevel::Unknown);
        assert!(summary.impact_summary.starts_with("Error generating summary:"));
        assert!(summary.impact_summary.contains("quota exceeded"));
    }
}
