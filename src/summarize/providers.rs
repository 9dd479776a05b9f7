//! Text-generation providers

use crate::error::{Result, TraceError};
use crate::network::{HttpClient, HttpRequest};
use async_trait::async_trait;
use serde_json::{json, Value};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const TEMPERATURE: f64 = 0.3;
const MAX_TOKENS: u32 = 1024;

/// Trait for language-model backends
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Generate a completion for a system and user prompt
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

/// OpenAI chat-completions API, or anything that speaks it
pub struct OpenAiCompatible {
    client: HttpClient,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiCompatible {
    pub fn new(
        client: HttpClient,
        base_url: Option<&str>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url
                .unwrap_or(OPENAI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            model: model.into(),
            api_key,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatible {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let mut request = HttpRequest::post(format!("{}/chat/completions", self.base_url)).json(
            json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": prompt },
                ],
                "temperature": TEMPERATURE,
            }),
        );
        if let Some(key) = &self.api_key {
            request = request.authorization("Bearer", key);
        }

        let response = self.client.execute(request).await?.error_for_status()?;
        let json: Value = response.json()?;

        json.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or_else(|| TraceError::Llm("response has no message content".to_string()))
    }
}

/// Anthropic messages API
pub struct Anthropic {
    client: HttpClient,
    base_url: String,
    model: String,
    api_key: String,
}

impl Anthropic {
    pub fn new(
        client: HttpClient,
        base_url: Option<&str>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url
                .unwrap_or(ANTHROPIC_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for Anthropic {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let request = HttpRequest::post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(json!({
                "model": self.model,
                "system": system,
                "max_tokens": MAX_TOKENS,
                "temperature": TEMPERATURE,
                "messages": [
                    { "role": "user", "content": prompt },
                ],
            }));

        let response = self.client.execute(request).await?.error_for_status()?;
        let json: Value = response.json()?;

        let text: Vec<&str> = json
            .get("content")
            .and_then(|c| c.as_array())
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
                    .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(TraceError::Llm("response has no text content".to_string()));
        }
        Ok(text.join(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_openai_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({ "model": "gpt-4" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "RISK_LEVEL: LOW" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAiCompatible::new(
            HttpClient::new().unwrap(),
            Some(format!("{}/v1/", server.uri()).as_str()),
            "gpt-4",
            Some("sk-test".to_string()),
        );
        let text = provider.complete("system", "prompt").await.unwrap();
        assert_eq!(text, "RISK_LEVEL: LOW");
    }

    #[tokio::test]
    async fn test_openai_missing_content_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let provider =
            OpenAiCompatible::new(HttpClient::new().unwrap(), Some(server.uri().as_str()), "m", None);
        assert!(matches!(
            provider.complete("s", "p").await,
            Err(TraceError::Llm(_))
        ));
    }

    #[tokio::test]
    async fn test_anthropic_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "ak-test"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    { "type": "text", "text": "RISK_LEVEL: HIGH\n" },
                    { "type": "text", "text": "IMPACT: many users" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = Anthropic::new(
            HttpClient::new().unwrap(),
            Some(server.uri().as_str()),
            "claude-model",
            "ak-test",
        );
        let text = provider.complete("system", "prompt").await.unwrap();
        assert_eq!(text, "RISK_LEVEL: HIGH\nIMPACT: many users");
    }

    #[tokio::test]
    async fn test_http_error_is_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let provider = Anthropic::new(HttpClient::new().unwrap(), Some(server.uri().as_str()), "m", "k");
        assert!(matches!(
            provider.complete("s", "p").await,
            Err(TraceError::Status { status: 429, .. })
        ));
    }
}
