//! Generation backend abstraction and the Gemini provider.
//!
//! The rest of the crate only depends on the [`GenerationBackend`]
//! capability, so any concrete AI provider can be substituted without
//! touching client logic.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::{IntegrationError, Result};

/// Model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_GEMINI_MODEL: &str = "models/gemini-2.5-flash";

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const GENERATE_TIMEOUT_MS: u64 = 30_000;

/// Opaque text-generation capability.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generates text for the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider call fails; callers above the
    /// [`AiClient`](crate::AiClient) boundary never see these errors.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Google Gemini `generateContent` provider.
#[derive(Clone)]
pub struct GeminiBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiBackend {
    /// Creates a backend with an explicit API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_owned(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Creates a backend from environment variables.
    ///
    /// Reads:
    /// - `GEMINI_API_KEY` — API credential (required, non-empty)
    /// - `GEMINI_MODEL` — model identifier (optional, defaults to
    ///   [`DEFAULT_GEMINI_MODEL`])
    ///
    /// Returns an error if the key is missing or empty; the process must
    /// refuse to start rather than operate without credentials.
    pub fn from_env() -> std::result::Result<Self, String> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| "missing GEMINI_API_KEY environment variable".to_owned())?;
        if api_key.trim().is_empty() {
            return Err("GEMINI_API_KEY is set but empty".to_owned());
        }
        let model = std::env::var("GEMINI_MODEL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_owned());
        Ok(Self::new(api_key, model))
    }

    /// Overrides the API endpoint, e.g. for a regional deployment or a
    /// test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(Duration::from_millis(GENERATE_TIMEOUT_MS))
            .json(&payload)
            .send()
            .await
            .map_err(IntegrationError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(IntegrationError::Transport)?;

        if !status.is_success() {
            return Err(IntegrationError::Http {
                status: status.as_u16(),
                body,
            });
        }

        extract_candidate_text(&body)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

fn extract_candidate_text(body: &str) -> Result<String> {
    let parsed: GenerateContentResponse = serde_json::from_str(body).map_err(|err| {
        IntegrationError::Decode(format!("invalid generateContent response JSON: {err}"))
    })?;

    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(IntegrationError::Generation(
            "response contained no candidate text".to_owned(),
        ));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::{extract_candidate_text, GeminiBackend};
    use crate::IntegrationError;

    #[test]
    fn extract_concatenates_first_candidate_parts() {
        let body = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "Olá, " }, { "text": "mundo" } ] } },
                { "content": { "parts": [ { "text": "ignored" } ] } }
            ]
        }"#;
        let text = extract_candidate_text(body).expect("must extract");
        assert_eq!(text, "Olá, mundo");
    }

    #[test]
    fn extract_fails_on_empty_candidates() {
        let err = extract_candidate_text(r#"{ "candidates": [] }"#).expect_err("must fail");
        assert!(matches!(err, IntegrationError::Generation(_)));
    }

    #[test]
    fn extract_fails_on_malformed_json() {
        let err = extract_candidate_text("not json").expect_err("must fail");
        assert!(matches!(err, IntegrationError::Decode(_)));
    }

    #[test]
    fn from_env_requires_api_key() {
        std::env::remove_var("GEMINI_API_KEY");
        let err = GeminiBackend::from_env().expect_err("must fail without key");
        assert!(err.contains("GEMINI_API_KEY"));

        std::env::set_var("GEMINI_API_KEY", "  ");
        let err = GeminiBackend::from_env().expect_err("must fail on empty key");
        assert!(err.contains("empty"));

        std::env::set_var("GEMINI_API_KEY", "test-key");
        let backend = GeminiBackend::from_env().expect("must build with key");
        assert_eq!(backend.model, super::DEFAULT_GEMINI_MODEL);
        std::env::remove_var("GEMINI_API_KEY");
    }

    #[test]
    fn debug_redacts_api_key() {
        let backend = GeminiBackend::new("secret-key", "models/gemini-2.5-flash");
        let debug = format!("{backend:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-key"));
    }
}
