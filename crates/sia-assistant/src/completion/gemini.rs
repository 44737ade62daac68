//! Google Gemini completion client (Generative Language REST API).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CompletionConfig, CompletionError, CompletionService};

const DEFAULT_HOST: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

pub struct GeminiCompletion {
    client: reqwest::Client,
    host: String,
    model: String,
    api_key: String,
}

impl GeminiCompletion {
    pub fn new(
        host: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, CompletionError> {
        let api_key = api_key.into();
        if !is_usable_key(&api_key) {
            return Err(CompletionError::Unavailable("no valid Gemini API key".into()));
        }
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| CompletionError::Unavailable(format!("http client: {e}")))?;
        Ok(Self {
            client,
            host: host.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        })
    }

    pub fn from_config(config: &CompletionConfig) -> Result<Self, CompletionError> {
        Self::new(
            config.host.as_deref().unwrap_or(DEFAULT_HOST),
            config.model.as_deref().unwrap_or(DEFAULT_MODEL),
            config.api_key.clone().unwrap_or_default(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Placeholder keys from sample env files (`your_api_key_here`) count as unset.
fn is_usable_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && !key.starts_with("your_")
}

#[async_trait]
impl CompletionService for GeminiCompletion {
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, CompletionError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.host, self.model
        );
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout(timeout)
                } else {
                    CompletionError::Unavailable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), model = %self.model, "gemini returned non-200");
            return Err(CompletionError::Rejected(response.status().as_u16()));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;

        let text: String = generated
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(CompletionError::Malformed("no candidate text".into()));
        }
        Ok(text)
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}
