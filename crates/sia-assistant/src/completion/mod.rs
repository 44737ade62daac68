//! External text-completion services.
//!
//! Used only for questions the rule table cannot answer. A missing provider
//! and a failed call look the same to the caller: both are errors, and both
//! end in the canned fallback answer.

pub mod gemini;
pub mod ollama;
pub mod prompt;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

pub use gemini::GeminiCompletion;
pub use ollama::OllamaCompletion;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CompletionError {
    #[error("completion timed out after {0:?}")]
    Timeout(Duration),

    #[error("completion service unavailable: {0}")]
    Unavailable(String),

    #[error("completion service rejected the request with status {0}")]
    Rejected(u16),

    #[error("malformed completion response: {0}")]
    Malformed(String),
}

/// A text-completion backend.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Complete `prompt` within `timeout`. A single attempt; no retries.
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, CompletionError>;

    /// Provider name for logs and the health endpoint.
    fn provider_name(&self) -> &str;
}

/// Stand-in used when no provider is configured. Always unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredCompletion;

#[async_trait]
impl CompletionService for UnconfiguredCompletion {
    async fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, CompletionError> {
        Err(CompletionError::Unavailable(
            "no completion provider configured".into(),
        ))
    }

    fn provider_name(&self) -> &str {
        "none"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    None,
    Gemini,
    Ollama,
}

/// `[completion]` section of the service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    #[serde(default)]
    pub provider: Provider,
    /// Model name; each provider has its own default.
    #[serde(default)]
    pub model: Option<String>,
    /// Base URL override.
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Upper bound on one completion call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    5
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: Provider::None,
            model: None,
            host: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CompletionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Build the configured completion service. Misconfiguration degrades to
/// `UnconfiguredCompletion` with a warning; it never stops the service.
pub fn from_config(config: &CompletionConfig) -> Arc<dyn CompletionService> {
    match config.provider {
        Provider::None => Arc::new(UnconfiguredCompletion),
        Provider::Gemini => match GeminiCompletion::from_config(config) {
            Ok(gemini) => {
                tracing::info!(model = gemini.model(), "gemini completion enabled");
                Arc::new(gemini)
            }
            Err(e) => {
                tracing::warn!(error = %e, "gemini not usable, answering from rules only");
                Arc::new(UnconfiguredCompletion)
            }
        },
        Provider::Ollama => match OllamaCompletion::from_config(config) {
            Ok(ollama) => {
                tracing::info!(model = ollama.model(), "ollama completion enabled");
                Arc::new(ollama)
            }
            Err(e) => {
                tracing::warn!(error = %e, "ollama not usable, answering from rules only");
                Arc::new(UnconfiguredCompletion)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_is_unavailable() {
        let err = UnconfiguredCompletion
            .complete("hello", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Unavailable(_)));
    }

    #[test]
    fn provider_from_toml() {
        let config: CompletionConfig = toml::from_str(
            r#"
provider = "ollama"
model = "llama3.2"
"#,
        )
        .unwrap();
        assert_eq!(config.provider, Provider::Ollama);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn gemini_without_key_falls_back() {
        let config = CompletionConfig {
            provider: Provider::Gemini,
            api_key: Some("your_gemini_api_key_here".into()),
            ..Default::default()
        };
        assert_eq!(from_config(&config).provider_name(), "none");
    }

    #[test]
    fn default_is_none() {
        assert_eq!(
            from_config(&CompletionConfig::default()).provider_name(),
            "none"
        );
    }
}
