//! Service configuration: TOML file with per-field defaults, then
//! environment overrides.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use sia_inventory::{
    HttpInventory, HttpInventoryConfig, InventoryAccessor, MemoryInventory, PgInventory,
};

use crate::assistant::AssistantOptions;
use crate::completion::{CompletionConfig, Provider};
use crate::formatter::FormatterConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    /// Listen address (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub answers: FormatterConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InventoryBackend {
    /// Built-in sample data.
    #[default]
    Memory,
    /// Inventory REST API.
    Http,
    /// Read-only PostgreSQL.
    Postgres,
}

/// `[inventory]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryConfig {
    #[serde(default)]
    pub backend: InventoryBackend,
    /// API base URL or database URL, depending on `backend`.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_inventory_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_inventory_timeout_secs() -> u64 {
    3
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            backend: InventoryBackend::Memory,
            url: None,
            timeout_secs: default_inventory_timeout_secs(),
        }
    }
}

impl InventoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Construct the configured accessor. Postgres connects lazily, so an
    /// unreachable database shows up on first query, not here.
    pub fn build(&self) -> anyhow::Result<Arc<dyn InventoryAccessor>> {
        let accessor: Arc<dyn InventoryAccessor> = match self.backend {
            InventoryBackend::Memory => Arc::new(MemoryInventory::with_sample_data()),
            InventoryBackend::Http => {
                let mut config = HttpInventoryConfig {
                    timeout_secs: self.timeout_secs,
                    ..Default::default()
                };
                if let Some(url) = &self.url {
                    config.url = url.clone();
                }
                Arc::new(HttpInventory::new(&config).context("inventory API client")?)
            }
            InventoryBackend::Postgres => {
                let url = self
                    .url
                    .as_deref()
                    .context("postgres inventory backend needs a database url")?;
                Arc::new(PgInventory::connect_lazy(url, self.timeout()).context("inventory database")?)
            }
        };
        Ok(accessor)
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            inventory: InventoryConfig::default(),
            completion: CompletionConfig::default(),
            answers: FormatterConfig::default(),
        }
    }
}

impl AssistantConfig {
    /// Load config from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// File (if given) or defaults, then process environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (the process environment in `load`).
    ///
    /// `DATABASE_URL` selects the postgres backend and wins over
    /// `INVENTORY_API_URL`. A Gemini key selects Gemini unless a provider was
    /// already chosen; `OLLAMA_HOST`/`OLLAMA_MODEL` select Ollama likewise.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = var("SIA_HOST") {
            self.host = host;
        }
        if let Some(port) = var("SIA_PORT") {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("SIA_PORT is not a port: {port}"))?;
        }

        if let Some(url) = var("INVENTORY_API_URL") {
            self.inventory.backend = InventoryBackend::Http;
            self.inventory.url = Some(url);
        }
        if let Some(url) = var("DATABASE_URL") {
            self.inventory.backend = InventoryBackend::Postgres;
            self.inventory.url = Some(url);
        }

        if let Some(key) = var("GEMINI_API_KEY") {
            self.completion.api_key = Some(key);
            if self.completion.provider == Provider::None {
                self.completion.provider = Provider::Gemini;
            }
        }
        if self.completion.provider == Provider::Gemini
            && let Some(model) = var("GEMINI_MODEL")
        {
            self.completion.model = Some(model);
        }

        let ollama_host = var("OLLAMA_HOST");
        let ollama_model = var("OLLAMA_MODEL");
        if self.completion.provider == Provider::None
            && (ollama_host.is_some() || ollama_model.is_some())
        {
            self.completion.provider = Provider::Ollama;
        }
        if self.completion.provider == Provider::Ollama {
            if ollama_host.is_some() {
                self.completion.host = ollama_host;
            }
            if ollama_model.is_some() {
                self.completion.model = ollama_model;
            }
        }

        if let Some(secs) = var("COMPLETION_TIMEOUT_SECS") {
            self.completion.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("COMPLETION_TIMEOUT_SECS is not a number: {secs}"))?;
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn assistant_options(&self) -> AssistantOptions {
        AssistantOptions {
            formatter: self.answers.clone(),
            inventory_timeout: self.inventory.timeout(),
            completion_timeout: self.completion.timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config() {
        let config = AssistantConfig::default();
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
        assert_eq!(config.inventory.backend, InventoryBackend::Memory);
        assert_eq!(config.inventory.timeout_secs, 3);
        assert_eq!(config.completion.provider, Provider::None);
        assert_eq!(config.answers.max_listed, 10);
    }

    #[test]
    fn parse_full_toml() {
        let config: AssistantConfig = toml::from_str(
            r#"
host = "127.0.0.1"
port = 9000

[inventory]
backend = "http"
url = "http://inventory.local:8000"
timeout_secs = 2

[completion]
provider = "ollama"
model = "llama3.2"
timeout_secs = 8

[answers]
max_listed = 5
"#,
        )
        .unwrap();
        assert_eq!(config.listen_addr(), "127.0.0.1:9000");
        assert_eq!(config.inventory.backend, InventoryBackend::Http);
        assert_eq!(config.inventory.url.as_deref(), Some("http://inventory.local:8000"));
        assert_eq!(config.completion.provider, Provider::Ollama);

        let options = config.assistant_options();
        assert_eq!(options.formatter.max_listed, 5);
        assert_eq!(options.inventory_timeout, Duration::from_secs(2));
        assert_eq!(options.completion_timeout, Duration::from_secs(8));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: AssistantConfig = toml::from_str("port = 8181\n").unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8181);
        assert_eq!(config.completion.timeout_secs, 5);
    }

    #[test]
    fn env_overrides() {
        let mut config = AssistantConfig::default();
        config
            .apply_env(env(&[
                ("SIA_PORT", "9090"),
                ("INVENTORY_API_URL", "http://api:8000"),
                ("GEMINI_API_KEY", "AIzaTest"),
                ("GEMINI_MODEL", "gemini-1.5-pro"),
                ("COMPLETION_TIMEOUT_SECS", "7"),
            ]))
            .unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.inventory.backend, InventoryBackend::Http);
        assert_eq!(config.completion.provider, Provider::Gemini);
        assert_eq!(config.completion.model.as_deref(), Some("gemini-1.5-pro"));
        assert_eq!(config.completion.timeout_secs, 7);
    }

    #[test]
    fn database_url_wins_over_api_url() {
        let mut config = AssistantConfig::default();
        config
            .apply_env(env(&[
                ("INVENTORY_API_URL", "http://api:8000"),
                ("DATABASE_URL", "postgres://ro@db/inventory"),
            ]))
            .unwrap();
        assert_eq!(config.inventory.backend, InventoryBackend::Postgres);
        assert_eq!(config.inventory.url.as_deref(), Some("postgres://ro@db/inventory"));
    }

    #[test]
    fn ollama_env_selects_ollama() {
        let mut config = AssistantConfig::default();
        config
            .apply_env(env(&[("OLLAMA_HOST", "http://gpu-box:11434")]))
            .unwrap();
        assert_eq!(config.completion.provider, Provider::Ollama);
        assert_eq!(config.completion.host.as_deref(), Some("http://gpu-box:11434"));
    }

    #[test]
    fn explicit_provider_is_kept() {
        let mut config = AssistantConfig::default();
        config.completion.provider = Provider::Ollama;
        config
            .apply_env(env(&[("GEMINI_API_KEY", "AIzaTest"), ("GEMINI_MODEL", "x")]))
            .unwrap();
        assert_eq!(config.completion.provider, Provider::Ollama);
        assert!(config.completion.model.is_none());
    }

    #[test]
    fn blank_env_is_ignored() {
        let mut config = AssistantConfig::default();
        config.apply_env(env(&[("SIA_HOST", "  ")])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn bad_port_is_an_error() {
        let mut config = AssistantConfig::default();
        assert!(config.apply_env(env(&[("SIA_PORT", "eighty")])).is_err());
    }

    #[tokio::test]
    async fn builds_memory_backend() {
        let inventory = InventoryConfig::default().build().unwrap();
        assert_eq!(inventory.backend_name(), "memory");
        assert_eq!(inventory.find_all().await.unwrap().len(), 16);
    }

    #[test]
    fn postgres_backend_requires_url() {
        let config = InventoryConfig {
            backend: InventoryBackend::Postgres,
            ..Default::default()
        };
        assert!(config.build().is_err());
    }

    #[test]
    fn from_file_missing_is_error() {
        assert!(AssistantConfig::from_file("/nonexistent/sia.toml").is_err());
    }
}
