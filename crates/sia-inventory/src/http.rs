//! Inventory REST API client.
//!
//! Reads `GET /api/servers`, `GET /api/users` and
//! `GET /api/servers/name/{name}` from the inventory service. Every request
//! carries a client-side timeout; transport, status and decode failures are
//! reported as `InventoryError`, never as an empty result.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use sia_protocol::{InventoryRecord, ServerRecord, UserRecord};

use crate::accessor::InventoryAccessor;
use crate::error::{InventoryError, InventoryResult};

/// Connection settings for the inventory API.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpInventoryConfig {
    /// Base URL, e.g. `http://localhost:8000`.
    #[serde(default = "default_url")]
    pub url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_url() -> String {
    "http://localhost:8000".into()
}

fn default_timeout_secs() -> u64 {
    3
}

impl Default for HttpInventoryConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Inventory accessor over the REST API.
pub struct HttpInventory {
    client: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl HttpInventory {
    pub fn new(config: &HttpInventoryConfig) -> InventoryResult<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let base = Url::parse(&config.url)
            .map_err(|e| InventoryError::Unavailable(format!("bad inventory url {}: {e}", config.url)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InventoryError::Unavailable(format!("http client: {e}")))?;
        Ok(Self {
            client,
            base,
            timeout,
        })
    }

    fn url(&self, segments: &[&str]) -> InventoryResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| InventoryError::Unavailable(format!("cannot-be-a-base url {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a JSON document. `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> InventoryResult<Option<T>> {
        let url = self.url(segments)?;
        tracing::debug!(url = %url, "inventory request");

        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), url = %url, "inventory returned non-200");
            return Err(InventoryError::Unavailable(format!(
                "{} returned {}",
                url.path(),
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| InventoryError::Decode(format!("{}: {e}", url.path())))
    }

    fn transport_error(&self, e: reqwest::Error) -> InventoryError {
        if e.is_timeout() {
            InventoryError::Timeout(self.timeout)
        } else {
            InventoryError::Unavailable(e.to_string())
        }
    }

    async fn servers(&self) -> InventoryResult<Vec<ServerRecord>> {
        self.get_json(&["api", "servers"])
            .await?
            .ok_or_else(|| InventoryError::Unavailable("/api/servers not found".into()))
    }

    async fn users(&self) -> InventoryResult<Vec<UserRecord>> {
        self.get_json(&["api", "users"])
            .await?
            .ok_or_else(|| InventoryError::Unavailable("/api/users not found".into()))
    }
}

#[async_trait]
impl InventoryAccessor for HttpInventory {
    async fn find_all(&self) -> InventoryResult<Vec<InventoryRecord>> {
        let (servers, users) = tokio::try_join!(self.servers(), self.users())?;
        Ok(servers
            .into_iter()
            .map(InventoryRecord::Server)
            .chain(users.into_iter().map(InventoryRecord::User))
            .collect())
    }

    async fn find_by_exact_name(&self, name: &str) -> InventoryResult<Option<InventoryRecord>> {
        if let Some(server) = self
            .get_json::<ServerRecord>(&["api", "servers", "name", name])
            .await?
        {
            return Ok(Some(InventoryRecord::Server(server)));
        }

        // The name endpoint is case-sensitive.
        Ok(self
            .servers()
            .await?
            .into_iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .map(InventoryRecord::Server))
    }

    fn backend_name(&self) -> &str {
        "http"
    }
}
