//! Shared harness for the end-to-end tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use sia_assistant::completion::{CompletionService, UnconfiguredCompletion};
use sia_assistant::routes::build_router;
use sia_assistant::state::AppState;
use sia_assistant::{Assistant, AssistantOptions};
use sia_inventory::{InventoryAccessor, InventoryError, InventoryResult, MemoryInventory};
use sia_protocol::InventoryRecord;

/// Assistant over the sample inventory (11 servers, 5 users) with no
/// completion provider.
pub fn sample_assistant() -> Assistant {
    assistant_with(
        Arc::new(MemoryInventory::with_sample_data()),
        Arc::new(UnconfiguredCompletion),
    )
}

pub fn assistant_with(
    inventory: Arc<dyn InventoryAccessor>,
    completion: Arc<dyn CompletionService>,
) -> Assistant {
    Assistant::new(inventory, completion, &fast_options())
}

/// Short timeouts so failure paths finish quickly.
pub fn fast_options() -> AssistantOptions {
    AssistantOptions {
        inventory_timeout: Duration::from_millis(500),
        completion_timeout: Duration::from_secs(1),
        ..Default::default()
    }
}

/// Inventory whose every call fails as unreachable.
pub struct UnreachableInventory;

#[async_trait]
impl InventoryAccessor for UnreachableInventory {
    async fn find_all(&self) -> InventoryResult<Vec<InventoryRecord>> {
        Err(InventoryError::Unavailable("connection refused".into()))
    }

    async fn find_by_exact_name(&self, _name: &str) -> InventoryResult<Option<InventoryRecord>> {
        Err(InventoryError::Unavailable("connection refused".into()))
    }

    fn backend_name(&self) -> &str {
        "unreachable"
    }
}

/// Router over the sample inventory, driven with `tower::oneshot`.
pub struct HttpHarness {
    pub router: Router,
}

impl HttpHarness {
    pub fn with_sample_data() -> Self {
        Self {
            router: build_router(AppState::with_sample_data()),
        }
    }

    pub fn with_assistant(assistant: Assistant) -> Self {
        Self {
            router: build_router(AppState::new(assistant)),
        }
    }

    /// POST a JSON body; returns (status, response JSON).
    pub async fn post(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    /// POST /api/v1/ask with `{question}`.
    pub async fn ask(&self, question: &str) -> (StatusCode, serde_json::Value) {
        self.post("/api/v1/ask", serde_json::json!({ "question": question }))
            .await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }
}
