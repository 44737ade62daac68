//! Health check endpoint.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /health: liveness plus backend reachability.
///
/// Always 200; an unreachable inventory reports `"degraded"` because the
/// service still answers (with the unavailable template).
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let inventory = state.assistant.inventory();
    let (reachable, records) = match inventory.find_all().await {
        Ok(records) => (true, Some(records.len())),
        Err(e) => {
            tracing::warn!(error = %e, backend = inventory.backend_name(), "inventory health check failed");
            (false, None)
        }
    };

    let status = if reachable { "ok" } else { "degraded" };
    Json(json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "inventory": {
            "backend": inventory.backend_name(),
            "reachable": reachable,
            "records": records,
        },
        "completion": state.assistant.completion_provider(),
    }))
}
