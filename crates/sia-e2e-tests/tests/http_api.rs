//! The HTTP surface end to end: router, handlers, assistant and inventory.

mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{HttpHarness, UnreachableInventory, assistant_with};
use sia_assistant::completion::UnconfiguredCompletion;

#[tokio::test]
async fn e2e_health_reports_backends() {
    let h = HttpHarness::with_sample_data();
    let (status, json) = h.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["inventory"]["backend"], "memory");
    assert_eq!(json["inventory"]["reachable"], true);
    assert_eq!(json["completion"], "none");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn e2e_health_with_unreachable_inventory() {
    let h = HttpHarness::with_assistant(assistant_with(
        Arc::new(UnreachableInventory),
        Arc::new(UnconfiguredCompletion),
    ));
    let (status, json) = h.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");
    assert!(json["inventory"]["records"].is_null());
}

#[tokio::test]
async fn e2e_ask_count() {
    let h = HttpHarness::with_sample_data();
    let (status, json) = h.ask("How many servers do we have?").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["intent"], "count_servers");
    assert_eq!(json["source"], "rules");
    assert_eq!(json["matched_ids"].as_array().unwrap().len(), 11);
    assert!(json["answer"].as_str().unwrap().contains("11"));
    assert!(json["question_id"].is_string());
    assert!(json["latency_ms"].is_u64());
}

#[tokio::test]
async fn e2e_ask_with_inventory_down() {
    let h = HttpHarness::with_assistant(assistant_with(
        Arc::new(UnreachableInventory),
        Arc::new(UnconfiguredCompletion),
    ));
    let (status, json) = h.ask("Which servers are down?").await;

    // Degraded answers are still successful responses.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["source"], "inventory_unavailable");
    assert!(
        json["answer"]
            .as_str()
            .unwrap()
            .contains("temporarily unavailable")
    );
}

#[tokio::test]
async fn e2e_classify_matches_ask() {
    let h = HttpHarness::with_sample_data();
    let question = "Show me servers with more than 8GB RAM";

    let (status, classified) = h
        .post("/api/v1/classify", json!({ "question": question }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(classified["intent"], "search_by_attribute");
    assert_eq!(classified["params"], json!({ "ram_gt": "8" }));
    assert_eq!(classified["rule"], "resource_threshold");

    let (_, answered) = h.ask(question).await;
    assert_eq!(answered["intent"], classified["intent"]);
    assert_eq!(answered["confidence"], classified["confidence"]);
}

#[tokio::test]
async fn e2e_blank_questions_rejected() {
    let h = HttpHarness::with_sample_data();
    for question in ["", "   ", "\n\t"] {
        let (status, json) = h.ask(question).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{question:?}");
        assert_eq!(json["status"], 400);
    }

    let (status, _) = h.post("/api/v1/classify", json!({ "question": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn e2e_wrong_body_shape_rejected() {
    let h = HttpHarness::with_sample_data();
    let (status, json) = h.post("/api/v1/ask", json!({ "question": 42 })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["status"], 422);
}
