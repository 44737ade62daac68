use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::query::Intent;

/// Which path produced the answer text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    /// Deterministic template over rule-matched records (including zero matches).
    Rules,
    /// Verbatim text from the external completion service.
    Completion,
    /// Fixed "I don't understand" fallback.
    Canned,
    /// The inventory could not be read.
    InventoryUnavailable,
}

/// The answer to one question, with enough detail to audit how it was made.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub question_id: Uuid,
    /// Rendered answer text. Never empty.
    pub answer: String,
    pub intent: Intent,
    pub confidence: f64,
    /// Identifiers of the inventory records the answer is based on.
    #[serde(default)]
    pub matched_ids: Vec<String>,
    pub source: AnswerSource,
    /// Processing latency in milliseconds.
    pub latency_ms: u64,
    pub answered_at: DateTime<Utc>,
}
