//! Fallback dispatcher: decides how a classified question is answered.
//!
//! Confident classifications are answered from the inventory through the
//! filter builder and formatter. Everything else, including recognised
//! intents whose parameters cannot be turned into a predicate, goes to the
//! completion service once, bounded by a timeout. Any completion failure
//! ends in the canned fallback. Only an unreadable inventory is reported as
//! an explicit error state.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sia_inventory::{InventoryAccessor, InventoryError, InventoryResult, Predicate};
use sia_protocol::{
    AnswerResponse, AnswerSource, Classification, Intent, InventoryRecord, Parameters, Question,
    params,
};
use tokio::time::timeout;

use crate::completion::{CompletionService, prompt};
use crate::filter::FilterBuilder;
use crate::formatter::{CANNED_FALLBACK, Formatter, INVENTORY_UNAVAILABLE};

/// Classifications at or above this confidence are answered by rules.
pub const CONFIDENCE_THRESHOLD: f64 = 0.5;

struct Outcome {
    answer: String,
    source: AnswerSource,
    matched_ids: Vec<String>,
}

impl Outcome {
    fn canned() -> Self {
        Self {
            answer: CANNED_FALLBACK.to_string(),
            source: AnswerSource::Canned,
            matched_ids: Vec::new(),
        }
    }
}

pub struct FallbackDispatcher {
    inventory: Arc<dyn InventoryAccessor>,
    completion: Arc<dyn CompletionService>,
    formatter: Formatter,
    inventory_timeout: Duration,
    completion_timeout: Duration,
}

impl FallbackDispatcher {
    pub fn new(
        inventory: Arc<dyn InventoryAccessor>,
        completion: Arc<dyn CompletionService>,
        formatter: Formatter,
        inventory_timeout: Duration,
        completion_timeout: Duration,
    ) -> Self {
        Self {
            inventory,
            completion,
            formatter,
            inventory_timeout,
            completion_timeout,
        }
    }

    pub async fn resolve(&self, question: &Question, mut classification: Classification) -> AnswerResponse {
        let predicate = if classification.is_confident(CONFIDENCE_THRESHOLD) {
            match FilterBuilder::build(classification.intent, &classification.params) {
                Ok(predicate) => Some(predicate),
                Err(e) => {
                    tracing::debug!(error = %e, "no predicate for classification, deferring");
                    classification = Classification {
                        intent: Intent::Unknown,
                        params: Parameters::new(),
                        confidence: 0.0,
                        rule: classification.rule,
                    };
                    None
                }
            }
        } else {
            None
        };

        let outcome = match predicate {
            Some(predicate) => self.from_inventory(&classification, &predicate).await,
            None => self.from_completion(&question.text).await,
        };

        let elapsed = Utc::now() - question.received_at;
        AnswerResponse {
            question_id: question.id,
            answer: outcome.answer,
            intent: classification.intent,
            confidence: classification.confidence,
            matched_ids: outcome.matched_ids,
            source: outcome.source,
            latency_ms: u64::try_from(elapsed.num_milliseconds()).unwrap_or(0),
            answered_at: Utc::now(),
        }
    }

    async fn from_inventory(&self, c: &Classification, predicate: &Predicate) -> Outcome {
        tracing::debug!(intent = %c.intent, predicate = %predicate, "querying inventory");

        let fetched = match (c.intent, c.params.get(params::NAME)) {
            (Intent::ServerDetail, Some(name)) => self
                .bounded(self.inventory.find_by_exact_name(name))
                .await
                .map(|found| found.into_iter().collect::<Vec<InventoryRecord>>()),
            _ => self.bounded(self.inventory.find_matching(predicate)).await,
        };

        match fetched {
            Ok(records) => Outcome {
                answer: self.formatter.format(c.intent, &c.params, &records),
                source: AnswerSource::Rules,
                matched_ids: records.iter().map(|r| r.id().to_string()).collect(),
            },
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    backend = self.inventory.backend_name(),
                    "inventory unavailable"
                );
                Outcome {
                    answer: INVENTORY_UNAVAILABLE.to_string(),
                    source: AnswerSource::InventoryUnavailable,
                    matched_ids: Vec::new(),
                }
            }
        }
    }

    async fn from_completion(&self, question: &str) -> Outcome {
        let context = match self.bounded(self.inventory.find_all()).await {
            Ok(records) => prompt::inventory_context(&records),
            Err(e) => {
                tracing::debug!(error = %e, "completion context without inventory data");
                prompt::INVENTORY_UNAVAILABLE_CONTEXT.to_string()
            }
        };
        let prompt = prompt::build(question, &context);

        let provider = self.completion.provider_name();
        let result = timeout(
            self.completion_timeout,
            self.completion.complete(&prompt, self.completion_timeout),
        )
        .await;

        match result {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                tracing::info!(provider, chars = text.len(), "answered by completion");
                Outcome {
                    answer: text,
                    source: AnswerSource::Completion,
                    matched_ids: Vec::new(),
                }
            }
            Ok(Ok(_)) => {
                tracing::warn!(provider, "empty completion");
                Outcome::canned()
            }
            Ok(Err(e)) => {
                tracing::debug!(provider, error = %e, "completion failed");
                Outcome::canned()
            }
            Err(_) => {
                tracing::warn!(
                    provider,
                    timeout_ms = self.completion_timeout.as_millis() as u64,
                    "completion timed out"
                );
                Outcome::canned()
            }
        }
    }

    /// Apply the inventory timeout to one accessor call.
    async fn bounded<T>(&self, call: impl Future<Output = InventoryResult<T>>) -> InventoryResult<T> {
        timeout(self.inventory_timeout, call)
            .await
            .unwrap_or(Err(InventoryError::Timeout(self.inventory_timeout)))
    }
}
