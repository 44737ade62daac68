//! The `answer(question)` entry point.

use std::sync::Arc;
use std::time::Duration;

use sia_inventory::InventoryAccessor;
use sia_protocol::{AnswerResponse, Classification, Question};

use crate::classifier::IntentClassifier;
use crate::completion::CompletionService;
use crate::fallback::FallbackDispatcher;
use crate::formatter::{Formatter, FormatterConfig};

/// Longest question prefix written to the logs.
const LOGGED_QUESTION_CHARS: usize = 100;

/// Tunables for answering.
#[derive(Debug, Clone)]
pub struct AssistantOptions {
    pub formatter: FormatterConfig,
    /// Bound on every inventory call.
    pub inventory_timeout: Duration,
    /// Bound on the completion call.
    pub completion_timeout: Duration,
}

impl Default for AssistantOptions {
    fn default() -> Self {
        Self {
            formatter: FormatterConfig::default(),
            inventory_timeout: Duration::from_secs(3),
            completion_timeout: Duration::from_secs(5),
        }
    }
}

/// Answers free-text inventory questions.
///
/// Holds only read-only state after construction, so one instance can
/// serve any number of concurrent questions.
pub struct Assistant {
    classifier: IntentClassifier,
    dispatcher: FallbackDispatcher,
    inventory: Arc<dyn InventoryAccessor>,
    completion: Arc<dyn CompletionService>,
}

impl Assistant {
    pub fn new(
        inventory: Arc<dyn InventoryAccessor>,
        completion: Arc<dyn CompletionService>,
        options: &AssistantOptions,
    ) -> Self {
        let dispatcher = FallbackDispatcher::new(
            inventory.clone(),
            completion.clone(),
            Formatter::new(&options.formatter),
            options.inventory_timeout,
            options.completion_timeout,
        );
        Self {
            classifier: IntentClassifier::new(),
            dispatcher,
            inventory,
            completion,
        }
    }

    /// Answer one question. Never fails; problems degrade the answer.
    pub async fn answer(&self, text: &str) -> AnswerResponse {
        let question = Question::new(text);
        tracing::info!(
            question_id = %question.id,
            question = %truncate(text, LOGGED_QUESTION_CHARS),
            "processing question"
        );

        let classification = self.classifier.classify(&question.text);
        tracing::debug!(
            question_id = %question.id,
            intent = %classification.intent,
            rule = classification.rule.as_deref().unwrap_or("-"),
            params = ?classification.params,
            "classified"
        );

        let response = self.dispatcher.resolve(&question, classification).await;
        tracing::info!(
            question_id = %question.id,
            intent = %response.intent,
            source = ?response.source,
            matches = response.matched_ids.len(),
            latency_ms = response.latency_ms,
            "answered"
        );
        response
    }

    /// Classification only, without touching the inventory.
    pub fn classify(&self, text: &str) -> Classification {
        self.classifier.classify(text)
    }

    pub fn inventory(&self) -> &Arc<dyn InventoryAccessor> {
        &self.inventory
    }

    pub fn completion_provider(&self) -> &str {
        self.completion.provider_name()
    }
}

fn truncate(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
