//! Shared application state for the Axum server.

use std::sync::Arc;

use sia_inventory::{InventoryAccessor, MemoryInventory};

use crate::assistant::{Assistant, AssistantOptions};
use crate::completion::{CompletionService, UnconfiguredCompletion};

/// Cloned into every handler; the assistant itself is shared.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
}

impl AppState {
    pub fn new(assistant: Assistant) -> Self {
        Self {
            assistant: Arc::new(assistant),
        }
    }

    pub fn with_backends(
        inventory: Arc<dyn InventoryAccessor>,
        completion: Arc<dyn CompletionService>,
        options: &AssistantOptions,
    ) -> Self {
        Self::new(Assistant::new(inventory, completion, options))
    }

    /// Sample inventory, no completion provider (for tests and development).
    pub fn with_sample_data() -> Self {
        Self::with_backends(
            Arc::new(MemoryInventory::with_sample_data()),
            Arc::new(UnconfiguredCompletion),
            &AssistantOptions::default(),
        )
    }
}
