//! Inventory access error types.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while reading the inventory. Every variant means the
/// inventory could not be consulted; none of them means "no matches".
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("inventory unavailable: {0}")]
    Unavailable(String),

    #[error("inventory request timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid inventory response: {0}")]
    Decode(String),
}

/// Convenience alias for inventory results.
pub type InventoryResult<T> = Result<T, InventoryError>;
