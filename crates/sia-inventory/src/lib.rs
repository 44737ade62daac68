//! Read-only access to the server inventory.
//!
//! Provides the `InventoryAccessor` abstraction the assistant queries, a
//! composable `Predicate` over inventory records, and three backends:
//! in-memory (tests and development), the inventory REST API, and a
//! read-only PostgreSQL view.

pub mod accessor;
pub mod error;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod predicate;

// Re-export key types for convenience
pub use accessor::InventoryAccessor;
pub use error::{InventoryError, InventoryResult};
pub use http::{HttpInventory, HttpInventoryConfig};
pub use memory::MemoryInventory;
pub use postgres::PgInventory;
pub use predicate::{Comparison, Constraint, Predicate, Resource, TextField};
