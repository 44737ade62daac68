//! Inventory accessor abstraction: read-only queries over server and user records.

use async_trait::async_trait;
use sia_protocol::InventoryRecord;

use crate::error::InventoryResult;
use crate::predicate::Predicate;

/// Read-only view of the inventory.
///
/// Implementations never write. Backends that cannot push a predicate down
/// get the default `find_matching`, which filters `find_all` in process.
#[async_trait]
pub trait InventoryAccessor: Send + Sync {
    /// Every server and user record.
    async fn find_all(&self) -> InventoryResult<Vec<InventoryRecord>>;

    /// Records satisfying `predicate`, in backend order.
    async fn find_matching(&self, predicate: &Predicate) -> InventoryResult<Vec<InventoryRecord>> {
        let records = self.find_all().await?;
        Ok(records.into_iter().filter(|r| predicate.matches(r)).collect())
    }

    /// The server whose name equals `name`, ignoring ASCII case.
    async fn find_by_exact_name(&self, name: &str) -> InventoryResult<Option<InventoryRecord>>;

    /// Backend name for logging and health reports.
    fn backend_name(&self) -> &str;
}
