//! Settlement repository trait.

use async_trait::async_trait;

use super::model::{NewSettlement, Settlement};
use crate::error::Result;

/// Persistence contract for settlements.
///
/// # Implementation Notes
///
/// `create_settlements_batch` must be all-or-nothing: either every record in
/// the batch is stored and returned, or none is and an error is returned.
#[async_trait]
pub trait SettlementRepository: Send + Sync {
    /// Lists every settlement (pending and settled) of a group.
    async fn list_settlements(&self, group_id: &str) -> Result<Vec<Settlement>>;

    /// Atomically stores a batch of pending settlements.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Settlement>)`: The stored records with their assigned ids,
    ///   in input order
    /// - `Err(_)`: Nothing was stored
    async fn create_settlements_batch(&self, batch: Vec<NewSettlement>) -> Result<Vec<Settlement>>;

    /// Marks a pending settlement as settled and returns the updated record.
    ///
    /// Fails with `NotFound` for unknown ids and `InvalidState` when the
    /// settlement was already settled.
    async fn mark_settled(&self, settlement_id: &str) -> Result<Settlement>;
}
