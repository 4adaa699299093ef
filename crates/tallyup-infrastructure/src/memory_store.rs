//! In-memory store.
//!
//! Implements every repository trait over a single [`LedgerDocument`] guarded
//! by a `tokio` RwLock. Reads and writes can be forced to fail so callers can
//! exercise their `Dependency` error paths.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use tallyup_core::error::{Result, TallyError};
use tallyup_core::expense::{Expense, ExpenseRepository};
use tallyup_core::group::{Group, GroupRepository};
use tallyup_core::settlement::{NewSettlement, Settlement, SettlementRepository};

use crate::dto::LedgerDocument;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    ledger: RwLock<LedgerDocument>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent read fail with a `Dependency` error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent write fail with a `Dependency` error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Copy of the current document.
    pub async fn snapshot(&self) -> LedgerDocument {
        self.ledger.read().await.clone()
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(TallyError::dependency("in-memory store: read failure"));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TallyError::dependency("in-memory store: write failure"));
        }
        Ok(())
    }

    async fn write<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut LedgerDocument) -> Result<R>,
    {
        self.check_write()?;
        let mut ledger = self.ledger.write().await;
        // Work on a copy so a rejected operation leaves nothing behind.
        let mut draft = ledger.clone();
        let out = f(&mut draft)?;
        *ledger = draft;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(out)
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>> {
        self.check_read()?;
        Ok(self.ledger.read().await.group(group_id).cloned())
    }

    async fn save_group(&self, group: &Group) -> Result<()> {
        self.write(|ledger| ledger.upsert_group(group)).await
    }

    async fn add_member(&self, code: &str, member_id: &str) -> Result<Group> {
        self.write(|ledger| ledger.add_member_by_code(code, member_id))
            .await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Group>> {
        self.check_read()?;
        Ok(self.ledger.read().await.group_by_code(code).cloned())
    }

    async fn list_for_member(&self, member_id: &str) -> Result<Vec<Group>> {
        self.check_read()?;
        Ok(self.ledger.read().await.groups_for_member(member_id))
    }
}

#[async_trait]
impl ExpenseRepository for InMemoryStore {
    async fn list_expenses(&self, group_id: &str) -> Result<Vec<Expense>> {
        self.check_read()?;
        Ok(self.ledger.read().await.expenses_for(group_id))
    }

    async fn save_expense(&self, expense: &Expense) -> Result<()> {
        self.write(|ledger| ledger.insert_expense(expense)).await
    }
}

#[async_trait]
impl SettlementRepository for InMemoryStore {
    async fn list_settlements(&self, group_id: &str) -> Result<Vec<Settlement>> {
        self.check_read()?;
        Ok(self.ledger.read().await.settlements_for(group_id))
    }

    async fn create_settlements_batch(&self, batch: Vec<NewSettlement>) -> Result<Vec<Settlement>> {
        self.write(|ledger| ledger.insert_settlements(batch)).await
    }

    async fn mark_settled(&self, settlement_id: &str) -> Result<Settlement> {
        self.write(|ledger| ledger.confirm_settlement(settlement_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_group_round_trip_and_lookup() {
        let store = InMemoryStore::new();
        let group = Group::new("Trip", "alice", vec!["bob".to_string()], "TRIP");
        store.save_group(&group).await.unwrap();

        assert_eq!(store.get_group(&group.id).await.unwrap(), Some(group.clone()));
        assert_eq!(store.find_by_code("TRIP").await.unwrap(), Some(group.clone()));
        assert_eq!(store.list_for_member("bob").await.unwrap().len(), 1);
        assert!(store.list_for_member("carol").await.unwrap().is_empty());
        assert!(store.get_group("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_joins_keep_every_member() {
        let store = std::sync::Arc::new(InMemoryStore::new());
        let group = Group::new("Trip", "alice", Vec::new(), "TRIP");
        store.save_group(&group).await.unwrap();

        let (a, b) = tokio::join!(
            store.add_member("TRIP", "bob"),
            store.add_member("TRIP", "carol")
        );
        a.unwrap();
        b.unwrap();

        let stored = store.get_group(&group.id).await.unwrap().unwrap();
        assert!(stored.is_member("bob"));
        assert!(stored.is_member("carol"));
        assert_eq!(stored.member_count(), 3);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = InMemoryStore::new();
        store.fail_reads(true);
        assert!(store.list_expenses("g").await.unwrap_err().is_dependency());

        store.fail_reads(false);
        store.fail_writes(true);
        let err = store.create_settlements_batch(Vec::new()).await.unwrap_err();
        assert!(err.is_dependency());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_batch_is_not_counted() {
        let store = InMemoryStore::new();
        let batch = vec![NewSettlement {
            group_id: "missing".to_string(),
            from: "a".to_string(),
            to: "b".to_string(),
            amount: 1.0,
        }];
        assert!(store.create_settlements_batch(batch).await.is_err());
        assert_eq!(store.write_count(), 0);
        assert!(store.snapshot().await.settlements.is_empty());
    }
}
