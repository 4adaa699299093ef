//! File-backed store.
//!
//! The whole ledger lives in one TOML document (`ledger.toml`). Every write is
//! a locked read-modify-write that replaces the file in a single rename, so a
//! settlement batch is persisted completely or not at all.
//!
//! The lock covers one store call, not the reducer's read-compute-write
//! sequence: two processes computing settlements for the same group at the
//! same time can both persist overlapping pending settlements.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use tallyup_core::error::{Result, TallyError};
use tallyup_core::expense::{Expense, ExpenseRepository};
use tallyup_core::group::{Group, GroupRepository};
use tallyup_core::settlement::{NewSettlement, Settlement, SettlementRepository};

use crate::dto::LedgerDocument;
use crate::storage::AtomicTomlFile;

/// Name of the ledger file inside the data directory.
pub const LEDGER_FILE_NAME: &str = "ledger.toml";

#[derive(Debug, Clone)]
pub struct FileStore {
    file: AtomicTomlFile<LedgerDocument>,
}

impl FileStore {
    /// Opens (or lazily creates) the ledger inside `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self::with_path(data_dir.as_ref().join(LEDGER_FILE_NAME))
    }

    pub fn with_path(path: PathBuf) -> Self {
        tracing::debug!("Using ledger file: {:?}", path);
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    async fn read<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&LedgerDocument) -> R + Send + 'static,
        R: Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || {
            file.read(|ledger| {
                ledger.validate()?;
                Ok(f(ledger))
            })
        })
        .await
        .map_err(|e| TallyError::dependency(format!("ledger read task failed: {}", e)))?
    }

    async fn write<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut LedgerDocument) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || {
            file.update(|ledger| {
                ledger.validate()?;
                f(ledger)
            })
        })
        .await
        .map_err(|e| TallyError::dependency(format!("ledger write task failed: {}", e)))?
    }
}

#[async_trait]
impl GroupRepository for FileStore {
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>> {
        let group_id = group_id.to_string();
        self.read(move |ledger| ledger.group(&group_id).cloned()).await
    }

    async fn save_group(&self, group: &Group) -> Result<()> {
        let group = group.clone();
        self.write(move |ledger| ledger.upsert_group(&group)).await
    }

    async fn add_member(&self, code: &str, member_id: &str) -> Result<Group> {
        let code = code.to_string();
        let member_id = member_id.to_string();
        self.write(move |ledger| ledger.add_member_by_code(&code, &member_id))
            .await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Group>> {
        let code = code.to_string();
        self.read(move |ledger| ledger.group_by_code(&code).cloned())
            .await
    }

    async fn list_for_member(&self, member_id: &str) -> Result<Vec<Group>> {
        let member_id = member_id.to_string();
        self.read(move |ledger| ledger.groups_for_member(&member_id))
            .await
    }
}

#[async_trait]
impl ExpenseRepository for FileStore {
    async fn list_expenses(&self, group_id: &str) -> Result<Vec<Expense>> {
        let group_id = group_id.to_string();
        self.read(move |ledger| ledger.expenses_for(&group_id)).await
    }

    async fn save_expense(&self, expense: &Expense) -> Result<()> {
        let expense = expense.clone();
        self.write(move |ledger| ledger.insert_expense(&expense))
            .await
    }
}

#[async_trait]
impl SettlementRepository for FileStore {
    async fn list_settlements(&self, group_id: &str) -> Result<Vec<Settlement>> {
        let group_id = group_id.to_string();
        self.read(move |ledger| ledger.settlements_for(&group_id))
            .await
    }

    async fn create_settlements_batch(&self, batch: Vec<NewSettlement>) -> Result<Vec<Settlement>> {
        let count = batch.len();
        let created = self
            .write(move |ledger| ledger.insert_settlements(batch))
            .await?;
        tracing::debug!("Persisted {} pending settlements", count);
        Ok(created)
    }

    async fn mark_settled(&self, settlement_id: &str) -> Result<Settlement> {
        let settlement_id = settlement_id.to_string();
        self.write(move |ledger| ledger.confirm_settlement(&settlement_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn seeded_group() -> Group {
        Group::new("House", "alice", vec!["bob".to_string()], "HOME")
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let group = seeded_group();
        {
            let store = FileStore::new(temp_dir.path());
            store.save_group(&group).await.unwrap();
            let paid = BTreeMap::from([("alice".to_string(), 40.0)]);
            store
                .save_expense(&Expense::new(&group.id, 40.0, paid, "Groceries"))
                .await
                .unwrap();
        }

        let reopened = FileStore::new(temp_dir.path());
        assert_eq!(reopened.get_group(&group.id).await.unwrap(), Some(group.clone()));
        let expenses = reopened.list_expenses(&group.id).await.unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].paid_by_member("alice"), 40.0);
    }

    #[tokio::test]
    async fn test_batch_and_confirm() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        let group = seeded_group();
        store.save_group(&group).await.unwrap();

        let created = store
            .create_settlements_batch(vec![NewSettlement {
                group_id: group.id.clone(),
                from: "bob".to_string(),
                to: "alice".to_string(),
                amount: 20.0,
            }])
            .await
            .unwrap();
        assert_eq!(created.len(), 1);
        assert!(created[0].is_pending());

        let confirmed = store.mark_settled(&created[0].id).await.unwrap();
        assert!(confirmed.settled);

        let stored = store.list_settlements(&group.id).await.unwrap();
        assert_eq!(stored, vec![confirmed]);
    }

    #[tokio::test]
    async fn test_rejected_batch_leaves_file_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        let group = seeded_group();
        store.save_group(&group).await.unwrap();
        let before = std::fs::read_to_string(store.path()).unwrap();

        let result = store
            .create_settlements_batch(vec![
                NewSettlement {
                    group_id: group.id.clone(),
                    from: "bob".to_string(),
                    to: "alice".to_string(),
                    amount: 20.0,
                },
                NewSettlement {
                    group_id: group.id.clone(),
                    from: "bob".to_string(),
                    to: "alice".to_string(),
                    amount: -1.0,
                },
            ])
            .await;
        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_joins_keep_every_member() {
        let temp_dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(FileStore::new(temp_dir.path()));

        for round in 0..20 {
            let code = format!("R{:03}", round);
            let group = Group::new("Round", "alice", Vec::new(), code.as_str());
            store.save_group(&group).await.unwrap();

            let first = {
                let store = store.clone();
                let code = code.clone();
                tokio::spawn(async move { store.add_member(&code, "bob").await })
            };
            let second = {
                let store = store.clone();
                let code = code.clone();
                tokio::spawn(async move { store.add_member(&code, "carol").await })
            };
            first.await.unwrap().unwrap();
            second.await.unwrap().unwrap();

            let stored = store.get_group(&group.id).await.unwrap().unwrap();
            assert!(
                stored.is_member("bob") && stored.is_member("carol"),
                "round {round} lost a member: {:?}",
                stored.members
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        store.save_group(&seeded_group()).await.unwrap();
        let err = store.add_member("ZZZZ", "carol").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_corrupt_ledger_is_dependency_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(LEDGER_FILE_NAME), "groups = 3").unwrap();
        let store = FileStore::new(temp_dir.path());
        assert!(store.get_group("x").await.unwrap_err().is_dependency());
    }
}
