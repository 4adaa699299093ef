//! Settlement use cases.
//!
//! `compute_settlements` is the only operation that writes computed data: it
//! reads the group, its expenses and its settlement history, reduces the
//! resulting balances and persists the new pending settlements in one batch.
//! Nothing is written unless every read and the whole computation succeeded.

use std::sync::Arc;

use tallyup_core::error::{Result, TallyError};
use tallyup_core::group::Group;
use tallyup_core::repository::{ExpenseRepository, GroupRepository, SettlementRepository};
use tallyup_core::settlement::{Balances, NewSettlement, Settlement, SettlementReducer};

pub struct SettlementService {
    groups: Arc<dyn GroupRepository>,
    expenses: Arc<dyn ExpenseRepository>,
    settlements: Arc<dyn SettlementRepository>,
    reducer: SettlementReducer,
}

impl SettlementService {
    pub fn new(
        groups: Arc<dyn GroupRepository>,
        expenses: Arc<dyn ExpenseRepository>,
        settlements: Arc<dyn SettlementRepository>,
    ) -> Self {
        Self {
            groups,
            expenses,
            settlements,
            reducer: SettlementReducer,
        }
    }

    /// Computes and persists the pending settlements that zero every balance
    /// of the group.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Settlement>)` - The newly stored settlements, empty when the
    ///   group is already square
    /// * `Err(NotFound)` - The group does not exist
    /// * `Err(Dependency)` - A store read or the batch write failed
    /// * `Err(InvariantViolation)` - The balances could not be reduced
    pub async fn compute_settlements(&self, group_id: &str) -> Result<Vec<Settlement>> {
        let (group, balances) = self.load_balances(group_id).await?;
        let transfers = self.reducer.reduce(balances)?;

        if transfers.is_empty() {
            tracing::info!(group_id = %group.id, "Group is settled, nothing to persist");
            return Ok(Vec::new());
        }

        let batch: Vec<NewSettlement> = transfers
            .into_iter()
            .map(|t| t.into_new_settlement(group.id.clone()))
            .collect();
        let created = self.settlements.create_settlements_batch(batch).await?;

        tracing::info!(
            group_id = %group.id,
            count = created.len(),
            "Persisted pending settlements"
        );
        Ok(created)
    }

    /// Net balance per member, without reducing or writing anything.
    pub async fn group_balances(&self, group_id: &str) -> Result<Balances> {
        let (_, balances) = self.load_balances(group_id).await?;
        Ok(balances)
    }

    /// Settlements of the group still awaiting confirmation, oldest first.
    pub async fn pending_settlements(&self, group_id: &str) -> Result<Vec<Settlement>> {
        self.require_group(group_id).await?;
        let mut pending: Vec<Settlement> = self
            .settlements
            .list_settlements(group_id)
            .await?
            .into_iter()
            .filter(Settlement::is_pending)
            .collect();
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(pending)
    }

    /// Records that a pending settlement has been paid.
    pub async fn confirm_settlement(&self, settlement_id: &str) -> Result<Settlement> {
        let settlement = self.settlements.mark_settled(settlement_id).await?;
        tracing::info!(
            settlement_id = %settlement.id,
            from = %settlement.from,
            to = %settlement.to,
            amount = settlement.amount,
            "Settlement confirmed"
        );
        Ok(settlement)
    }

    async fn load_balances(&self, group_id: &str) -> Result<(Group, Balances)> {
        let group = self.require_group(group_id).await?;
        let expenses = self.expenses.list_expenses(group_id).await?;
        let history = self.settlements.list_settlements(group_id).await?;

        tracing::debug!(
            group_id,
            members = group.member_count(),
            expenses = expenses.len(),
            settlements = history.len(),
            "Computing balances"
        );

        let balances = self.reducer.balances(&group, &expenses, &history)?;
        Ok((group, balances))
    }

    async fn require_group(&self, group_id: &str) -> Result<Group> {
        self.groups
            .get_group(group_id)
            .await?
            .ok_or_else(|| TallyError::not_found("group", group_id))
    }
}
