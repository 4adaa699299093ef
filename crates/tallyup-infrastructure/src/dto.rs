//! Persisted ledger document shared by every store implementation.
//!
//! Both the in-memory and the file store keep one `LedgerDocument` and run
//! the same boundary checks against it, so they only differ in how the
//! document is locked and persisted.

use serde::{Deserialize, Serialize};

use tallyup_core::error::{Result, TallyError};
use tallyup_core::expense::Expense;
use tallyup_core::group::Group;
use tallyup_core::settlement::{NewSettlement, Settlement};

/// Current on-disk schema version.
pub const LEDGER_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub settlements: Vec<Settlement>,
}

fn default_version() -> u32 {
    LEDGER_VERSION
}

impl Default for LedgerDocument {
    fn default() -> Self {
        Self {
            version: LEDGER_VERSION,
            groups: Vec::new(),
            expenses: Vec::new(),
            settlements: Vec::new(),
        }
    }
}

impl LedgerDocument {
    /// Checks every stored record. Used when a document is loaded.
    pub fn validate(&self) -> Result<()> {
        if self.version > LEDGER_VERSION {
            return Err(TallyError::validation(format!(
                "ledger version {} is newer than supported version {}",
                self.version, LEDGER_VERSION
            )));
        }
        for group in &self.groups {
            group.validate()?;
        }
        for expense in &self.expenses {
            expense.validate()?;
        }
        for settlement in &self.settlements {
            if !settlement.amount.is_finite() || settlement.amount <= 0.0 {
                return Err(TallyError::validation(format!(
                    "settlement '{}' has non-positive amount",
                    settlement.id
                )));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    pub fn group(&self, group_id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    pub fn group_by_code(&self, code: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.code == code)
    }

    pub fn groups_for_member(&self, member_id: &str) -> Vec<Group> {
        self.groups
            .iter()
            .filter(|g| g.is_member(member_id))
            .cloned()
            .collect()
    }

    /// Inserts or replaces a group. Join codes stay unique across groups.
    pub fn upsert_group(&mut self, group: &Group) -> Result<()> {
        group.validate()?;
        if self
            .groups
            .iter()
            .any(|g| g.code == group.code && g.id != group.id)
        {
            return Err(TallyError::validation(format!(
                "join code '{}' is already taken",
                group.code
            )));
        }

        match self.groups.iter_mut().find(|g| g.id == group.id) {
            Some(existing) => *existing = group.clone(),
            None => self.groups.push(group.clone()),
        }
        Ok(())
    }

    pub fn add_member_by_code(&mut self, code: &str, member_id: &str) -> Result<Group> {
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.code == code)
            .ok_or_else(|| TallyError::not_found("group code", code))?;
        group.add_member(member_id);
        Ok(group.clone())
    }

    // ------------------------------------------------------------------
    // Expenses
    // ------------------------------------------------------------------

    pub fn expenses_for(&self, group_id: &str) -> Vec<Expense> {
        self.expenses
            .iter()
            .filter(|e| e.group_id == group_id)
            .cloned()
            .collect()
    }

    pub fn insert_expense(&mut self, expense: &Expense) -> Result<()> {
        expense.validate()?;
        if self.group(&expense.group_id).is_none() {
            return Err(TallyError::not_found("group", expense.group_id.clone()));
        }
        if self.expenses.iter().any(|e| e.id == expense.id) {
            return Err(TallyError::validation(format!(
                "expense '{}' already exists",
                expense.id
            )));
        }
        self.expenses.push(expense.clone());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Settlements
    // ------------------------------------------------------------------

    pub fn settlements_for(&self, group_id: &str) -> Vec<Settlement> {
        self.settlements
            .iter()
            .filter(|s| s.group_id == group_id)
            .cloned()
            .collect()
    }

    /// Validates the whole batch before touching the document, so a rejected
    /// record leaves nothing behind.
    pub fn insert_settlements(&mut self, batch: Vec<NewSettlement>) -> Result<Vec<Settlement>> {
        for new in &batch {
            new.validate()?;
            let group = self
                .group(&new.group_id)
                .ok_or_else(|| TallyError::not_found("group", new.group_id.clone()))?;
            if !group.is_member(&new.from) || !group.is_member(&new.to) {
                return Err(TallyError::validation(format!(
                    "settlement {} -> {} references a non-member of group '{}'",
                    new.from, new.to, new.group_id
                )));
            }
        }

        let created: Vec<Settlement> = batch.into_iter().map(NewSettlement::into_pending).collect();
        self.settlements.extend(created.iter().cloned());
        Ok(created)
    }

    pub fn confirm_settlement(&mut self, settlement_id: &str) -> Result<Settlement> {
        let settlement = self
            .settlements
            .iter_mut()
            .find(|s| s.id == settlement_id)
            .ok_or_else(|| TallyError::not_found("settlement", settlement_id))?;
        settlement.confirm()?;
        Ok(settlement.clone())
    }
}
