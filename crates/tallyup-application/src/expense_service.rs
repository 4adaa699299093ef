//! Expense use cases.
//!
//! Expenses are always split equally across the group. This is also where a
//! new expense's payments are reconciled against its total; the reducer
//! trusts stored expenses and never re-checks that sum.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use tallyup_core::error::{Result, TallyError};
use tallyup_core::expense::Expense;
use tallyup_core::group::MemberId;
use tallyup_core::repository::{ExpenseRepository, GroupRepository};
use tallyup_core::settlement::SETTLEMENT_EPSILON;

/// Input for [`ExpenseService::add_expense`].
#[derive(Debug, Clone)]
pub struct ExpenseRequest {
    pub group_id: String,
    pub total_amount: f64,
    pub paid_by: BTreeMap<MemberId, f64>,
    pub description: String,
    pub date: Option<DateTime<Utc>>,
    pub category: Option<String>,
}

/// One entry of a member's activity feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub group_id: String,
    pub group_name: String,
    pub expense_id: String,
    pub description: String,
    pub amount: f64,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

pub struct ExpenseService {
    groups: Arc<dyn GroupRepository>,
    expenses: Arc<dyn ExpenseRepository>,
}

impl ExpenseService {
    pub fn new(groups: Arc<dyn GroupRepository>, expenses: Arc<dyn ExpenseRepository>) -> Self {
        Self { groups, expenses }
    }

    /// Records a new expense after checking it against its group.
    ///
    /// Rejected with `Validation` when the description is blank, an amount is
    /// negative, a payer is not a member, or the payments differ from the
    /// total by more than `SETTLEMENT_EPSILON`.
    pub async fn add_expense(&self, request: ExpenseRequest) -> Result<Expense> {
        let group = self
            .groups
            .get_group(&request.group_id)
            .await?
            .ok_or_else(|| TallyError::not_found("group", request.group_id.clone()))?;

        let description = request.description.trim();
        if description.is_empty() {
            tracing::warn!(group_id = %group.id, "Rejected expense without description");
            return Err(TallyError::validation("expense description must not be empty"));
        }

        if let Some(stranger) = request.paid_by.keys().find(|p| !group.is_member(p)) {
            tracing::warn!(group_id = %group.id, payer = %stranger, "Rejected non-member payer");
            return Err(TallyError::validation(format!(
                "'{}' is not a member of group '{}'",
                stranger, group.name
            )));
        }

        let mut expense = Expense::new(
            group.id.clone(),
            request.total_amount,
            request.paid_by,
            description,
        );
        if let Some(date) = request.date {
            expense = expense.with_date(date);
        }
        if let Some(category) = request.category.filter(|c| !c.trim().is_empty()) {
            expense = expense.with_category(category);
        }
        expense.validate()?;

        let paid = expense.payer_total();
        if (paid - expense.total_amount).abs() > SETTLEMENT_EPSILON {
            tracing::warn!(
                group_id = %group.id,
                total = expense.total_amount,
                paid,
                "Rejected unreconciled expense"
            );
            return Err(TallyError::validation(format!(
                "payments sum to {:.2} but the expense total is {:.2}",
                paid, expense.total_amount
            )));
        }

        self.expenses.save_expense(&expense).await?;
        tracing::info!(
            group_id = %group.id,
            expense_id = %expense.id,
            amount = expense.total_amount,
            "Expense recorded"
        );
        Ok(expense)
    }

    pub async fn list_expenses(&self, group_id: &str) -> Result<Vec<Expense>> {
        if self.groups.get_group(group_id).await?.is_none() {
            return Err(TallyError::not_found("group", group_id));
        }
        self.expenses.list_expenses(group_id).await
    }

    /// Expenses across all of the member's groups, most recent first.
    pub async fn activity_feed(&self, member: &str) -> Result<Vec<Activity>> {
        let mut feed = Vec::new();
        for group in self.groups.list_for_member(member).await? {
            for expense in self.expenses.list_expenses(&group.id).await? {
                feed.push(Activity {
                    group_id: group.id.clone(),
                    group_name: group.name.clone(),
                    expense_id: expense.id,
                    description: expense.description,
                    amount: expense.total_amount,
                    date: expense.date,
                    category: expense.category,
                });
            }
        }
        feed.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(feed)
    }
}
