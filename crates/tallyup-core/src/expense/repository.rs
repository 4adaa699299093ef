//! Expense repository trait.

use async_trait::async_trait;

use super::model::Expense;
use crate::error::Result;

/// Persistence contract for expenses.
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// Lists all expenses recorded for a group, in insertion order.
    async fn list_expenses(&self, group_id: &str) -> Result<Vec<Expense>>;

    /// Stores a new expense.
    async fn save_expense(&self, expense: &Expense) -> Result<()>;
}
