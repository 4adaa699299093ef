//! Expense domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, TallyError};
use crate::group::{GroupId, MemberId};

/// A shared expense recorded against a group.
///
/// `paid_by` maps each paying member to what they personally put in. Members
/// who paid nothing are absent. The map is not required to sum to
/// `total_amount`; that reconciliation happens when the expense is entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub group_id: GroupId,
    pub total_amount: f64,
    #[serde(default)]
    pub paid_by: BTreeMap<MemberId, f64>,
    pub description: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Expense {
    /// Creates an expense dated now with a fresh id.
    pub fn new(
        group_id: impl Into<GroupId>,
        total_amount: f64,
        paid_by: BTreeMap<MemberId, f64>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            group_id: group_id.into(),
            total_amount,
            paid_by,
            description: description.into(),
            date: Utc::now(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    /// What `member` paid toward this expense, zero if they are not a payer.
    pub fn paid_by_member(&self, member: &str) -> f64 {
        self.paid_by.get(member).copied().unwrap_or(0.0)
    }

    /// Sum of all recorded payments.
    pub fn payer_total(&self) -> f64 {
        self.paid_by.values().sum()
    }

    /// Rejects records no computation should ever see.
    pub fn validate(&self) -> Result<()> {
        if !self.total_amount.is_finite() || self.total_amount < 0.0 {
            return Err(TallyError::validation(format!(
                "expense '{}' has invalid total {}",
                self.id, self.total_amount
            )));
        }
        if let Some((member, amount)) = self
            .paid_by
            .iter()
            .find(|(_, amount)| !amount.is_finite() || **amount < 0.0)
        {
            return Err(TallyError::validation(format!(
                "expense '{}' records invalid payment {} by '{}'",
                self.id, amount, member
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paid(entries: &[(&str, f64)]) -> BTreeMap<MemberId, f64> {
        entries
            .iter()
            .map(|(m, a)| (m.to_string(), *a))
            .collect()
    }

    #[test]
    fn test_absent_payer_paid_zero() {
        let expense = Expense::new("g", 30.0, paid(&[("alice", 30.0)]), "Dinner");
        assert_eq!(expense.paid_by_member("alice"), 30.0);
        assert_eq!(expense.paid_by_member("bob"), 0.0);
    }

    #[test]
    fn test_payer_total() {
        let expense = Expense::new("g", 50.0, paid(&[("a", 20.0), ("b", 30.0)]), "Taxi");
        assert_eq!(expense.payer_total(), 50.0);
    }

    #[test]
    fn test_validate_rejects_negative_amounts() {
        let expense = Expense::new("g", -1.0, BTreeMap::new(), "Bad");
        assert!(expense.validate().is_err());

        let expense = Expense::new("g", 10.0, paid(&[("a", -5.0)]), "Bad");
        assert!(expense.validate().is_err());
    }

    #[test]
    fn test_category_is_optional_in_serialized_form() {
        let expense = Expense::new("g", 10.0, paid(&[("a", 10.0)]), "Coffee");
        let json = serde_json::to_string(&expense).unwrap();
        assert!(!json.contains("category"));

        let tagged = expense.with_category("food");
        let json = serde_json::to_string(&tagged).unwrap();
        assert!(json.contains("\"category\":\"food\""));
    }
}
