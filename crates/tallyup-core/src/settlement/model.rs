//! Settlement domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};
use crate::group::{GroupId, MemberId};

/// A directed payment `from` → `to` within a group.
///
/// Lifecycle: created pending (`settled == false`), then confirmed
/// (`settled == true`). Confirmation is terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub id: String,
    pub group_id: GroupId,
    /// Debtor.
    pub from: MemberId,
    /// Creditor.
    pub to: MemberId,
    pub amount: f64,
    #[serde(default)]
    pub settled: bool,
    pub created_at: DateTime<Utc>,
}

impl Settlement {
    pub fn is_pending(&self) -> bool {
        !self.settled
    }

    /// Moves the record to its terminal state.
    pub fn confirm(&mut self) -> Result<()> {
        if self.settled {
            return Err(TallyError::invalid_state(format!(
                "settlement '{}' is already settled",
                self.id
            )));
        }
        self.settled = true;
        Ok(())
    }
}

/// A settlement that has not been assigned an id by the store yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSettlement {
    pub group_id: GroupId,
    pub from: MemberId,
    pub to: MemberId,
    pub amount: f64,
}

impl NewSettlement {
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(TallyError::validation(format!(
                "settlement {} -> {} has non-positive amount {}",
                self.from, self.to, self.amount
            )));
        }
        if self.from == self.to {
            return Err(TallyError::validation(format!(
                "settlement from '{}' to themselves",
                self.from
            )));
        }
        Ok(())
    }

    /// Materializes the pending record with a fresh id.
    pub fn into_pending(self) -> Settlement {
        Settlement {
            id: uuid::Uuid::new_v4().to_string(),
            group_id: self.group_id,
            from: self.from,
            to: self.to,
            amount: self.amount,
            settled: false,
            created_at: Utc::now(),
        }
    }
}
