//! Group domain model.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{Result, TallyError};

/// Identifier of a group member.
pub type MemberId = String;

/// Identifier of a group.
pub type GroupId = String;

/// Alphabet used for join codes.
pub const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Number of characters in a join code.
pub const JOIN_CODE_LEN: usize = 4;

/// A set of members sharing expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    /// Member identifiers. Ordered for reproducible iteration.
    pub members: BTreeSet<MemberId>,
    pub created_by: MemberId,
    pub created_at: DateTime<Utc>,
    /// Short human-shareable code other members join with.
    pub code: String,
}

impl Group {
    /// Builds a new group. The creator is always made a member.
    pub fn new(
        name: impl Into<String>,
        created_by: impl Into<MemberId>,
        members: impl IntoIterator<Item = MemberId>,
        code: impl Into<String>,
    ) -> Self {
        let created_by = created_by.into();
        let mut members: BTreeSet<MemberId> = members.into_iter().collect();
        members.insert(created_by.clone());

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            members,
            created_by,
            created_at: Utc::now(),
            code: code.into(),
        }
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_member(&self, member: &str) -> bool {
        self.members.contains(member)
    }

    /// Adds a member. Returns `false` if they were already in the group.
    pub fn add_member(&mut self, member: impl Into<MemberId>) -> bool {
        self.members.insert(member.into())
    }

    /// Checks the invariants a stored group must satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(TallyError::validation("group name must not be empty"));
        }
        if self.members.is_empty() {
            return Err(TallyError::validation(format!(
                "group '{}' has no members",
                self.id
            )));
        }
        if !self.members.contains(&self.created_by) {
            return Err(TallyError::validation(format!(
                "creator '{}' is not a member of group '{}'",
                self.created_by, self.id
            )));
        }
        if !is_valid_join_code(&self.code) {
            return Err(TallyError::validation(format!(
                "invalid join code '{}'",
                self.code
            )));
        }
        Ok(())
    }
}

/// Generates a random join code such as `K7QZ`.
pub fn generate_join_code() -> String {
    let mut rng = rand::thread_rng();
    (0..JOIN_CODE_LEN)
        .map(|_| JOIN_CODE_ALPHABET[rng.gen_range(0..JOIN_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Upper-cases and trims user input so `" k7qz"` matches `K7QZ`.
pub fn normalize_join_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

pub fn is_valid_join_code(code: &str) -> bool {
    code.len() == JOIN_CODE_LEN && code.bytes().all(|b| JOIN_CODE_ALPHABET.contains(&b))
}
