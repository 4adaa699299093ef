//! Group use cases: creation with a join code, joining by code, listing.

use std::sync::Arc;

use tallyup_core::error::{Result, TallyError};
use tallyup_core::group::{Group, MemberId, generate_join_code, normalize_join_code};
use tallyup_core::repository::GroupRepository;

/// How many fresh codes to try before giving up on a collision streak.
const MAX_CODE_ATTEMPTS: usize = 16;

pub struct GroupService {
    groups: Arc<dyn GroupRepository>,
}

impl GroupService {
    pub fn new(groups: Arc<dyn GroupRepository>) -> Self {
        Self { groups }
    }

    /// Creates a group owned by `creator` with an unused join code.
    pub async fn create_group(
        &self,
        name: &str,
        creator: &str,
        members: Vec<MemberId>,
    ) -> Result<Group> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TallyError::validation("group name must not be empty"));
        }
        if creator.trim().is_empty() {
            return Err(TallyError::validation("creator must not be empty"));
        }

        let code = self.unused_code().await?;
        let group = Group::new(name, creator, members, code);
        self.groups.save_group(&group).await?;

        tracing::info!(
            group_id = %group.id,
            code = %group.code,
            members = group.member_count(),
            "Group created"
        );
        Ok(group)
    }

    /// Adds `member` to the group with the given join code.
    ///
    /// Codes are matched case-insensitively. Joining a group twice is a no-op.
    pub async fn join_group(&self, code: &str, member: &str) -> Result<Group> {
        if member.trim().is_empty() {
            return Err(TallyError::validation("member must not be empty"));
        }

        let code = normalize_join_code(code);
        let group = self.groups.add_member(&code, member).await?;
        tracing::info!(group_id = %group.id, member, "Member joined group");
        Ok(group)
    }

    pub async fn groups_for_member(&self, member: &str) -> Result<Vec<Group>> {
        let mut groups = self.groups.list_for_member(member).await?;
        groups.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(groups)
    }

    pub async fn get_group(&self, group_id: &str) -> Result<Group> {
        self.groups
            .get_group(group_id)
            .await?
            .ok_or_else(|| TallyError::not_found("group", group_id))
    }

    async fn unused_code(&self) -> Result<String> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_join_code();
            if self.groups.find_by_code(&code).await?.is_none() {
                return Ok(code);
            }
            tracing::debug!(code = %code, "Join code collision, retrying");
        }
        Err(TallyError::invariant(format!(
            "no free join code after {} attempts",
            MAX_CODE_ATTEMPTS
        )))
    }
}
