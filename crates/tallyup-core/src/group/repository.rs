//! Group repository trait.

use async_trait::async_trait;

use super::model::Group;
use crate::error::Result;

/// Persistence contract for groups.
///
/// Implementations are expected to reject groups that fail
/// [`Group::validate`] rather than store them.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Finds a group by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Group))`: Group found
    /// - `Ok(None)`: Group not found
    /// - `Err(_)`: The store could not be read
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>>;

    /// Inserts or replaces a group.
    async fn save_group(&self, group: &Group) -> Result<()>;

    /// Adds a member to the group with the given (already normalized) join
    /// code and returns the updated group.
    ///
    /// Lookup and insert happen in one write, so concurrent joins never
    /// overwrite each other. Adding an existing member changes nothing.
    ///
    /// Fails with `NotFound` when no group has the code.
    async fn add_member(&self, code: &str, member_id: &str) -> Result<Group>;

    /// Finds a group by its (already normalized) join code.
    async fn find_by_code(&self, code: &str) -> Result<Option<Group>>;

    /// Lists every group the member belongs to.
    async fn list_for_member(&self, member_id: &str) -> Result<Vec<Group>>;
}
