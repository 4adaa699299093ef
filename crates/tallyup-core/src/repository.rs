//! Repository trait re-exports.
//!
//! Centralized access to the store seam used by the application layer.

pub use crate::expense::ExpenseRepository;
pub use crate::group::GroupRepository;
pub use crate::settlement::SettlementRepository;
