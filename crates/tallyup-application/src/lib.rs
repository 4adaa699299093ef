//! Application layer for tallyup.
//!
//! Use cases that coordinate the domain logic in `tallyup-core` with whatever
//! store implementation the caller injects.

pub mod expense_service;
pub mod group_service;
pub mod settlement_service;

use std::sync::Arc;

use tallyup_core::repository::{ExpenseRepository, GroupRepository, SettlementRepository};

pub use expense_service::{Activity, ExpenseRequest, ExpenseService};
pub use group_service::GroupService;
pub use settlement_service::SettlementService;

/// All services wired to one store.
pub struct AppServices {
    pub groups: GroupService,
    pub expenses: ExpenseService,
    pub settlements: SettlementService,
}

impl AppServices {
    /// Builds every service on top of a store that implements all three
    /// repository traits.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: GroupRepository + ExpenseRepository + SettlementRepository + 'static,
    {
        let groups: Arc<dyn GroupRepository> = store.clone();
        let expenses: Arc<dyn ExpenseRepository> = store.clone();
        let settlements: Arc<dyn SettlementRepository> = store;

        Self {
            groups: GroupService::new(groups.clone()),
            expenses: ExpenseService::new(groups.clone(), expenses.clone()),
            settlements: SettlementService::new(groups, expenses, settlements),
        }
    }
}
