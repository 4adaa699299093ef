//! Settlement domain module.
//!
//! # Module Structure
//!
//! - `model`: `Settlement` records and their pending → settled lifecycle
//! - `reducer`: balance computation and greedy reduction to transfers
//! - `repository`: persistence trait
//!
//! # Usage
//!
//! ```ignore
//! use tallyup_core::settlement::{SettlementReducer, SETTLEMENT_EPSILON};
//!
//! let reducer = SettlementReducer;
//! let balances = reducer.balances(&group, &expenses, &history)?;
//! let transfers = reducer.reduce(balances)?;
//! ```

mod model;
pub mod reducer;
pub mod repository;

pub use model::{NewSettlement, Settlement};
pub use reducer::{Balances, SETTLEMENT_EPSILON, SettlementReducer, Transfer};
pub use repository::SettlementRepository;
