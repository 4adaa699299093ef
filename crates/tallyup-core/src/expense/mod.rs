//! Expense domain module.

mod model;
pub mod repository;

pub use model::Expense;
pub use repository::ExpenseRepository;
