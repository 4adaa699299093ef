pub mod expense;
pub mod group;
pub mod settle;
pub mod utils;
