pub mod config;
pub mod error;
pub mod expense;
pub mod group;
pub mod repository;
pub mod settlement;

// Re-export common error type
pub use error::TallyError;
