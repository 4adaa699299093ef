//! Error types for tallyup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the whole tallyup workspace.
///
/// Store implementations convert every I/O, lock and serialization failure into
/// [`TallyError::Dependency`], so callers only have to distinguish "the data
/// says no" from "the store failed".
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TallyError {
    /// Referenced entity does not exist
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Reading from or writing to the backing store failed
    #[error("Dependency error: {0}")]
    Dependency(String),

    /// Balances did not converge or the input breaks a model invariant
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// A record was rejected at the store boundary
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested state transition is not allowed
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TallyError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Dependency error
    pub fn dependency(message: impl Into<String>) -> Self {
        Self::Dependency(message.into())
    }

    /// Creates an InvariantViolation error
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an InvalidState error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a Dependency error
    pub fn is_dependency(&self) -> bool {
        matches!(self, Self::Dependency(_))
    }

    /// Check if this is an InvariantViolation error
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for TallyError {
    fn from(err: std::io::Error) -> Self {
        Self::Dependency(format!("I/O: {} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for TallyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Dependency(format!("JSON: {}", err))
    }
}

impl From<toml::de::Error> for TallyError {
    fn from(err: toml::de::Error) -> Self {
        Self::Dependency(format!("TOML parse: {}", err))
    }
}

impl From<toml::ser::Error> for TallyError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Dependency(format!("TOML serialize: {}", err))
    }
}

/// A type alias for `Result<T, TallyError>`.
pub type Result<T> = std::result::Result<T, TallyError>;
