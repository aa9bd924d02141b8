//! Unified error types for the domain layer
//!
//! Invariant violations raised by value objects and the roster aggregate.
//! The engine maps these onto its use-case errors.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., empty names)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The move is already in the learned move list
    #[error("This pokemon already knows {0}")]
    MoveAlreadyKnown(String),

    /// The move is not in the learned move list
    #[error("This pokemon does not know {0}")]
    MoveNotKnown(String),

    /// The learned move list is at capacity
    #[error("This pokemon already knows {current}/{max} moves")]
    MoveListFull { current: usize, max: usize },
}

impl DomainError {
    /// Creates a validation error for malformed input.
    ///
    /// # Example
    /// ```ignore
    /// if name.is_empty() {
    ///     return Err(DomainError::validation("Species name cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a move list full error
    pub fn move_list_full(current: usize, max: usize) -> Self {
        Self::MoveListFull { current, max }
    }
}
