//! Roster use case errors.

use pokeroster_domain::{DomainError, RosterId};

use crate::infrastructure::ports::{RepoError, SpeciesError};

/// Every way a roster operation can fail. Each operation reports exactly one.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("Species not found: {0}")]
    SpeciesNotFound(String),

    #[error("Roster entry not found: {0}")]
    NotFound(RosterId),

    #[error("{species} cannot learn {move_name}")]
    IllegalMove { species: String, move_name: String },

    #[error("This pokemon already knows {0}")]
    MoveAlreadyKnown(String),

    #[error("This pokemon does not know {0}")]
    MoveNotKnown(String),

    #[error("This pokemon already knows {max} moves")]
    MoveListFull { max: usize },

    /// The species provider could not be reached or answered garbage.
    #[error("Species provider unavailable: {0}")]
    SpeciesUnavailable(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage failure: {0}")]
    StoreFailure(#[from] RepoError),
}

impl From<DomainError> for RosterError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(msg) => Self::Validation(msg),
            DomainError::MoveAlreadyKnown(name) => Self::MoveAlreadyKnown(name),
            DomainError::MoveNotKnown(name) => Self::MoveNotKnown(name),
            DomainError::MoveListFull { max, .. } => Self::MoveListFull { max },
        }
    }
}

impl From<SpeciesError> for RosterError {
    fn from(e: SpeciesError) -> Self {
        match e {
            SpeciesError::NotFound(name) => Self::SpeciesNotFound(name),
            SpeciesError::Unavailable(msg) | SpeciesError::InvalidResponse(msg) => {
                Self::SpeciesUnavailable(msg)
            }
        }
    }
}
