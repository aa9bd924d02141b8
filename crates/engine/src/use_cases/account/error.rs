//! Account use case errors.

use pokeroster_domain::DomainError;

use crate::infrastructure::ports::RepoError;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Username {0} is already taken")]
    UsernameTaken(String),

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Storage failure: {0}")]
    StoreFailure(#[from] RepoError),
}

impl From<DomainError> for AccountError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(msg) => Self::Validation(msg),
            other => Self::Validation(other.to_string()),
        }
    }
}
