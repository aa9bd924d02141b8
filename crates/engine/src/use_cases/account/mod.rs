//! Account use cases: registration, password change and login.
//!
//! Accounts are not linked to roster entries.

mod error;
mod password;

use std::sync::Arc;

use pokeroster_domain::{UserId, Username};

pub use error::AccountError;

use crate::infrastructure::ports::{AccountRepo, RepoError};

pub struct AccountService {
    repo: Arc<dyn AccountRepo>,
}

impl AccountService {
    pub fn new(repo: Arc<dyn AccountRepo>) -> Self {
        Self { repo }
    }

    pub async fn create_account(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserId, AccountError> {
        let username = Username::new(username)?;
        let hash = hash(password).await?;

        let id = self
            .repo
            .create(&username, &hash)
            .await
            .map_err(|e| match e {
                RepoError::ConstraintViolation(_) => {
                    AccountError::UsernameTaken(username.to_string())
                }
                other => store_failure("create", &username, other),
            })?;

        tracing::info!(username = %username, user_id = %id, "Created account");
        Ok(id)
    }

    pub async fn update_password(
        &self,
        username: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        let username = Username::new(username)?;
        let hash = hash(new_password).await?;

        self.repo
            .update_password_hash(&username, &hash)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    AccountError::UserNotFound(username.to_string())
                } else {
                    store_failure("update_password_hash", &username, e)
                }
            })?;

        tracing::info!(username = %username, "Updated password");
        Ok(())
    }

    /// Check a username/password pair.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), AccountError> {
        let username = Username::new(username)?;
        let stored = self
            .repo
            .get_password_hash(&username)
            .await
            .map_err(|e| store_failure("get_password_hash", &username, e))?
            .ok_or_else(|| AccountError::UserNotFound(username.to_string()))?;

        let candidate = password.to_string();
        let matches = tokio::task::spawn_blocking(move || {
            password::verify_password(&candidate, &stored)
        })
        .await
        .map_err(|e| AccountError::Hashing(e.to_string()))?
        .map_err(|e| AccountError::Hashing(e.to_string()))?;

        if !matches {
            tracing::info!(username = %username, "Rejected login");
            return Err(AccountError::InvalidCredentials);
        }
        tracing::debug!(username = %username, "Login succeeded");
        Ok(())
    }
}

/// Hash on the blocking pool.
async fn hash(password: &str) -> Result<String, AccountError> {
    if password.is_empty() {
        return Err(AccountError::Validation(
            "Password cannot be empty".to_string(),
        ));
    }
    let plain = password.to_string();
    tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(|e| AccountError::Hashing(e.to_string()))?
        .map_err(|e| AccountError::Hashing(e.to_string()))
}

fn store_failure(operation: &'static str, username: &Username, e: RepoError) -> AccountError {
    tracing::error!(operation, username = %username, error = %e, "Account store operation failed");
    AccountError::StoreFailure(e)
}
