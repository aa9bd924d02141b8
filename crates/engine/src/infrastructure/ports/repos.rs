//! Repository port traits for database access.

use async_trait::async_trait;
use pokeroster_domain::{MoveName, NewRosterEntry, RosterEntry, RosterId, UserId, Username};
use pokeroster_domain::STAT_COUNT;

use super::error::RepoError;

// =============================================================================
// Roster Storage
// =============================================================================

/// Durable storage for roster entries.
///
/// Every method is atomic for the single record it touches; nothing here
/// spans several records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RosterRepo: Send + Sync {
    /// Store a new entry and return the id assigned to it.
    async fn insert(&self, entry: &NewRosterEntry) -> Result<RosterId, RepoError>;

    async fn get(&self, id: RosterId) -> Result<Option<RosterEntry>, RepoError>;

    /// Overwrite the learned move list, keeping the given order.
    async fn replace_moves(&self, id: RosterId, moves: &[MoveName]) -> Result<(), RepoError>;

    /// Overwrite the six effort values and the cached total.
    async fn replace_effort_values(
        &self,
        id: RosterId,
        effort: [u16; STAT_COUNT],
        total_effort: u16,
    ) -> Result<(), RepoError>;

    /// Drop every entry and restart id assignment.
    async fn reset_all(&self) -> Result<(), RepoError>;
}

// =============================================================================
// Account Storage
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepo: Send + Sync {
    /// Create an account. Fails with `ConstraintViolation` if the username is taken.
    async fn create(&self, username: &Username, password_hash: &str)
        -> Result<UserId, RepoError>;

    async fn get_password_hash(&self, username: &Username) -> Result<Option<String>, RepoError>;

    /// Fails with `NotFound` if the account does not exist.
    async fn update_password_hash(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<(), RepoError>;
}

// =============================================================================
// Health
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn check_connection(&self) -> Result<(), RepoError>;

    /// Fails with `NotFound` if the table does not exist.
    async fn check_table_exists(&self, table: &str) -> Result<(), RepoError>;
}
