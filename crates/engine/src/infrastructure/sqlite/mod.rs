//! SQLite adapters: roster entries, accounts and health checks share one pool.

mod account_repo;
mod health_repo;
mod roster_repo;
mod schema;

use std::sync::Arc;

use sqlx::SqlitePool;

pub use account_repo::SqliteAccountRepo;
pub use health_repo::SqliteHealthRepo;
pub use roster_repo::SqliteRosterRepo;
pub use schema::ensure_schema;

use crate::infrastructure::ports::RepoError;

/// All SQLite repositories, built over one connection pool.
pub struct SqliteRepositories {
    pub roster: Arc<SqliteRosterRepo>,
    pub account: Arc<SqliteAccountRepo>,
    pub health: Arc<SqliteHealthRepo>,
}

impl SqliteRepositories {
    /// Open (or create) the database file and make sure the schema exists.
    pub async fn connect(db_path: &str) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("connect", e))?;

        ensure_schema(&pool).await?;

        Ok(Self::new(pool))
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self {
            roster: Arc::new(SqliteRosterRepo::new(pool.clone())),
            account: Arc::new(SqliteAccountRepo::new(pool.clone())),
            health: Arc::new(SqliteHealthRepo::new(pool)),
        }
    }
}
