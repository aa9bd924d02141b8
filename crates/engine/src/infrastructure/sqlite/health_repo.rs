//! SQLite connectivity and schema checks.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::infrastructure::ports::{HealthRepo, RepoError};

pub struct SqliteHealthRepo {
    pool: SqlitePool,
}

impl SqliteHealthRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthRepo for SqliteHealthRepo {
    async fn check_connection(&self) -> Result<(), RepoError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("health.connection", e))?;
        Ok(())
    }

    async fn check_table_exists(&self, table: &str) -> Result<(), RepoError> {
        let row = sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("health.table", e))?;

        match row {
            Some(_) => Ok(()),
            None => Err(RepoError::not_found("Table", table)),
        }
    }
}
