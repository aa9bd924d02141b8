//! SQLite-backed account storage.

use async_trait::async_trait;
use pokeroster_domain::{UserId, Username};
use sqlx::{Row, SqlitePool};

use crate::infrastructure::ports::{AccountRepo, RepoError};

pub struct SqliteAccountRepo {
    pool: SqlitePool,
}

impl SqliteAccountRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepo for SqliteAccountRepo {
    async fn create(&self, username: &Username, password_hash: &str) -> Result<UserId, RepoError> {
        let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username.as_str())
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    RepoError::constraint(format!("username {username} already exists"))
                }
                other => RepoError::database("account.create", other),
            })?;

        Ok(UserId::new(result.last_insert_rowid()))
    }

    async fn get_password_hash(&self, username: &Username) -> Result<Option<String>, RepoError> {
        let row = sqlx::query("SELECT password_hash FROM users WHERE username = ?")
            .bind(username.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("account.get_password_hash", e))?;

        row.map(|r| r.try_get::<String, _>("password_hash"))
            .transpose()
            .map_err(|e| RepoError::serialization(format!("password_hash: {e}")))
    }

    async fn update_password_hash(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<(), RepoError> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE username = ?")
            .bind(password_hash)
            .bind(username.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("account.update_password_hash", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Account", username));
        }
        Ok(())
    }
}
