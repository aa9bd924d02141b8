//! SQLite schema for roster entries and accounts.

use pokeroster_domain::Stat;
use sqlx::{SqliteConnection, SqlitePool};

use crate::infrastructure::ports::RepoError;

const CREATE_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    )
"#;

const CREATE_POKEMON: &str = r#"
    CREATE TABLE IF NOT EXISTS pokemon (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        game_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        ability TEXT NOT NULL DEFAULT '',
        total_effort INTEGER NOT NULL DEFAULT 0
    )
"#;

const CREATE_LEARNED_MOVES: &str = r#"
    CREATE TABLE IF NOT EXISTS learned_moves (
        pokemon_id INTEGER NOT NULL,
        position INTEGER NOT NULL,
        move TEXT NOT NULL,
        PRIMARY KEY (pokemon_id, move)
    )
"#;

/// Tables dropped and recreated by a roster reset, children first.
const ROSTER_TABLES: [&str; 3] = ["learned_moves", "stats", "pokemon"];

/// `stats` has one `<stat>_base` and one `<stat>_effort` column per stat.
fn create_stats_sql() -> String {
    let columns: Vec<String> = Stat::ALL
        .iter()
        .map(|s| {
            format!(
                "{key}_base INTEGER NOT NULL, {key}_effort INTEGER NOT NULL DEFAULT 0",
                key = s.key()
            )
        })
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS stats (pokemon_id INTEGER PRIMARY KEY, {})",
        columns.join(", ")
    )
}

/// `hp_base, hp_effort, attack_base, ...` in stat order.
pub(super) fn stat_columns() -> Vec<String> {
    Stat::ALL
        .iter()
        .flat_map(|s| [format!("{}_base", s.key()), format!("{}_effort", s.key())])
        .collect()
}

async fn create_roster_tables(conn: &mut SqliteConnection) -> Result<(), RepoError> {
    for statement in [
        CREATE_POKEMON.to_string(),
        CREATE_LEARNED_MOVES.to_string(),
        create_stats_sql(),
    ] {
        sqlx::query(&statement)
            .execute(&mut *conn)
            .await
            .map_err(|e| RepoError::database("schema", e))?;
    }
    Ok(())
}

/// Create all tables that do not exist yet.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), RepoError> {
    sqlx::query(CREATE_USERS)
        .execute(pool)
        .await
        .map_err(|e| RepoError::database("schema", e))?;
    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| RepoError::database("schema", e))?;
    create_roster_tables(&mut conn).await?;
    tracing::info!("Database schema initialized");
    Ok(())
}

/// Drop and recreate the roster tables in one transaction, so readers see
/// either the old tables or the new empty ones. Dropping `pokemon` also drops
/// its AUTOINCREMENT sequence, so ids restart at 1. Accounts are untouched.
pub(super) async fn recreate_roster_tables(pool: &SqlitePool) -> Result<(), RepoError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| RepoError::database("roster.reset_all", e))?;

    for table in ROSTER_TABLES {
        sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database("roster.reset_all", e))?;
    }
    create_roster_tables(&mut tx).await?;

    tx.commit()
        .await
        .map_err(|e| RepoError::database("roster.reset_all", e))
}
