//! SQLite-backed roster storage.
//!
//! An entry spans three tables: `pokemon` (identity and cached total),
//! `learned_moves` (one row per move, ordered by `position`) and `stats`
//! (base and effort columns per stat). Writes that touch several tables run
//! in one transaction.

use async_trait::async_trait;
use pokeroster_domain::{
    MoveName, NewRosterEntry, RosterEntry, RosterId, SpeciesId, Stat, StatBlock, StatSlot,
    STAT_COUNT,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::schema::{recreate_roster_tables, stat_columns};
use crate::infrastructure::ports::{RepoError, RosterRepo};

pub struct SqliteRosterRepo {
    pool: SqlitePool,
}

impl SqliteRosterRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn to_u16(value: i64, column: &str) -> Result<u16, RepoError> {
    u16::try_from(value)
        .map_err(|_| RepoError::serialization(format!("{column} out of range: {value}")))
}

fn read_i64(row: &SqliteRow, column: &str) -> Result<i64, RepoError> {
    row.try_get::<i64, _>(column)
        .map_err(|e| RepoError::serialization(format!("{column}: {e}")))
}

fn stats_from_row(row: &SqliteRow) -> Result<StatBlock, RepoError> {
    let mut slots = [StatSlot::default(); STAT_COUNT];
    for stat in Stat::ALL {
        let base_col = format!("{}_base", stat.key());
        let effort_col = format!("{}_effort", stat.key());
        slots[stat.index()] = StatSlot::new(
            to_u16(read_i64(row, &base_col)?, &base_col)?,
            to_u16(read_i64(row, &effort_col)?, &effort_col)?,
        );
    }
    Ok(StatBlock::from_slots(slots))
}

#[async_trait]
impl RosterRepo for SqliteRosterRepo {
    async fn insert(&self, entry: &NewRosterEntry) -> Result<RosterId, RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("roster.insert", e))?;

        let result = sqlx::query(
            r#"
            INSERT INTO pokemon (game_id, name, ability, total_effort)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(i64::from(entry.species_id.get()))
        .bind(entry.name.as_str())
        .bind(entry.ability.as_str())
        .bind(i64::from(entry.stats.total_effort()))
        .execute(&mut *tx)
        .await
        .map_err(|e| RepoError::database("roster.insert", e))?;
        let id = result.last_insert_rowid();

        let columns = stat_columns();
        let placeholders = vec!["?"; columns.len() + 1].join(", ");
        let sql = format!(
            "INSERT INTO stats (pokemon_id, {}) VALUES ({})",
            columns.join(", "),
            placeholders
        );
        let mut query = sqlx::query(&sql).bind(id);
        for slot in entry.stats.slots() {
            query = query.bind(i64::from(slot.base)).bind(i64::from(slot.effort));
        }
        query
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database("roster.insert", e))?;

        tx.commit()
            .await
            .map_err(|e| RepoError::database("roster.insert", e))?;

        Ok(RosterId::new(id))
    }

    async fn get(&self, id: RosterId) -> Result<Option<RosterEntry>, RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("roster.get", e))?;

        let Some(row) = sqlx::query("SELECT id, game_id, name, ability FROM pokemon WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RepoError::database("roster.get", e))?
        else {
            return Ok(None);
        };

        let game_id = u32::try_from(read_i64(&row, "game_id")?)
            .map_err(|_| RepoError::serialization("game_id out of range"))?;
        let name: String = row
            .try_get("name")
            .map_err(|e| RepoError::serialization(format!("name: {e}")))?;
        let ability: String = row
            .try_get("ability")
            .map_err(|e| RepoError::serialization(format!("ability: {e}")))?;

        let move_rows =
            sqlx::query("SELECT move FROM learned_moves WHERE pokemon_id = ? ORDER BY position")
                .bind(id.get())
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| RepoError::database("roster.get", e))?;
        let learned_moves = move_rows
            .iter()
            .map(|r| {
                let name: String = r
                    .try_get("move")
                    .map_err(|e| RepoError::serialization(format!("move: {e}")))?;
                MoveName::new(name).map_err(RepoError::serialization)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let stats_sql = format!(
            "SELECT {} FROM stats WHERE pokemon_id = ?",
            stat_columns().join(", ")
        );
        let stats_row = sqlx::query(&stats_sql)
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RepoError::database("roster.get", e))?
            .ok_or_else(|| RepoError::serialization(format!("stats missing for pokemon {id}")))?;
        let stats = stats_from_row(&stats_row)?;

        tx.commit()
            .await
            .map_err(|e| RepoError::database("roster.get", e))?;

        Ok(Some(RosterEntry::from_storage(
            id,
            SpeciesId::new(game_id),
            name,
            ability,
            learned_moves,
            stats,
        )))
    }

    async fn replace_moves(&self, id: RosterId, moves: &[MoveName]) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("roster.replace_moves", e))?;

        let exists = sqlx::query("SELECT 1 FROM pokemon WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RepoError::database("roster.replace_moves", e))?;
        if exists.is_none() {
            return Err(RepoError::not_found("RosterEntry", id));
        }

        sqlx::query("DELETE FROM learned_moves WHERE pokemon_id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database("roster.replace_moves", e))?;

        for (position, move_name) in moves.iter().enumerate() {
            sqlx::query("INSERT INTO learned_moves (pokemon_id, position, move) VALUES (?, ?, ?)")
                .bind(id.get())
                .bind(position as i64)
                .bind(move_name.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| RepoError::database("roster.replace_moves", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::database("roster.replace_moves", e))?;
        Ok(())
    }

    async fn replace_effort_values(
        &self,
        id: RosterId,
        effort: [u16; STAT_COUNT],
        total_effort: u16,
    ) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("roster.replace_effort_values", e))?;

        let updated = sqlx::query("UPDATE pokemon SET total_effort = ? WHERE id = ?")
            .bind(i64::from(total_effort))
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database("roster.replace_effort_values", e))?;
        if updated.rows_affected() == 0 {
            return Err(RepoError::not_found("RosterEntry", id));
        }

        let assignments: Vec<String> = Stat::ALL
            .iter()
            .map(|s| format!("{}_effort = ?", s.key()))
            .collect();
        let sql = format!(
            "UPDATE stats SET {} WHERE pokemon_id = ?",
            assignments.join(", ")
        );
        let mut query = sqlx::query(&sql);
        for value in effort {
            query = query.bind(i64::from(value));
        }
        query
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database("roster.replace_effort_values", e))?;

        tx.commit()
            .await
            .map_err(|e| RepoError::database("roster.replace_effort_values", e))?;
        Ok(())
    }

    async fn reset_all(&self) -> Result<(), RepoError> {
        recreate_roster_tables(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sqlite::SqliteRepositories;
    use pokeroster_domain::BaseStats;

    async fn repo(dir: &tempfile::TempDir) -> std::sync::Arc<SqliteRosterRepo> {
        let path = dir.path().join("roster.db");
        SqliteRepositories::connect(&path.to_string_lossy())
            .await
            .expect("connect")
            .roster
    }

    fn ditto() -> NewRosterEntry {
        NewRosterEntry {
            species_id: SpeciesId::new(132),
            name: "ditto".to_string(),
            ability: String::new(),
            stats: StatBlock::from_base(BaseStats::new([48, 48, 48, 48, 48, 48])),
        }
    }

    fn mv(name: &str) -> MoveName {
        MoveName::new(name).unwrap()
    }

    #[tokio::test]
    async fn insert_then_get_round_trips_a_fresh_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = repo(&dir).await;

        let id = repo.insert(&ditto()).await.expect("insert");
        assert_eq!(id, RosterId::new(1));

        let entry = repo.get(id).await.expect("get").expect("entry exists");
        assert_eq!(entry, ditto().with_id(id));
    }

    #[tokio::test]
    async fn get_missing_entry_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = repo(&dir).await;

        assert!(repo.get(RosterId::new(42)).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn replace_moves_keeps_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = repo(&dir).await;
        let id = repo.insert(&ditto()).await.expect("insert");

        repo.replace_moves(id, &[mv("transform"), mv("growl")])
            .await
            .expect("first replace");
        repo.replace_moves(id, &[mv("growl"), mv("tackle"), mv("transform")])
            .await
            .expect("second replace");

        let entry = repo.get(id).await.expect("get").expect("entry");
        let names: Vec<&str> = entry.learned_moves().iter().map(|m| m.as_str()).collect();
        assert_eq!(names, ["growl", "tackle", "transform"]);
    }

    #[tokio::test]
    async fn replace_moves_on_missing_entry_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = repo(&dir).await;

        let err = repo
            .replace_moves(RosterId::new(9), &[mv("growl")])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn replace_effort_values_updates_slots_and_total() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = repo(&dir).await;
        let id = repo.insert(&ditto()).await.expect("insert");

        repo.replace_effort_values(id, [100, 200, 50, 60, 70, 30], 510)
            .await
            .expect("update");

        let entry = repo.get(id).await.expect("get").expect("entry");
        assert_eq!(entry.stats().effort_values(), [100, 200, 50, 60, 70, 30]);
        assert_eq!(entry.stats().base_values(), [48; 6]);
        assert_eq!(entry.total_effort(), 510);
    }

    #[tokio::test]
    async fn reset_all_clears_entries_and_restarts_ids() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = repo(&dir).await;
        let first = repo.insert(&ditto()).await.expect("insert");
        repo.insert(&ditto()).await.expect("insert");
        repo.replace_moves(first, &[mv("transform")])
            .await
            .expect("moves");

        repo.reset_all().await.expect("reset");

        assert!(repo.get(first).await.expect("get").is_none());
        let id = repo.insert(&ditto()).await.expect("insert after reset");
        assert_eq!(id, RosterId::new(1));
        let entry = repo.get(id).await.expect("get").expect("entry");
        assert!(entry.learned_moves().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn reads_during_reset_never_see_missing_tables() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = repo(&dir).await;
        repo.insert(&ditto()).await.expect("insert");

        let resetter = {
            let repo = repo.clone();
            tokio::spawn(async move {
                for _ in 0..25 {
                    repo.insert(&ditto()).await?;
                    repo.reset_all().await?;
                }
                Ok::<_, RepoError>(())
            })
        };
        let reader = {
            let repo = repo.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    repo.get(RosterId::new(1)).await?;
                }
                Ok::<_, RepoError>(())
            })
        };

        resetter.await.unwrap().expect("resets");
        reader.await.unwrap().expect("reads");
    }

    #[tokio::test]
    async fn entries_survive_reopening_the_database() {
        let dir = tempfile::tempdir().expect("tempdir");
        let id = {
            let repo = repo(&dir).await;
            repo.insert(&ditto()).await.expect("insert")
        };

        let repo = repo(&dir).await;
        assert!(repo.get(id).await.expect("get").is_some());
        let next = repo.insert(&ditto()).await.expect("insert");
        assert_eq!(next, RosterId::new(2));
    }
}
