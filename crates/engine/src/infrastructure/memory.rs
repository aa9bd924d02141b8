//! In-memory storage adapters.
//!
//! Used when `ROSTER_STORE=memory` and by use case tests. Nothing survives a
//! restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use pokeroster_domain::{
    MoveName, NewRosterEntry, RosterEntry, RosterId, StatBlock, StatSlot, UserId, Username,
    STAT_COUNT,
};
use tokio::sync::RwLock;

use super::ports::{AccountRepo, HealthRepo, RepoError, RosterRepo};

/// Roster entries kept in a map, ids handed out from a counter starting at 1.
#[derive(Default)]
pub struct InMemoryRosterRepo {
    entries: RwLock<BTreeMap<RosterId, RosterEntry>>,
    last_id: AtomicI64,
}

impl InMemoryRosterRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RosterRepo for InMemoryRosterRepo {
    async fn insert(&self, entry: &NewRosterEntry) -> Result<RosterId, RepoError> {
        let mut entries = self.entries.write().await;
        let id = RosterId::new(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
        entries.insert(id, entry.clone().with_id(id));
        Ok(id)
    }

    async fn get(&self, id: RosterId) -> Result<Option<RosterEntry>, RepoError> {
        Ok(self.entries.read().await.get(&id).cloned())
    }

    async fn replace_moves(&self, id: RosterId, moves: &[MoveName]) -> Result<(), RepoError> {
        let mut entries = self.entries.write().await;
        let current = entries
            .get(&id)
            .ok_or_else(|| RepoError::not_found("RosterEntry", id))?;

        let updated = RosterEntry::from_storage(
            id,
            current.species_id(),
            current.name().to_string(),
            current.ability().to_string(),
            moves.to_vec(),
            *current.stats(),
        );
        entries.insert(id, updated);
        Ok(())
    }

    async fn replace_effort_values(
        &self,
        id: RosterId,
        effort: [u16; STAT_COUNT],
        _total_effort: u16,
    ) -> Result<(), RepoError> {
        let mut entries = self.entries.write().await;
        let current = entries
            .get(&id)
            .ok_or_else(|| RepoError::not_found("RosterEntry", id))?;

        let mut slots = *current.stats().slots();
        for (slot, value) in slots.iter_mut().zip(effort) {
            *slot = StatSlot::new(slot.base, value);
        }
        // The total is recomputed from the slots on hydration.
        let updated = RosterEntry::from_storage(
            id,
            current.species_id(),
            current.name().to_string(),
            current.ability().to_string(),
            current.learned_moves().to_vec(),
            StatBlock::from_slots(slots),
        );
        entries.insert(id, updated);
        Ok(())
    }

    async fn reset_all(&self) -> Result<(), RepoError> {
        let mut entries = self.entries.write().await;
        entries.clear();
        self.last_id.store(0, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl HealthRepo for InMemoryRosterRepo {
    async fn check_connection(&self) -> Result<(), RepoError> {
        Ok(())
    }

    async fn check_table_exists(&self, table: &str) -> Result<(), RepoError> {
        match table {
            "users" | "pokemon" | "learned_moves" | "stats" => Ok(()),
            other => Err(RepoError::not_found("Table", other)),
        }
    }
}

/// Accounts keyed by username.
#[derive(Default)]
pub struct InMemoryAccountRepo {
    accounts: RwLock<HashMap<String, (UserId, String)>>,
    last_id: AtomicI64,
}

impl InMemoryAccountRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepo for InMemoryAccountRepo {
    async fn create(&self, username: &Username, password_hash: &str) -> Result<UserId, RepoError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(username.as_str()) {
            return Err(RepoError::constraint(format!(
                "username {username} already exists"
            )));
        }
        let id = UserId::new(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
        accounts.insert(
            username.as_str().to_string(),
            (id, password_hash.to_string()),
        );
        Ok(id)
    }

    async fn get_password_hash(&self, username: &Username) -> Result<Option<String>, RepoError> {
        Ok(self
            .accounts
            .read()
            .await
            .get(username.as_str())
            .map(|(_, hash)| hash.clone()))
    }

    async fn update_password_hash(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<(), RepoError> {
        let mut accounts = self.accounts.write().await;
        let (_, hash) = accounts
            .get_mut(username.as_str())
            .ok_or_else(|| RepoError::not_found("Account", username))?;
        *hash = password_hash.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokeroster_domain::{BaseStats, SpeciesId};

    fn bulbasaur() -> NewRosterEntry {
        NewRosterEntry {
            species_id: SpeciesId::new(1),
            name: "bulbasaur".to_string(),
            ability: String::new(),
            stats: StatBlock::from_base(BaseStats::new([45, 49, 49, 65, 65, 45])),
        }
    }

    #[tokio::test]
    async fn ids_start_at_one_and_restart_after_reset() {
        let repo = InMemoryRosterRepo::new();
        assert_eq!(repo.insert(&bulbasaur()).await.unwrap(), RosterId::new(1));
        assert_eq!(repo.insert(&bulbasaur()).await.unwrap(), RosterId::new(2));

        repo.reset_all().await.unwrap();

        assert!(repo.get(RosterId::new(2)).await.unwrap().is_none());
        assert_eq!(repo.insert(&bulbasaur()).await.unwrap(), RosterId::new(1));
    }

    #[tokio::test]
    async fn effort_update_keeps_base_values_and_moves() {
        let repo = InMemoryRosterRepo::new();
        let id = repo.insert(&bulbasaur()).await.unwrap();
        repo.replace_moves(id, &[MoveName::new("vine-whip").unwrap()])
            .await
            .unwrap();

        repo.replace_effort_values(id, [4, 0, 0, 252, 0, 252], 508)
            .await
            .unwrap();

        let entry = repo.get(id).await.unwrap().unwrap();
        assert_eq!(entry.stats().base_values(), [45, 49, 49, 65, 65, 45]);
        assert_eq!(entry.stats().effort_values(), [4, 0, 0, 252, 0, 252]);
        assert_eq!(entry.total_effort(), 508);
        assert_eq!(entry.learned_moves().len(), 1);
    }

    #[tokio::test]
    async fn writes_to_missing_entries_are_not_found() {
        let repo = InMemoryRosterRepo::new();
        assert!(repo
            .replace_moves(RosterId::new(3), &[])
            .await
            .unwrap_err()
            .is_not_found());
        assert!(repo
            .replace_effort_values(RosterId::new(3), [0; STAT_COUNT], 0)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn duplicate_account_is_rejected() {
        let repo = InMemoryAccountRepo::new();
        let red = Username::new("red").unwrap();
        repo.create(&red, "h1").await.unwrap();

        assert!(matches!(
            repo.create(&red, "h2").await,
            Err(RepoError::ConstraintViolation(_))
        ));
        assert_eq!(
            repo.get_password_hash(&red).await.unwrap(),
            Some("h1".to_string())
        );
    }
}
