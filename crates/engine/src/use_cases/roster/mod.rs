//! Roster use cases.
//!
//! `RosterService` owns the rules for creating a tracked pokemon from species
//! data and for mutating its moves and effort values. Move legality is checked
//! live against the species provider on every add; nothing is cached.
//!
//! Mutations of one roster id are serialized through a per-id lock so two
//! concurrent requests cannot interleave their read-modify-write cycles. The
//! lock table only holds ids with a mutation in flight. Clearing the roster
//! waits for every in-flight mutation and blocks new ones until it is done.

mod error;

use std::sync::Arc;

use dashmap::DashMap;
use pokeroster_domain::{MoveName, NewRosterEntry, RosterEntry, RosterId, Species, SpeciesName};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

pub use error::RosterError;

use crate::infrastructure::ports::{RepoError, RosterRepo, SpeciesProvider};

pub struct RosterService {
    repo: Arc<dyn RosterRepo>,
    species: Arc<dyn SpeciesProvider>,
    /// Shared by writes, exclusive for `clear_all`.
    reset: RwLock<()>,
    locks: DashMap<RosterId, Arc<Mutex<()>>>,
}

impl RosterService {
    pub fn new(repo: Arc<dyn RosterRepo>, species: Arc<dyn SpeciesProvider>) -> Self {
        Self {
            repo,
            species,
            reset: RwLock::new(()),
            locks: DashMap::new(),
        }
    }

    /// Fetch species data and store a fresh entry for it.
    ///
    /// Returns the id assigned by the store.
    pub async fn create_from_species(&self, species_name: &str) -> Result<RosterId, RosterError> {
        let species_name = SpeciesName::new(species_name)?;
        let species = self.fetch_species(species_name.as_str()).await?;

        let entry = NewRosterEntry::from_species(&species);
        let _reset = self.reset.read().await;
        let id = self
            .repo
            .insert(&entry)
            .await
            .map_err(|e| store_failure("insert", None, e))?;

        tracing::info!(roster_id = %id, species = %species.name, "Created roster entry");
        Ok(id)
    }

    pub async fn get(&self, id: RosterId) -> Result<RosterEntry, RosterError> {
        self.load(id).await
    }

    /// Append a move the species can legally learn.
    ///
    /// Checks run in order: entry exists, move is legal for the species, move
    /// not already known, fewer than four moves known.
    pub async fn add_move(&self, id: RosterId, move_name: &str) -> Result<(), RosterError> {
        let move_name = MoveName::new(move_name)?;
        let _reset = self.reset.read().await;
        let _entry = self.lock_entry(id).await;

        self.add_move_locked(id, move_name).await
    }

    pub async fn remove_move(&self, id: RosterId, move_name: &str) -> Result<(), RosterError> {
        let move_name = MoveName::new(move_name)?;
        let _reset = self.reset.read().await;
        let _entry = self.lock_entry(id).await;

        self.remove_move_locked(id, &move_name).await
    }

    /// Remove `old_move`, then add `new_move`.
    ///
    /// The two steps are stored separately: if the add fails, the old move
    /// stays removed.
    pub async fn replace_move(
        &self,
        id: RosterId,
        old_move: &str,
        new_move: &str,
    ) -> Result<(), RosterError> {
        let old_move = MoveName::new(old_move)?;
        let new_move = MoveName::new(new_move)?;
        let _reset = self.reset.read().await;
        let _entry = self.lock_entry(id).await;

        self.remove_move_locked(id, &old_move).await?;
        self.add_move_locked(id, new_move).await
    }

    /// Reallocate all six effort values with the greedy capped allocator.
    pub async fn distribute_effort_values(
        &self,
        id: RosterId,
        values: &[i64],
    ) -> Result<(), RosterError> {
        let _reset = self.reset.read().await;
        let _entry = self.lock_entry(id).await;

        let mut entry = self.load(id).await?;
        let total = entry.distribute_effort(values);

        self.repo
            .replace_effort_values(id, entry.stats().effort_values(), total)
            .await
            .map_err(|e| store_failure("replace_effort_values", Some(id), e))?;

        tracing::info!(roster_id = %id, total_effort = total, "Distributed effort values");
        Ok(())
    }

    /// Drop every roster entry and restart id assignment.
    pub async fn clear_all(&self) -> Result<(), RosterError> {
        let _reset = self.reset.write().await;
        self.repo
            .reset_all()
            .await
            .map_err(|e| store_failure("reset_all", None, e))?;

        tracing::warn!("Cleared all roster entries");
        Ok(())
    }

    /// Species lookup passthrough.
    pub async fn species(&self, key: &str) -> Result<Species, RosterError> {
        let key = SpeciesName::new(key)?;
        self.fetch_species(key.as_str()).await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn lock_entry(&self, id: RosterId) -> EntryGuard<'_> {
        let lock = self.locks.entry(id).or_default().clone();
        let guard = lock.lock_owned().await;
        EntryGuard {
            locks: &self.locks,
            id,
            guard: Some(guard),
        }
    }

    async fn load(&self, id: RosterId) -> Result<RosterEntry, RosterError> {
        self.repo
            .get(id)
            .await
            .map_err(|e| store_failure("get", Some(id), e))?
            .ok_or(RosterError::NotFound(id))
    }

    async fn fetch_species(&self, key: &str) -> Result<Species, RosterError> {
        self.species.fetch_by_name(key).await.map_err(|e| {
            tracing::warn!(species = %key, error = %e, "Species lookup failed");
            RosterError::from(e)
        })
    }

    async fn add_move_locked(&self, id: RosterId, move_name: MoveName) -> Result<(), RosterError> {
        let mut entry = self.load(id).await?;

        let species = self.fetch_species(entry.name()).await?;
        if !species.can_learn(move_name.as_str()) {
            return Err(RosterError::IllegalMove {
                species: entry.name().to_string(),
                move_name: move_name.into(),
            });
        }

        entry.learn_move(move_name.clone())?;
        self.repo
            .replace_moves(id, entry.learned_moves())
            .await
            .map_err(|e| store_failure("replace_moves", Some(id), e))?;

        tracing::info!(roster_id = %id, move_name = %move_name, "Learned move");
        Ok(())
    }

    async fn remove_move_locked(
        &self,
        id: RosterId,
        move_name: &MoveName,
    ) -> Result<(), RosterError> {
        let mut entry = self.load(id).await?;
        entry.forget_move(move_name)?;

        self.repo
            .replace_moves(id, entry.learned_moves())
            .await
            .map_err(|e| store_failure("replace_moves", Some(id), e))?;

        tracing::info!(roster_id = %id, move_name = %move_name, "Forgot move");
        Ok(())
    }
}

/// Exclusive hold on one roster id.
///
/// On drop the mutex is released first, then the table entry is removed if
/// no other caller holds or waits on it. Clones of the lock are only taken
/// under the map's shard lock, so the count check cannot miss a new waiter.
struct EntryGuard<'a> {
    locks: &'a DashMap<RosterId, Arc<Mutex<()>>>,
    id: RosterId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for EntryGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .remove_if(&self.id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Log a store error and lift it into the use case error. A write that finds
/// its row gone (cleared concurrently) reports the entry as missing.
fn store_failure(operation: &'static str, id: Option<RosterId>, e: RepoError) -> RosterError {
    match id {
        Some(id) if e.is_not_found() => RosterError::NotFound(id),
        _ => {
            tracing::error!(
                operation,
                roster_id = ?id.map(|i| i.get()),
                error = %e,
                "Roster store operation failed"
            );
            RosterError::StoreFailure(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryRosterRepo;
    use crate::infrastructure::ports::{MockRosterRepo, MockSpeciesProvider, SpeciesError};
    use mockall::predicate::*;
    use pokeroster_domain::{BaseStats, SpeciesAbility, SpeciesId};

    fn pikachu() -> Species {
        Species {
            id: SpeciesId::new(25),
            name: "pikachu".to_string(),
            base_stats: BaseStats::new([35, 55, 40, 50, 50, 90]),
            moves: ["thunderbolt", "quick-attack", "tail-whip", "growl", "thunder-wave", "surf"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            abilities: vec![SpeciesAbility {
                name: "static".to_string(),
                is_hidden: false,
                slot: 1,
            }],
            forms: vec!["pikachu".to_string()],
        }
    }

    fn provider() -> MockSpeciesProvider {
        let mut species = MockSpeciesProvider::new();
        species
            .expect_fetch_by_name()
            .with(eq("pikachu"))
            .returning(|_| Ok(pikachu()));
        species
            .expect_fetch_by_name()
            .returning(|name| Err(SpeciesError::NotFound(name.to_string())));
        species
    }

    fn service() -> RosterService {
        RosterService::new(Arc::new(InMemoryRosterRepo::new()), Arc::new(provider()))
    }

    async fn created(service: &RosterService) -> RosterId {
        service.create_from_species("pikachu").await.expect("create")
    }

    fn move_names(entry: &RosterEntry) -> Vec<&str> {
        entry.learned_moves().iter().map(|m| m.as_str()).collect()
    }

    #[tokio::test]
    async fn create_builds_a_blank_entry_from_species_data() {
        let service = service();
        let id = created(&service).await;
        assert_eq!(id, RosterId::new(1));

        let entry = service.get(id).await.expect("get");
        assert_eq!(entry.name(), "pikachu");
        assert_eq!(entry.species_id(), SpeciesId::new(25));
        assert_eq!(entry.ability(), "");
        assert!(entry.learned_moves().is_empty());
        assert_eq!(entry.total_effort(), 0);
        assert_eq!(entry.stats().effort_values(), [0; 6]);
        assert_eq!(entry.stats().base_values(), [35, 55, 40, 50, 50, 90]);
    }

    #[tokio::test]
    async fn create_unknown_species_fails() {
        let service = service();
        let err = service.create_from_species("missingno").await.unwrap_err();
        assert!(matches!(err, RosterError::SpeciesNotFound(name) if name == "missingno"));
    }

    #[tokio::test]
    async fn create_rejects_blank_species_name() {
        let service = service();
        let err = service.create_from_species("  ").await.unwrap_err();
        assert!(matches!(err, RosterError::Validation(_)));
    }

    #[tokio::test]
    async fn get_missing_entry_is_not_found() {
        let service = service();
        let err = service.get(RosterId::new(99)).await.unwrap_err();
        assert!(matches!(err, RosterError::NotFound(id) if id == RosterId::new(99)));
    }

    #[tokio::test]
    async fn get_is_idempotent() {
        let service = service();
        let id = created(&service).await;
        service.add_move(id, "growl").await.unwrap();

        let first = service.get(id).await.unwrap();
        let second = service.get(id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn added_moves_keep_their_order() {
        let service = service();
        let id = created(&service).await;
        for name in ["tail-whip", "thunderbolt", "growl", "quick-attack"] {
            service.add_move(id, name).await.expect("add");
        }

        let entry = service.get(id).await.unwrap();
        assert_eq!(
            move_names(&entry),
            ["tail-whip", "thunderbolt", "growl", "quick-attack"]
        );
    }

    #[tokio::test]
    async fn fifth_move_fails_and_leaves_moves_unchanged() {
        let service = service();
        let id = created(&service).await;
        for name in ["tail-whip", "thunderbolt", "growl", "quick-attack"] {
            service.add_move(id, name).await.unwrap();
        }

        let err = service.add_move(id, "surf").await.unwrap_err();
        assert!(matches!(err, RosterError::MoveListFull { max: 4 }));
        assert_eq!(err.to_string(), "This pokemon already knows 4 moves");

        let entry = service.get(id).await.unwrap();
        assert_eq!(
            move_names(&entry),
            ["tail-whip", "thunderbolt", "growl", "quick-attack"]
        );
    }

    #[tokio::test]
    async fn known_move_fails_and_leaves_moves_unchanged() {
        let service = service();
        let id = created(&service).await;
        service.add_move(id, "growl").await.unwrap();

        let err = service.add_move(id, "growl").await.unwrap_err();
        assert!(matches!(err, RosterError::MoveAlreadyKnown(name) if name == "growl"));
        assert_eq!(move_names(&service.get(id).await.unwrap()), ["growl"]);
    }

    #[tokio::test]
    async fn illegal_move_fails() {
        let service = service();
        let id = created(&service).await;

        let err = service.add_move(id, "hydro-pump").await.unwrap_err();
        assert_eq!(err.to_string(), "pikachu cannot learn hydro-pump");
        assert!(service.get(id).await.unwrap().learned_moves().is_empty());
    }

    #[tokio::test]
    async fn legality_is_checked_before_capacity() {
        let service = service();
        let id = created(&service).await;
        for name in ["tail-whip", "thunderbolt", "growl", "quick-attack"] {
            service.add_move(id, name).await.unwrap();
        }

        let err = service.add_move(id, "hydro-pump").await.unwrap_err();
        assert!(matches!(err, RosterError::IllegalMove { .. }));
    }

    #[tokio::test]
    async fn add_move_to_missing_entry_skips_the_provider() {
        let mut species = MockSpeciesProvider::new();
        species.expect_fetch_by_name().never();
        let service = RosterService::new(Arc::new(InMemoryRosterRepo::new()), Arc::new(species));

        let err = service.add_move(RosterId::new(5), "growl").await.unwrap_err();
        assert!(matches!(err, RosterError::NotFound(_)));
    }

    #[tokio::test]
    async fn remove_move_keeps_the_rest_in_order() {
        let service = service();
        let id = created(&service).await;
        for name in ["tail-whip", "thunderbolt", "growl"] {
            service.add_move(id, name).await.unwrap();
        }

        service.remove_move(id, "thunderbolt").await.expect("remove");
        assert_eq!(
            move_names(&service.get(id).await.unwrap()),
            ["tail-whip", "growl"]
        );
    }

    #[tokio::test]
    async fn remove_unknown_move_fails_without_change() {
        let service = service();
        let id = created(&service).await;
        service.add_move(id, "growl").await.unwrap();

        let err = service.remove_move(id, "surf").await.unwrap_err();
        assert!(matches!(err, RosterError::MoveNotKnown(name) if name == "surf"));
        assert_eq!(move_names(&service.get(id).await.unwrap()), ["growl"]);
    }

    #[tokio::test]
    async fn replace_move_swaps_old_for_new_at_the_end() {
        let service = service();
        let id = created(&service).await;
        for name in ["tail-whip", "growl"] {
            service.add_move(id, name).await.unwrap();
        }

        service
            .replace_move(id, "tail-whip", "thunderbolt")
            .await
            .expect("replace");
        assert_eq!(
            move_names(&service.get(id).await.unwrap()),
            ["growl", "thunderbolt"]
        );
    }

    #[tokio::test]
    async fn failed_replace_leaves_old_move_removed() {
        let service = service();
        let id = created(&service).await;
        service.add_move(id, "growl").await.unwrap();

        let err = service
            .replace_move(id, "growl", "hydro-pump")
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::IllegalMove { .. }));
        assert!(service.get(id).await.unwrap().learned_moves().is_empty());
    }

    #[tokio::test]
    async fn replace_with_unknown_old_move_changes_nothing() {
        let service = service();
        let id = created(&service).await;
        service.add_move(id, "growl").await.unwrap();

        let err = service
            .replace_move(id, "surf", "thunderbolt")
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::MoveNotKnown(_)));
        assert_eq!(move_names(&service.get(id).await.unwrap()), ["growl"]);
    }

    #[tokio::test]
    async fn distribute_within_caps_is_stored_verbatim() {
        let service = service();
        let id = created(&service).await;

        service
            .distribute_effort_values(id, &[100, 200, 50, 60, 70, 30])
            .await
            .expect("distribute");

        let entry = service.get(id).await.unwrap();
        assert_eq!(entry.stats().effort_values(), [100, 200, 50, 60, 70, 30]);
        assert_eq!(entry.total_effort(), 510);
    }

    #[tokio::test]
    async fn distribute_caps_slots_then_stops_at_total() {
        let service = service();
        let id = created(&service).await;

        service
            .distribute_effort_values(id, &[300, 300, 300, 300, 300, 300])
            .await
            .unwrap();

        let entry = service.get(id).await.unwrap();
        assert_eq!(entry.stats().effort_values(), [255, 255, 0, 0, 0, 0]);
        assert_eq!(entry.total_effort(), 510);
    }

    #[tokio::test]
    async fn distribute_short_input_pads_with_zero() {
        let service = service();
        let id = created(&service).await;

        service.distribute_effort_values(id, &[4]).await.unwrap();

        let entry = service.get(id).await.unwrap();
        assert_eq!(entry.stats().effort_values(), [4, 0, 0, 0, 0, 0]);
        assert_eq!(entry.total_effort(), 4);
    }

    #[tokio::test]
    async fn distribute_on_missing_entry_is_not_found() {
        let service = service();
        let err = service
            .distribute_effort_values(RosterId::new(3), &[4])
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::NotFound(_)));
    }

    #[tokio::test]
    async fn clear_all_removes_entries_and_restarts_ids() {
        let service = service();
        let first = created(&service).await;
        created(&service).await;

        service.clear_all().await.expect("clear");

        assert!(matches!(
            service.get(first).await,
            Err(RosterError::NotFound(_))
        ));
        assert_eq!(created(&service).await, RosterId::new(1));
    }

    #[tokio::test]
    async fn store_failures_surface_as_store_failure() {
        let mut repo = MockRosterRepo::new();
        repo.expect_insert()
            .returning(|_| Err(RepoError::database("roster.insert", "disk full")));
        let service = RosterService::new(Arc::new(repo), Arc::new(provider()));

        let err = service.create_from_species("pikachu").await.unwrap_err();
        assert!(matches!(err, RosterError::StoreFailure(_)));
    }

    #[tokio::test]
    async fn provider_outage_is_reported_as_unavailable() {
        let mut species = MockSpeciesProvider::new();
        species
            .expect_fetch_by_name()
            .returning(|_| Err(SpeciesError::Unavailable("connection refused".to_string())));
        let service = RosterService::new(Arc::new(InMemoryRosterRepo::new()), Arc::new(species));

        let err = service.create_from_species("pikachu").await.unwrap_err();
        assert!(matches!(err, RosterError::SpeciesUnavailable(_)));
    }

    #[tokio::test]
    async fn concurrent_adds_to_one_entry_are_serialized() {
        let service = Arc::new(service());
        let id = created(&service).await;

        let names = ["tail-whip", "thunderbolt", "growl", "quick-attack", "surf", "thunder-wave"];
        let handles: Vec<_> = names
            .iter()
            .map(|name| {
                let service = service.clone();
                let name = name.to_string();
                tokio::spawn(async move { service.add_move(id, &name).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 4);
        assert_eq!(service.get(id).await.unwrap().learned_moves().len(), 4);
        assert!(service.locks.is_empty());
    }

    #[tokio::test]
    async fn mutations_on_missing_ids_leave_no_locks_behind() {
        let service = service();
        for raw in 1..=200 {
            let id = RosterId::new(raw);
            assert!(service.add_move(id, "growl").await.is_err());
            assert!(service.remove_move(id, "growl").await.is_err());
            assert!(service.replace_move(id, "growl", "surf").await.is_err());
            assert!(service.distribute_effort_values(id, &[4]).await.is_err());
        }

        assert!(service.locks.is_empty());
    }

    #[tokio::test]
    async fn lock_entry_is_kept_while_another_caller_waits() {
        let service = service();
        let id = RosterId::new(1);

        let first = service.lock_entry(id).await;
        let waiting = service.locks.get(&id).map(|lock| lock.value().clone());
        drop(first);
        assert_eq!(service.locks.len(), 1);

        drop(waiting);
        drop(service.lock_entry(id).await);
        assert!(service.locks.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn clear_all_waits_for_in_flight_mutations() {
        use std::sync::Mutex as StdMutex;
        use std::time::Duration;

        let events: Arc<StdMutex<Vec<&'static str>>> = Arc::default();
        let id = RosterId::new(1);

        let mut repo = MockRosterRepo::new();
        let log = events.clone();
        repo.expect_get().returning(move |id| {
            std::thread::sleep(Duration::from_millis(150));
            log.lock().unwrap().push("get");
            Ok(Some(NewRosterEntry::from_species(&pikachu()).with_id(id)))
        });
        let log = events.clone();
        repo.expect_replace_effort_values().returning(move |_, _, _| {
            log.lock().unwrap().push("replace_effort_values");
            Ok(())
        });
        let log = events.clone();
        repo.expect_reset_all().returning(move || {
            log.lock().unwrap().push("reset_all");
            Ok(())
        });
        let service = Arc::new(RosterService::new(Arc::new(repo), Arc::new(provider())));

        let writer = {
            let service = service.clone();
            tokio::spawn(async move { service.distribute_effort_values(id, &[4]).await })
        };
        tokio::time::sleep(Duration::from_millis(30)).await;
        service.clear_all().await.expect("clear");
        writer.await.unwrap().expect("distribute");

        assert_eq!(
            *events.lock().unwrap(),
            ["get", "replace_effort_values", "reset_all"]
        );
    }
}
