//! RosterEntry aggregate - one tracked pokemon
//!
//! # Invariants
//!
//! - `learned_moves` holds at most [`MAX_LEARNED_MOVES`] entries, no duplicates,
//!   in the order they were learned
//! - `total_effort` always equals the sum of the six effort values and never
//!   exceeds [`MAX_TOTAL_EFFORT`](crate::MAX_TOTAL_EFFORT)
//! - `species_id`, `name` and the base stat values never change after creation
//!
//! Legality of a move (whether the species can learn it at all) is not known
//! to the aggregate; callers check it against [`Species`] before calling
//! [`RosterEntry::learn_move`].

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::NamedStatSlots;
use crate::{MoveName, RosterId, Species, SpeciesId, StatBlock};

/// Maximum number of moves a pokemon can know at once.
pub const MAX_LEARNED_MOVES: usize = 4;

/// A roster entry that has not been stored yet and so has no id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRosterEntry {
    pub species_id: SpeciesId,
    pub name: String,
    pub ability: String,
    pub stats: StatBlock,
}

impl NewRosterEntry {
    /// Build a fresh entry from species data: base stats copied, effort at 0,
    /// no moves, no ability.
    pub fn from_species(species: &Species) -> Self {
        Self {
            species_id: species.id,
            name: species.name.clone(),
            ability: String::new(),
            stats: StatBlock::from_base(species.base_stats),
        }
    }

    /// Attach the id assigned by the store.
    pub fn with_id(self, id: RosterId) -> RosterEntry {
        RosterEntry {
            id,
            species_id: self.species_id,
            name: self.name,
            ability: self.ability,
            learned_moves: Vec::new(),
            stats: self.stats,
            total_effort: 0,
        }
    }
}

/// One tracked pokemon instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RosterEntryRecord")]
pub struct RosterEntry {
    id: RosterId,
    species_id: SpeciesId,
    name: String,
    ability: String,
    learned_moves: Vec<MoveName>,
    stats: StatBlock,
    total_effort: u16,
}

impl RosterEntry {
    /// Reconstruct from storage (database hydration).
    ///
    /// `total_effort` is recomputed from the stat block rather than trusted.
    pub fn from_storage(
        id: RosterId,
        species_id: SpeciesId,
        name: String,
        ability: String,
        learned_moves: Vec<MoveName>,
        stats: StatBlock,
    ) -> Self {
        Self {
            id,
            species_id,
            name,
            ability,
            learned_moves,
            total_effort: stats.total_effort(),
            stats,
        }
    }

    // ──────────────────────────────────────────────────────────────────────────
    // Read accessors
    // ──────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> RosterId {
        self.id
    }

    pub fn species_id(&self) -> SpeciesId {
        self.species_id
    }

    /// Species display name, copied from species data at creation.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ability(&self) -> &str {
        &self.ability
    }

    pub fn learned_moves(&self) -> &[MoveName] {
        &self.learned_moves
    }

    pub fn stats(&self) -> &StatBlock {
        &self.stats
    }

    pub fn total_effort(&self) -> u16 {
        self.total_effort
    }

    pub fn knows_move(&self, move_name: &MoveName) -> bool {
        self.learned_moves.contains(move_name)
    }

    // ──────────────────────────────────────────────────────────────────────────
    // Mutations
    // ──────────────────────────────────────────────────────────────────────────

    /// Append a move to the learned list.
    ///
    /// # Errors
    ///
    /// - `MoveAlreadyKnown` if the move is already learned
    /// - `MoveListFull` if four moves are already learned
    pub fn learn_move(&mut self, move_name: MoveName) -> Result<(), DomainError> {
        if self.knows_move(&move_name) {
            return Err(DomainError::MoveAlreadyKnown(move_name.into()));
        }
        if self.learned_moves.len() >= MAX_LEARNED_MOVES {
            return Err(DomainError::move_list_full(
                self.learned_moves.len(),
                MAX_LEARNED_MOVES,
            ));
        }
        self.learned_moves.push(move_name);
        Ok(())
    }

    /// Remove a move from the learned list, keeping the order of the rest.
    ///
    /// # Errors
    ///
    /// - `MoveNotKnown` if the move is not learned
    pub fn forget_move(&mut self, move_name: &MoveName) -> Result<(), DomainError> {
        let position = self
            .learned_moves
            .iter()
            .position(|m| m == move_name)
            .ok_or_else(|| DomainError::MoveNotKnown(move_name.to_string()))?;
        self.learned_moves.remove(position);
        Ok(())
    }

    /// Redistribute effort values (see [`StatBlock::distribute_effort`]).
    ///
    /// Returns the new total effort.
    pub fn distribute_effort(&mut self, values: &[i64]) -> u16 {
        self.total_effort = self.stats.distribute_effort(values);
        self.total_effort
    }
}

/// Wire shape of [`RosterEntry`] before its invariants are checked.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RosterEntryRecord {
    id: RosterId,
    species_id: SpeciesId,
    name: String,
    ability: String,
    learned_moves: Vec<MoveName>,
    stats: NamedStatSlots,
    total_effort: u16,
}

impl TryFrom<RosterEntryRecord> for RosterEntry {
    type Error = DomainError;

    fn try_from(record: RosterEntryRecord) -> Result<Self, Self::Error> {
        let stats = StatBlock::try_from(record.stats)?;
        if stats.total_effort() != record.total_effort {
            return Err(DomainError::validation(format!(
                "totalEffort {} does not match the stat block ({})",
                record.total_effort,
                stats.total_effort()
            )));
        }

        let mut entry = RosterEntry::from_storage(
            record.id,
            record.species_id,
            record.name,
            record.ability,
            Vec::with_capacity(record.learned_moves.len()),
            stats,
        );
        for move_name in record.learned_moves {
            entry.learn_move(move_name)?;
        }
        Ok(entry)
    }
}
