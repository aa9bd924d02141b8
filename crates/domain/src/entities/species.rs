//! Species entity - immutable reference facts about a pokemon species
//!
//! Species data is owned by the external species data provider. The roster
//! copies the parts it needs (id, name, base stats) when an entry is created
//! and consults the legal move pool on every move change.

use serde::{Deserialize, Serialize};

use crate::{BaseStats, SpeciesId};

/// An ability a species may have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesAbility {
    pub name: String,
    pub is_hidden: bool,
    pub slot: u8,
}

/// Species facts as reported by the provider.
///
/// This is a data-carrying struct with no invariants to protect. All fields are public.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub id: SpeciesId,
    pub name: String,
    pub base_stats: BaseStats,
    /// Every move this species can legally learn
    pub moves: Vec<String>,
    pub abilities: Vec<SpeciesAbility>,
    pub forms: Vec<String>,
}

impl Species {
    /// Whether `move_name` is in this species' legal move pool.
    pub fn can_learn(&self, move_name: &str) -> bool {
        self.moves.iter().any(|m| m == move_name)
    }
}
