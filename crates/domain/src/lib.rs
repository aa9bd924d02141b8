//! Pokeroster domain.
//!
//! Pure types and invariants for tracked pokemon: stat blocks with effort
//! allocation, learned move lists, species facts and validated names.

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use aggregates::{NewRosterEntry, RosterEntry, MAX_LEARNED_MOVES};
pub use entities::{Species, SpeciesAbility};
pub use error::DomainError;
pub use ids::{RosterId, SpeciesId, UserId};
pub use value_objects::{
    BaseStats, MoveName, SpeciesName, Stat, StatBlock, StatSlot, Username,
    MAX_EFFORT_PER_STAT, MAX_TOTAL_EFFORT, STAT_COUNT,
};
