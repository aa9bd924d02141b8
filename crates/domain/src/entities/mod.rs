//! Domain entities - Core business objects with identity

mod species;

pub use species::{Species, SpeciesAbility};
