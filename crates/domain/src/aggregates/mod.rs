//! Aggregate roots - domain objects that own their related data
//!
//! Each aggregate:
//! - Has a unique identity
//! - Owns all its constituent parts (enforced by Rust ownership)
//! - Exposes behavior through methods, not public fields

pub mod roster_entry;

pub use roster_entry::{NewRosterEntry, RosterEntry, MAX_LEARNED_MOVES};
