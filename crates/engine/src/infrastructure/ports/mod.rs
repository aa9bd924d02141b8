//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Database access (SQLite or in-memory)
//! - Species data (PokeAPI, or a mock in tests)

mod error;
mod external;
mod repos;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{AccountRepo, HealthRepo, RosterRepo};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::SpeciesProvider;

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{MockAccountRepo, MockHealthRepo, MockRosterRepo};

#[cfg(test)]
pub use external::MockSpeciesProvider;

// =============================================================================
// Error Types
// =============================================================================
pub use error::{RepoError, SpeciesError};
