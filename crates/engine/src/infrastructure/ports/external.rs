//! External service port traits (species data provider).

use async_trait::async_trait;
use pokeroster_domain::Species;

use super::error::SpeciesError;

/// Source of immutable species facts.
///
/// Lookups are not cached: the roster asks again on every move change, so
/// implementations are expected to answer the same way for the same species.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeciesProvider: Send + Sync {
    /// Look up a species by name or numeric id.
    ///
    /// Returns `SpeciesError::NotFound` when the provider has no match.
    async fn fetch_by_name(&self, name: &str) -> Result<Species, SpeciesError>;
}
