//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::ports::{AccountRepo, HealthRepo, RosterRepo, SpeciesProvider};
use crate::use_cases::{AccountService, RosterService};

/// Main application state.
///
/// Holds the use cases and the health port. Passed to HTTP handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
    pub health: Arc<dyn HealthRepo>,
}

/// Container for all use cases.
pub struct UseCases {
    pub roster: Arc<RosterService>,
    pub accounts: Arc<AccountService>,
}

impl App {
    /// Wire use cases onto concrete port implementations.
    pub fn new(
        roster_repo: Arc<dyn RosterRepo>,
        account_repo: Arc<dyn AccountRepo>,
        health: Arc<dyn HealthRepo>,
        species: Arc<dyn SpeciesProvider>,
    ) -> Self {
        let use_cases = UseCases {
            roster: Arc::new(RosterService::new(roster_repo, species)),
            accounts: Arc::new(AccountService::new(account_repo)),
        };

        Self { use_cases, health }
    }
}
