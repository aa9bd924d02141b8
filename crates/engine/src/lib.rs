//! Pokeroster Engine library.
//!
//! Server-side code for the pokemon roster service.
//!
//! ## Structure
//!
//! - `use_cases/` - Roster and account orchestration
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
