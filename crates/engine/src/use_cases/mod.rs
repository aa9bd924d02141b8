//! Use cases - User story orchestration.
//!
//! - `roster` - tracked pokemon: creation, moves, effort values
//! - `account` - registration, password change, login

pub mod account;
pub mod roster;

pub use account::{AccountError, AccountService};
pub use roster::{RosterError, RosterService};
