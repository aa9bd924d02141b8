//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod config;
pub mod memory;
pub mod pokeapi;
pub mod ports;
pub mod sqlite;
