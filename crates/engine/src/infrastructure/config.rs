//! Process configuration read from the environment.

use std::time::Duration;

use crate::infrastructure::pokeapi::{DEFAULT_POKEAPI_BASE_URL, DEFAULT_POKEAPI_TIMEOUT_SECS};

const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
const DEFAULT_SERVER_PORT: u16 = 5000;
const DEFAULT_DATABASE_PATH: &str = "pokeroster.db";

/// Which roster/account store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl StoreBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Some(Self::Sqlite),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub database_path: String,
    pub store: StoreBackend,
    pub pokeapi_base_url: String,
    pub pokeapi_timeout: Duration,
    /// Raw `CORS_ALLOWED_ORIGINS` value; `None` disables the CORS layer.
    pub cors_allowed_origins: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            store: StoreBackend::Sqlite,
            pokeapi_base_url: DEFAULT_POKEAPI_BASE_URL.to_string(),
            pokeapi_timeout: Duration::from_secs(DEFAULT_POKEAPI_TIMEOUT_SECS),
            cors_allowed_origins: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset; values that
    /// fail to parse fall back to the default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let server_port = get("SERVER_PORT")
            .or_else(|| get("PORT"))
            .and_then(|raw| match raw.parse::<u16>() {
                Ok(port) => Some(port),
                Err(_) => {
                    tracing::warn!(value = %raw, "Invalid SERVER_PORT, using default");
                    None
                }
            })
            .unwrap_or(defaults.server_port);

        let store = get("ROSTER_STORE")
            .and_then(|raw| {
                let parsed = StoreBackend::parse(&raw);
                if parsed.is_none() {
                    tracing::warn!(value = %raw, "Unknown ROSTER_STORE, using sqlite");
                }
                parsed
            })
            .unwrap_or(defaults.store);

        let pokeapi_timeout = get("POKEAPI_TIMEOUT_SECS")
            .and_then(|raw| match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    tracing::warn!(value = %raw, "Invalid POKEAPI_TIMEOUT_SECS, using default");
                    None
                }
            })
            .unwrap_or(defaults.pokeapi_timeout);

        Self {
            server_host: get("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port,
            database_path: get("DATABASE_PATH").unwrap_or(defaults.database_path),
            store,
            pokeapi_base_url: get("POKEAPI_BASE_URL").unwrap_or(defaults.pokeapi_base_url),
            pokeapi_timeout,
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS"),
        }
    }
}
