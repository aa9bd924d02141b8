//! PokeAPI species client (https://pokeapi.co)

use async_trait::async_trait;
use pokeroster_domain::{BaseStats, Species, SpeciesAbility, SpeciesId};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::infrastructure::ports::{SpeciesError, SpeciesProvider};

/// Default PokeAPI base URL.
pub const DEFAULT_POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Default request timeout in seconds.
pub const DEFAULT_POKEAPI_TIMEOUT_SECS: u64 = 10;

/// Client for the PokeAPI `pokemon` resource.
#[derive(Clone)]
pub struct PokeApiClient {
    client: Client,
    base_url: String,
}

impl PokeApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(
                    error = %e,
                    "Failed to build PokeAPI client, falling back to defaults without a timeout"
                );
                Client::new()
            });

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `{base}/pokemon/{key}` with the key percent-encoded as one path segment.
    fn pokemon_url(&self, key: &str) -> Result<Url, SpeciesError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SpeciesError::Unavailable(format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| SpeciesError::Unavailable("base url cannot take a path".to_string()))?
            .pop_if_empty()
            .push("pokemon")
            .push(&key.trim().to_lowercase());
        Ok(url)
    }
}

impl Default for PokeApiClient {
    fn default() -> Self {
        Self::new(
            DEFAULT_POKEAPI_BASE_URL,
            Duration::from_secs(DEFAULT_POKEAPI_TIMEOUT_SECS),
        )
    }
}

#[async_trait]
impl SpeciesProvider for PokeApiClient {
    async fn fetch_by_name(&self, name: &str) -> Result<Species, SpeciesError> {
        let url = self.pokemon_url(name)?;
        tracing::debug!(%url, "Fetching species");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SpeciesError::Unavailable(e.to_string()))?;

        let status = response.status();
        // PokeAPI answers 404 for unknown names; treat any 4xx as no match
        if status.is_client_error() {
            return Err(SpeciesError::NotFound(name.to_string()));
        }
        if !status.is_success() {
            return Err(SpeciesError::Unavailable(format!(
                "PokeAPI returned {status}"
            )));
        }

        let body: PokemonResponse = response
            .json()
            .await
            .map_err(|e| SpeciesError::InvalidResponse(e.to_string()))?;

        Ok(body.into())
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PokemonResponse {
    id: u32,
    name: String,
    #[serde(default)]
    stats: Vec<PokemonStatSlot>,
    #[serde(default)]
    moves: Vec<PokemonMoveSlot>,
    #[serde(default)]
    abilities: Vec<PokemonAbilitySlot>,
    #[serde(default)]
    forms: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
struct PokemonStatSlot {
    base_stat: u16,
    stat: NamedResource,
}

#[derive(Debug, Deserialize)]
struct PokemonMoveSlot {
    #[serde(rename = "move")]
    move_info: NamedResource,
}

#[derive(Debug, Deserialize)]
struct PokemonAbilitySlot {
    ability: NamedResource,
    #[serde(default)]
    is_hidden: bool,
    #[serde(default)]
    slot: u8,
}

impl From<PokemonResponse> for Species {
    fn from(r: PokemonResponse) -> Self {
        let base_stats = BaseStats::from_provider_pairs(
            r.stats
                .iter()
                .map(|s| (s.stat.name.as_str(), s.base_stat)),
        );

        Species {
            id: SpeciesId::new(r.id),
            name: r.name,
            base_stats,
            moves: r.moves.into_iter().map(|m| m.move_info.name).collect(),
            abilities: r
                .abilities
                .into_iter()
                .map(|a| SpeciesAbility {
                    name: a.ability.name,
                    is_hidden: a.is_hidden,
                    slot: a.slot,
                })
                .collect(),
            forms: r.forms.into_iter().map(|f| f.name).collect(),
        }
    }
}
