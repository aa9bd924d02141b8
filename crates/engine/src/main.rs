//! Pokeroster Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pokeroster_engine::api;
use pokeroster_engine::infrastructure::{
    config::{AppConfig, StoreBackend},
    memory::{InMemoryAccountRepo, InMemoryRosterRepo},
    pokeapi::PokeApiClient,
    sqlite::SqliteRepositories,
};
use pokeroster_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root.
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pokeroster_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Pokeroster Engine");

    let config = AppConfig::from_env();

    let species = Arc::new(PokeApiClient::new(
        &config.pokeapi_base_url,
        config.pokeapi_timeout,
    ));
    tracing::info!(
        base_url = %config.pokeapi_base_url,
        timeout_secs = config.pokeapi_timeout.as_secs(),
        "Species provider configured"
    );

    let app = match config.store {
        StoreBackend::Sqlite => {
            tracing::info!(path = %config.database_path, "Opening SQLite database");
            let repos = SqliteRepositories::connect(&config.database_path).await?;
            App::new(repos.roster, repos.account, repos.health, species)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; roster and accounts are lost on restart");
            let roster = Arc::new(InMemoryRosterRepo::new());
            App::new(
                roster.clone(),
                Arc::new(InMemoryAccountRepo::new()),
                roster,
                species,
            )
        }
    };

    let mut router = api::http::routes()
        .with_state(Arc::new(app))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer(config.cors_allowed_origins.as_deref()) {
        router = router.layer(cors);
    }

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

/// `*` allows any origin; otherwise a comma-separated origin list.
fn build_cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins?;

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!(value = %allowed_origins, "No valid CORS origins, CORS disabled");
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
