//! HTTP routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use pokeroster_domain::{RosterEntry, RosterId, Species};

use crate::app::App;
use crate::use_cases::{AccountError, RosterError};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/db-check", get(db_check))
        .route("/api/accounts", post(create_account))
        .route("/api/accounts/password", put(update_password))
        .route("/api/login", post(login))
        .route("/api/species/{key}", get(get_species))
        .route("/api/roster", post(create_entry).delete(clear_roster))
        .route("/api/roster/{id}", get(get_entry))
        .route("/api/roster/{id}/moves", post(add_move).put(replace_move))
        .route("/api/roster/{id}/moves/{move_name}", delete(remove_move))
        .route("/api/roster/{id}/effort-values", put(distribute_effort_values))
}

// =============================================================================
// Health
// =============================================================================

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

async fn db_check(State(app): State<Arc<App>>) -> Result<Json<serde_json::Value>, ApiError> {
    let check = async {
        app.health.check_connection().await?;
        for table in ["users", "pokemon"] {
            app.health.check_table_exists(table).await?;
        }
        Ok::<_, crate::infrastructure::ports::RepoError>(())
    };

    match check.await {
        Ok(()) => Ok(Json(json!({ "database_status": "healthy" }))),
        Err(e) => {
            tracing::warn!(error = %e, "Database check failed");
            Err(ApiError::NotFound(e.to_string()))
        }
    }
}

// =============================================================================
// Accounts
// =============================================================================

#[derive(Debug, Deserialize)]
struct CredentialsRequest {
    username: String,
    password: String,
}

async fn create_account(
    State(app): State<Arc<App>>,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let id = app
        .use_cases
        .accounts
        .create_account(&body.username, &body.password)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn update_password(
    State(app): State<Arc<App>>,
    Json(body): Json<CredentialsRequest>,
) -> Result<StatusCode, ApiError> {
    app.use_cases
        .accounts
        .update_password(&body.username, &body.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn login(
    State(app): State<Arc<App>>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    app.use_cases
        .accounts
        .login(&body.username, &body.password)
        .await?;
    Ok(Json(json!({ "authenticated": true })))
}

// =============================================================================
// Species
// =============================================================================

async fn get_species(
    State(app): State<Arc<App>>,
    Path(key): Path<String>,
) -> Result<Json<Species>, ApiError> {
    Ok(Json(app.use_cases.roster.species(&key).await?))
}

// =============================================================================
// Roster
// =============================================================================

#[derive(Debug, Deserialize)]
struct CreateEntryRequest {
    species: String,
}

#[derive(Debug, Deserialize)]
struct AddMoveRequest {
    #[serde(rename = "move")]
    move_name: String,
}

#[derive(Debug, Deserialize)]
struct ReplaceMoveRequest {
    old_move: String,
    new_move: String,
}

#[derive(Debug, Deserialize)]
struct EffortValuesRequest {
    values: Vec<i64>,
}

async fn create_entry(
    State(app): State<Arc<App>>,
    Json(body): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let id = app.use_cases.roster.create_from_species(&body.species).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn clear_roster(State(app): State<Arc<App>>) -> Result<StatusCode, ApiError> {
    app.use_cases.roster.clear_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_entry(
    State(app): State<Arc<App>>,
    Path(id): Path<i64>,
) -> Result<Json<RosterEntry>, ApiError> {
    Ok(Json(app.use_cases.roster.get(RosterId::new(id)).await?))
}

async fn add_move(
    State(app): State<Arc<App>>,
    Path(id): Path<i64>,
    Json(body): Json<AddMoveRequest>,
) -> Result<StatusCode, ApiError> {
    app.use_cases
        .roster
        .add_move(RosterId::new(id), &body.move_name)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn replace_move(
    State(app): State<Arc<App>>,
    Path(id): Path<i64>,
    Json(body): Json<ReplaceMoveRequest>,
) -> Result<StatusCode, ApiError> {
    app.use_cases
        .roster
        .replace_move(RosterId::new(id), &body.old_move, &body.new_move)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_move(
    State(app): State<Arc<App>>,
    Path((id, move_name)): Path<(i64, String)>,
) -> Result<StatusCode, ApiError> {
    app.use_cases
        .roster
        .remove_move(RosterId::new(id), &move_name)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn distribute_effort_values(
    State(app): State<Arc<App>>,
    Path(id): Path<i64>,
    Json(body): Json<EffortValuesRequest>,
) -> Result<StatusCode, ApiError> {
    app.use_cases
        .roster
        .distribute_effort_values(RosterId::new(id), &body.values)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Conflict(String),
    BadGateway(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<RosterError> for ApiError {
    fn from(e: RosterError) -> Self {
        let message = e.to_string();
        match e {
            RosterError::SpeciesNotFound(_) | RosterError::NotFound(_) => {
                ApiError::NotFound(message)
            }
            RosterError::IllegalMove { .. }
            | RosterError::MoveNotKnown(_)
            | RosterError::Validation(_) => ApiError::BadRequest(message),
            RosterError::MoveAlreadyKnown(_) | RosterError::MoveListFull { .. } => {
                ApiError::Conflict(message)
            }
            RosterError::SpeciesUnavailable(_) => ApiError::BadGateway(message),
            RosterError::StoreFailure(_) => ApiError::Internal(message),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        let message = e.to_string();
        match e {
            AccountError::Validation(_) => ApiError::BadRequest(message),
            AccountError::UsernameTaken(_) => ApiError::Conflict(message),
            AccountError::UserNotFound(_) => ApiError::NotFound(message),
            AccountError::InvalidCredentials => ApiError::Unauthorized(message),
            AccountError::Hashing(_) | AccountError::StoreFailure(_) => ApiError::Internal(message),
        }
    }
}
