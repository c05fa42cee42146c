use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use shutter_types::api::{LoginRequest, LoginResponse};
use shutter_types::validation::is_valid_username;

use crate::error::ApiError;
use crate::state::{AppState, db_call};

/// POST /session — log in by username, creating the user on first sight.
/// The returned identifier doubles as the bearer token.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    if !is_valid_username(&req.username) {
        return Err(ApiError::BadRequest("Invalid username".into()));
    }

    let username = req.username;
    let (identifier, created) = db_call(&state, move |db| db.login(&username)).await?;

    if created {
        info!("Registered user {}", identifier);
        Ok((StatusCode::CREATED, Json(LoginResponse { identifier })))
    } else {
        Ok((StatusCode::OK, Json(LoginResponse { identifier })))
    }
}

/// GET /liveness
pub async fn liveness(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    db_call(&state, |db| db.ping()).await?;
    Ok(StatusCode::OK)
}
