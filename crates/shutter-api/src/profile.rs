use axum::{
    Extension, Json,
    extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
    response::IntoResponse,
};
use tracing::info;

use shutter_types::api::{SetUsernameRequest, User};
use shutter_types::validation::is_valid_username;

use crate::convert;
use crate::error::ApiError;
use crate::middleware::Params;
use crate::pagination::PageQuery;
use crate::relations::ensure_not_banned;
use crate::state::{AppState, db_call};

/// GET /profiles/{user_id} — profile, one page of photos, counters.
pub async fn get_user_profile(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let page = query.page()?;
    let user_id = params.id("user_id")?;
    let caller = params.caller()?;

    ensure_not_banned(&state, user_id, caller, "view the profile of").await?;

    let profile =
        db_call(&state, move |db| db.get_user_profile(user_id, page.amount, page.offset)).await?;
    Ok(Json(convert::profile(profile)))
}

/// PUT /profiles/{user_id}/name
pub async fn set_my_username(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
    payload: Result<Json<SetUsernameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    if !is_valid_username(&req.username) {
        return Err(ApiError::BadRequest("Invalid username".into()));
    }

    let user_id = params.id("user_id")?;
    let username = req.username.clone();
    db_call(&state, move |db| db.change_username(user_id, &username)).await?;
    info!("User {} is now '{}'", user_id, req.username);

    Ok(Json(User {
        identifier: user_id,
        username: req.username,
    }))
}
