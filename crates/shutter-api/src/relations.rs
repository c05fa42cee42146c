use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use shutter_db::Relation;
use shutter_types::api::UserList;

use crate::convert;
use crate::error::ApiError;
use crate::middleware::Params;
use crate::state::{AppState, db_call};

/// Fails with 403 when `owner` has banned `caller`.
pub(crate) async fn ensure_not_banned(
    state: &AppState,
    owner: i64,
    caller: i64,
    action: &str,
) -> Result<(), ApiError> {
    let banned = db_call(state, move |db| db.is_user_targeted(caller, owner, Relation::Ban)).await?;
    if banned {
        return Err(ApiError::Forbidden(format!("Can't {} a user that banned you", action)));
    }
    Ok(())
}

// -- Targeting --

/// PUT /profiles/{user_id}/following/{targeted_user_id}
pub async fn follow_user(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
) -> Result<StatusCode, ApiError> {
    target_user(&state, &params, Relation::Follow).await
}

/// DELETE /profiles/{user_id}/following/{targeted_user_id}
pub async fn unfollow_user(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
) -> Result<StatusCode, ApiError> {
    untarget_user(&state, &params, Relation::Follow).await
}

/// PUT /profiles/{user_id}/ban/{targeted_user_id}
pub async fn ban_user(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
) -> Result<StatusCode, ApiError> {
    target_user(&state, &params, Relation::Ban).await
}

/// DELETE /profiles/{user_id}/ban/{targeted_user_id}
pub async fn unban_user(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
) -> Result<StatusCode, ApiError> {
    untarget_user(&state, &params, Relation::Ban).await
}

async fn target_user(state: &AppState, params: &Params, relation: Relation) -> Result<StatusCode, ApiError> {
    let actor = params.id("user_id")?;
    let target = params.id("targeted_user_id")?;

    db_call(state, move |db| db.target_user(actor, target, relation)).await?;
    info!("User {} added a {} on user {}", actor, relation.verb(), target);
    Ok(StatusCode::NO_CONTENT)
}

async fn untarget_user(state: &AppState, params: &Params, relation: Relation) -> Result<StatusCode, ApiError> {
    let actor = params.id("user_id")?;
    let target = params.id("targeted_user_id")?;

    db_call(state, move |db| db.untarget_user(actor, target, relation)).await?;
    info!("User {} removed a {} on user {}", actor, relation.verb(), target);
    Ok(StatusCode::NO_CONTENT)
}

// -- Lists --

/// GET /profiles/{user_id}/following
pub async fn get_followed_users(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
) -> Result<impl IntoResponse, ApiError> {
    users_list(&state, &params, Relation::Follow).await
}

/// GET /profiles/{user_id}/ban
pub async fn get_banned_users(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
) -> Result<impl IntoResponse, ApiError> {
    users_list(&state, &params, Relation::Ban).await
}

async fn users_list(
    state: &AppState,
    params: &Params,
    relation: Relation,
) -> Result<Json<UserList>, ApiError> {
    let user_id = params.id("user_id")?;
    let rows = db_call(state, move |db| db.get_users_list(user_id, relation)).await?;
    Ok(Json(convert::users(rows)))
}

/// GET /profiles/{user_id}/followers
pub async fn get_followers(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = params.id("user_id")?;
    let caller = params.caller()?;

    ensure_not_banned(&state, user_id, caller, "list the followers of").await?;

    let rows = db_call(&state, move |db| db.get_followers(user_id)).await?;
    Ok(Json(convert::users(rows)))
}
