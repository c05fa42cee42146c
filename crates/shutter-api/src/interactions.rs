use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use shutter_types::api::{CommentCreated, CommentList, CommentRequest};
use shutter_types::validation::is_valid_comment;

use crate::convert;
use crate::error::ApiError;
use crate::middleware::Params;
use crate::relations::ensure_not_banned;
use crate::state::{AppState, db_call};

/// Photo owner, photo and caller for a request under `/profiles/{user_id}/photos/{photo_id}`.
fn photo_target(params: &Params) -> Result<(i64, i64, i64), ApiError> {
    Ok((params.id("user_id")?, params.id("photo_id")?, params.caller()?))
}

// -- Likes --

/// PUT /profiles/{user_id}/photos/{photo_id}/likes[/{liker_id}]
pub async fn like_photo(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
) -> Result<StatusCode, ApiError> {
    let (owner, photo, caller) = photo_target(&params)?;

    db_call(&state, move |db| db.like_photo(caller, photo, owner)).await?;
    info!("User {} liked photo {}", caller, photo);
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /profiles/{user_id}/photos/{photo_id}/likes[/{liker_id}]
pub async fn unlike_photo(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
) -> Result<StatusCode, ApiError> {
    let (owner, photo, caller) = photo_target(&params)?;

    db_call(&state, move |db| db.unlike_photo(caller, photo, owner)).await?;
    info!("User {} unliked photo {}", caller, photo);
    Ok(StatusCode::NO_CONTENT)
}

// -- Comments --

/// POST /profiles/{user_id}/photos/{photo_id}/comments
pub async fn comment_photo(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    if !is_valid_comment(&req.content) {
        return Err(ApiError::BadRequest("Invalid comment".into()));
    }

    let (owner, photo, caller) = photo_target(&params)?;

    let id = db_call(&state, move |db| db.comment_photo(caller, photo, owner, &req.content)).await?;
    info!("User {} commented photo {} (comment {})", caller, photo, id);
    Ok((StatusCode::CREATED, Json(CommentCreated { id })))
}

/// GET /profiles/{user_id}/photos/{photo_id}/comments
pub async fn get_photo_comments(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
) -> Result<impl IntoResponse, ApiError> {
    let (owner, photo, caller) = photo_target(&params)?;
    ensure_not_banned(&state, owner, caller, "read the comments of").await?;

    let rows = db_call(&state, move |db| db.get_photo_comments(photo, owner)).await?;
    Ok(Json(CommentList {
        comments: rows.into_iter().map(convert::comment).collect(),
    }))
}

/// DELETE /profiles/{user_id}/photos/{photo_id}/comments/{comment_id}
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
) -> Result<StatusCode, ApiError> {
    let (owner, photo, caller) = photo_target(&params)?;
    let comment = params.id("comment_id")?;

    db_call(&state, move |db| db.delete_comment(photo, owner, caller, comment)).await?;
    info!("User {} deleted comment {}", caller, comment);
    Ok(StatusCode::NO_CONTENT)
}
