use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Query, State, rejection::{BytesRejection, QueryRejection}},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::info;

use shutter_types::api::{PhotoList, UploadResponse};

use crate::convert;
use crate::error::ApiError;
use crate::middleware::Params;
use crate::pagination::PageQuery;
use crate::relations::ensure_not_banned;
use crate::state::{AppState, db_call};

/// POST /profiles/{user_id}/photos — raw image bytes in the body.
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
    bytes: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = bytes?;
    let owner = params.id("user_id")?;
    let size = bytes.len();
    let id = db_call(&state, move |db| db.insert_photo(&bytes, owner)).await?;
    info!("User {} uploaded photo {} ({} bytes)", owner, id, size);

    Ok((StatusCode::CREATED, Json(UploadResponse { id, size })))
}

/// GET /profiles/{user_id}/photos?amount=&offset= — one page of the user's photos.
pub async fn list_photos(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let page = query.page()?;
    let owner = params.id("user_id")?;
    let caller = params.caller()?;

    ensure_not_banned(&state, owner, caller, "view the photos of").await?;

    let rows = db_call(&state, move |db| db.get_user_photos(owner, page.amount, page.offset)).await?;
    Ok(Json(PhotoList {
        photos: rows.into_iter().map(convert::photo).collect(),
    }))
}

/// GET /profiles/{user_id}/photos/{photo_id} — the image itself.
pub async fn get_image(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = params.id("user_id")?;
    let photo = params.id("photo_id")?;
    let caller = params.caller()?;

    ensure_not_banned(&state, owner, caller, "view the photos of").await?;

    let image = db_call(&state, move |db| db.get_image(photo, owner)).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], image))
}

/// DELETE /profiles/{user_id}/photos/{photo_id}
pub async fn delete_photo(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
) -> Result<StatusCode, ApiError> {
    let owner = params.id("user_id")?;
    let photo = params.id("photo_id")?;

    db_call(&state, move |db| db.delete_photo(photo, owner)).await?;
    info!("User {} deleted photo {}", owner, photo);
    Ok(StatusCode::NO_CONTENT)
}
