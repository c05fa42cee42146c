use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
    response::IntoResponse,
};

use shutter_types::api::Stream;

use crate::convert;
use crate::error::ApiError;
use crate::middleware::Params;
use crate::pagination::PageQuery;
use crate::state::{AppState, db_call};

/// GET /stream/{user_id}?amount=&offset= — photos of followed users, newest first.
pub async fn get_my_stream(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let page = query.page()?;
    let user_id = params.id("user_id")?;

    let rows = db_call(&state, move |db| db.get_my_stream(user_id, page.offset, page.amount)).await?;
    Ok(Json(Stream {
        photos: rows.into_iter().map(convert::photo).collect(),
    }))
}
