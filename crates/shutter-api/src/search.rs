use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::convert;
use crate::error::ApiError;
use crate::middleware::Params;
use crate::state::{AppState, db_call};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub pattern: String,
}

/// GET /search?pattern= — users whose name contains `pattern`, ignoring case.
/// Users who banned the caller are left out.
pub async fn do_search(
    State(state): State<AppState>,
    Extension(params): Extension<Params>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(SearchQuery { pattern }) = query?;
    if pattern.is_empty() {
        return Err(ApiError::BadRequest("Missing search pattern".into()));
    }

    let caller = params.caller()?;
    let rows = db_call(&state, move |db| db.do_search(&pattern, caller)).await?;
    Ok(Json(convert::users(rows)))
}
