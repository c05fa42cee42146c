use std::sync::Arc;

use tracing::error;

use shutter_db::{Database, DbResult};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
}

impl AppStateInner {
    pub fn new(db: Database) -> AppState {
        Arc::new(Self { db })
    }
}

/// Run blocking DB work off the async runtime.
pub async fn db_call<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> DbResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .map_err(ApiError::from)
}
