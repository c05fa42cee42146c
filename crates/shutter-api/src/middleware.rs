//! Per-route request guard.
//!
//! Each route declares which path parameters name which table and, optionally,
//! which parameter the caller's identity must match. The guard parses and
//! checks those ids, authenticates the bearer token, and hands the handler a
//! normalized [`Params`] map. Rejections never reach the handler.

use std::collections::HashMap;

use axum::{
    RequestExt,
    extract::{Path, Request, State},
    http::{HeaderMap, header},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};
use tracing::debug;

use shutter_db::Table;

use crate::error::ApiError;
use crate::state::{AppState, db_call};

/// Reserved key holding the authenticated user id.
pub const TOKEN_KEY: &str = "token";

/// A path parameter that must hold the id of an existing row in `table`.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub param: &'static str,
    pub table: Table,
}

pub const fn bind(param: &'static str, table: Table) -> Binding {
    Binding { param, table }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Guard {
    bindings: &'static [Binding],
    identity: Option<&'static str>,
}

impl Guard {
    /// Bearer token only.
    pub const fn authenticated() -> Self {
        Self {
            bindings: &[],
            identity: None,
        }
    }

    pub const fn new(bindings: &'static [Binding]) -> Self {
        Self {
            bindings,
            identity: None,
        }
    }

    /// Reject with 403 unless the caller is the user named by `param`.
    /// `param` must be one of the bindings.
    pub const fn identity(mut self, param: &'static str) -> Self {
        self.identity = Some(param);
        self
    }
}

/// Validated ids for the current request, keyed by path parameter name plus
/// [`TOKEN_KEY`] for the caller.
#[derive(Debug, Clone, Default)]
pub struct Params(HashMap<&'static str, i64>);

impl Params {
    pub fn get(&self, name: &str) -> Option<i64> {
        self.0.get(name).copied()
    }

    pub fn id(&self, name: &str) -> Result<i64, ApiError> {
        self.get(name)
            .ok_or_else(|| ApiError::Internal(format!("route guard did not bind `{}`", name)))
    }

    pub fn caller(&self) -> Result<i64, ApiError> {
        self.id(TOKEN_KEY)
    }

    fn insert(&mut self, name: &'static str, id: i64) {
        self.0.insert(name, id);
    }
}

#[derive(Clone)]
pub struct GuardState {
    app: AppState,
    guard: Guard,
}

/// Wrap `method` so it only runs after `guard` has accepted the request.
pub fn guarded(method: MethodRouter<AppState>, state: &AppState, guard: Guard) -> MethodRouter<AppState> {
    method.route_layer(middleware::from_fn_with_state(
        GuardState {
            app: state.clone(),
            guard,
        },
        validate,
    ))
}

async fn validate(
    State(GuardState { app, guard }): State<GuardState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let mut params = Params::default();

    if !guard.bindings.is_empty() {
        let Path(raw) = req
            .extract_parts::<Path<HashMap<String, String>>>()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        for binding in guard.bindings {
            let value = raw.get(binding.param).ok_or_else(|| {
                ApiError::Internal(format!("route has no `{}` parameter", binding.param))
            })?;
            let id: i64 = value
                .parse()
                .map_err(|_| ApiError::BadRequest(format!("Invalid {} id: {}", binding.table, value)))?;

            let table = binding.table;
            if !db_call(&app, move |db| db.entity_exists(id, table)).await? {
                return Err(ApiError::NotFound(format!("No {} with id {}", table, id)));
            }
            params.insert(binding.param, id);
        }
    }

    let caller = bearer_user(req.headers())?;
    if !db_call(&app, move |db| db.entity_exists(caller, Table::User)).await? {
        return Err(ApiError::Unauthorized("Unknown user".into()));
    }

    if let Some(param) = guard.identity {
        let expected = params.id(param)?;
        if expected != caller {
            debug!("User {} tried to act as user {}", caller, expected);
            return Err(ApiError::Forbidden("Can't act on behalf of another user".into()));
        }
    }

    params.insert(TOKEN_KEY, caller);
    req.extensions_mut().insert(params);
    Ok(next.run(req).await)
}

/// Extract the user id from `Authorization: Bearer <id>`.
pub fn bearer_user(headers: &HeaderMap) -> Result<i64, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Authorization scheme must be Bearer".into()))?;

    token
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::Unauthorized("Invalid bearer token".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn parses_bearer_id() {
        assert_eq!(bearer_user(&headers("Bearer 42")).unwrap(), 42);
    }

    #[test]
    fn rejects_malformed_tokens() {
        for bad in ["42", "Basic 42", "Bearer", "Bearer abc", "Bearer -3", "Bearer 0", "bearer 42"] {
            let err = bearer_user(&headers(bad)).unwrap_err();
            assert!(matches!(err, ApiError::Unauthorized(_)), "{bad}");
        }
    }

    #[test]
    fn missing_header_unauthorized() {
        let err = bearer_user(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn params_lookup() {
        let mut params = Params::default();
        params.insert("user_id", 7);
        params.insert(TOKEN_KEY, 7);
        assert_eq!(params.id("user_id").unwrap(), 7);
        assert_eq!(params.caller().unwrap(), 7);
        assert!(matches!(params.id("photo_id"), Err(ApiError::Internal(_))));
    }
}
