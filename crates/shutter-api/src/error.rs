use axum::{
    Json,
    extract::rejection::{BytesRejection, JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use shutter_db::DbError;
use shutter_types::api::ErrorBody;

/// Every way a request can fail, mapped to a status code only at the
/// response boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// The cause is logged, clients only see a generic message.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => Self::NotFound(msg),
            DbError::Conflict(msg) => Self::Conflict(msg),
            DbError::Forbidden(msg) => Self::Forbidden(msg),
            DbError::BadInput(msg) => Self::BadRequest(msg),
            DbError::Internal(e) => Self::Internal(format!("database error: {}", e)),
            DbError::LockPoisoned => Self::Internal("database lock poisoned".into()),
        }
    }
}

impl ApiError {
    /// Body extractor failures: over the size cap keeps its 413, the rest are 400.
    fn from_body_rejection(status: StatusCode, text: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(text)
        } else {
            Self::BadRequest(text)
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::from_body_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        Self::from_body_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Internal(cause) => error!("{}: {}", status, cause),
            other => warn!("{}: {}", status, other),
        }

        (
            status,
            Json(ErrorBody {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_errors_map_to_status() {
        let cases = [
            (DbError::not_found("x"), StatusCode::NOT_FOUND),
            (DbError::conflict("x"), StatusCode::CONFLICT),
            (DbError::forbidden("x"), StatusCode::FORBIDDEN),
            (DbError::bad_input("x"), StatusCode::BAD_REQUEST),
            (DbError::LockPoisoned, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (db_err, status) in cases {
            assert_eq!(ApiError::from(db_err).status(), status);
        }
    }

    #[test]
    fn oversized_body_keeps_its_status() {
        let err = ApiError::from_body_rejection(StatusCode::PAYLOAD_TOO_LARGE, "too big".into());
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.to_string(), "too big");

        let err = ApiError::from_body_rejection(StatusCode::UNSUPPORTED_MEDIA_TYPE, "bad".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_cause_is_not_exposed() {
        let err = ApiError::Internal("disk on fire".into());
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn message_kept_for_client_errors() {
        let err = ApiError::from(DbError::conflict("User already liked that photo"));
        assert_eq!(err.to_string(), "User already liked that photo");
    }
}
