use rusqlite::ffi;
use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

/// Outcome taxonomy of the data-access layer.
///
/// Message-carrying variants are safe to show to clients. `Internal` wraps the
/// driver error and is only ever logged.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadInput(String),

    #[error("database error: {0}")]
    Internal(#[source] rusqlite::Error),

    #[error("database lock poisoned")]
    LockPoisoned,
}

impl DbError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn bad_input(msg: impl Into<String>) -> Self {
        Self::BadInput(msg.into())
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::QueryReturnedNoRows => Self::NotFound("Not found".into()),
            rusqlite::Error::SqliteFailure(e, _) if is_duplicate_key(e) => {
                Self::Conflict("Conflict with the server state".into())
            }
            _ => Self::Internal(err),
        }
    }
}

fn is_duplicate_key(err: &ffi::Error) -> bool {
    err.code == ffi::ErrorCode::ConstraintViolation
        && matches!(
            err.extended_code,
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE
        )
}

/// Turns a failed insert into a `Conflict` with a domain-specific message,
/// leaving every other failure classified as usual.
pub(crate) fn on_duplicate(err: rusqlite::Error, msg: &str) -> DbError {
    match DbError::from(err) {
        DbError::Conflict(_) => DbError::conflict(msg),
        other => other,
    }
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> DbResult<Option<T>>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> DbResult<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(extended_code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(extended_code), None)
    }

    #[test]
    fn primary_key_violation_is_conflict() {
        let err = DbError::from(failure(ffi::SQLITE_CONSTRAINT_PRIMARYKEY));
        assert!(matches!(err, DbError::Conflict(_)));
    }

    #[test]
    fn unique_violation_is_conflict() {
        let err = DbError::from(failure(ffi::SQLITE_CONSTRAINT_UNIQUE));
        assert!(matches!(err, DbError::Conflict(_)));
    }

    #[test]
    fn foreign_key_violation_is_internal() {
        let err = DbError::from(failure(ffi::SQLITE_CONSTRAINT_FOREIGNKEY));
        assert!(matches!(err, DbError::Internal(_)));
    }

    #[test]
    fn no_rows_is_not_found() {
        let err = DbError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[test]
    fn on_duplicate_overrides_message() {
        let err = on_duplicate(failure(ffi::SQLITE_CONSTRAINT_PRIMARYKEY), "already liked");
        assert_eq!(err.to_string(), "already liked");
    }
}
