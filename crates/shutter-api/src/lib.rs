//! HTTP surface: request guard, handlers and the router that binds them.

pub mod convert;
pub mod error;
pub mod interactions;
pub mod middleware;
pub mod pagination;
pub mod photos;
pub mod profile;
pub mod relations;
pub mod routes;
pub mod search;
pub mod session;
pub mod state;
pub mod stream;

pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, AppStateInner};
