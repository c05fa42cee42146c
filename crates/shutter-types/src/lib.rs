//! Wire types shared by the HTTP layer and its clients.

pub mod api;
pub mod validation;
