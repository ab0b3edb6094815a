//! outlast-api: the REST request surface
//!
//! Each handler authenticates through the gate (public endpoints aside),
//! enforces caller-equals-subject, invokes exactly one core operation, and
//! renders the result. Errors become `{"detail": message}` bodies with the
//! status taken from the error code; a refreshed credential rides out in
//! the `x-new-token` response header.

pub mod cors;
pub mod error;
pub mod handlers;
pub mod json;
pub mod render;
pub mod routes;
pub mod state;

pub use cors::CorsConfig;
pub use error::error_response;
pub use json::Json;
pub use routes::build_router;
pub use state::AppState;
