//! HTTP API: routing, handlers, schemas, and structured errors.

pub mod error;
pub mod handlers;
pub mod rest;
pub mod schemas;

pub use error::{ApiError, ErrorCode};
pub use rest::{api_router, AppState};
