//! # crm-api
//!
//! JSON HTTP API for CRM RS.
//!
//! Handlers are thin: they extract the acting user and request data, call
//! the matching service and map `CrmError` onto HTTP responses.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use extractors::{Actor, AppState, AuthenticatedUser};
pub use routes::router;
