//! API error handling
//!
//! Every error renders as `{ "error": <code>, "message": <text> }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use crm_core::error::CrmError;
use serde::Serialize;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Error raised by a service
    Service(CrmError),
    /// The trusted user header was malformed or named an unusable account
    Unauthorized(String),
    BadRequest(String),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Service(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::Service(err) => err.error_code(),
            ApiError::Unauthorized(_) => "unauthenticated",
            ApiError::BadRequest(_) => "bad_request",
        }
    }
}

impl From<CrmError> for ApiError {
    fn from(err: CrmError) -> Self {
        ApiError::Service(err)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = self.error_code();
        let (message, details) = match self {
            ApiError::Service(CrmError::Validation(errors)) => {
                let details = serde_json::to_value(&errors.errors).ok();
                (errors.full_messages().join(", "), details)
            }
            ApiError::Service(err) => (err.to_string(), None),
            ApiError::Unauthorized(msg) | ApiError::BadRequest(msg) => (msg, None),
        };

        (
            status,
            Json(ErrorBody {
                error,
                message,
                details,
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_service_error() {
        let err = ApiError::from(CrmError::forbidden("no"));
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err = ApiError::from(CrmError::invalid("Name, phone, and status are required"));
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error_code(), "validation_failed");

        let err = ApiError::from(CrmError::Identity("down".into()));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_unauthorized_code() {
        let err = ApiError::unauthorized("Unknown account");
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.error_code(), "unauthenticated");
    }
}
