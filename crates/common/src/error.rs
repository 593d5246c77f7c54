//! Error taxonomy shared by the service and its clients.

use thiserror::Error;

use crate::protocol::FieldViolation;

/// Every failure a client request can end in.
///
/// Each variant fixes the HTTP status and the `code` field of the
/// [`ErrorResponse`](crate::protocol::ErrorResponse) body:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::Validation`] → 422
/// - [`ServiceError::Internal`] → 500
/// - [`ServiceError::Unavailable`] → 503
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request could not be parsed: not JSON, or a bad path or query.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No record matches the requested identifier.
    #[error("not found: {0}")]
    NotFound(String),

    /// One or more input fields violate their constraints.
    #[error("validation failed: {} violation(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    /// The database could not hand out a connection.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Anything else; details are logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::Validation(_) => 422,
            ServiceError::Unavailable(_) => 503,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in the error response body.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Validation(_) => "validation_failed",
            ServiceError::Unavailable(_) => "service_unavailable",
            ServiceError::Internal(_) => "internal_error",
        }
    }
}
