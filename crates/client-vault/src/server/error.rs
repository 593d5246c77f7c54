//! Conversion of layer errors into HTTP error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{protocol::ErrorResponse, ServiceError};
use tracing::error;

use crate::store::StoreError;
use crate::validation::ValidationErrors;

/// Handler error: a [`ServiceError`] rendered as an [`ErrorResponse`] body.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        Self(ServiceError::Validation(e.into_violations()))
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => Self(ServiceError::NotFound(what)),
            StoreError::Database(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) => {
                error!("database connection pool exhausted or closed");
                Self(ServiceError::Unavailable("database unavailable".into()))
            }
            other => {
                error!(error = %other, "store operation failed");
                Self(ServiceError::Internal(other.to_string()))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = self.0.code();
        let body = match self.0 {
            ServiceError::Validation(details) => {
                ErrorResponse::new(code, "request validation failed").with_details(details)
            }
            ServiceError::NotFound(_) => ErrorResponse::new(code, "Client not found"),
            // Internal details stay in the logs.
            ServiceError::Internal(_) => ErrorResponse::new(code, "internal server error"),
            other => ErrorResponse::new(code, other.to_string()),
        };
        (status, Json(body)).into_response()
    }
}
