//! Request extractors whose rejections are rendered as [`ErrorResponse`]
//! bodies instead of Axum's plain-text defaults.
//!
//! A JSON body that parses but does not fit the request type (a required
//! key missing, a value of the wrong type) is a validation failure naming
//! the field. Anything that is not JSON at all, and unparseable path or
//! query parameters, are bad requests.
//!
//! [`ErrorResponse`]: common::protocol::ErrorResponse

use axum::extract::{
    rejection::{JsonRejection, PathRejection, QueryRejection},
    FromRequest, FromRequestParts,
};
use common::{protocol::FieldViolation, ServiceError};

use super::error::ApiError;

/// [`axum::Json`] with structured rejections.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// [`axum::extract::Path`] with structured rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// [`axum::extract::Query`] with structured rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => {
                Self(ServiceError::Validation(vec![body_violation(&e.body_text())]))
            }
            JsonRejection::JsonSyntaxError(_) => {
                Self(ServiceError::BadRequest("request body is not valid JSON".into()))
            }
            JsonRejection::MissingJsonContentType(_) => Self(ServiceError::BadRequest(
                "expected `Content-Type: application/json`".into(),
            )),
            other => Self(ServiceError::BadRequest(other.body_text())),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(ServiceError::BadRequest(format!(
            "invalid path parameter: {}",
            rejection.body_text()
        )))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(ServiceError::BadRequest(format!(
            "invalid query parameter: {}",
            rejection.body_text()
        )))
    }
}

/// Map a serde data error onto the field it refers to.
///
/// Axum renders these as `<prefix>: missing field `name` at ...` or
/// `<prefix>: name: invalid type: ...`.
fn body_violation(text: &str) -> FieldViolation {
    let detail = text
        .split_once("target type: ")
        .map_or(text, |(_, rest)| rest);

    if let Some(field) = detail
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split_once('`'))
        .map(|(field, _)| field)
    {
        return FieldViolation::new(field, "required", format!("{field} is required"));
    }

    match detail.split_once(": ") {
        Some((field, reason)) if is_field_path(field) => FieldViolation::new(
            field,
            "invalid_type",
            format!("{field} has the wrong type: {reason}"),
        ),
        _ => FieldViolation::new("body", "invalid_type", detail),
    }
}

fn is_field_path(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '[' || c == ']')
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

    #[test]
    fn missing_field_is_required() {
        let v = body_violation(&format!(
            "{PREFIX}missing field `full_name` at line 1 column 30"
        ));
        assert_eq!(v.field, "full_name");
        assert_eq!(v.constraint, "required");
    }

    #[test]
    fn wrong_type_names_the_field() {
        let v = body_violation(&format!(
            "{PREFIX}age: invalid type: string \"abc\", expected i64 at line 1 column 12"
        ));
        assert_eq!(v.field, "age");
        assert_eq!(v.constraint, "invalid_type");
    }

    #[test]
    fn unattributable_error_falls_back_to_body() {
        let v = body_violation(&format!(
            "{PREFIX}invalid type: sequence, expected struct ClientCreate"
        ));
        assert_eq!(v.field, "body");
    }
}
