//! Request and response types exchanged over the public HTTP API.
//!
//! These types carry plaintext only. Ciphertext never crosses this boundary:
//! sensitive fields are sealed and opened inside the service's store layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Default number of clients returned by a list call when `limit` is omitted.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

// ---------------------------------------------------------------------------
// Client input
// ---------------------------------------------------------------------------

/// Request body for `POST /api/v1/clients`.
///
/// Values are unvalidated; the service's validator turns this into a typed
/// command or a list of field violations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCreate {
    #[serde(alias = "fullName")]
    pub full_name: String,
    pub age: i64,
    pub gender: String,
    #[serde(default, alias = "customGender")]
    pub custom_gender: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
}

/// Request body for `PUT /api/v1/clients/{id}`.
///
/// Every field is tri-state: absent (`None`), explicit `null`
/// (`Some(None)`), or a value (`Some(Some(v))`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientUpdate {
    #[serde(
        default,
        alias = "fullName",
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub full_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub age: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub gender: Option<Option<String>>,
    #[serde(
        default,
        alias = "customGender",
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_gender: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub background: Option<Option<String>>,
}

/// Distinguishes an explicit `null` from an absent key. Paired with
/// `#[serde(default)]`, which supplies `None` when the key is missing.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Query parameters for `GET /api/v1/clients`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListParams {
    /// Number of records to skip.
    #[serde(default, alias = "offset")]
    pub skip: u32,
    /// Maximum number of records to return. Defaults to [`DEFAULT_PAGE_SIZE`].
    #[serde(default)]
    pub limit: Option<u32>,
}

// ---------------------------------------------------------------------------
// Client output
// ---------------------------------------------------------------------------

/// Full client projection returned by create, get, and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientResponse {
    pub id: i64,
    pub uuid: String,
    pub full_name: String,
    pub age: u8,
    pub gender: String,
    pub custom_gender: Option<String>,
    pub background: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reduced projection used for each item of a list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientListItem {
    pub id: i64,
    pub uuid: String,
    pub full_name: String,
    pub age: u8,
    pub gender: String,
    pub created_at: DateTime<Utc>,
}

/// Response body for `GET /api/v1/clients/stats/count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub total_clients: u64,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// A single failed field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Input field name, e.g. `"full_name"`.
    pub field: String,
    /// Machine-readable constraint identifier, e.g. `"too_long"`.
    pub constraint: String,
    /// Human-readable description.
    pub message: String,
}

impl FieldViolation {
    pub fn new(
        field: impl Into<String>,
        constraint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            constraint: constraint.into(),
            message: message.into(),
        }
    }
}

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"not_found"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
    /// Per-field details, present only for validation failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldViolation>,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Attach per-field violation details.
    pub fn with_details(mut self, details: Vec<FieldViolation>) -> Self {
        self.details = details;
        self
    }
}

// ---------------------------------------------------------------------------
// Service status
// ---------------------------------------------------------------------------

/// Response body for `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub status: String,
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Whether the database answered a ping.
    pub database_ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_accepts_camel_case_aliases() {
        let req: ClientCreate = serde_json::from_value(json!({
            "fullName": "Jane Doe",
            "age": 34,
            "gender": "female",
            "customGender": "n/a"
        }))
        .unwrap();
        assert_eq!(req.full_name, "Jane Doe");
        assert_eq!(req.custom_gender.as_deref(), Some("n/a"));
        assert!(req.background.is_none());
    }

    #[test]
    fn update_distinguishes_absent_from_null() {
        let req: ClientUpdate =
            serde_json::from_value(json!({"age": 35, "background": null})).unwrap();
        assert_eq!(req.age, Some(Some(35)));
        assert_eq!(req.background, Some(None));
        assert!(req.full_name.is_none());
        assert!(req.custom_gender.is_none());
    }

    #[test]
    fn update_serialises_only_supplied_fields() {
        let req = ClientUpdate {
            age: Some(Some(40)),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({"age": 40}));
    }

    #[test]
    fn list_params_accept_offset_alias() {
        let p: ListParams = serde_json::from_value(json!({"offset": 5, "limit": 2})).unwrap();
        assert_eq!(p.skip, 5);
        assert_eq!(p.limit, Some(2));
        let d: ListParams = serde_json::from_value(json!({})).unwrap();
        assert_eq!(d.skip, 0);
        assert!(d.limit.is_none());
    }

    #[test]
    fn error_response_omits_empty_details() {
        let e = ErrorResponse::new("not_found", "client not found");
        let v = serde_json::to_value(&e).unwrap();
        assert!(v.get("details").is_none());

        let e = e.with_details(vec![FieldViolation::new("age", "out_of_range", "bad age")]);
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["details"][0]["field"], "age");
    }
}
