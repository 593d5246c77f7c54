//! Input validation for client payloads.
//!
//! Turns the raw wire types from [`common::protocol`] into the typed
//! [`NewClient`] / [`ClientPatch`] commands, or reports every violated
//! constraint at once as [`ValidationErrors`].

use std::fmt;

use common::protocol::{ClientCreate, ClientUpdate, FieldViolation};
use thiserror::Error;

use crate::domain::{ClientPatch, Gender, NewClient};

pub const FULL_NAME_MIN_CHARS: usize = 2;
pub const FULL_NAME_MAX_CHARS: usize = 200;
pub const CUSTOM_GENDER_MAX_CHARS: usize = 100;
pub const BACKGROUND_MAX_CHARS: usize = 2400;
pub const AGE_MIN: i64 = 0;
pub const AGE_MAX: i64 = 120;

/// Input field a violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FullName,
    Age,
    Gender,
    CustomGender,
    Background,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::FullName => "full_name",
            Field::Age => "age",
            Field::Gender => "gender",
            Field::CustomGender => "custom_gender",
            Field::Background => "background",
        }
    }
}

/// The constraint a field failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Explicit `null` for a field that cannot be cleared.
    Required,
    /// Blank after trimming.
    Empty,
    TooShort { min: usize },
    TooLong { max: usize },
    OutOfRange { min: i64, max: i64 },
    /// Not a member of the allowed enumeration.
    NotAllowed { allowed: String },
}

impl Constraint {
    /// Machine-readable constraint identifier.
    pub fn code(&self) -> &'static str {
        match self {
            Constraint::Required => "required",
            Constraint::Empty => "empty",
            Constraint::TooShort { .. } => "too_short",
            Constraint::TooLong { .. } => "too_long",
            Constraint::OutOfRange { .. } => "out_of_range",
            Constraint::NotAllowed { .. } => "not_allowed",
        }
    }
}

/// One failed constraint on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: Field,
    pub constraint: Constraint,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field.as_str();
        match &self.constraint {
            Constraint::Required => write!(f, "{field} must not be null"),
            Constraint::Empty => write!(f, "{field} cannot be empty"),
            Constraint::TooShort { min } => {
                write!(f, "{field} must be at least {min} characters")
            }
            Constraint::TooLong { max } => write!(f, "{field} must be at most {max} characters"),
            Constraint::OutOfRange { min, max } => {
                write!(f, "{field} must be between {min} and {max}")
            }
            Constraint::NotAllowed { allowed } => write!(f, "{field} must be one of: {allowed}"),
        }
    }
}

/// Every violation found in one payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    /// `true` if any violation refers to `field`.
    #[cfg(test)]
    pub fn has(&self, field: Field) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Convert into the wire representation.
    pub fn into_violations(self) -> Vec<FieldViolation> {
        self.0
            .into_iter()
            .map(|e| FieldViolation::new(e.field.as_str(), e.constraint.code(), e.to_string()))
            .collect()
    }
}

/// Collects violations while individual fields are checked.
#[derive(Default)]
struct Collector(Vec<ValidationError>);

impl Collector {
    fn check<T>(&mut self, field: Field, result: Result<T, Constraint>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(constraint) => {
                self.0.push(ValidationError { field, constraint });
                None
            }
        }
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, ValidationErrors> {
        match value {
            Some(v) if self.0.is_empty() => Ok(v),
            _ => Err(ValidationErrors(self.0)),
        }
    }
}

/// Validate a creation payload.
///
/// # Errors
///
/// Returns every violated constraint if any field is invalid.
pub fn validate_create(req: ClientCreate) -> Result<NewClient, ValidationErrors> {
    let mut errors = Collector::default();

    let full_name = errors.check(Field::FullName, full_name(&req.full_name));
    let age = errors.check(Field::Age, age(req.age));
    let gender = errors.check(Field::Gender, gender(&req.gender));
    let custom_gender = errors.check(
        Field::CustomGender,
        optional_text(req.custom_gender, CUSTOM_GENDER_MAX_CHARS),
    );
    let background = errors.check(
        Field::Background,
        optional_text(req.background, BACKGROUND_MAX_CHARS),
    );

    let client = match (full_name, age, gender, custom_gender, background) {
        (Some(full_name), Some(age), Some(gender), Some(custom_gender), Some(background)) => {
            Some(NewClient {
                full_name,
                age,
                gender,
                custom_gender,
                background,
            })
        }
        _ => None,
    };
    errors.finish(client)
}

/// Validate a partial-update payload. Absent fields are not checked.
///
/// # Errors
///
/// Returns every violated constraint if any supplied field is invalid.
pub fn validate_update(req: ClientUpdate) -> Result<ClientPatch, ValidationErrors> {
    let mut errors = Collector::default();
    let mut patch = ClientPatch::default();

    if let Some(value) = req.full_name {
        patch.full_name = errors.check(Field::FullName, required(value).and_then(|v| full_name(&v)));
    }
    if let Some(value) = req.age {
        patch.age = errors.check(Field::Age, required(value).and_then(age));
    }
    if let Some(value) = req.gender {
        patch.gender = errors.check(Field::Gender, required(value).and_then(|v| gender(&v)));
    }
    if let Some(value) = req.custom_gender {
        patch.custom_gender = errors.check(
            Field::CustomGender,
            optional_text(value, CUSTOM_GENDER_MAX_CHARS),
        );
    }
    if let Some(value) = req.background {
        patch.background = errors.check(
            Field::Background,
            optional_text(value, BACKGROUND_MAX_CHARS),
        );
    }

    errors.finish(Some(patch))
}

fn required<T>(value: Option<T>) -> Result<T, Constraint> {
    value.ok_or(Constraint::Required)
}

fn full_name(raw: &str) -> Result<String, Constraint> {
    let trimmed = raw.trim();
    let chars = trimmed.chars().count();
    if chars == 0 {
        return Err(Constraint::Empty);
    }
    if chars < FULL_NAME_MIN_CHARS {
        return Err(Constraint::TooShort {
            min: FULL_NAME_MIN_CHARS,
        });
    }
    if chars > FULL_NAME_MAX_CHARS {
        return Err(Constraint::TooLong {
            max: FULL_NAME_MAX_CHARS,
        });
    }
    Ok(trimmed.to_owned())
}

fn age(value: i64) -> Result<u8, Constraint> {
    if !(AGE_MIN..=AGE_MAX).contains(&value) {
        return Err(Constraint::OutOfRange {
            min: AGE_MIN,
            max: AGE_MAX,
        });
    }
    u8::try_from(value).map_err(|_| Constraint::OutOfRange {
        min: AGE_MIN,
        max: AGE_MAX,
    })
}

fn gender(raw: &str) -> Result<Gender, Constraint> {
    raw.parse().map_err(|_| Constraint::NotAllowed {
        allowed: Gender::allowed(),
    })
}

/// Length-checks an optional free-text field. Empty strings become `None`.
fn optional_text(value: Option<String>, max: usize) -> Result<Option<String>, Constraint> {
    match value {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) if s.chars().count() > max => Err(Constraint::TooLong { max }),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(full_name: &str, age: i64, gender: &str) -> ClientCreate {
        ClientCreate {
            full_name: full_name.into(),
            age,
            gender: gender.into(),
            custom_gender: None,
            background: None,
        }
    }

    #[test]
    fn valid_create_is_trimmed() {
        let c = validate_create(create("  Jane Doe  ", 34, "female")).unwrap();
        assert_eq!(c.full_name, "Jane Doe");
        assert_eq!(c.age, 34);
        assert_eq!(c.gender, Gender::Female);
        assert!(c.background.is_none());
    }

    #[test]
    fn unknown_gender_rejected() {
        let err = validate_create(create("Jane Doe", 34, "martian")).unwrap_err();
        assert_eq!(err.0.len(), 1);
        assert_eq!(err.0[0].field, Field::Gender);
        assert_eq!(err.0[0].constraint.code(), "not_allowed");
    }

    #[test]
    fn non_binary_accepted() {
        let c = validate_create(create("Alex Kim", 29, "non-binary")).unwrap();
        assert_eq!(c.gender, Gender::NonBinary);
    }

    #[test]
    fn blank_name_rejected_as_empty() {
        let err = validate_create(create("   ", 34, "female")).unwrap_err();
        assert_eq!(
            err.0,
            vec![ValidationError {
                field: Field::FullName,
                constraint: Constraint::Empty
            }]
        );
    }

    #[test]
    fn name_length_bounds_after_trim() {
        assert!(validate_create(create(" J ", 34, "female"))
            .unwrap_err()
            .has(Field::FullName));
        assert!(validate_create(create("Jo", 34, "female")).is_ok());
        assert!(validate_create(create(&"n".repeat(200), 34, "female")).is_ok());
        let err = validate_create(create(&"n".repeat(201), 34, "female")).unwrap_err();
        assert_eq!(err.0[0].constraint, Constraint::TooLong { max: 200 });
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        assert!(validate_create(create(&"é".repeat(200), 34, "female")).is_ok());
    }

    #[test]
    fn age_bounds() {
        assert!(validate_create(create("Jane Doe", 0, "female")).is_ok());
        assert!(validate_create(create("Jane Doe", 120, "female")).is_ok());
        assert!(validate_create(create("Jane Doe", -1, "female"))
            .unwrap_err()
            .has(Field::Age));
        assert!(validate_create(create("Jane Doe", 121, "female"))
            .unwrap_err()
            .has(Field::Age));
    }

    #[test]
    fn collects_every_violation() {
        let mut req = create("", 500, "martian");
        req.background = Some("b".repeat(2401));
        req.custom_gender = Some("c".repeat(101));
        let err = validate_create(req).unwrap_err();
        assert_eq!(err.0.len(), 5);
        for field in [
            Field::FullName,
            Field::Age,
            Field::Gender,
            Field::CustomGender,
            Field::Background,
        ] {
            assert!(err.has(field), "missing {field:?}");
        }
    }

    #[test]
    fn empty_background_becomes_absent() {
        let mut req = create("Jane Doe", 34, "female");
        req.background = Some(String::new());
        assert!(validate_create(req).unwrap().background.is_none());
    }

    #[test]
    fn update_with_absent_fields_is_empty_patch() {
        let patch = validate_update(ClientUpdate::default()).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn update_only_age() {
        let patch = validate_update(ClientUpdate {
            age: Some(Some(35)),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch.age, Some(35));
        assert!(patch.full_name.is_none());
        assert!(patch.background.is_none());
    }

    #[test]
    fn update_rejects_blank_name() {
        let err = validate_update(ClientUpdate {
            full_name: Some(Some("  ".into())),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.0[0].constraint, Constraint::Empty);
    }

    #[test]
    fn update_rejects_null_for_required_fields() {
        let err = validate_update(ClientUpdate {
            full_name: Some(None),
            age: Some(None),
            gender: Some(None),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.0.len(), 3);
        assert!(err.0.iter().all(|e| e.constraint == Constraint::Required));
    }

    #[test]
    fn update_rejects_unknown_gender() {
        let err = validate_update(ClientUpdate {
            gender: Some(Some("martian".into())),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.has(Field::Gender));
    }

    #[test]
    fn update_null_clears_optional_fields() {
        let patch = validate_update(ClientUpdate {
            background: Some(None),
            custom_gender: Some(None),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch.background, Some(None));
        assert_eq!(patch.custom_gender, Some(None));
    }

    #[test]
    fn violations_carry_field_and_code() {
        let err = validate_create(create("Jane Doe", 200, "female")).unwrap_err();
        let v = err.into_violations();
        assert_eq!(v[0].field, "age");
        assert_eq!(v[0].constraint, "out_of_range");
        assert_eq!(v[0].message, "age must be between 0 and 120");
    }
}
