use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Gender;

/// Marker shown to callers in place of a field that could not be decrypted.
pub const DECRYPTION_FAILED: &str = "[DECRYPTION_FAILED]";

/// Outcome of opening one sensitive column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revealed {
    /// The ciphertext decrypted to this plaintext.
    Plain(String),
    /// The ciphertext could not be decrypted (wrong key, corruption, tampering).
    Unreadable,
}

impl Revealed {
    /// Text to put in a response: the plaintext, or [`DECRYPTION_FAILED`].
    pub fn into_display(self) -> String {
        match self {
            Revealed::Plain(s) => s,
            Revealed::Unreadable => DECRYPTION_FAILED.to_owned(),
        }
    }
}

/// A materialized client record with its sensitive fields opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: i64,
    pub uuid: Uuid,
    pub full_name: Revealed,
    pub background: Option<Revealed>,
    pub age: u8,
    pub gender: Gender,
    pub custom_gender: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    /// Trimmed, 2 to 200 characters.
    pub full_name: String,
    pub age: u8,
    pub gender: Gender,
    pub custom_gender: Option<String>,
    /// `None` when absent or empty.
    pub background: Option<String>,
}

/// Validated partial update. `None` leaves the stored value unchanged.
///
/// The optional attributes are doubly wrapped: `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientPatch {
    pub full_name: Option<String>,
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub custom_gender: Option<Option<String>>,
    pub background: Option<Option<String>>,
}

impl ClientPatch {
    /// `true` when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.custom_gender.is_none()
            && self.background.is_none()
    }
}
