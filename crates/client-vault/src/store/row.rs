//! Persisted row layout and the encrypted-attribute mapping.
//!
//! A [`ClientRow`] is exactly what lives in the `clients` table: the two
//! sensitive attributes exist only as ciphertext. [`SealedAttr`] pairs each
//! of them with the function pair that crosses the boundary:
//! [`SealedAttr::seal`] on the way in, [`SealedAttr::open`] on the way out.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use super::StoreError;
use crate::crypto::{CipherError, FieldCipher};
use crate::domain::{Client, ClientPatch, Gender, NewClient, Revealed};

/// A sensitive attribute backed by exactly one ciphertext column.
#[derive(Debug, Clone, Copy)]
pub struct SealedAttr {
    /// Attribute name as callers know it.
    pub name: &'static str,
    /// Column holding the ciphertext.
    pub column: &'static str,
}

pub const FULL_NAME: SealedAttr = SealedAttr {
    name: "full_name",
    column: "full_name_encrypted",
};

pub const BACKGROUND: SealedAttr = SealedAttr {
    name: "background",
    column: "background_encrypted",
};

impl SealedAttr {
    /// Encrypt an optional plaintext. Absent or empty input yields no
    /// ciphertext at all.
    ///
    /// # Errors
    ///
    /// Propagates the cipher's error; nothing should be written in that case.
    pub fn seal(
        &self,
        cipher: &dyn FieldCipher,
        plaintext: Option<&str>,
    ) -> Result<Option<String>, CipherError> {
        match plaintext {
            None | Some("") => Ok(None),
            Some(p) => cipher.encrypt(p).map(Some),
        }
    }

    /// Encrypt a plaintext that must be present.
    ///
    /// # Errors
    ///
    /// Propagates the cipher's error.
    pub fn seal_required(
        &self,
        cipher: &dyn FieldCipher,
        plaintext: &str,
    ) -> Result<String, CipherError> {
        cipher.encrypt(plaintext)
    }

    /// Decrypt an optional ciphertext.
    ///
    /// Never fails: a ciphertext that cannot be decrypted is logged and
    /// returned as [`Revealed::Unreadable`], so one bad column does not take
    /// down the rest of the record.
    pub fn open(
        &self,
        cipher: &dyn FieldCipher,
        client_id: i64,
        ciphertext: Option<&str>,
    ) -> Option<Revealed> {
        let ciphertext = ciphertext.filter(|c| !c.is_empty())?;
        match cipher.decrypt(ciphertext) {
            Ok(plaintext) => Some(Revealed::Plain(plaintext)),
            Err(e) => {
                warn!(
                    client_id,
                    attribute = self.name,
                    column = self.column,
                    error = %e,
                    "failed to decrypt sensitive attribute"
                );
                Some(Revealed::Unreadable)
            }
        }
    }
}

/// One row of the `clients` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ClientRow {
    pub id: i64,
    pub uuid: String,
    pub full_name_encrypted: String,
    pub background_encrypted: Option<String>,
    pub age: i64,
    pub gender: String,
    pub custom_gender: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values for an INSERT; the id is assigned by the database.
#[derive(Debug, Clone)]
pub struct NewClientRow {
    pub uuid: Uuid,
    pub full_name_encrypted: String,
    pub background_encrypted: Option<String>,
    pub age: i64,
    pub gender: &'static str,
    pub custom_gender: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewClientRow {
    /// Seal a validated client into insertable column values with a fresh UUID.
    ///
    /// # Errors
    ///
    /// Returns the cipher's error if either sensitive attribute fails to encrypt.
    pub fn seal(
        client: NewClient,
        cipher: &dyn FieldCipher,
        now: DateTime<Utc>,
    ) -> Result<Self, CipherError> {
        Ok(Self {
            uuid: Uuid::new_v4(),
            full_name_encrypted: FULL_NAME.seal_required(cipher, &client.full_name)?,
            background_encrypted: BACKGROUND.seal(cipher, client.background.as_deref())?,
            age: i64::from(client.age),
            gender: client.gender.as_str(),
            custom_gender: client.custom_gender,
            created_at: now,
        })
    }

    /// The full row once the database has assigned `id`.
    pub fn with_id(self, id: i64) -> ClientRow {
        ClientRow {
            id,
            uuid: self.uuid.to_string(),
            full_name_encrypted: self.full_name_encrypted,
            background_encrypted: self.background_encrypted,
            age: self.age,
            gender: self.gender.to_owned(),
            custom_gender: self.custom_gender,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

impl ClientRow {
    /// Apply a validated patch. Supplied sensitive attributes are re-sealed;
    /// the others keep their stored ciphertext untouched.
    ///
    /// # Errors
    ///
    /// Returns the cipher's error; the row is left partially modified and
    /// must not be written.
    pub fn apply(
        &mut self,
        patch: ClientPatch,
        cipher: &dyn FieldCipher,
        now: DateTime<Utc>,
    ) -> Result<(), CipherError> {
        if let Some(full_name) = patch.full_name {
            self.full_name_encrypted = FULL_NAME.seal_required(cipher, &full_name)?;
        }
        if let Some(background) = patch.background {
            self.background_encrypted = BACKGROUND.seal(cipher, background.as_deref())?;
        }
        if let Some(age) = patch.age {
            self.age = i64::from(age);
        }
        if let Some(gender) = patch.gender {
            self.gender = gender.as_str().to_owned();
        }
        if let Some(custom_gender) = patch.custom_gender {
            self.custom_gender = custom_gender;
        }
        self.updated_at = next_timestamp(self.updated_at, now);
        Ok(())
    }

    /// Materialize the domain entity, opening both sensitive attributes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MalformedRow`] if a plaintext column holds a
    /// value the domain cannot represent. Decryption problems are not errors.
    pub fn open(self, cipher: &dyn FieldCipher) -> Result<Client, StoreError> {
        let id = self.id;
        let malformed = |reason: String| StoreError::MalformedRow { id, reason };

        let uuid = Uuid::parse_str(&self.uuid).map_err(|e| malformed(format!("uuid: {e}")))?;
        let age = u8::try_from(self.age).map_err(|_| malformed(format!("age: {}", self.age)))?;
        let gender: Gender = self
            .gender
            .parse()
            .map_err(|_| malformed(format!("gender: {}", self.gender)))?;

        let full_name = FULL_NAME
            .open(cipher, id, Some(&self.full_name_encrypted))
            .unwrap_or(Revealed::Unreadable);
        let background = BACKGROUND.open(cipher, id, self.background_encrypted.as_deref());

        Ok(Client {
            id,
            uuid,
            full_name,
            background,
            age,
            gender,
            custom_gender: self.custom_gender,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// `now`, or one microsecond past `previous` if the clock has not moved on,
/// so `updated_at` strictly increases on every mutation.
fn next_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + chrono::Duration::microseconds(1)
    }
}
