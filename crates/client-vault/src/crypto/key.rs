//! [`FieldKey`]: the process-wide field encryption key.

use base64::{
    engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD},
    Engine as _,
};
use thiserror::Error;

use super::cipher::KEY_LEN;

/// Errors produced while loading key material.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The configured key is not valid base64 in any accepted alphabet.
    #[error("encryption key is not valid base64")]
    InvalidEncoding,

    /// The decoded key material has an unexpected length.
    #[error("encryption key has invalid length: expected {KEY_LEN} bytes, got {0}")]
    InvalidLength(usize),
}

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// Built once at startup from configuration and never replaced. When this
/// type is dropped, the memory is overwritten with zeroes.
pub struct FieldKey(Box<[u8; KEY_LEN]>);

impl FieldKey {
    /// Build a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidLength`] if the slice is not [`KEY_LEN`] bytes.
    pub fn from_bytes(key_bytes: &[u8]) -> Result<Self, KeyError> {
        if key_bytes.len() != KEY_LEN {
            return Err(KeyError::InvalidLength(key_bytes.len()));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(key_bytes);
        Ok(Self(buf))
    }

    /// Decode a base64 key. URL-safe and standard alphabets are accepted,
    /// with or without padding.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidEncoding`] if no alphabet decodes the input,
    /// or [`KeyError::InvalidLength`] if it decodes to the wrong length.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let encoded = encoded.trim();
        let mut decoded = [&URL_SAFE, &STANDARD, &URL_SAFE_NO_PAD, &STANDARD_NO_PAD]
            .iter()
            .find_map(|engine| engine.decode(encoded).ok())
            .ok_or(KeyError::InvalidEncoding)?;
        let key = Self::from_bytes(&decoded);
        decoded.iter_mut().for_each(|b| *b = 0);
        key
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for FieldKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FieldKey([REDACTED])")
    }
}
