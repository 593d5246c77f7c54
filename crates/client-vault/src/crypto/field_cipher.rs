//! String-level cipher used by the store to seal and open sensitive columns.

use super::cipher::{CipherError, SealedToken, Sealer};
use super::key::FieldKey;

/// Encrypts and decrypts opaque text values.
///
/// Empty input passes through unchanged in both directions, so an empty
/// value never turns into an encrypted empty string.
#[cfg_attr(test, mockall::automock)]
pub trait FieldCipher: Send + Sync {
    /// Encrypt `plaintext` into a `v1.<nonce>.<ciphertext>` token.
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError>;

    /// Decrypt a token produced by [`FieldCipher::encrypt`].
    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError>;
}

/// AES-256-GCM-SIV implementation of [`FieldCipher`] bound to one key.
///
/// The raw key is consumed on construction and zeroed once the key
/// schedule has been expanded.
#[derive(Debug)]
pub struct AesFieldCipher {
    sealer: Sealer,
}

impl AesFieldCipher {
    pub fn new(key: FieldKey) -> Self {
        Self {
            sealer: Sealer::new(&key),
        }
    }
}

impl FieldCipher for AesFieldCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }
        Ok(self.sealer.seal(plaintext.as_bytes())?.to_string())
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        if ciphertext.is_empty() {
            return Ok(String::new());
        }
        let token: SealedToken = ciphertext.parse()?;
        let plaintext = self.sealer.open(&token)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::InvalidUtf8)
    }
}
