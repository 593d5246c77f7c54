//! AES-256-GCM-SIV sealing of individual field values.
//!
//! [`Sealer`] holds the expanded key schedule for one [`FieldKey`] and turns
//! plaintext bytes into a [`SealedToken`] and back. Each seal draws a fresh
//! 96-bit nonce from the OS CSPRNG, so the same plaintext never produces the
//! same token twice.

use std::fmt;
use std::str::FromStr;

use aes_gcm_siv::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    Aes256GcmSiv, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use thiserror::Error;

use super::key::FieldKey;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Leading segment of every token.
pub const VERSION_PREFIX: &str = "v1";

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// Authentication failed: wrong key, or the token was altered.
    #[error("aead operation failed")]
    AeadFailure,

    /// The token is not `v1.<nonce>.<ciphertext>`.
    #[error("invalid encrypted field format")]
    InvalidFormat,

    /// The token authenticated but its plaintext is not UTF-8.
    #[error("decrypted field is not valid utf-8")]
    InvalidUtf8,
}

/// Nonce and ciphertext of one sealed value.
///
/// Renders as `v1.<base64url(nonce)>.<base64url(ciphertext+tag)>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedToken {
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext with the tag appended.
    pub ciphertext: Vec<u8>,
}

impl fmt::Display for SealedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{VERSION_PREFIX}.{}.{}",
            URL_SAFE_NO_PAD.encode(self.nonce),
            URL_SAFE_NO_PAD.encode(&self.ciphertext),
        )
    }
}

impl FromStr for SealedToken {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(VERSION_PREFIX)
            .and_then(|r| r.strip_prefix('.'))
            .ok_or(CipherError::InvalidFormat)?;
        let (nonce, ciphertext) = rest.split_once('.').ok_or(CipherError::InvalidFormat)?;

        let nonce: [u8; NONCE_LEN] = decode_segment(nonce)?
            .try_into()
            .map_err(|_| CipherError::InvalidFormat)?;
        let ciphertext = decode_segment(ciphertext)?;
        // Anything shorter cannot even hold the tag.
        if ciphertext.len() < TAG_LEN {
            return Err(CipherError::InvalidFormat);
        }

        Ok(Self { nonce, ciphertext })
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, CipherError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| CipherError::InvalidFormat)
}

/// AES-256-GCM-SIV bound to one key.
pub struct Sealer {
    aead: Aes256GcmSiv,
}

impl Sealer {
    pub fn new(key: &FieldKey) -> Self {
        Self {
            aead: Aes256GcmSiv::new(key.as_bytes().into()),
        }
    }

    /// Encrypt `plaintext` under a fresh random nonce.
    ///
    /// # Errors
    ///
    /// [`CipherError::AeadFailure`] if the AEAD rejects the input.
    pub fn seal(&self, plaintext: &[u8]) -> Result<SealedToken, CipherError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        let ciphertext = self
            .aead
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| CipherError::AeadFailure)?;
        Ok(SealedToken { nonce, ciphertext })
    }

    /// Authenticate and decrypt a token.
    ///
    /// # Errors
    ///
    /// [`CipherError::AeadFailure`] if the key is wrong or the token was
    /// tampered with.
    pub fn open(&self, token: &SealedToken) -> Result<Vec<u8>, CipherError> {
        self.aead
            .decrypt(Nonce::from_slice(&token.nonce), token.ciphertext.as_ref())
            .map_err(|_| CipherError::AeadFailure)
    }
}

impl fmt::Debug for Sealer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sealer(AES-256-GCM-SIV)")
    }
}
