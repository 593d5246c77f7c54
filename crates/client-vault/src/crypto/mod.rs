//! AES-256-GCM-SIV field encryption.
//!
//! This module is free of storage and HTTP dependencies. It provides the
//! AEAD wrapper ([`cipher`]), the key holder ([`key`]), and the string-level
//! [`FieldCipher`] the store uses for its sensitive columns.
//!
//! # Ciphertext format
//!
//! ```text
//! v1.<base64url-no-pad(nonce)>.<base64url-no-pad(ciphertext+tag)>
//! ```
//!
//! The `v1` prefix leaves room for a later algorithm change without
//! breaking existing ciphertext.

pub mod cipher;
pub mod field_cipher;
pub mod key;

pub use cipher::CipherError;
pub use field_cipher::{AesFieldCipher, FieldCipher};
pub use key::FieldKey;

#[cfg(test)]
pub use field_cipher::MockFieldCipher;
