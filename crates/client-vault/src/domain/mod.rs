//! Client entity and the validated commands that create and modify it.
//!
//! Domain values only ever hold plaintext. Sensitive fields read back from
//! the store are wrapped in [`Revealed`] so a failed decryption stays a typed
//! outcome until the response is formatted.

mod client;
mod gender;

pub use client::{Client, ClientPatch, NewClient, Revealed, DECRYPTION_FAILED};
pub use gender::Gender;
