//! HTTP surface of the client API.
//!
//! Handlers validate input, call the [`ClientStore`](crate::store::ClientStore),
//! and format the result through [`projection`]. Store and validation errors
//! become JSON error bodies in [`error`].

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod projection;
pub mod router;
pub mod state;
