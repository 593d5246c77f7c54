//! Response formatting for [`Client`] values.
//!
//! This is the only place an unreadable sensitive attribute becomes the
//! `[DECRYPTION_FAILED]` display string.

use common::protocol::{ClientListItem, ClientResponse};

use crate::domain::Client;

/// Full projection used by create, get, and update.
pub fn full(client: Client) -> ClientResponse {
    ClientResponse {
        id: client.id,
        uuid: client.uuid.to_string(),
        full_name: client.full_name.into_display(),
        age: client.age,
        gender: client.gender.as_str().to_owned(),
        custom_gender: client.custom_gender,
        background: client.background.map(|b| b.into_display()),
        created_at: client.created_at,
        updated_at: client.updated_at,
    }
}

/// Reduced projection used for list items.
pub fn list_item(client: Client) -> ClientListItem {
    ClientListItem {
        id: client.id,
        uuid: client.uuid.to_string(),
        full_name: client.full_name.into_display(),
        age: client.age,
        gender: client.gender.as_str().to_owned(),
        created_at: client.created_at,
    }
}
