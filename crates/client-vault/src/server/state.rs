//! Shared application state injected into every Axum handler.

use crate::store::ClientStore;

/// Application state shared across all request handlers.
///
/// Cheap to clone: the store wraps a pooled connection handle and an
/// `Arc`-shared cipher.
#[derive(Clone)]
pub struct AppState {
    /// Encrypted client repository.
    pub store: ClientStore,
    /// Largest page a list call may return.
    pub max_page_size: u32,
}

impl AppState {
    pub fn new(store: ClientStore, max_page_size: u32) -> Self {
        Self {
            store,
            max_page_size,
        }
    }

    /// Resolve a requested page size against the default and the ceiling.
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(common::protocol::DEFAULT_PAGE_SIZE)
            .min(self.max_page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::memory_store;

    #[tokio::test]
    async fn page_size_defaults_and_clamps() {
        let state = AppState::new(memory_store().await, 250);
        assert_eq!(state.page_size(None), 100);
        assert_eq!(state.page_size(Some(10)), 10);
        assert_eq!(state.page_size(Some(10_000)), 250);
        assert_eq!(state.page_size(Some(0)), 0);

        let small = AppState::new(state.store.clone(), 50);
        assert_eq!(small.page_size(None), 50);
    }
}
