//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::UserStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds only the store handle: requests share
/// no other mutable state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn UserStore>,
}

impl AppState {
    /// Create a new application state around a user store.
    pub fn new(store: impl UserStore + 'static) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store: Arc::new(store),
            }),
        }
    }

    /// Get a reference to the user store.
    #[must_use]
    pub fn store(&self) -> &dyn UserStore {
        self.inner.store.as_ref()
    }
}
