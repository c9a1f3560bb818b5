//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds no session data: every request carries its own cookie, so the only
//! shared pieces are the backend client and the cookie policy.

use std::sync::Arc;

use crate::services::backend::Backend;

/// Clone is required by Axum; the backend is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    /// Whether session cookies carry the `Secure` attribute.
    pub cookie_secure: bool,
}

impl AppState {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, cookie_secure: bool) -> Self {
        Self { backend, cookie_secure }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
