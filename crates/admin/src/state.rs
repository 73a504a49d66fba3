//! Application state shared across handlers.

use std::sync::Arc;

use bazaar_supabase::{SupabaseClient, SupabaseError};

use crate::backend::{AdminBackend, SupabaseAdminBackend};
use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// Cheap to clone; the backend sits behind a trait object so tests can
/// swap in a fake.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: Arc<dyn AdminBackend>,
}

impl AppState {
    /// Create state backed by the hosted backend with the service role key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend URL is invalid.
    pub fn new(config: AdminConfig) -> Result<Self, SupabaseError> {
        let client = SupabaseClient::new(&config.supabase_url, config.service_role_key.clone())?;
        Ok(Self::with_backend(
            config,
            Arc::new(SupabaseAdminBackend::new(client)),
        ))
    }

    /// Create state around any backend.
    #[must_use]
    pub fn with_backend(config: AdminConfig, backend: Arc<dyn AdminBackend>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, backend }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn backend(&self) -> &dyn AdminBackend {
        self.inner.backend.as_ref()
    }
}
