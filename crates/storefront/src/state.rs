//! Application state shared across handlers.

use std::sync::Arc;

use bazaar_supabase::{SupabaseClient, SupabaseError};

use crate::config::StorefrontConfig;
use crate::services::products::CategoryCache;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// backend client, the category cache and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    supabase: SupabaseClient,
    categories: CategoryCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend URL is invalid.
    pub fn new(config: StorefrontConfig) -> Result<Self, SupabaseError> {
        let supabase = SupabaseClient::new(&config.supabase_url, config.supabase_anon_key.clone())?;
        Ok(Self::with_client(config, supabase))
    }

    /// Create application state around an existing backend client.
    #[must_use]
    pub fn with_client(config: StorefrontConfig, supabase: SupabaseClient) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                supabase,
                categories: CategoryCache::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend client (anon key).
    #[must_use]
    pub fn supabase(&self) -> &SupabaseClient {
        &self.inner.supabase
    }

    /// Get a reference to the category cache.
    #[must_use]
    pub fn categories(&self) -> &CategoryCache {
        &self.inner.categories
    }
}
