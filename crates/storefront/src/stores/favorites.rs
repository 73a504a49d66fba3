//! Favorites container.

use async_trait::async_trait;
use bazaar_core::ProductId;
use bazaar_core::models::Product;
use serde::{Deserialize, Serialize};

use crate::services::Result;

/// Backend operations behind the favorites list.
#[async_trait]
pub trait FavoritesApi: Send + Sync {
    /// The user's saved listings.
    async fn list(&self) -> Result<Vec<Product>>;

    /// Save a listing. Saving an already saved listing succeeds.
    async fn add(&self, product_id: ProductId) -> Result<()>;

    /// Forget a listing.
    async fn remove(&self, product_id: ProductId) -> Result<()>;
}

/// Saved listings, loaded on first use and kept in the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FavoritesState {
    loaded: bool,
    items: Vec<Product>,
}

impl FavoritesState {
    /// Saved listings as last fetched.
    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    /// Whether `product_id` is in the local list.
    #[must_use]
    pub fn is_favorite(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|p| p.id == product_id)
    }

    /// Fetch the list unless it was already loaded.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the fetch fails.
    pub async fn ensure_loaded(&mut self, api: &dyn FavoritesApi) -> Result<()> {
        if !self.loaded {
            self.refresh(api).await?;
        }
        Ok(())
    }

    /// Re-fetch the list.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the local list is left as it was.
    pub async fn refresh(&mut self, api: &dyn FavoritesApi) -> Result<()> {
        self.items = api.list().await?;
        self.loaded = true;
        Ok(())
    }

    /// Save a listing and re-fetch. A listing that is already saved is left
    /// alone and reported as success.
    ///
    /// # Errors
    ///
    /// Returns the backend error if saving or re-fetching fails.
    pub async fn add(&mut self, api: &dyn FavoritesApi, product_id: ProductId) -> Result<()> {
        self.ensure_loaded(api).await?;
        if self.is_favorite(product_id) {
            return Ok(());
        }
        api.add(product_id).await?;
        self.refresh(api).await
    }

    /// Forget a listing and drop it from the local list.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the local list is unchanged in that case.
    pub async fn remove(&mut self, api: &dyn FavoritesApi, product_id: ProductId) -> Result<()> {
        api.remove(product_id).await?;
        self.items.retain(|p| p.id != product_id);
        Ok(())
    }
}
