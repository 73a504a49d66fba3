//! Saved listings.

use async_trait::async_trait;
use bazaar_core::models::Product;
use bazaar_core::{ProductId, UserId};
use bazaar_supabase::SupabaseClient;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::Result;
use super::products::ProductRow;
use crate::models::CurrentUser;
use crate::stores::FavoritesApi;

const FAVORITE_SELECT: &str = "
    product_id,
    products!favorites_product_id_fkey(
        *,
        profiles!products_seller_id_fkey(id, name, avatar_url, avg_rating, total_ratings),
        categories!products_category_id_fkey(id, name, slug)
    )
";

#[derive(Debug, Deserialize)]
struct FavoriteRow {
    #[serde(default)]
    products: Option<ProductRow>,
}

#[derive(Debug, Serialize)]
struct FavoriteInsert {
    user_id: UserId,
    product_id: ProductId,
}

/// Favorites of one signed-in user.
pub struct FavoritesService<'a> {
    client: &'a SupabaseClient,
    user: &'a CurrentUser,
}

impl<'a> FavoritesService<'a> {
    #[must_use]
    pub const fn new(client: &'a SupabaseClient, user: &'a CurrentUser) -> Self {
        Self { client, user }
    }

    /// Whether the user has saved `product_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self), fields(user_id = %self.user.id))]
    pub async fn is_favorite(&self, product_id: ProductId) -> Result<bool> {
        let row: Option<IgnoredAny> = self
            .client
            .table("favorites")
            .auth(&self.user.access_token)
            .select("product_id")
            .eq("user_id", self.user.id)
            .eq("product_id", product_id)
            .fetch_optional()
            .await?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl FavoritesApi for FavoritesService<'_> {
    #[instrument(skip(self), fields(user_id = %self.user.id))]
    async fn list(&self) -> Result<Vec<Product>> {
        let rows: Vec<FavoriteRow> = self
            .client
            .table("favorites")
            .auth(&self.user.access_token)
            .select(FAVORITE_SELECT)
            .eq("user_id", self.user.id)
            .fetch()
            .await?;
        // Listings hidden by row-level security come back as null
        Ok(rows
            .into_iter()
            .filter_map(|row| row.products.map(ProductRow::into_product))
            .collect())
    }

    #[instrument(skip(self), fields(user_id = %self.user.id))]
    async fn add(&self, product_id: ProductId) -> Result<()> {
        if self.is_favorite(product_id).await? {
            return Ok(());
        }

        match self
            .client
            .table("favorites")
            .auth(&self.user.access_token)
            .insert(&FavoriteInsert {
                user_id: self.user.id,
                product_id,
            })
            .await
        {
            Ok(()) => Ok(()),
            // Saved concurrently from another tab
            Err(e) if e.is_unique_violation() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self), fields(user_id = %self.user.id))]
    async fn remove(&self, product_id: ProductId) -> Result<()> {
        self.client
            .table("favorites")
            .auth(&self.user.access_token)
            .eq("user_id", self.user.id)
            .eq("product_id", product_id)
            .delete()
            .await?;
        Ok(())
    }
}
