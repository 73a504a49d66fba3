//! Listings, product images and categories.
//!
//! Product rows are fetched with their seller profile and category embedded
//! and flattened into [`Product`]. Categories change rarely and are cached
//! in memory for five minutes.

use std::sync::Arc;
use std::time::Duration;

use bazaar_core::models::{ANONYMOUS_NAME, Category, Product, ProductReview, fallback_avatar};
use bazaar_core::validation::{require_text, validate_images, validate_price};
use bazaar_core::{CategoryId, Price, ProductId, ProductStatus, UserId};
use bazaar_supabase::{SupabaseClient, Table};
use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use super::{IdRow, Result, SellerRow, ServiceError, content_type_for, random_file_name};
use crate::models::CurrentUser;

/// Listing columns with seller and category embeds.
pub(crate) const PRODUCT_SELECT: &str = "
    *,
    profiles!products_seller_id_fkey(id, name, avatar_url, avg_rating, total_ratings),
    categories!products_category_id_fkey(id, name, slug)
";

/// Detail view: adds the seller's bio and the listing's reviews.
const PRODUCT_DETAIL_SELECT: &str = "
    *,
    profiles!products_seller_id_fkey(id, name, avatar_url, avg_rating, total_ratings, bio),
    categories!products_category_id_fkey(id, name, slug),
    product_reviews(
        id, rating, review, created_at,
        buyer:profiles!product_reviews_buyer_id_fkey(name, avatar_url)
    )
";

const IMAGE_BUCKET: &str = "products";

/// A `products` row with its embeds, as returned by the backend.
#[derive(Debug, Deserialize)]
pub(crate) struct ProductRow {
    id: ProductId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    price: Price,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    images: Vec<String>,
    seller_id: UserId,
    #[serde(default)]
    status: ProductStatus,
    created_at: DateTime<Utc>,
    #[serde(default)]
    avg_rating: Option<f64>,
    #[serde(default)]
    total_reviews: Option<i64>,
    #[serde(default)]
    profiles: Option<SellerEmbed>,
    #[serde(default)]
    categories: Option<CategoryEmbed>,
    #[serde(default)]
    product_reviews: Option<Vec<ProductReview>>,
}

#[derive(Debug, Deserialize)]
struct SellerEmbed {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    avg_rating: Option<f64>,
    #[serde(default)]
    total_ratings: Option<i64>,
    #[serde(default)]
    bio: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryEmbed {
    name: String,
    slug: String,
}

impl ProductRow {
    /// Flatten the row and its embeds. A missing seller profile shows as the
    /// anonymous placeholder; missing ratings count as zero.
    pub(crate) fn into_product(self) -> Product {
        let seller = self.profiles.unwrap_or(SellerEmbed {
            name: None,
            avatar_url: None,
            avg_rating: None,
            total_ratings: None,
            bio: None,
        });
        let (category, category_slug) = match self.categories {
            Some(c) => (c.name, c.slug),
            None => (self.category.unwrap_or_default(), String::new()),
        };

        Product {
            id: self.id,
            title: self.title,
            description: self.description.unwrap_or_default(),
            price: self.price,
            category,
            category_slug,
            images: self.images,
            seller_id: self.seller_id,
            seller_avatar: seller
                .avatar_url
                .unwrap_or_else(|| fallback_avatar(seller.name.as_deref())),
            seller_name: seller.name.unwrap_or_else(|| ANONYMOUS_NAME.to_string()),
            seller_rating: seller.avg_rating.unwrap_or(0.0),
            seller_total_ratings: seller.total_ratings.unwrap_or(0),
            seller_bio: seller.bio,
            rating: self.avg_rating.unwrap_or(0.0),
            review_count: self.total_reviews.unwrap_or(0),
            reviews: self.product_reviews,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// Input for a new listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    pub category_id: CategoryId,
    pub images: Vec<String>,
}

/// Partial listing update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ProductInsert<'a> {
    title: &'a str,
    description: &'a str,
    price: Price,
    category: &'a str,
    category_id: CategoryId,
    images: &'a [String],
    seller_id: UserId,
    status: ProductStatus,
}

#[derive(Debug, Default, Serialize)]
struct ProductPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<&'a [String]>,
}

/// Listings carry no `updated_at` column.
#[derive(Debug, Serialize)]
struct StatusPatch {
    status: ProductStatus,
}

/// Body of the admin product-status function.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusRequest {
    product_id: ProductId,
    status: ProductStatus,
}

#[derive(Debug, Deserialize)]
struct CategoryName {
    name: String,
}

/// Listing queries and mutations.
///
/// Reads run anonymously unless a token is attached with
/// [`ProductService::with_token`]; sellers need that to see their own
/// listings that are no longer active.
pub struct ProductService<'a> {
    client: &'a SupabaseClient,
    access_token: Option<&'a str>,
}

impl<'a> ProductService<'a> {
    #[must_use]
    pub const fn new(client: &'a SupabaseClient) -> Self {
        Self {
            client,
            access_token: None,
        }
    }

    /// Run reads as the owner of `access_token`.
    #[must_use]
    pub const fn with_token(mut self, access_token: &'a str) -> Self {
        self.access_token = Some(access_token);
        self
    }

    fn table(&self, name: &str) -> Table {
        let table = self.client.table(name);
        match self.access_token {
            Some(token) => table.auth(token),
            None => table,
        }
    }

    /// Active listings, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<Product>> {
        let rows: Vec<ProductRow> = self
            .table("products")
            .select(PRODUCT_SELECT)
            .eq("status", ProductStatus::Active)
            .order("created_at", false)
            .fetch()
            .await?;
        Ok(rows.into_iter().map(ProductRow::into_product).collect())
    }

    /// All of a seller's listings in any status, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self))]
    pub async fn list_by_seller(&self, seller_id: UserId) -> Result<Vec<Product>> {
        let rows: Vec<ProductRow> = self
            .table("products")
            .select(PRODUCT_SELECT)
            .eq("seller_id", seller_id)
            .order("created_at", false)
            .fetch()
            .await?;
        Ok(rows.into_iter().map(ProductRow::into_product).collect())
    }

    /// One listing with its seller's bio and its reviews.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if there is no such listing.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Product> {
        let row: ProductRow = self
            .table("products")
            .select(PRODUCT_DETAIL_SELECT)
            .eq("id", id)
            .fetch_one()
            .await
            .map_err(ServiceError::or_not_found("Product"))?;
        Ok(row.into_product())
    }

    /// Create an active listing owned by `user`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank title, a negative price or an
    /// image count outside 1..=5, and `ServiceError::NotFound` when the user
    /// has no profile or the category does not exist.
    #[instrument(skip(self, user, input), fields(user_id = %user.id))]
    pub async fn create(&self, user: &CurrentUser, input: NewProduct) -> Result<Product> {
        require_text("title", &input.title)?;
        validate_price(input.price)?;
        validate_images(&input.images, true)?;

        let _profile: IdRow<UserId> = self
            .client
            .table("profiles")
            .auth(&user.access_token)
            .select("id")
            .eq("id", user.id)
            .fetch_one()
            .await
            .map_err(ServiceError::or_not_found("Profile"))?;

        let category = self.category_name(input.category_id).await?;

        let row: ProductRow = self
            .client
            .table("products")
            .auth(&user.access_token)
            .select(PRODUCT_SELECT)
            .insert_returning(&ProductInsert {
                title: input.title.trim(),
                description: &input.description,
                price: input.price,
                category: &category,
                category_id: input.category_id,
                images: &input.images,
                seller_id: user.id,
                status: ProductStatus::Active,
            })
            .await?;
        Ok(row.into_product())
    }

    /// Update a listing owned by `user`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for an unknown listing or category,
    /// `ServiceError::Forbidden` when `user` is not the seller, and a
    /// validation error for more than five images.
    #[instrument(skip(self, user, changes), fields(user_id = %user.id))]
    pub async fn update(
        &self,
        user: &CurrentUser,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Product> {
        if let Some(title) = &changes.title {
            require_text("title", title)?;
        }
        if let Some(price) = changes.price {
            validate_price(price)?;
        }
        if let Some(images) = &changes.images {
            validate_images(images, false)?;
        }

        if self.seller_of(id).await? != user.id {
            return Err(ServiceError::Forbidden(
                "Unauthorized to update this product".to_string(),
            ));
        }

        let category = match changes.category_id {
            Some(category_id) => Some(self.category_name(category_id).await?),
            None => None,
        };

        let patch = ProductPatch {
            title: changes.title.as_deref().map(str::trim),
            description: changes.description.as_deref(),
            price: changes.price,
            category,
            category_id: changes.category_id,
            images: changes.images.as_deref(),
        };

        let rows: Vec<ProductRow> = self
            .client
            .table("products")
            .auth(&user.access_token)
            .select(PRODUCT_SELECT)
            .eq("id", id)
            .eq("seller_id", user.id)
            .update_returning(&patch)
            .await?;
        rows.into_iter()
            .next()
            .map(ProductRow::into_product)
            .ok_or(ServiceError::NotFound("Product"))
    }

    /// Remove a listing from sale.
    ///
    /// Admins go through the product-status function at `status_function`;
    /// sellers mark their own listing deleted.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for an unknown listing and
    /// `ServiceError::Forbidden` when `user` is neither an admin nor the
    /// seller.
    #[instrument(skip(self, user, status_function), fields(user_id = %user.id))]
    pub async fn delete(
        &self,
        user: &CurrentUser,
        id: ProductId,
        status_function: &Url,
    ) -> Result<()> {
        if user.is_admin {
            let _: serde_json::Value = self
                .client
                .functions()
                .invoke_url(
                    status_function.clone(),
                    &user.access_token,
                    &StatusRequest {
                        product_id: id,
                        status: ProductStatus::Deleted,
                    },
                )
                .await
                .map_err(ServiceError::or_not_found("Product"))?;
            return Ok(());
        }

        if self.seller_of(id).await? != user.id {
            return Err(ServiceError::Forbidden(
                "Unauthorized to delete this product".to_string(),
            ));
        }

        self.client
            .table("products")
            .auth(&user.access_token)
            .eq("id", id)
            .eq("seller_id", user.id)
            .update(&StatusPatch {
                status: ProductStatus::Deleted,
            })
            .await?;
        Ok(())
    }

    /// Store a listing image and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload is rejected.
    #[instrument(skip(self, user, bytes), fields(user_id = %user.id, size = bytes.len()))]
    pub async fn upload_image(
        &self,
        user: &CurrentUser,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: Option<&str>,
    ) -> Result<String> {
        let path = format!("products/{}", random_file_name(file_name, None));
        let storage = self
            .client
            .storage(IMAGE_BUCKET)
            .auth(&user.access_token);
        storage
            .upload(&path, bytes, &content_type_for(file_name, content_type))
            .await?;
        Ok(storage.public_url(&path)?.to_string())
    }

    async fn seller_of(&self, id: ProductId) -> Result<UserId> {
        let row: SellerRow = self
            .table("products")
            .select("seller_id")
            .eq("id", id)
            .fetch_one()
            .await
            .map_err(ServiceError::or_not_found("Product"))?;
        Ok(row.seller_id)
    }

    async fn category_name(&self, id: CategoryId) -> Result<String> {
        let row: CategoryName = self
            .table("categories")
            .select("name")
            .eq("id", id)
            .fetch_one()
            .await
            .map_err(ServiceError::or_not_found("Category"))?;
        Ok(row.name)
    }
}

/// Categories ordered by name, cached for five minutes.
#[derive(Clone)]
pub struct CategoryCache {
    cache: Cache<&'static str, Arc<Vec<Category>>>,
}

impl CategoryCache {
    const KEY: &'static str = "categories";

    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(300))
                .build(),
        }
    }

    /// All categories, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails on a cache miss.
    #[instrument(skip_all)]
    pub async fn categories(&self, client: &SupabaseClient) -> Result<Arc<Vec<Category>>> {
        if let Some(categories) = self.cache.get(&Self::KEY).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = client
            .table("categories")
            .select("*")
            .order("name", true)
            .fetch()
            .await?;
        let categories = Arc::new(categories);

        self.cache.insert(Self::KEY, Arc::clone(&categories)).await;
        Ok(categories)
    }

    /// Drop the cached list so the next read refetches.
    pub async fn invalidate(&self) {
        self.cache.invalidate(&Self::KEY).await;
    }
}

impl Default for CategoryCache {
    fn default() -> Self {
        Self::new()
    }
}
