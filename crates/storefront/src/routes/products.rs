//! Catalog route handlers.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    response::IntoResponse,
};
use bazaar_core::ProductId;
use serde::Serialize;
use tracing::{info, instrument};

use super::{MAX_UPLOAD_FILES, ok, read_uploads};
use crate::error::Result;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::services::products::{NewProduct, ProductChanges, ProductService};
use crate::state::AppState;

/// Public URLs of uploaded images.
#[derive(Debug, Serialize)]
pub struct UploadedImages {
    pub urls: Vec<String>,
}

/// Active listings, newest first.
///
/// GET /api/products
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let products = ProductService::new(state.supabase()).list_active().await?;
    Ok(ok(products))
}

/// Listing detail with seller bio and reviews. Signed-in sellers also see
/// their own listings that are no longer active.
///
/// GET /api/products/{id}
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let mut products = ProductService::new(state.supabase());
    if let Some(user) = &user {
        products = products.with_token(&user.access_token);
    }
    let product = products.get(id).await?;
    Ok(ok(product))
}

/// The signed-in seller's listings in any status.
///
/// GET /api/me/products
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let products = ProductService::new(state.supabase())
        .with_token(&user.access_token)
        .list_by_seller(user.id)
        .await?;
    Ok(ok(products))
}

/// Create a listing.
///
/// POST /api/products
#[instrument(skip(state, user, input), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<NewProduct>,
) -> Result<impl IntoResponse> {
    let product = ProductService::new(state.supabase())
        .with_token(&user.access_token)
        .create(&user, input)
        .await?;
    info!(product_id = %product.id, "Product created");
    Ok(ok(product))
}

/// Update an own listing.
///
/// PUT /api/products/{id}
#[instrument(skip(state, user, changes), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
    Json(changes): Json<ProductChanges>,
) -> Result<impl IntoResponse> {
    let product = ProductService::new(state.supabase())
        .with_token(&user.access_token)
        .update(&user, id, changes)
        .await?;
    Ok(ok(product))
}

/// Delete a listing (owner or admin).
///
/// DELETE /api/products/{id}
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    ProductService::new(state.supabase())
        .with_token(&user.access_token)
        .delete(&user, id, &state.config().admin_function_url)
        .await?;
    info!(product_id = %id, "Product deleted");
    Ok(ok(()))
}

/// Upload up to five listing images.
///
/// POST /api/products/images (multipart)
#[instrument(skip(state, user, multipart), fields(user_id = %user.id))]
pub async fn upload_images(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let uploads = read_uploads(multipart, MAX_UPLOAD_FILES).await?;
    let products = ProductService::new(state.supabase());

    let mut urls = Vec::with_capacity(uploads.len());
    for upload in uploads {
        let url = products
            .upload_image(
                &user,
                upload.bytes,
                &upload.file_name,
                upload.content_type.as_deref(),
            )
            .await?;
        urls.push(url);
    }
    Ok(ok(UploadedImages { urls }))
}

/// All categories, ordered by name.
///
/// GET /api/categories
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = state.categories().categories(state.supabase()).await?;
    Ok(ok(categories.to_vec()))
}
