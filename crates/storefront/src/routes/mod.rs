//! HTTP route handlers for storefront.
//!
//! Every handler answers JSON. Success bodies are `{"success": true,
//! "data": ...}`; failures come from [`AppError`](crate::error::AppError).
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Health check
//!
//! # Auth (rate limited)
//! POST /api/auth/login                  - Sign in
//! POST /api/auth/register               - Sign up
//! POST /api/auth/logout                 - Sign out
//! POST /api/auth/refresh                - Refresh backend tokens
//! GET  /api/auth/me                     - Current user and profile
//!
//! # Catalog
//! GET  /api/products                    - Active listings
//! POST /api/products                    - Create listing (auth)
//! GET  /api/products/{id}               - Listing detail with reviews
//! PUT  /api/products/{id}               - Update own listing (auth)
//! DELETE /api/products/{id}             - Delete listing (owner or admin)
//! POST /api/products/images             - Upload listing images (multipart)
//! GET  /api/categories                  - Categories
//! GET  /api/sellers/{id}                - Seller page
//! GET  /api/me/products                 - Own listings, any status (auth)
//!
//! # Profile (auth)
//! GET  /api/profile                     - Own profile
//! PUT  /api/profile                     - Update own profile
//! POST /api/profile/avatar              - Upload avatar (multipart)
//!
//! # Cart (session)
//! GET  /api/cart                        - Cart with summary
//! POST /api/cart/add | /update | /remove | /clear
//! POST /api/cart/checkout               - One order per line (auth)
//!
//! # Favorites (auth)
//! GET  /api/favorites
//! POST /api/favorites/{product_id}
//! DELETE /api/favorites/{product_id}
//!
//! # Orders (auth)
//! GET  /api/orders
//! POST /api/orders/{id}/complete        - Seller completes
//! POST /api/orders/{id}/rate            - Buyer rates
//!
//! # Chat (auth)
//! GET  /api/conversations
//! POST /api/conversations               - Start or reopen
//! POST /api/conversations/{id}/activate - Open and mark read
//! GET  /api/conversations/active/messages
//! POST /api/conversations/active/messages
//! DELETE /api/conversations/active      - Close
//!
//! # Reports (auth)
//! POST /api/reports
//! ```

pub mod auth;
pub mod cart;
pub mod chat;
pub mod favorites;
pub mod orders;
pub mod products;
pub mod profile;
pub mod reports;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart},
    routing::{delete, get, post},
};
use bazaar_core::validation::MAX_PRODUCT_IMAGES;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Upper bound for multipart upload bodies (5 images of up to 5 MB each).
const UPLOAD_BODY_LIMIT: usize = 25 * 1024 * 1024;

/// Maximum images accepted in one listing upload.
pub(crate) const MAX_UPLOAD_FILES: usize = MAX_PRODUCT_IMAGES;

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Wrap `data` in a success envelope.
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}

/// A file read from a multipart body.
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Read every file part of a multipart body, up to `max` files.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for a malformed body, no files, or more
/// than `max` files.
pub async fn read_uploads(mut multipart: Multipart, max: usize) -> Result<Vec<Upload>> {
    let mut uploads = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid upload: {e}")))?
    {
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        if uploads.len() == max {
            return Err(AppError::BadRequest(format!("Maximum {max} files allowed")));
        }
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid upload: {e}")))?;
        uploads.push(Upload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    if uploads.is_empty() {
        return Err(AppError::BadRequest("No file uploaded".to_string()));
    }
    Ok(uploads)
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/refresh", post(auth::refresh))
        .layer(auth_rate_limiter())
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route(
            "/images",
            post(products::upload_images).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/checkout", post(cart::checkout))
}

/// Create the conversation routes router.
pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(chat::index).post(chat::start))
        .route("/{id}/activate", post(chat::activate))
        .route("/active", delete(chat::close))
        .route(
            "/active/messages",
            get(chat::messages).post(chat::send),
        )
}

/// Create the rest of the JSON API.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .route("/categories", get(products::categories))
        .route("/sellers/{id}", get(profile::seller))
        .route("/me/products", get(products::mine))
        .route("/profile", get(profile::show).put(profile::update))
        .route(
            "/profile/avatar",
            post(profile::upload_avatar).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .nest("/cart", cart_routes())
        .route("/favorites", get(favorites::index))
        .route(
            "/favorites/{product_id}",
            post(favorites::add).delete(favorites::remove),
        )
        .route("/orders", get(orders::index))
        .route("/orders/{id}/complete", post(orders::complete))
        .route("/orders/{id}/rate", post(orders::rate))
        .nest("/conversations", chat_routes())
        .route("/reports", post(reports::create))
        .layer(api_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api", api_routes())
}
