//! Data-access collaborators.
//!
//! Each service wraps the filtered and joined backend queries for one area
//! and reshapes rows into the view models in `bazaar_core::models`. Requests
//! made on behalf of a signed-in user carry that user's access token so the
//! backend's row-level security applies.
//!
//! # Services
//!
//! - `auth` - Sign in, sign up, token refresh, profile lookup
//! - `products` - Catalog, listing CRUD, image upload, categories
//! - `orders` - Orders, completion, ratings, checkout
//! - `favorites` - Saved listings
//! - `chat` - Buyer/seller conversations
//! - `reports` - Abuse reports
//! - `profile` - Profiles, avatars, seller pages

pub mod auth;
pub mod chat;
pub mod favorites;
pub mod orders;
pub mod products;
pub mod profile;
pub mod reports;

use bazaar_core::validation::ValidationError;
use bazaar_supabase::SupabaseError;
use serde::Deserialize;
use thiserror::Error;

use bazaar_core::UserId;

/// Errors returned by the data-access services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Backend request failed.
    #[error("Backend error: {0}")]
    Backend(#[from] SupabaseError),

    /// Input rejected before reaching the backend.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A referenced row does not exist (or is hidden by row-level security).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The caller may not perform this action.
    #[error("{0}")]
    Forbidden(String),

    /// The action conflicts with existing data.
    #[error("{0}")]
    Conflict(String),

    /// The request is not valid in the current state.
    #[error("{0}")]
    BadRequest(String),
}

impl ServiceError {
    /// Map a backend "no such row" to [`ServiceError::NotFound`].
    pub(crate) fn or_not_found(what: &'static str) -> impl FnOnce(SupabaseError) -> Self {
        move |err| {
            if err.is_not_found() {
                Self::NotFound(what)
            } else {
                Self::Backend(err)
            }
        }
    }
}

/// Result type alias for services.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// `select=id`
#[derive(Debug, Deserialize)]
pub(crate) struct IdRow<T> {
    pub id: T,
}

/// `select=seller_id`
#[derive(Debug, Deserialize)]
pub(crate) struct SellerRow {
    pub seller_id: UserId,
}

/// Storage object name for an uploaded file: a random stem with the
/// original extension, lowercased. Names without an extension get `bin`.
pub(crate) fn random_file_name(original: &str, prefix: Option<&str>) -> String {
    let ext = original
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or_else(|| "bin".to_string(), str::to_ascii_lowercase);
    let stem = format!("{:016x}", rand::random::<u64>());
    match prefix {
        Some(prefix) => format!("{prefix}-{stem}.{ext}"),
        None => format!("{stem}.{ext}"),
    }
}

/// Content type for an upload, preferring what the client sent.
pub(crate) fn content_type_for(file_name: &str, declared: Option<&str>) -> String {
    if let Some(declared) = declared.filter(|d| !d.is_empty() && *d != "application/octet-stream") {
        return declared.to_string();
    }
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_file_name_keeps_extension() {
        let name = random_file_name("Photo.JPG", None);
        assert!(name.ends_with(".jpg"));
        assert_eq!(name.len(), 16 + ".jpg".len());
        assert_ne!(name, random_file_name("Photo.JPG", None));
    }

    #[test]
    fn test_random_file_name_with_prefix() {
        let name = random_file_name("me.png", Some("5f1e"));
        assert!(name.starts_with("5f1e-"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn test_random_file_name_without_extension() {
        assert!(random_file_name("README", None).ends_with(".bin"));
        assert!(random_file_name("evil.../x", None).ends_with(".bin"));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.jpeg", None), "image/jpeg");
        assert_eq!(content_type_for("a.webp", Some("")), "image/webp");
        assert_eq!(content_type_for("a.bin", Some("image/png")), "image/png");
        assert_eq!(content_type_for("a", None), "application/octet-stream");
    }

    #[test]
    fn test_or_not_found() {
        let err = ServiceError::or_not_found("Product")(SupabaseError::NotFound("x".into()));
        assert!(matches!(err, ServiceError::NotFound("Product")));
        assert_eq!(err.to_string(), "Product not found");

        let err = ServiceError::or_not_found("Product")(SupabaseError::RateLimited(1));
        assert!(matches!(err, ServiceError::Backend(_)));
    }
}
