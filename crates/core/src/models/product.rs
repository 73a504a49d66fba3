//! Product listing view model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PersonSummary;
use crate::types::{Price, ProductId, ProductStatus, ReviewId, UserId};

/// Shown in place of a seller or buyer who never set a display name.
pub const ANONYMOUS_NAME: &str = "Аноним";

/// Generated initials avatar for users without an uploaded picture.
#[must_use]
pub fn fallback_avatar(name: Option<&str>) -> String {
    let seed = name.unwrap_or(ANONYMOUS_NAME);
    format!("https://api.dicebear.com/7.x/initials/svg?seed={}", seed.replace(' ', "%20"))
}

/// A listing flattened for display: category and seller columns are copied
/// in from their joined rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub category_slug: String,
    pub images: Vec<String>,
    pub seller_id: UserId,
    pub seller_name: String,
    pub seller_avatar: String,
    pub seller_rating: f64,
    pub seller_total_ratings: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_bio: Option<String>,
    pub rating: f64,
    pub review_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<ProductReview>>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// First image, used as the thumbnail.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether the listing can still be bought.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == ProductStatus::Active
    }
}

/// A buyer's review of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductReview {
    pub id: ReviewId,
    pub rating: u8,
    #[serde(default)]
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub buyer: Option<PersonSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_avatar_uses_name() {
        assert_eq!(
            fallback_avatar(Some("Olga Petrova")),
            "https://api.dicebear.com/7.x/initials/svg?seed=Olga%20Petrova"
        );
    }

    #[test]
    fn test_fallback_avatar_anonymous() {
        assert!(fallback_avatar(None).ends_with("seed=Аноним"));
    }
}
