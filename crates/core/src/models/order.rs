//! Orders, seller ratings and product reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PersonSummary;
use crate::types::{OrderId, OrderStatus, Price, ProductId, RatingId, UserId};

/// An order with its product and seller embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: UserId,
    pub product_id: ProductId,
    pub seller_id: UserId,
    pub status: OrderStatus,
    pub total_amount: Price,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub product: Option<OrderProduct>,
    #[serde(default)]
    pub seller: Option<PersonSummary>,
    #[serde(default, deserialize_with = "super::one_or_many")]
    pub seller_rating: Vec<RatingSummary>,
    #[serde(default, deserialize_with = "super::one_or_many")]
    pub product_review: Vec<ReviewSummary>,
}

impl Order {
    /// Whether the buyer has already left a rating for this order.
    #[must_use]
    pub fn is_rated(&self) -> bool {
        !self.seller_rating.is_empty() || !self.product_review.is_empty()
    }

    /// Whether `user` may complete this order (only its seller can).
    #[must_use]
    pub fn can_complete(&self, user: UserId) -> bool {
        self.seller_id == user && self.status == OrderStatus::Pending
    }

    /// Whether `user` may rate this order (only its buyer, once).
    #[must_use]
    pub fn can_rate(&self, user: UserId) -> bool {
        self.buyer_id == user && !self.is_rated()
    }
}

/// Listing columns embedded in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderProduct {
    pub title: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Rating columns embedded in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Review columns embedded in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub rating: u8,
    #[serde(default)]
    pub review: Option<String>,
}

/// A buyer's rating of a seller for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerRating {
    pub id: RatingId,
    pub order_id: OrderId,
    pub seller_id: UserId,
    pub buyer_id: UserId,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Rating submitted by a buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSellerRating {
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Review submitted by a buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProductReview {
    pub rating: u8,
    #[serde(default)]
    pub review: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order_json() -> serde_json::Value {
        serde_json::json!({
            "id": "0a9b8c7d-6e5f-4a3b-8c1d-0e9f8a7b6c5d",
            "buyer_id": "11111111-1111-4111-8111-111111111111",
            "product_id": "22222222-2222-4222-8222-222222222222",
            "seller_id": "33333333-3333-4333-8333-333333333333",
            "status": "pending",
            "total_amount": 2400,
            "created_at": "2024-05-20T09:30:00Z",
            "completed_at": null,
            "product": { "title": "Велосипед", "images": ["a.jpg"] },
            "seller": { "name": "Пётр", "avatar_url": null }
        })
    }

    #[test]
    fn test_order_deserializes_with_missing_embeds() {
        let order: Order = serde_json::from_value(order_json()).unwrap();
        assert_eq!(order.total_amount, Price::rubles(2400));
        assert!(order.seller_rating.is_empty());
        assert!(!order.is_rated());
    }

    #[test]
    fn test_rating_embed_as_object_or_null() {
        let mut json = order_json();
        json["seller_rating"] = serde_json::json!({ "rating": 4, "comment": "ok" });
        json["product_review"] = serde_json::Value::Null;
        let order: Order = serde_json::from_value(json).unwrap();
        assert_eq!(order.seller_rating.len(), 1);
        assert!(order.product_review.is_empty());
        assert!(order.is_rated());

        let mut json = order_json();
        json["product_review"] = serde_json::json!([{ "rating": 5, "review": null }]);
        let order: Order = serde_json::from_value(json).unwrap();
        assert_eq!(order.product_review[0].rating, 5);
    }

    #[test]
    fn test_only_seller_can_complete() {
        let order: Order = serde_json::from_value(order_json()).unwrap();
        assert!(order.can_complete(order.seller_id));
        assert!(!order.can_complete(order.buyer_id));
    }

    #[test]
    fn test_only_buyer_can_rate_once() {
        let mut order: Order = serde_json::from_value(order_json()).unwrap();
        assert!(order.can_rate(order.buyer_id));
        assert!(!order.can_rate(order.seller_id));

        order.seller_rating.push(RatingSummary {
            rating: 5,
            comment: None,
        });
        assert!(!order.can_rate(order.buyer_id));
    }
}
