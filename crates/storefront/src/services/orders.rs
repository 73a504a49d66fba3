//! Orders, completion, ratings and cart checkout.

use bazaar_core::models::{NewProductReview, NewSellerRating, Order};
use bazaar_core::validation::validate_rating;
use bazaar_core::{Cart, OrderId, OrderStatus, Price, ProductId, ProductStatus, UserId};
use bazaar_supabase::SupabaseClient;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use super::{IdRow, Result, SellerRow, ServiceError};
use crate::models::CurrentUser;

const ORDER_SELECT: &str = "
    *,
    product:products(title, images),
    seller:profiles!orders_seller_id_fkey(name, avatar_url),
    seller_rating:seller_ratings(rating, comment),
    product_review:product_reviews(rating, review)
";

#[derive(Debug, Serialize)]
struct OrderInsert {
    buyer_id: UserId,
    seller_id: UserId,
    product_id: ProductId,
    total_amount: Price,
    status: OrderStatus,
}

#[derive(Debug, Serialize)]
struct CompletePatch {
    status: OrderStatus,
    completed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct SoldPatch {
    status: ProductStatus,
}

#[derive(Debug, Deserialize)]
struct OrderParties {
    seller_id: UserId,
    product_id: ProductId,
}

#[derive(Debug, Serialize)]
struct SellerRatingInsert<'a> {
    order_id: OrderId,
    seller_id: UserId,
    buyer_id: UserId,
    rating: u8,
    comment: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ProductReviewInsert<'a> {
    order_id: OrderId,
    product_id: ProductId,
    buyer_id: UserId,
    rating: u8,
    review: Option<&'a str>,
}

/// Order queries and mutations for one signed-in user.
pub struct OrderService<'a> {
    client: &'a SupabaseClient,
    user: &'a CurrentUser,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(client: &'a SupabaseClient, user: &'a CurrentUser) -> Self {
        Self { client, user }
    }

    /// Place a pending order for `product_id`; the seller is taken from the
    /// listing.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the listing does not exist.
    #[instrument(skip(self), fields(user_id = %self.user.id))]
    pub async fn create(&self, product_id: ProductId, total: Price) -> Result<OrderId> {
        let product: SellerRow = self
            .client
            .table("products")
            .auth(&self.user.access_token)
            .select("seller_id")
            .eq("id", product_id)
            .fetch_one()
            .await
            .map_err(ServiceError::or_not_found("Product"))?;

        let row: IdRow<OrderId> = self
            .client
            .table("orders")
            .auth(&self.user.access_token)
            .select("id")
            .insert_returning(&OrderInsert {
                buyer_id: self.user.id,
                seller_id: product.seller_id,
                product_id,
                total_amount: total,
                status: OrderStatus::Pending,
            })
            .await?;
        Ok(row.id)
    }

    /// Orders the user bought or sold, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self), fields(user_id = %self.user.id))]
    pub async fn list(&self) -> Result<Vec<Order>> {
        let id = self.user.id;
        Ok(self
            .client
            .table("orders")
            .auth(&self.user.access_token)
            .select(ORDER_SELECT)
            .or(&format!("buyer_id.eq.{id},seller_id.eq.{id}"))
            .order("created_at", false)
            .fetch()
            .await?)
    }

    /// Mark an order completed. Only its seller may do this. The listing is
    /// then marked sold; a failure there is logged and does not undo the
    /// completion.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for an unknown order and
    /// `ServiceError::Forbidden` when the user is not its seller.
    #[instrument(skip(self), fields(user_id = %self.user.id))]
    pub async fn complete(&self, order_id: OrderId) -> Result<()> {
        let order: OrderParties = self
            .client
            .table("orders")
            .auth(&self.user.access_token)
            .select("seller_id,product_id")
            .eq("id", order_id)
            .fetch_one()
            .await
            .map_err(ServiceError::or_not_found("Order"))?;

        if order.seller_id != self.user.id {
            return Err(ServiceError::Forbidden(
                "Only the seller can complete this order".to_string(),
            ));
        }

        self.client
            .table("orders")
            .auth(&self.user.access_token)
            .eq("id", order_id)
            .eq("seller_id", self.user.id)
            .update(&CompletePatch {
                status: OrderStatus::Completed,
                completed_at: Utc::now(),
            })
            .await?;

        if let Err(e) = self
            .client
            .table("products")
            .auth(&self.user.access_token)
            .eq("id", order.product_id)
            .update(&SoldPatch {
                status: ProductStatus::Sold,
            })
            .await
        {
            error!(error = %e, product_id = %order.product_id, "Failed to mark product sold");
        }

        info!(%order_id, "Order completed");
        Ok(())
    }

    /// Rate the seller and review the product of an order the user bought.
    /// Both records are written concurrently.
    ///
    /// # Errors
    ///
    /// Returns a validation error for ratings outside 1..=5,
    /// `ServiceError::NotFound` when the user did not buy this order and
    /// `ServiceError::Conflict` if it was already rated.
    #[instrument(skip(self, seller_rating, product_review), fields(user_id = %self.user.id))]
    pub async fn rate(
        &self,
        order_id: OrderId,
        seller_rating: &NewSellerRating,
        product_review: &NewProductReview,
    ) -> Result<()> {
        validate_rating(seller_rating.rating)?;
        validate_rating(product_review.rating)?;

        let order: OrderParties = self
            .client
            .table("orders")
            .auth(&self.user.access_token)
            .select("seller_id,product_id")
            .eq("id", order_id)
            .eq("buyer_id", self.user.id)
            .fetch_one()
            .await
            .map_err(ServiceError::or_not_found("Order"))?;

        let rating = SellerRatingInsert {
            order_id,
            seller_id: order.seller_id,
            buyer_id: self.user.id,
            rating: seller_rating.rating,
            comment: seller_rating.comment.as_deref(),
        };
        let review = ProductReviewInsert {
            order_id,
            product_id: order.product_id,
            buyer_id: self.user.id,
            rating: product_review.rating,
            review: product_review.review.as_deref(),
        };

        let ratings = self.client.table("seller_ratings").auth(&self.user.access_token);
        let reviews = self.client.table("product_reviews").auth(&self.user.access_token);

        futures::try_join!(ratings.insert(&rating), reviews.insert(&review)).map_err(|e| {
            if e.is_unique_violation() {
                ServiceError::Conflict("Order already rated".to_string())
            } else {
                ServiceError::Backend(e)
            }
        })?;
        Ok(())
    }

    /// Place one order per cart line, concurrently. Any failure fails the
    /// whole checkout; the caller keeps the cart in that case.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::BadRequest` for an empty cart, or the first
    /// order failure.
    #[instrument(skip(self, cart), fields(user_id = %self.user.id, lines = cart.lines().len()))]
    pub async fn checkout(&self, cart: &Cart) -> Result<Vec<OrderId>> {
        if cart.is_empty() {
            return Err(ServiceError::BadRequest("Cart is empty".to_string()));
        }

        let orders = try_join_all(
            cart.lines()
                .iter()
                .map(|line| self.create(line.product.id, line.line_total())),
        )
        .await?;

        info!(count = orders.len(), "Checkout completed");
        Ok(orders)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_insert_shape() {
        let insert = SellerRatingInsert {
            order_id: OrderId::random(),
            seller_id: UserId::random(),
            buyer_id: UserId::random(),
            rating: 5,
            comment: None,
        };
        let json = serde_json::to_value(&insert).unwrap();
        assert_eq!(json["rating"], 5);
        assert!(json["comment"].is_null());
        assert!(json.get("order_id").is_some());
    }

    #[test]
    fn test_order_insert_is_pending() {
        let insert = OrderInsert {
            buyer_id: UserId::random(),
            seller_id: UserId::random(),
            product_id: ProductId::random(),
            total_amount: Price::rubles(3000),
            status: OrderStatus::Pending,
        };
        let json = serde_json::to_value(&insert).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["total_amount"], 3000.0);
    }
}
