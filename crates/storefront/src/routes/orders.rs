//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use bazaar_core::OrderId;
use bazaar_core::models::{NewProductReview, NewSellerRating};
use serde::Deserialize;
use tracing::{info, instrument};

use super::ok;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::orders::OrderService;
use crate::state::AppState;

/// Buyer's rating of a finished order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
    pub seller_rating: NewSellerRating,
    pub product_review: NewProductReview,
}

/// Orders the user bought or sold.
///
/// GET /api/orders
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let orders = OrderService::new(state.supabase(), &user).list().await?;
    Ok(ok(orders))
}

/// Seller marks an order completed.
///
/// POST /api/orders/{id}/complete
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn complete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    OrderService::new(state.supabase(), &user)
        .complete(id)
        .await?;
    Ok(ok(()))
}

/// Buyer rates the seller and reviews the product.
///
/// POST /api/orders/{id}/rate
#[instrument(skip(state, user, request), fields(user_id = %user.id))]
pub async fn rate(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
    Json(request): Json<RateRequest>,
) -> Result<impl IntoResponse> {
    OrderService::new(state.supabase(), &user)
        .rate(id, &request.seller_rating, &request.product_review)
        .await?;
    info!(order_id = %id, "Order rated");
    Ok(ok(()))
}
