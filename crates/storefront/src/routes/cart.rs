//! Cart route handlers.
//!
//! The cart lives in the session. Checkout turns every line into an order
//! and empties the cart only when all orders were placed.

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use bazaar_core::{Cart, CartLine, CartProduct, CartSummary, OrderId, ProductId, ShippingOption};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, instrument};

use super::ok;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::orders::OrderService;
use crate::services::products::ProductService;
use crate::state::AppState;
use crate::stores::cart::{get_cart, set_cart};

/// Shipping choice for the summary.
#[derive(Debug, Default, Deserialize)]
pub struct ShippingQuery {
    #[serde(default)]
    pub shipping: ShippingOption,
}

/// Add-to-cart request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRequest {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: u32,
}

const fn one() -> u32 {
    1
}

/// Quantity change request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Line removal request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveRequest {
    pub product_id: ProductId,
}

/// Cart as shown to the client.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub summary: CartSummary,
}

impl CartView {
    fn new(cart: &Cart, shipping: ShippingOption) -> Self {
        Self {
            items: cart.lines().to_vec(),
            summary: cart.summary(shipping),
        }
    }
}

/// Orders placed at checkout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub order_ids: Vec<OrderId>,
}

/// Show the cart.
///
/// GET /api/cart?shipping=standard|express
#[instrument(skip(session))]
pub async fn show(
    session: Session,
    Query(query): Query<ShippingQuery>,
) -> Result<impl IntoResponse> {
    let cart = get_cart(&session).await?;
    Ok(ok(CartView::new(&cart, query.shipping)))
}

/// Add a listing to the cart, merging with an existing line.
///
/// POST /api/cart/add
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddRequest>,
) -> Result<impl IntoResponse> {
    let product = ProductService::new(state.supabase())
        .get(request.product_id)
        .await?;
    if !product.is_available() {
        return Err(AppError::BadRequest(
            "Product is no longer available".to_string(),
        ));
    }

    let mut cart = get_cart(&session).await?;
    cart.add(CartProduct::from(&product), request.quantity);
    set_cart(&session, &cart).await?;

    Ok(ok(CartView::new(&cart, ShippingOption::default())))
}

/// Change a line's quantity (never below one).
///
/// POST /api/cart/update
#[instrument(skip(session))]
pub async fn update(session: Session, Json(request): Json<UpdateRequest>) -> Result<impl IntoResponse> {
    let mut cart = get_cart(&session).await?;
    if !cart.update_quantity(request.product_id, request.quantity) {
        return Err(AppError::NotFound("Item not in cart".to_string()));
    }
    set_cart(&session, &cart).await?;
    Ok(ok(CartView::new(&cart, ShippingOption::default())))
}

/// Remove a line.
///
/// POST /api/cart/remove
#[instrument(skip(session))]
pub async fn remove(session: Session, Json(request): Json<RemoveRequest>) -> Result<impl IntoResponse> {
    let mut cart = get_cart(&session).await?;
    if cart.remove(request.product_id) {
        set_cart(&session, &cart).await?;
    }
    Ok(ok(CartView::new(&cart, ShippingOption::default())))
}

/// Empty the cart.
///
/// POST /api/cart/clear
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<impl IntoResponse> {
    let cart = Cart::new();
    set_cart(&session, &cart).await?;
    Ok(ok(CartView::new(&cart, ShippingOption::default())))
}

/// Place one order per line. The cart is kept if any order fails.
///
/// POST /api/cart/checkout
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let mut cart = get_cart(&session).await?;
    let order_ids = OrderService::new(state.supabase(), &user)
        .checkout(&cart)
        .await?;

    cart.clear();
    set_cart(&session, &cart).await?;

    info!(orders = order_ids.len(), "Cart checked out");
    Ok(ok(CheckoutView { order_ids }))
}
