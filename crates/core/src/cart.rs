//! The shopping cart.
//!
//! A cart is an ordered list of lines, unique by product id. It lives in the
//! buyer's session only; nothing is persisted until checkout turns each line
//! into an order.

use serde::{Deserialize, Serialize};

use crate::models::Product;
use crate::types::{Price, ProductId, UserId};

/// Minimum quantity of any cart line.
pub const MIN_QUANTITY: u32 = 1;

/// Listing snapshot kept in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProduct {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub seller_id: UserId,
    #[serde(default)]
    pub image: Option<String>,
}

impl From<&Product> for CartProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            price: product.price,
            seller_id: product.seller_id,
            image: product.primary_image().map(str::to_owned),
        }
    }
}

/// One (product, quantity) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: CartProduct,
    pub quantity: u32,
}

impl CartLine {
    /// Price × quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Delivery choice at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingOption {
    #[default]
    Standard,
    Express,
}

impl ShippingOption {
    /// Flat delivery fee in rubles.
    #[must_use]
    pub fn cost(self) -> Price {
        match self {
            Self::Standard => Price::rubles(400),
            Self::Express => Price::rubles(1000),
        }
    }
}

/// Totals shown on the checkout step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub item_count: u32,
    pub subtotal: Price,
    pub shipping: ShippingOption,
    pub shipping_cost: Price,
    pub total: Price,
}

/// In-session shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add a product. An existing line for the same product grows by
    /// `quantity`; otherwise a new line is appended. A zero quantity counts
    /// as one.
    pub fn add(&mut self, product: CartProduct, quantity: u32) {
        let quantity = quantity.max(MIN_QUANTITY);
        if let Some(line) = self.line_mut(product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            line.product = product;
        } else {
            self.lines.push(CartLine { product, quantity });
        }
    }

    /// Set a line's quantity, clamped at [`MIN_QUANTITY`].
    ///
    /// Returns `false` when the product is not in the cart.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) -> bool {
        self.line_mut(product_id).is_some_and(|line| {
            line.quantity = quantity.max(MIN_QUANTITY);
            true
        })
    }

    /// Remove a product's line. Returns `false` when it was not present.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product.id != product_id);
        self.lines.len() != before
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of price × quantity across all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Checkout totals for a shipping choice.
    #[must_use]
    pub fn summary(&self, shipping: ShippingOption) -> CartSummary {
        let subtotal = self.total();
        let shipping_cost = shipping.cost();
        CartSummary {
            item_count: self.item_count(),
            subtotal,
            shipping,
            shipping_cost,
            total: subtotal + shipping_cost,
        }
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product.id == product_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(price: i64) -> CartProduct {
        CartProduct {
            id: ProductId::random(),
            title: format!("item {price}"),
            price: Price::rubles(price),
            seller_id: UserId::random(),
            image: None,
        }
    }

    #[test]
    fn test_add_is_unique_by_product() {
        let mut cart = Cart::new();
        let lamp = product(1200);
        cart.add(lamp.clone(), 1);
        cart.add(lamp.clone(), 2);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let mut cart = Cart::new();
        let first = product(100);
        let second = product(200);
        cart.add(first.clone(), 1);
        cart.add(second.clone(), 1);
        cart.add(first.clone(), 1);

        let ids: Vec<_> = cart.lines().iter().map(|l| l.product.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn test_add_zero_counts_as_one() {
        let mut cart = Cart::new();
        cart.add(product(50), 0);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_quantity_never_below_one() {
        let mut cart = Cart::new();
        let chair = product(3000);
        cart.add(chair.clone(), 4);

        assert!(cart.update_quantity(chair.id, 0));
        assert_eq!(cart.lines()[0].quantity, 1);

        assert!(cart.update_quantity(chair.id, 7));
        assert_eq!(cart.lines()[0].quantity, 7);
    }

    #[test]
    fn test_update_unknown_product() {
        let mut cart = Cart::new();
        assert!(!cart.update_quantity(ProductId::random(), 3));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_is_sum_of_lines() {
        let mut cart = Cart::new();
        cart.add(product(1500), 2);
        cart.add(
            CartProduct {
                price: Price::new(Decimal::new(99_90, 2)),
                ..product(0)
            },
            3,
        );

        let expected: Price = cart.lines().iter().map(|l| l.product.price * l.quantity).sum();
        assert_eq!(cart.total(), expected);
        assert_eq!(cart.total(), Price::new(Decimal::new(3299_70, 2)));
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        let a = product(10);
        let b = product(20);
        cart.add(a.clone(), 1);
        cart.add(b.clone(), 1);

        assert!(cart.remove(a.id));
        assert!(!cart.remove(a.id));
        assert_eq!(cart.total(), Price::rubles(20));

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_summary_adds_shipping() {
        let mut cart = Cart::new();
        cart.add(product(1000), 2);

        let standard = cart.summary(ShippingOption::Standard);
        assert_eq!(standard.subtotal, Price::rubles(2000));
        assert_eq!(standard.total, Price::rubles(2400));

        let express = cart.summary(ShippingOption::Express);
        assert_eq!(express.shipping_cost, Price::rubles(1000));
        assert_eq!(express.total, Price::rubles(3000));
    }

    #[test]
    fn test_cart_serde_roundtrip_for_session() {
        let mut cart = Cart::new();
        cart.add(product(700), 2);
        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }
}
