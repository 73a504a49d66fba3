//! Bazaar Core - Shared types library.
//!
//! This crate provides common types used across all Bazaar components:
//! - `storefront` - Buyer and seller facing marketplace API
//! - `admin` - Admin console and the product status function
//! - `cli` - Operator tools
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients. Rows fetched from the backend are reshaped into the view models
//! in [`models`] by the crates that own the queries.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`models`] - Entities and display-ready view models
//! - [`cart`] - The in-session shopping cart
//! - [`validation`] - Client-side input rules (image limits, ratings, slugs)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod models;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartLine, CartProduct, CartSummary, ShippingOption};
pub use types::*;
