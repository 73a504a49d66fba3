//! Client-side input rules.
//!
//! The backend enforces ownership and uniqueness; these are the simple UI
//! constraints checked before a request is made.

use thiserror::Error;

use crate::types::Price;

/// Maximum number of images on one listing.
pub const MAX_PRODUCT_IMAGES: usize = 5;

/// Accepted rating range for sellers and products.
pub const RATING_RANGE: core::ops::RangeInclusive<u8> = 1..=5;

/// A rejected input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Maximum 5 images allowed")]
    TooManyImages,
    #[error("At least one image is required")]
    NoImages,
    #[error("Rating must be between 1 and 5 (got {0})")]
    RatingOutOfRange(u8),
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    #[error("Price cannot be negative")]
    NegativePrice,
}

/// Check a listing's image list.
///
/// # Errors
///
/// Returns [`ValidationError::TooManyImages`] above the limit, and
/// [`ValidationError::NoImages`] when `require_one` is set and the list is
/// empty.
pub fn validate_images(images: &[String], require_one: bool) -> Result<(), ValidationError> {
    if images.len() > MAX_PRODUCT_IMAGES {
        return Err(ValidationError::TooManyImages);
    }
    if require_one && images.is_empty() {
        return Err(ValidationError::NoImages);
    }
    Ok(())
}

/// Check a 1-5 star rating.
///
/// # Errors
///
/// Returns [`ValidationError::RatingOutOfRange`] outside 1..=5.
pub fn validate_rating(rating: u8) -> Result<(), ValidationError> {
    if RATING_RANGE.contains(&rating) {
        Ok(())
    } else {
        Err(ValidationError::RatingOutOfRange(rating))
    }
}

/// Check that a text field has visible content.
///
/// # Errors
///
/// Returns [`ValidationError::Empty`] naming `field` when blank.
pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Empty(field))
    } else {
        Ok(())
    }
}

/// Check a listing price.
///
/// # Errors
///
/// Returns [`ValidationError::NegativePrice`] below zero.
pub fn validate_price(price: Price) -> Result<(), ValidationError> {
    if price.is_negative() {
        Err(ValidationError::NegativePrice)
    } else {
        Ok(())
    }
}

/// Category slug: lowercased, whitespace runs collapsed to `-`.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
