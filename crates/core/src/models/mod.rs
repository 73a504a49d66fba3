//! Marketplace entities and view models.
//!
//! Records mirror backend tables. Joined rows are flattened at read time
//! (a [`Product`] carries its seller's name, avatar and rating), and the
//! copies held here have no consistency guarantees beyond "last fetch wins".

pub mod category;
pub mod chat;
pub mod order;
pub mod product;
pub mod profile;
pub mod report;

pub use category::{Category, NewCategory};
pub use chat::{Conversation, Message, summarize_messages};
pub use order::{
    NewProductReview, NewSellerRating, Order, OrderProduct, RatingSummary, ReviewSummary,
    SellerRating,
};
pub use product::{Product, ProductReview, fallback_avatar, ANONYMOUS_NAME};
pub use profile::{Profile, ProfileUpdate};
pub use report::Report;

use serde::{Deserialize, Serialize};

use crate::types::{ProductId, UserId};

/// Name and avatar of another user, as embedded in orders and reviews.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersonSummary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Identified participant, as embedded in conversations and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Minimal listing reference shown next to conversations and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductThumb {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Embedded relations come back as an array, a single object or `null`
/// depending on the foreign key's cardinality. All three become a `Vec`.
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
    })
}
