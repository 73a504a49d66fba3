//! Product categories.

use serde::{Deserialize, Serialize};

use crate::types::CategoryId;
use crate::validation::slugify;

/// A catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_count: Option<i64>,
}

/// Insert payload for a new category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewCategory {
    /// Build a category, deriving the slug from the name when none is given.
    #[must_use]
    pub fn new(name: &str, slug: Option<&str>, description: Option<String>) -> Self {
        let name = name.trim().to_owned();
        let slug = slug
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map_or_else(|| slugify(&name), str::to_owned);
        Self {
            name,
            slug,
            description,
        }
    }
}
