//! User profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::product::{ANONYMOUS_NAME, fallback_avatar};
use crate::types::{UserId, UserStatus};

/// Public profile row. Shares its id with the auth user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_ratings: Option<i64>,
}

impl Profile {
    /// Name to show, falling back to the anonymous placeholder.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(ANONYMOUS_NAME)
    }

    /// Uploaded avatar or a generated initials avatar.
    #[must_use]
    pub fn avatar(&self) -> String {
        self.avatar_url
            .clone()
            .unwrap_or_else(|| fallback_avatar(self.name.as_deref()))
    }
}

/// Partial profile update. Absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ProfileUpdate {
    /// Whether the update would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.avatar_url.is_none()
            && self.bio.is_none()
            && self.location.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_defaults_when_columns_missing() {
        let profile: Profile = serde_json::from_value(serde_json::json!({
            "id": "6f1c2a0e-8b3d-4f5e-9a7b-1c2d3e4f5a6b",
            "created_at": "2024-03-01T10:00:00Z",
            "updated_at": "2024-03-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(profile.status, UserStatus::Active);
        assert!(!profile.is_admin);
        assert_eq!(profile.display_name(), ANONYMOUS_NAME);
        assert!(profile.avatar().starts_with("https://api.dicebear.com/"));
    }

    #[test]
    fn test_profile_update_skips_absent_fields() {
        let update = ProfileUpdate {
            bio: Some("Продаю винтаж".to_string()),
            ..ProfileUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "bio": "Продаю винтаж" }));
        assert!(!update.is_empty());
        assert!(ProfileUpdate::default().is_empty());
    }
}
