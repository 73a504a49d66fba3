//! Privileged backend access for the console and the status endpoint.
//!
//! Handlers talk to [`AdminBackend`]; production uses
//! [`SupabaseAdminBackend`] with the service role key, tests use in-memory
//! fakes.

use async_trait::async_trait;
use bazaar_core::models::{Category, NewCategory, Participant, Profile, Report};
use bazaar_core::{
    CategoryId, Price, ProductId, ProductStatus, ReportId, ReportStatus, UserId, UserStatus,
};
use bazaar_supabase::{SupabaseClient, SupabaseError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Listing columns with the seller embedded.
const PRODUCT_SELECT: &str = "*, seller:profiles!products_seller_id_fkey(id, name, avatar_url)";

/// Report columns with the listing and reporter embedded.
const REPORT_SELECT: &str = "
    *,
    product:products!reports_product_id_fkey(id, title, images),
    reporter:profiles!reports_reporter_id_fkey(id, name, avatar_url)
";

/// A listing as shown in the console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminProduct {
    pub id: ProductId,
    pub seller_id: UserId,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub seller: Option<Participant>,
}

/// A listing row as stored, every column kept. Returned by status changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub status: ProductStatus,
    #[serde(flatten)]
    pub columns: serde_json::Map<String, serde_json::Value>,
}

/// Privileged operations. Every method bypasses row-level security.
#[async_trait]
pub trait AdminBackend: Send + Sync {
    /// Resolve an access token to its user, `None` if the token is invalid.
    async fn user_for_token(&self, access_token: &str) -> Result<Option<UserId>, SupabaseError>;

    /// Whether the user's profile carries the admin flag.
    async fn is_admin(&self, user_id: UserId) -> Result<bool, SupabaseError>;

    /// All profiles, newest first.
    async fn users(&self) -> Result<Vec<Profile>, SupabaseError>;

    /// All listings with their sellers, newest first.
    async fn products(&self) -> Result<Vec<AdminProduct>, SupabaseError>;

    /// All reports with listing and reporter, newest first.
    async fn reports(&self) -> Result<Vec<Report>, SupabaseError>;

    /// All categories by name.
    async fn categories(&self) -> Result<Vec<Category>, SupabaseError>;

    /// Set an account status. `None` if the user does not exist.
    async fn set_user_status(
        &self,
        user_id: UserId,
        status: UserStatus,
    ) -> Result<Option<Profile>, SupabaseError>;

    /// Grant or revoke the admin flag. `None` if the user does not exist.
    async fn set_admin(
        &self,
        user_id: UserId,
        is_admin: bool,
    ) -> Result<Option<Profile>, SupabaseError>;

    /// Set a listing status. `None` if the listing does not exist.
    async fn set_product_status(
        &self,
        product_id: ProductId,
        status: ProductStatus,
    ) -> Result<Option<ProductRecord>, SupabaseError>;

    /// Set a report status. `None` if the report does not exist.
    async fn set_report_status(
        &self,
        report_id: ReportId,
        status: ReportStatus,
        resolved_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Report>, SupabaseError>;

    async fn create_category(&self, category: &NewCategory) -> Result<Category, SupabaseError>;

    /// Rename a category. `None` if it does not exist.
    async fn update_category(
        &self,
        id: CategoryId,
        category: &NewCategory,
    ) -> Result<Option<Category>, SupabaseError>;

    async fn delete_category(&self, id: CategoryId) -> Result<(), SupabaseError>;
}

#[derive(Deserialize)]
struct AdminFlag {
    #[serde(default)]
    is_admin: bool,
}

#[derive(Serialize)]
struct StatusPatch<S> {
    status: S,
    updated_at: DateTime<Utc>,
}

/// Listings carry no `updated_at` column.
#[derive(Serialize)]
struct ProductStatusPatch {
    status: ProductStatus,
}

#[derive(Serialize)]
struct AdminPatch {
    is_admin: bool,
    updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct ReportPatch {
    status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved_at: Option<DateTime<Utc>>,
}

/// [`AdminBackend`] over the hosted backend, authenticated with the service
/// role key.
#[derive(Clone)]
pub struct SupabaseAdminBackend {
    client: SupabaseClient,
}

impl SupabaseAdminBackend {
    #[must_use]
    pub const fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AdminBackend for SupabaseAdminBackend {
    #[instrument(skip_all)]
    async fn user_for_token(&self, access_token: &str) -> Result<Option<UserId>, SupabaseError> {
        match self.client.auth().get_user(access_token).await {
            Ok(user) => Ok(Some(UserId::new(user.id))),
            Err(SupabaseError::Unauthorized(_) | SupabaseError::NotFound(_)) => Ok(None),
            Err(SupabaseError::Api { status: 400 | 403, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn is_admin(&self, user_id: UserId) -> Result<bool, SupabaseError> {
        let flag: Option<AdminFlag> = self
            .client
            .table("profiles")
            .select("is_admin")
            .eq("id", user_id)
            .fetch_optional()
            .await?;
        Ok(flag.is_some_and(|f| f.is_admin))
    }

    #[instrument(skip(self))]
    async fn users(&self) -> Result<Vec<Profile>, SupabaseError> {
        self.client
            .table("profiles")
            .select("*")
            .order("created_at", false)
            .fetch()
            .await
    }

    #[instrument(skip(self))]
    async fn products(&self) -> Result<Vec<AdminProduct>, SupabaseError> {
        self.client
            .table("products")
            .select(PRODUCT_SELECT)
            .order("created_at", false)
            .fetch()
            .await
    }

    #[instrument(skip(self))]
    async fn reports(&self) -> Result<Vec<Report>, SupabaseError> {
        self.client
            .table("reports")
            .select(REPORT_SELECT)
            .order("created_at", false)
            .fetch()
            .await
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> Result<Vec<Category>, SupabaseError> {
        self.client
            .table("categories")
            .select("*")
            .order("name", true)
            .fetch()
            .await
    }

    #[instrument(skip(self))]
    async fn set_user_status(
        &self,
        user_id: UserId,
        status: UserStatus,
    ) -> Result<Option<Profile>, SupabaseError> {
        let rows: Vec<Profile> = self
            .client
            .table("profiles")
            .select("*")
            .eq("id", user_id)
            .update_returning(&StatusPatch {
                status,
                updated_at: Utc::now(),
            })
            .await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn set_admin(
        &self,
        user_id: UserId,
        is_admin: bool,
    ) -> Result<Option<Profile>, SupabaseError> {
        let rows: Vec<Profile> = self
            .client
            .table("profiles")
            .select("*")
            .eq("id", user_id)
            .update_returning(&AdminPatch {
                is_admin,
                updated_at: Utc::now(),
            })
            .await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn set_product_status(
        &self,
        product_id: ProductId,
        status: ProductStatus,
    ) -> Result<Option<ProductRecord>, SupabaseError> {
        let rows: Vec<ProductRecord> = self
            .client
            .table("products")
            .select("*")
            .eq("id", product_id)
            .update_returning(&ProductStatusPatch { status })
            .await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn set_report_status(
        &self,
        report_id: ReportId,
        status: ReportStatus,
        resolved_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Report>, SupabaseError> {
        let rows: Vec<Report> = self
            .client
            .table("reports")
            .select(REPORT_SELECT)
            .eq("id", report_id)
            .update_returning(&ReportPatch {
                status,
                resolved_at,
            })
            .await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self), fields(slug = %category.slug))]
    async fn create_category(&self, category: &NewCategory) -> Result<Category, SupabaseError> {
        self.client
            .table("categories")
            .select("*")
            .insert_returning(category)
            .await
    }

    #[instrument(skip(self), fields(slug = %category.slug))]
    async fn update_category(
        &self,
        id: CategoryId,
        category: &NewCategory,
    ) -> Result<Option<Category>, SupabaseError> {
        let rows: Vec<Category> = self
            .client
            .table("categories")
            .select("*")
            .eq("id", id)
            .update_returning(category)
            .await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn delete_category(&self, id: CategoryId) -> Result<(), SupabaseError> {
        self.client.table("categories").eq("id", id).delete().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_record_keeps_every_column() {
        let row = serde_json::json!({
            "id": "22222222-2222-4222-8222-222222222222",
            "seller_id": "33333333-3333-4333-8333-333333333333",
            "title": "Лампа",
            "description": "Латунная настольная лампа",
            "price": 1500,
            "category": "Дом",
            "category_id": "44444444-4444-4444-8444-444444444444",
            "images": [],
            "status": "deleted",
            "created_at": "2024-05-01T08:00:00Z"
        });

        let record: ProductRecord = serde_json::from_value(row.clone()).unwrap();
        assert_eq!(record.status, ProductStatus::Deleted);
        assert_eq!(serde_json::to_value(&record).unwrap(), row);
    }

    #[test]
    fn test_product_status_patch_sets_status_only() {
        let patch = ProductStatusPatch {
            status: ProductStatus::Sold,
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({"status": "sold"})
        );
    }
}
