//! Admin console handlers.
//!
//! Lists and moderation actions over users, listings, reports and
//! categories. Every handler requires [`RequireAdmin`].

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use bazaar_core::models::NewCategory;
use bazaar_core::validation::require_text;
use bazaar_core::{
    CategoryId, InvalidValue, ProductAction, ProductId, ReportAction, ReportId, UserAction, UserId,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{AdminError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Wrap `data` in a success envelope.
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}

/// Moderation action, parsed per entity.
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: String,
}

impl ActionRequest {
    fn parse<A>(&self) -> Result<A>
    where
        A: std::str::FromStr<Err = InvalidValue>,
    {
        self.action
            .parse()
            .map_err(|e: InvalidValue| AdminError::BadRequest(e.to_string()))
    }
}

/// New category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Category rename. The slug follows the name.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn require_name(name: &str) -> Result<()> {
    require_text("Category name", name).map_err(|e| AdminError::BadRequest(e.to_string()))
}

/// GET /api/admin/users
#[instrument(skip(state))]
pub async fn users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<impl IntoResponse> {
    Ok(ok(state.backend().users().await?))
}

/// GET /api/admin/products
#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<impl IntoResponse> {
    Ok(ok(state.backend().products().await?))
}

/// GET /api/admin/reports
#[instrument(skip(state))]
pub async fn reports(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<impl IntoResponse> {
    Ok(ok(state.backend().reports().await?))
}

/// GET /api/admin/categories
#[instrument(skip(state))]
pub async fn categories(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<impl IntoResponse> {
    Ok(ok(state.backend().categories().await?))
}

/// Suspend, ban or reactivate an account.
///
/// POST /api/admin/users/{id}/status
#[instrument(skip(state, request))]
pub async fn user_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
    Json(request): Json<ActionRequest>,
) -> Result<impl IntoResponse> {
    let action: UserAction = request.parse()?;
    let profile = state
        .backend()
        .set_user_status(id, action.target_status())
        .await?
        .ok_or_else(|| AdminError::NotFound("User not found".to_string()))?;

    info!(user_id = %id, status = %profile.status, "User status changed");
    Ok(ok(profile))
}

/// Delete or restore a listing.
///
/// POST /api/admin/products/{id}/status
#[instrument(skip(state, request))]
pub async fn product_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(request): Json<ActionRequest>,
) -> Result<impl IntoResponse> {
    let action: ProductAction = request.parse()?;
    let product = state
        .backend()
        .set_product_status(id, action.target_status())
        .await?
        .ok_or_else(|| AdminError::NotFound("Product not found".to_string()))?;

    info!(product_id = %id, status = %product.status, "Product status changed");
    Ok(ok(product))
}

/// Resolve or dismiss a report. Either way it is stamped as handled now.
///
/// POST /api/admin/reports/{id}/status
#[instrument(skip(state, request))]
pub async fn report_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ReportId>,
    Json(request): Json<ActionRequest>,
) -> Result<impl IntoResponse> {
    let action: ReportAction = request.parse()?;
    let report = state
        .backend()
        .set_report_status(id, action.target_status(), Some(Utc::now()))
        .await?
        .ok_or_else(|| AdminError::NotFound("Report not found".to_string()))?;

    info!(report_id = %id, status = %report.status, "Report status changed");
    Ok(ok(report))
}

/// POST /api/admin/categories
#[instrument(skip(state, request))]
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse> {
    require_name(&request.name)?;
    let category = NewCategory::new(
        &request.name,
        request.slug.as_deref(),
        request.description,
    );
    let created = state.backend().create_category(&category).await?;

    info!(category_id = %created.id, slug = %created.slug, "Category created");
    Ok(ok(created))
}

/// PUT /api/admin/categories/{id}
#[instrument(skip(state, request))]
pub async fn update_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CategoryId>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse> {
    require_name(&request.name)?;
    let category = NewCategory::new(&request.name, None, request.description);
    let updated = state
        .backend()
        .update_category(id, &category)
        .await?
        .ok_or_else(|| AdminError::NotFound("Category not found".to_string()))?;
    Ok(ok(updated))
}

/// DELETE /api/admin/categories/{id}
#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<impl IntoResponse> {
    state.backend().delete_category(id).await?;
    info!(category_id = %id, "Category deleted");
    Ok(ok(()))
}
