//! Report route handler.

use axum::{Json, extract::State, response::IntoResponse};
use bazaar_core::ProductId;
use serde::Deserialize;
use tracing::instrument;

use super::ok;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::reports;
use crate::state::AppState;

/// A report against a listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub product_id: ProductId,
    pub reason: String,
}

/// Report a listing. A second report of the same listing is a conflict.
///
/// POST /api/reports
#[instrument(skip(state, user, request), fields(user_id = %user.id, product_id = %request.product_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<ReportRequest>,
) -> Result<impl IntoResponse> {
    reports::create(state.supabase(), &user, request.product_id, &request.reason).await?;
    Ok(ok(()))
}
