//! Abuse reports against listings.

use bazaar_core::validation::require_text;
use bazaar_core::{ProductId, UserId};
use bazaar_supabase::SupabaseClient;
use serde::Serialize;
use tracing::{info, instrument};

use super::{Result, ServiceError};
use crate::models::CurrentUser;

/// Shown when the user reports the same listing twice.
pub const DUPLICATE_REPORT: &str = "Вы уже отправляли жалобу на это объявление";

#[derive(Debug, Serialize)]
struct ReportInsert<'a> {
    reporter_id: UserId,
    product_id: ProductId,
    reason: &'a str,
}

/// Report a listing. Each user may report a listing once.
///
/// # Errors
///
/// Returns a validation error for a blank reason and
/// `ServiceError::Conflict` for a repeated report.
#[instrument(skip(client, user, reason), fields(user_id = %user.id))]
pub async fn create(
    client: &SupabaseClient,
    user: &CurrentUser,
    product_id: ProductId,
    reason: &str,
) -> Result<()> {
    require_text("reason", reason)?;

    client
        .table("reports")
        .auth(&user.access_token)
        .insert(&ReportInsert {
            reporter_id: user.id,
            product_id,
            reason: reason.trim(),
        })
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                ServiceError::Conflict(DUPLICATE_REPORT.to_string())
            } else {
                ServiceError::Backend(e)
            }
        })?;

    info!(%product_id, "Report submitted");
    Ok(())
}
