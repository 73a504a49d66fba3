//! Listing status changes.

use bazaar_admin::backend::AdminBackend;
use bazaar_core::{ProductId, ProductStatus};

use super::CliError;

/// Set a listing's status (`active`, `deleted` or `sold`).
///
/// # Errors
///
/// Returns an error if the ID or status is malformed, the listing does not
/// exist or the backend rejects the update.
pub async fn set_status(
    backend: &dyn AdminBackend,
    product_id: &str,
    status: &str,
) -> Result<(), CliError> {
    let id: ProductId = product_id.parse()?;
    let status: ProductStatus = status.parse()?;

    let product = backend
        .set_product_status(id, status)
        .await?
        .ok_or_else(|| CliError::NotFound("Product", product_id.to_owned()))?;

    tracing::info!("Product {} is now {}", product.id, product.status);
    Ok(())
}
