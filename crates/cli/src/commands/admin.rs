//! Admin flag management.
//!
//! # Usage
//!
//! ```bash
//! bazaar admin grant 6f1c2a4e-0c1d-4f3b-9a57-2b8e5d0c7f11
//! bazaar admin revoke 6f1c2a4e-0c1d-4f3b-9a57-2b8e5d0c7f11
//! ```

use bazaar_admin::backend::AdminBackend;
use bazaar_core::UserId;

use super::CliError;

/// Set or clear a user's admin flag.
///
/// # Errors
///
/// Returns an error if the ID is malformed, the user does not exist or the
/// backend rejects the update.
pub async fn set_admin(
    backend: &dyn AdminBackend,
    user_id: &str,
    is_admin: bool,
) -> Result<(), CliError> {
    let id: UserId = user_id.parse()?;

    let profile = backend
        .set_admin(id, is_admin)
        .await?
        .ok_or_else(|| CliError::NotFound("User", user_id.to_owned()))?;

    if is_admin {
        tracing::info!("Granted admin to {} ({})", profile.display_name(), profile.id);
    } else {
        tracing::info!("Revoked admin from {} ({})", profile.display_name(), profile.id);
    }
    Ok(())
}
