//! Authentication extractors.
//!
//! The signed-in user lives in the session. Expired access tokens are
//! refreshed transparently; if the refresh token is rejected too, the user is
//! signed out.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};
use crate::services::auth::{AuthService, is_token_expired};
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        session_user(session, state)
            .await?
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Extractor that optionally gets the signed-in user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is
/// signed in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session_user(session, state).await.ok().flatten(),
            None => None,
        };
        Ok(Self(user))
    }
}

/// The session's user with a usable access token.
async fn session_user(session: &Session, state: &AppState) -> Result<Option<CurrentUser>, AppError> {
    let Some(mut user) = session.get::<CurrentUser>(session_keys::CURRENT_USER).await? else {
        return Ok(None);
    };

    if !is_token_expired(&user.access_token) {
        return Ok(Some(user));
    }

    debug!(user_id = %user.id, "Access token expired, refreshing");
    match AuthService::new(state.supabase())
        .refresh(&user.refresh_token)
        .await
    {
        Ok(tokens) => {
            user.update_tokens(&tokens);
            set_current_user(session, &user).await?;
            Ok(Some(user))
        }
        Err(e) => {
            warn!(user_id = %user.id, error = %e, "Token refresh failed, signing out");
            clear_current_user(session).await?;
            Ok(None)
        }
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user and their cached containers from the
/// session (logout). The cart is kept.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    session
        .remove::<serde_json::Value>(session_keys::FAVORITES)
        .await?;
    session
        .remove::<serde_json::Value>(session_keys::CHAT)
        .await?;
    Ok(())
}
