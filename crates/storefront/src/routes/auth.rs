//! Authentication route handlers.
//!
//! Sign-in and sign-up go to the backend's identity provider; the resulting
//! tokens are kept in the session, never handed to the client.

use axum::{Json, extract::State, response::IntoResponse};
use bazaar_core::models::Profile;
use bazaar_core::{Email, UserId};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use super::ok;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Credentials for sign-in and sign-up.
#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// The signed-in user as shown to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub email: Email,
    pub is_admin: bool,
}

impl From<&CurrentUser> for UserView {
    fn from(user: &CurrentUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Result of sign-up.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterView {
    pub user: Option<UserView>,
    pub confirmation_required: bool,
}

/// The signed-in user with their profile.
#[derive(Debug, Serialize)]
pub struct MeView {
    pub user: UserView,
    pub profile: Profile,
}

/// Sign in.
///
/// POST /api/auth/login
///
/// # Errors
///
/// Returns 400 for a malformed email and 401 for wrong credentials.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<Credentials>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(state.supabase())
        .login(&form.email, &form.password)
        .await?;

    // New identity, new session id
    session.cycle_id().await?;
    set_current_user(&session, &user).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    info!(user_id = %user.id, "User signed in");
    Ok(ok(UserView::from(&user)))
}

/// Sign up. When the provider requires email confirmation the user is not
/// signed in yet.
///
/// POST /api/auth/register
///
/// # Errors
///
/// Returns 400 for a malformed email or weak password and 409 when the
/// email is taken.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<Credentials>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(state.supabase())
        .register(&form.email, &form.password)
        .await?;

    let Some(user) = user else {
        info!("User registered, awaiting email confirmation");
        return Ok(ok(RegisterView {
            user: None,
            confirmation_required: true,
        }));
    };

    session.cycle_id().await?;
    set_current_user(&session, &user).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    info!(user_id = %user.id, "User registered");
    Ok(ok(RegisterView {
        user: Some(UserView::from(&user)),
        confirmation_required: false,
    }))
}

/// Sign out. The provider session is revoked best-effort; the local session
/// is cleared regardless.
///
/// POST /api/auth/logout
///
/// # Errors
///
/// Returns 500 if the session store fails.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    if let Some(user) = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await?
    {
        if let Err(e) = AuthService::new(state.supabase()).logout(&user).await {
            warn!(user_id = %user.id, error = %e, "Provider sign-out failed");
        }
        info!(user_id = %user.id, "User signed out");
    }

    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(ok(()))
}

/// Trade the session's refresh token for new tokens.
///
/// POST /api/auth/refresh
///
/// # Errors
///
/// Returns 401 when nobody is signed in or the refresh token is rejected.
#[instrument(skip(state, session))]
pub async fn refresh(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let mut user = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    match AuthService::new(state.supabase())
        .refresh(&user.refresh_token)
        .await
    {
        Ok(tokens) => {
            user.update_tokens(&tokens);
            set_current_user(&session, &user).await?;
            Ok(ok(UserView::from(&user)))
        }
        Err(e) => {
            clear_current_user(&session).await?;
            Err(e.into())
        }
    }
}

/// The signed-in user and their profile.
///
/// GET /api/auth/me
///
/// # Errors
///
/// Returns 401 when nobody is signed in.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let profile = AuthService::new(state.supabase())
        .profile(user.id)
        .await?;
    Ok(ok(MeView {
        user: UserView::from(&user),
        profile,
    }))
}
