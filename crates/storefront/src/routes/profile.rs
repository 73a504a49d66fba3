//! Profile and seller page handlers.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    response::IntoResponse,
};
use bazaar_core::UserId;
use bazaar_core::models::ProfileUpdate;
use serde::Serialize;
use tracing::instrument;

use super::{ok, read_uploads};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::profile;
use crate::state::AppState;

/// Public URL of an uploaded avatar.
#[derive(Debug, Serialize)]
pub struct UploadedAvatar {
    pub url: String,
}

/// The signed-in user's profile.
///
/// GET /api/profile
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    Ok(ok(profile::get(state.supabase(), user.id).await?))
}

/// Update the signed-in user's profile.
///
/// PUT /api/profile
#[instrument(skip(state, user, changes), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(changes): Json<ProfileUpdate>,
) -> Result<impl IntoResponse> {
    Ok(ok(profile::update(state.supabase(), &user, &changes).await?))
}

/// Upload an avatar. Save the returned URL with `PUT /api/profile`.
///
/// POST /api/profile/avatar (multipart)
#[instrument(skip(state, user, multipart), fields(user_id = %user.id))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let upload = read_uploads(multipart, 1)
        .await?
        .pop()
        .ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    let url = profile::upload_avatar(
        state.supabase(),
        &user,
        upload.bytes,
        &upload.file_name,
        upload.content_type.as_deref(),
    )
    .await?;
    Ok(ok(UploadedAvatar { url }))
}

/// A seller's profile and active listings.
///
/// GET /api/sellers/{id}
#[instrument(skip(state))]
pub async fn seller(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse> {
    Ok(ok(profile::seller_page(state.supabase(), id).await?))
}
