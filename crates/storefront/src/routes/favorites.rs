//! Favorites route handlers.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use bazaar_core::ProductId;
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use super::ok;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::session_keys;
use crate::services::favorites::FavoritesService;
use crate::state::AppState;
use crate::stores::{self, FavoritesState};

/// Favorite flag after a change.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteView {
    pub product_id: ProductId,
    pub is_favorite: bool,
}

/// Saved listings.
///
/// GET /api/favorites
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let api = FavoritesService::new(state.supabase(), &user);
    let mut favorites: FavoritesState = stores::load(&session, session_keys::FAVORITES).await?;

    favorites.refresh(&api).await?;
    stores::save(&session, session_keys::FAVORITES, &favorites).await?;

    Ok(ok(favorites.items().to_vec()))
}

/// Save a listing. Saving it twice succeeds.
///
/// POST /api/favorites/{product_id}
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let api = FavoritesService::new(state.supabase(), &user);
    let mut favorites: FavoritesState = stores::load(&session, session_keys::FAVORITES).await?;

    favorites.add(&api, product_id).await?;
    stores::save(&session, session_keys::FAVORITES, &favorites).await?;

    Ok(ok(FavoriteView {
        product_id,
        is_favorite: true,
    }))
}

/// Forget a listing.
///
/// DELETE /api/favorites/{product_id}
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let api = FavoritesService::new(state.supabase(), &user);
    let mut favorites: FavoritesState = stores::load(&session, session_keys::FAVORITES).await?;

    favorites.remove(&api, product_id).await?;
    stores::save(&session, session_keys::FAVORITES, &favorites).await?;

    Ok(ok(FavoriteView {
        product_id,
        is_favorite: false,
    }))
}
