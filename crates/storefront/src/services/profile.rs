//! Profiles, avatars and public seller pages.

use bazaar_core::UserId;
use bazaar_core::models::{Product, Profile, ProfileUpdate};
use bazaar_supabase::SupabaseClient;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use super::products::ProductService;
use super::{Result, ServiceError, content_type_for, random_file_name};
use crate::models::CurrentUser;

const AVATAR_BUCKET: &str = "avatars";

/// A seller's public page.
#[derive(Debug, Clone, Serialize)]
pub struct SellerPage {
    pub profile: Profile,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
struct ProfilePatch<'a> {
    #[serde(flatten)]
    changes: &'a ProfileUpdate,
    updated_at: DateTime<Utc>,
}

/// Fetch a profile.
///
/// # Errors
///
/// Returns `ServiceError::NotFound` if the profile does not exist.
#[instrument(skip(client))]
pub async fn get(client: &SupabaseClient, user_id: UserId) -> Result<Profile> {
    client
        .table("profiles")
        .select("*")
        .eq("id", user_id)
        .fetch_one()
        .await
        .map_err(ServiceError::or_not_found("Profile"))
}

/// Update the signed-in user's own profile.
///
/// # Errors
///
/// Returns `ServiceError::BadRequest` when nothing would change and
/// `ServiceError::NotFound` if the profile does not exist.
#[instrument(skip(client, user, changes), fields(user_id = %user.id))]
pub async fn update(
    client: &SupabaseClient,
    user: &CurrentUser,
    changes: &ProfileUpdate,
) -> Result<Profile> {
    if changes.is_empty() {
        return Err(ServiceError::BadRequest("Nothing to update".to_string()));
    }

    let rows: Vec<Profile> = client
        .table("profiles")
        .auth(&user.access_token)
        .select("*")
        .eq("id", user.id)
        .update_returning(&ProfilePatch {
            changes,
            updated_at: Utc::now(),
        })
        .await?;
    rows.into_iter().next().ok_or(ServiceError::NotFound("Profile"))
}

/// Store an avatar image and return its public URL. The profile itself is
/// not changed; callers save the URL with [`update`].
///
/// # Errors
///
/// Returns an error if the upload is rejected.
#[instrument(skip(client, user, bytes), fields(user_id = %user.id, size = bytes.len()))]
pub async fn upload_avatar(
    client: &SupabaseClient,
    user: &CurrentUser,
    bytes: Vec<u8>,
    file_name: &str,
    content_type: Option<&str>,
) -> Result<String> {
    let user_id = user.id.to_string();
    let path = format!("avatars/{}", random_file_name(file_name, Some(&user_id)));
    let storage = client.storage(AVATAR_BUCKET).auth(&user.access_token);
    storage
        .upload(&path, bytes, &content_type_for(file_name, content_type))
        .await?;
    Ok(storage.public_url(&path)?.to_string())
}

/// A seller's profile with their listings, fetched concurrently.
///
/// # Errors
///
/// Returns `ServiceError::NotFound` if the seller does not exist.
#[instrument(skip(client))]
pub async fn seller_page(client: &SupabaseClient, seller_id: UserId) -> Result<SellerPage> {
    let products = ProductService::new(client);
    let (profile, products) =
        futures::try_join!(get(client, seller_id), products.list_by_seller(seller_id))?;

    Ok(SellerPage {
        profile,
        products: products
            .into_iter()
            .filter(Product::is_available)
            .collect(),
    })
}
