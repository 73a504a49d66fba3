//! Per-session state containers.
//!
//! The cart, the favorites list and the chat panel are cached in the
//! visitor's session. Each container is loaded at the start of a request,
//! mutated through its backend seam, and written back before responding.
//! The seams are traits so the containers can run against in-memory fakes.

pub mod cart;
pub mod chat;
pub mod favorites;

pub use chat::{ChatApi, ChatState};
pub use favorites::{FavoritesApi, FavoritesState};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tower_sessions::Session;

/// Read a container from the session, starting empty if absent.
///
/// # Errors
///
/// Returns an error if the session store fails or holds malformed data.
pub async fn load<T>(session: &Session, key: &str) -> Result<T, tower_sessions::session::Error>
where
    T: DeserializeOwned + Default,
{
    Ok(session.get::<T>(key).await?.unwrap_or_default())
}

/// Write a container back to the session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save<T>(session: &Session, key: &str, value: &T) -> Result<(), tower_sessions::session::Error>
where
    T: Serialize + Sync,
{
    session.insert(key, value).await
}
