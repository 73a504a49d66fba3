//! Server function invocation under `/functions/v1`.

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::{SupabaseClient, SupabaseError, parse_json, read_body};

/// Calls server functions with the caller's token.
#[derive(Clone)]
pub struct FunctionsClient {
    client: SupabaseClient,
}

impl FunctionsClient {
    pub(crate) const fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// URL of the function called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Url`] if `name` does not form a valid path.
    pub fn url(&self, name: &str) -> Result<Url, SupabaseError> {
        self.client.endpoint(&format!("functions/v1/{name}"))
    }

    /// POST `body` to the function called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Api`] carrying the function's error message
    /// for non-success responses.
    pub async fn invoke<B, T>(&self, name: &str, access_token: &str, body: &B) -> Result<T, SupabaseError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        self.invoke_url(self.url(name)?, access_token, body).await
    }

    /// POST `body` to a function at an explicit URL (for functions served
    /// outside the project, e.g. a self-hosted admin endpoint).
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Api`] carrying the function's error message
    /// for non-success responses.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn invoke_url<B, T>(&self, url: Url, access_token: &str, body: &B) -> Result<T, SupabaseError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .request(Method::POST, url, Some(access_token))
            .json(body)
            .send()
            .await?;
        parse_json(&read_body(response).await?)
    }
}
