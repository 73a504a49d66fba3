//! Object storage under `/storage/v1/object`.

use reqwest::Method;
use tracing::instrument;
use url::Url;

use crate::{SupabaseClient, SupabaseError, read_body};

/// Uploads and public URLs for one bucket.
#[derive(Clone)]
pub struct StorageClient {
    client: SupabaseClient,
    bucket: String,
    bearer: Option<String>,
}

impl StorageClient {
    pub(crate) fn new(client: SupabaseClient, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_owned(),
            bearer: None,
        }
    }

    /// Upload as the user owning `access_token`.
    #[must_use]
    pub fn auth(mut self, access_token: &str) -> Self {
        self.bearer = Some(access_token.to_owned());
        self
    }

    /// Store `bytes` at `path` inside the bucket. Existing objects are not
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the upload (including when the
    /// path is already taken).
    #[instrument(skip(self, bytes), fields(bucket = %self.bucket, size = bytes.len()))]
    pub async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), SupabaseError> {
        let url = self
            .client
            .endpoint(&format!("storage/v1/object/{}/{path}", self.bucket))?;
        let response = self
            .client
            .request(Method::POST, url, self.bearer.as_deref())
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        read_body(response).await.map(drop)
    }

    /// Public URL of the object at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Url`] if `path` does not form a valid URL.
    pub fn public_url(&self, path: &str) -> Result<Url, SupabaseError> {
        self.client
            .endpoint(&format!("storage/v1/object/public/{}/{path}", self.bucket))
    }
}
