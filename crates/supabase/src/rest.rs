//! PostgREST query builder.
//!
//! Filters use PostgREST's URL syntax: `column=eq.value`, `column=is.null`,
//! `or=(a.eq.x,b.eq.y)`, `order=column.desc`. Embedded resources go in the
//! `select` list, e.g. `*,seller:profiles!products_seller_id_fkey(name)`.

use std::fmt::Display;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::{SupabaseClient, SupabaseError, parse_json, read_body};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_REPRESENTATION: &str = "return=representation";
const RETURN_MINIMAL: &str = "return=minimal";

/// A request against one table, built up by chaining filters.
#[derive(Clone)]
pub struct Table {
    client: SupabaseClient,
    name: String,
    query: Vec<(String, String)>,
    bearer: Option<String>,
}

impl Table {
    pub(crate) fn new(client: SupabaseClient, name: &str) -> Self {
        Self {
            client,
            name: name.to_owned(),
            query: Vec::new(),
            bearer: None,
        }
    }

    /// Run the request as the user owning `access_token`, so row-level
    /// security applies to them.
    #[must_use]
    pub fn auth(mut self, access_token: &str) -> Self {
        self.bearer = Some(access_token.to_owned());
        self
    }

    /// Columns and embeds to return. Whitespace is stripped so multi-line
    /// embed lists can be written readably.
    #[must_use]
    pub fn select(self, columns: &str) -> Self {
        let columns: String = columns.split_whitespace().collect();
        self.param("select", columns)
    }

    /// `column = value`
    #[must_use]
    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.param(column, format!("eq.{value}"))
    }

    /// `column <> value`
    #[must_use]
    pub fn neq(self, column: &str, value: impl Display) -> Self {
        self.param(column, format!("neq.{value}"))
    }

    /// `column IS NULL`
    #[must_use]
    pub fn is_null(self, column: &str) -> Self {
        self.param(column, "is.null".to_owned())
    }

    /// Disjunction of PostgREST filters, e.g. `buyer_id.eq.X,seller_id.eq.X`.
    #[must_use]
    pub fn or(self, filters: &str) -> Self {
        self.param("or", format!("({filters})"))
    }

    /// Sort by `column`.
    #[must_use]
    pub fn order(self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.param("order", format!("{column}.{direction}"))
    }

    /// At most `count` rows.
    #[must_use]
    pub fn limit(self, count: usize) -> Self {
        self.param("limit", count.to_string())
    }

    fn param(mut self, key: &str, value: String) -> Self {
        self.query.push((key.to_owned(), value));
        self
    }

    /// Full request URL with every filter applied.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Url`] if the table name does not form a
    /// valid path.
    pub fn url(&self) -> Result<Url, SupabaseError> {
        let mut url = self.client.endpoint(&format!("rest/v1/{}", self.name))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }

    fn request(&self, method: Method) -> Result<reqwest::RequestBuilder, SupabaseError> {
        Ok(self
            .client
            .request(method, self.url()?, self.bearer.as_deref()))
    }

    /// All matching rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or rows do not match `T`.
    #[instrument(skip(self), fields(table = %self.name))]
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>, SupabaseError> {
        let response = self.request(Method::GET)?.send().await?;
        parse_json(&read_body(response).await?)
    }

    /// Exactly one matching row.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::NotFound`] when no row matches.
    #[instrument(skip(self), fields(table = %self.name))]
    pub async fn fetch_one<T: DeserializeOwned>(self) -> Result<T, SupabaseError> {
        let response = self
            .request(Method::GET)?
            .header("Accept", SINGLE_OBJECT)
            .send()
            .await?;
        parse_json(&read_body(response).await?)
    }

    /// The first matching row, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the row does not match `T`.
    pub async fn fetch_optional<T: DeserializeOwned>(self) -> Result<Option<T>, SupabaseError> {
        let rows: Vec<T> = self.limit(1).fetch().await?;
        Ok(rows.into_iter().next())
    }

    /// Insert `body` (an object or an array of objects).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the insert.
    #[instrument(skip(self, body), fields(table = %self.name))]
    pub async fn insert<B: Serialize + Sync>(self, body: &B) -> Result<(), SupabaseError> {
        let response = self
            .request(Method::POST)?
            .header("Prefer", RETURN_MINIMAL)
            .json(body)
            .send()
            .await?;
        read_body(response).await.map(drop)
    }

    /// Insert one row and return it, with any embeds named in `select`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the insert.
    #[instrument(skip(self, body), fields(table = %self.name))]
    pub async fn insert_returning<B, T>(self, body: &B) -> Result<T, SupabaseError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::POST)?
            .header("Prefer", RETURN_REPRESENTATION)
            .header("Accept", SINGLE_OBJECT)
            .json(body)
            .send()
            .await?;
        parse_json(&read_body(response).await?)
    }

    /// Patch every matching row.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, body), fields(table = %self.name))]
    pub async fn update<B: Serialize + Sync>(self, body: &B) -> Result<(), SupabaseError> {
        let response = self
            .request(Method::PATCH)?
            .header("Prefer", RETURN_MINIMAL)
            .json(body)
            .send()
            .await?;
        read_body(response).await.map(drop)
    }

    /// Patch every matching row and return the updated rows. An empty list
    /// means nothing matched (or row-level security hid the rows).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, body), fields(table = %self.name))]
    pub async fn update_returning<B, T>(self, body: &B) -> Result<Vec<T>, SupabaseError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::PATCH)?
            .header("Prefer", RETURN_REPRESENTATION)
            .json(body)
            .send()
            .await?;
        parse_json(&read_body(response).await?)
    }

    /// Delete every matching row.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the delete.
    #[instrument(skip(self), fields(table = %self.name))]
    pub async fn delete(self) -> Result<(), SupabaseError> {
        let response = self.request(Method::DELETE)?.send().await?;
        read_body(response).await.map(drop)
    }
}
