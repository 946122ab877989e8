//! Collection persistence through the PostgREST API

mod filter;
mod memory;
mod query;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::Session;
use crate::error::{Error, Result};
use crate::fetch::{Fetch, FetchBuilder};

pub use filter::*;
pub use memory::{MemoryStore, StoreCall};
pub use query::*;

/// The document-collection collaborator
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// List records of a collection
    async fn list(&self, session: &Session, table: &str, options: &ListOptions) -> Result<Vec<Value>>;

    /// Insert a record and return it as stored
    async fn create(&self, session: &Session, table: &str, record: Value) -> Result<Value>;

    /// Merge `patch` into the record with the given id
    async fn update(&self, session: &Session, table: &str, id: &str, patch: Value) -> Result<Value>;

    /// Delete the record with the given id
    async fn delete(&self, session: &Session, table: &str, id: &str) -> Result<()>;

    /// Insert, or merge into the row that collides on the `on_conflict` columns
    async fn upsert(
        &self,
        session: &Session,
        table: &str,
        record: Value,
        on_conflict: &[&str],
    ) -> Result<Value>;

    /// Delete every row matching all filters; returns how many went away
    async fn delete_where(&self, session: &Session, table: &str, filters: &[Filter]) -> Result<u64>;
}

/// Collection store backed by a Supabase project's REST endpoint
pub struct PostgrestStore {
    /// The base URL for the project
    url: String,

    /// The anonymous API key
    key: String,

    /// HTTP client
    client: Client,

    client_info: String,

    timeout: Option<Duration>,
}

impl PostgrestStore {
    pub fn new(
        url: &str,
        key: &str,
        client: Client,
        client_info: &str,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            client_info: client_info.to_string(),
            timeout,
        }
    }

    /// Get the base URL for REST API requests
    fn get_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    fn authorize<'a>(&self, fetch: FetchBuilder<'a>, session: &Session) -> FetchBuilder<'a> {
        fetch
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info)
            .bearer_auth(&session.access_token)
            .timeout(self.timeout)
            .service_error(Error::database::<String>)
    }
}

fn first_row(rows: Vec<Value>, what: &str) -> Result<Value> {
    rows.into_iter()
        .next()
        .ok_or_else(|| Error::database(format!("No row returned after {}", what)))
}

#[async_trait]
impl CollectionStore for PostgrestStore {
    async fn list(&self, session: &Session, table: &str, options: &ListOptions) -> Result<Vec<Value>> {
        let url = self.get_url(table);
        self.authorize(Fetch::get(&self.client, &url), session)
            .query_pairs(options.to_query())
            .execute::<Vec<Value>>()
            .await
    }

    async fn create(&self, session: &Session, table: &str, record: Value) -> Result<Value> {
        let url = self.get_url(table);
        let rows = self
            .authorize(Fetch::post(&self.client, &url), session)
            .header("Prefer", "return=representation")
            .json(&record)?
            .execute::<Vec<Value>>()
            .await?;
        first_row(rows, "insert")
    }

    async fn update(&self, session: &Session, table: &str, id: &str, patch: Value) -> Result<Value> {
        let url = self.get_url(table);
        let (column, filter) = Filter::eq("id", id).to_query();
        let rows = self
            .authorize(Fetch::patch(&self.client, &url), session)
            .header("Prefer", "return=representation")
            .query(&column, &filter)
            .json(&patch)?
            .execute::<Vec<Value>>()
            .await?;
        first_row(rows, "update")
    }

    async fn delete(&self, session: &Session, table: &str, id: &str) -> Result<()> {
        let url = self.get_url(table);
        let (column, filter) = Filter::eq("id", id).to_query();
        self.authorize(Fetch::delete(&self.client, &url), session)
            .query(&column, &filter)
            .execute_empty()
            .await
    }

    async fn upsert(
        &self,
        session: &Session,
        table: &str,
        record: Value,
        on_conflict: &[&str],
    ) -> Result<Value> {
        let url = self.get_url(table);
        let rows = self
            .authorize(Fetch::post(&self.client, &url), session)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .query("on_conflict", &on_conflict.join(","))
            .json(&record)?
            .execute::<Vec<Value>>()
            .await?;
        first_row(rows, "upsert")
    }

    async fn delete_where(&self, session: &Session, table: &str, filters: &[Filter]) -> Result<u64> {
        if filters.is_empty() {
            return Err(Error::database("Refusing to delete without a filter"));
        }
        let url = self.get_url(table);
        let rows = self
            .authorize(Fetch::delete(&self.client, &url), session)
            .header("Prefer", "return=representation")
            .query_pairs(filters.iter().map(Filter::to_query))
            .execute::<Vec<Value>>()
            .await?;
        Ok(rows.len() as u64)
    }
}

/// Typed handle on one collection
pub struct Collection<T> {
    store: Arc<dyn CollectionStore>,
    table: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            table: self.table.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Collection<T> {
    pub fn new(store: Arc<dyn CollectionStore>, table: &str) -> Self {
        Self {
            store,
            table: table.to_string(),
            _record: PhantomData,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub async fn list(&self, session: &Session, options: &ListOptions) -> Result<Vec<T>> {
        let rows = self.store.list(session, &self.table, options).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(Error::from))
            .collect()
    }

    pub async fn create<N: Serialize + Sync>(&self, session: &Session, record: &N) -> Result<T> {
        let row = self
            .store
            .create(session, &self.table, serde_json::to_value(record)?)
            .await?;
        Ok(serde_json::from_value(row)?)
    }

    pub async fn update<P: Serialize + Sync>(&self, session: &Session, id: &str, patch: &P) -> Result<T> {
        let row = self
            .store
            .update(session, &self.table, id, serde_json::to_value(patch)?)
            .await?;
        Ok(serde_json::from_value(row)?)
    }

    pub async fn delete(&self, session: &Session, id: &str) -> Result<()> {
        self.store.delete(session, &self.table, id).await
    }

    pub async fn upsert<N: Serialize + Sync>(
        &self,
        session: &Session,
        record: &N,
        on_conflict: &[&str],
    ) -> Result<T> {
        let row = self
            .store
            .upsert(session, &self.table, serde_json::to_value(record)?, on_conflict)
            .await?;
        Ok(serde_json::from_value(row)?)
    }

    pub async fn delete_where(&self, session: &Session, filters: &[Filter]) -> Result<u64> {
        self.store.delete_where(session, &self.table, filters).await
    }
}
