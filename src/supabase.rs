#![doc = "PostgREST record store and storage-API blob store used by the CLI."]
//
//! # Backend integration
//!
//! [`SupabaseClient`] implements the core's [`RecordStore`] and [`BlobStore`]
//! traits against a Supabase-style backend:
//!
//! - rows: `GET {url}/rest/v1/{collection}?select=..&col=eq.value&order=col.desc&limit=n`
//! - upserts: `POST {url}/rest/v1/{collection}` with `Prefer: resolution=merge-duplicates`
//! - uploads: `POST {url}/storage/v1/object/{bucket}/{path}`
//!
//! Every request carries the anon key both as `apikey` and as a bearer token.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use portfolio_feed_core::contract::{BlobStore, Query, RecordStore};
use portfolio_feed_core::error::StoreError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde_json::Value;

use crate::load_config::BackendConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct SupabaseClient {
    http: Client,
    base_url: String,
}

impl SupabaseClient {
    pub fn new(backend: &BackendConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&backend.anon_key).context("anon key is not a valid header value")?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", backend.anon_key))
                .context("anon key is not a valid header value")?,
        );
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .context("Failed to build backend HTTP client")?;

        tracing::info!(url = %backend.url, "Initialized SupabaseClient");
        Ok(Self {
            http,
            base_url: backend.url.trim_end_matches('/').to_string(),
        })
    }

    fn rest_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }
}

/// PostgREST query-string pairs for `query`.
pub fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), query.columns.clone())];
    for (column, value) in &query.filters {
        let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        params.push((column.clone(), format!("eq.{value}")));
    }
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl RecordStore for SupabaseClient {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        let url = self.rest_url(&query.collection);
        tracing::debug!(%url, collection = %query.collection, "Selecting rows");
        let response = self
            .http
            .get(&url)
            .query(&query_params(query))
            .send()
            .await?;
        let body = ensure_success(response).await?.text().await?;
        let rows: Vec<Value> = serde_json::from_str(&body)?;
        tracing::debug!(collection = %query.collection, rows = rows.len(), "Selected rows");
        Ok(rows)
    }

    async fn upsert(&self, collection: &str, row: &Value) -> Result<(), StoreError> {
        let url = self.rest_url(collection);
        tracing::info!(%url, collection, "Upserting row");
        let response = self
            .http
            .post(&url)
            .header("prefer", "resolution=merge-duplicates")
            .json(row)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for SupabaseClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<String, StoreError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path);
        let mut request = self.http.post(&url).body(bytes);
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        ensure_success(request.send().await?).await?;
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, path
        )
    }
}
