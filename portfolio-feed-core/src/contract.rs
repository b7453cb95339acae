//! # contract: seams to the outside world
//!
//! The pipeline talks to three external collaborators, each behind a trait so
//! production clients and `mockall` mocks are interchangeable:
//!
//! - [`RepositorySource`]: the source-control hosting API (see [`crate::github::GitHubClient`]).
//! - [`RecordStore`]: the structured-data backend holding `posts`, `projects` and `settings`.
//! - [`BlobStore`]: image storage.
//!
//! `RepositorySource` is fail-soft by contract: implementations log and
//! return empty values instead of errors. The store traits do return errors;
//! the facade in [`crate::aggregate`] turns those into fallthrough.
//!
//! ## Mocking & Testing
//! Traits are annotated with `automock` when the `test-export-mocks` feature is
//! enabled (the default) so downstream crates can build mocks too.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::github::RepositoryFilter;
use crate::model::{LanguageStats, Repository};

/// Read access to a user's repositories on the hosting service.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Repositories for `username`, most recently updated first, with `filter` applied.
    /// Empty on any failure.
    async fn list_repositories(&self, username: &str, filter: &RepositoryFilter)
        -> Vec<Repository>;

    /// Language byte counts for one repository. Empty on any failure.
    async fn fetch_languages(&self, owner: &str, repo: &str) -> LanguageStats;

    /// Names of the top-level entries of a repository. Empty on any failure.
    async fn fetch_file_listing(&self, owner: &str, repo: &str) -> Vec<String>;
}

/// Column ordering for a [`Query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A select against one collection of the record store.
///
/// Filters are equality only; rows come back in the store's snake_case shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub columns: String,
    pub filters: Vec<(String, Value)>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn from(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push((column.to_string(), value.into()));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Value of the equality filter on `column`, if any.
    pub fn filter_value(&self, column: &str) -> Option<&Value> {
        self.filters
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

/// Generic record-store access (select/filter/order/limit/upsert).
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// Inserts `row`, or merges it into the row with the same primary key.
    async fn upsert(&self, collection: &str, row: &Value) -> Result<(), StoreError>;
}

/// Opaque blob storage used for project and post images.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` at `path` inside `bucket` and returns the stored path.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<String, StoreError>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}
