//! Row shapes of the record store and the helpers built on the store traits.
//!
//! Rows come back snake_case (`demo_link`, `published_at`, ...) and are
//! normalized here into the camelCase [`Project`] and [`Post`] models.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::contract::{BlobStore, Query, RecordStore};
use crate::error::StoreError;
use crate::model::{id_string, Post, Project, ProjectStatus};

pub const PROJECTS: &str = "projects";
pub const POSTS: &str = "posts";
pub const SETTINGS: &str = "settings";
pub const DEFAULT_BUCKET: &str = "images";

#[derive(Debug, Deserialize)]
struct ProjectRow {
    #[serde(deserialize_with = "id_string")]
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    demo_link: Option<String>,
    #[serde(default)]
    github_link: Option<String>,
    #[serde(default)]
    download_link: Option<String>,
    #[serde(default)]
    technologies: Option<Vec<String>>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    featured: Option<bool>,
    #[serde(default)]
    status: Option<ProjectStatus>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            title: row.title,
            description: row.description.unwrap_or_default(),
            image: row.image,
            demo_link: row.demo_link,
            github_link: row.github_link,
            download_link: row.download_link,
            technologies: row.technologies.unwrap_or_default(),
            category: row.category.unwrap_or_default(),
            featured: row.featured.unwrap_or(false),
            status: row.status.unwrap_or_default(),
            published_at: row.published_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            stars: None,
            forks: None,
            language: None,
            topics: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PostRow {
    #[serde(deserialize_with = "id_string")]
    id: String,
    title: String,
    slug: String,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(default)]
    content_markdown: Option<String>,
    #[serde(default)]
    cover_image: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            title: row.title,
            slug: row.slug,
            excerpt: row.excerpt,
            content_markdown: row.content_markdown,
            cover_image: row.cover_image,
            tags: row.tags.unwrap_or_default(),
            published_at: row.published_at,
            created_at: row.created_at,
        }
    }
}

pub fn project_from_row(row: Value) -> Result<Project, StoreError> {
    Ok(serde_json::from_value::<ProjectRow>(row)?.into())
}

pub fn post_from_row(row: Value) -> Result<Post, StoreError> {
    Ok(serde_json::from_value::<PostRow>(row)?.into())
}

/// First row matching `query`, if any.
pub async fn select_single(
    store: &dyn RecordStore,
    query: Query,
) -> Result<Option<Value>, StoreError> {
    let rows = store.select(&query.limit(1)).await?;
    Ok(rows.into_iter().next())
}

/// `value` column of the `settings` row with the given key.
pub async fn setting(store: &dyn RecordStore, key: &str) -> Result<Option<Value>, StoreError> {
    let row = select_single(store, Query::from(SETTINGS).eq("key", key)).await?;
    Ok(row.and_then(|mut row| row.get_mut("value").map(Value::take)))
}

fn content_type_for(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}

/// Stores an image under `public/<uuid>.<ext>` and returns that path.
pub async fn upload_image(
    store: &dyn BlobStore,
    file_name: &str,
    bytes: Vec<u8>,
    bucket: &str,
) -> Result<String, StoreError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let path = if extension.is_empty() {
        format!("public/{}", Uuid::new_v4())
    } else {
        format!("public/{}.{}", Uuid::new_v4(), extension)
    };
    let content_type = content_type_for(extension).map(str::to_string);
    debug!(bucket, %path, size = bytes.len(), "Uploading image");

    let stored = store.upload(bucket, &path, bytes, content_type).await?;
    info!(bucket, path = %stored, "Uploaded image");
    Ok(stored)
}

/// Public URL of a stored image, or an empty string for an empty path.
pub fn image_url(store: &dyn BlobStore, path: &str, bucket: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    store.public_url(bucket, path)
}
