//! The facade page-rendering code talks to.
//!
//! Every project and technology operation resolves through an ordered list of
//! tiers and returns the first one that produces data:
//!
//! 1. [`Tier::SourceControl`]: live repositories, classified on the fly.
//! 2. [`Tier::RecordStore`]: rows curated in the structured-data backend.
//! 3. [`Tier::Fallback`]: the static dataset.
//!
//! A tier that errors is logged and skipped; none of the public methods
//! return an error. In the worst case callers get an empty list, `None`
//! or a default value.
//!
//! Posts and settings only live in the record store, so those operations
//! have a single tier and degrade to empty values when it is missing.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::analyzer::{AnalyzerSettings, TechAnalyzer};
use crate::cache::TtlCache;
use crate::classify::{rank_featured, Classifier};
use crate::config::PortfolioConfig;
use crate::contract::{BlobStore, Query, RecordStore, RepositorySource};
use crate::error::{FetchError, StoreError};
use crate::fallback::{static_technologies, StaticCatalog};
use crate::github::{GitHubClient, RepositoryFilter};
use crate::model::{AboutData, Post, Project, Repository, TechnologyReport};
use crate::store::{self, POSTS, PROJECTS, SETTINGS};

/// Source that can answer a facade query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    SourceControl,
    RecordStore,
    Fallback,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::SourceControl => "source_control",
            Tier::RecordStore => "record_store",
            Tier::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

/// What a single tier produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TierOutcome<T> {
    Found(T),
    Empty,
    Failed(String),
}

impl<T> TierOutcome<Vec<T>> {
    fn collection(items: Vec<T>) -> Self {
        if items.is_empty() {
            TierOutcome::Empty
        } else {
            TierOutcome::Found(items)
        }
    }
}

impl<T> TierOutcome<T> {
    fn optional(value: Option<T>) -> Self {
        value.map_or(TierOutcome::Empty, TierOutcome::Found)
    }
}

/// Logs the outcome of `tier` and hands back the value if it was found.
fn settle<T>(operation: &str, tier: Tier, outcome: TierOutcome<T>) -> Option<T> {
    match outcome {
        TierOutcome::Found(value) => {
            info!(operation, %tier, "[FEED][TIER] Served");
            Some(value)
        }
        TierOutcome::Empty if tier == Tier::Fallback => {
            warn!(operation, %tier, "[FEED][TIER] Fallback returned nothing");
            None
        }
        TierOutcome::Empty => {
            debug!(operation, %tier, "[FEED][TIER] Empty, trying next tier");
            None
        }
        TierOutcome::Failed(reason) => {
            error!(operation, %tier, error = %reason, "[FEED][TIER][ERROR] Failed, trying next tier");
            None
        }
    }
}

fn decode_rows<T>(
    rows: Vec<Value>,
    decode: impl Fn(Value) -> Result<T, StoreError>,
) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match decode(row) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(error = %e, "[FEED] Skipping malformed record");
                None
            }
        })
        .collect()
}

pub struct Portfolio {
    config: PortfolioConfig,
    source: Arc<dyn RepositorySource>,
    records: Option<Arc<dyn RecordStore>>,
    blobs: Option<Arc<dyn BlobStore>>,
    fallback: StaticCatalog,
    analyzer: TechAnalyzer,
    projects_cache: TtlCache<Vec<Project>>,
}

impl Portfolio {
    pub fn new(config: PortfolioConfig, source: Arc<dyn RepositorySource>) -> Self {
        let analyzer = TechAnalyzer::new(source.clone(), AnalyzerSettings::from(&config.fetch));
        let projects_cache = TtlCache::new(config.fetch.cache_ttl());
        Self {
            config,
            source,
            records: None,
            blobs: None,
            fallback: StaticCatalog::embedded(),
            analyzer,
            projects_cache,
        }
    }

    /// Facade backed by the GitHub REST API, sharing `cache` for repository listings.
    pub fn with_github(
        config: PortfolioConfig,
        cache: Arc<TtlCache<Vec<Repository>>>,
    ) -> Result<Self, FetchError> {
        let client = GitHubClient::new(&config.fetch, cache)?;
        Ok(Self::new(config, Arc::new(client)))
    }

    pub fn with_record_store(mut self, records: Arc<dyn RecordStore>) -> Self {
        self.records = Some(records);
        self
    }

    pub fn with_blob_store(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    pub fn with_fallback(mut self, fallback: StaticCatalog) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn config(&self) -> &PortfolioConfig {
        &self.config
    }

    fn username(&self) -> Option<&str> {
        Some(self.config.github.username.as_str()).filter(|u| !u.is_empty())
    }

    /// Repositories converted into projects, at most `max_projects`, cached per user.
    /// An empty conversion is not cached.
    async fn source_projects(&self, now: DateTime<Utc>) -> Vec<Project> {
        let Some(username) = self.username() else {
            debug!("[FEED] No source-control username configured");
            return Vec::new();
        };
        let key = format!("projects:{username}");
        let ttl = self.projects_cache.default_ttl();

        self.projects_cache
            .get_or_try_fetch(&key, ttl, || async {
                let filter = RepositoryFilter::portfolio(&self.config.github.exclude_repos);
                let mut repos = self.source.list_repositories(username, &filter).await;
                repos.truncate(self.config.fetch.max_projects);

                let languages = join_all(
                    repos
                        .iter()
                        .map(|repo| self.source.fetch_languages(&repo.owner.login, &repo.name)),
                )
                .await;

                let classifier = Classifier::new(&self.config);
                let projects: Vec<Project> = repos
                    .iter()
                    .zip(languages.iter())
                    .map(|(repo, langs)| classifier.convert_repo_to_project(repo, langs, now))
                    .collect();
                info!(username, projects = projects.len(), "[FEED] Converted repositories");
                if projects.is_empty() {
                    Err("no repositories")
                } else {
                    Ok(projects)
                }
            })
            .await
            .unwrap_or_default()
    }

    async fn store_rows(&self, query: Query) -> TierOutcome<Vec<Value>> {
        let Some(records) = &self.records else {
            return TierOutcome::Empty;
        };
        match records.select(&query).await {
            Ok(rows) => TierOutcome::collection(rows),
            Err(e) => TierOutcome::Failed(e.to_string()),
        }
    }

    async fn store_projects(&self, query: Query) -> TierOutcome<Vec<Project>> {
        match self.store_rows(query).await {
            TierOutcome::Found(rows) => {
                TierOutcome::collection(decode_rows(rows, store::project_from_row))
            }
            TierOutcome::Empty => TierOutcome::Empty,
            TierOutcome::Failed(reason) => TierOutcome::Failed(reason),
        }
    }

    fn published_projects_query() -> Query {
        Query::from(PROJECTS)
            .eq("status", "published")
            .order("published_at", false)
    }

    pub async fn all_published_projects(&self) -> Vec<Project> {
        const OP: &str = "all_published_projects";
        info!("[FEED] Resolving published projects");

        let live = self.source_projects(Utc::now()).await;
        if let Some(projects) = settle(OP, Tier::SourceControl, TierOutcome::collection(live)) {
            return projects;
        }
        let stored = self.store_projects(Self::published_projects_query()).await;
        if let Some(projects) = settle(OP, Tier::RecordStore, stored) {
            return projects;
        }
        let fallback = TierOutcome::collection(self.fallback.all_published());
        settle(OP, Tier::Fallback, fallback).unwrap_or_default()
    }

    /// One page (1-based) of [`Self::all_published_projects`], sized by
    /// `display.projects_per_page`. Pages past the end are empty.
    pub async fn published_projects_page(&self, page: usize) -> Vec<Project> {
        let per_page = self.config.display.projects_per_page.max(1);
        let skip = page.saturating_sub(1).saturating_mul(per_page);
        self.all_published_projects()
            .await
            .into_iter()
            .skip(skip)
            .take(per_page)
            .collect()
    }

    pub async fn featured_projects(&self, limit: usize) -> Vec<Project> {
        const OP: &str = "featured_projects";
        info!(limit, "[FEED] Resolving featured projects");

        let now = Utc::now();
        let live = rank_featured(self.source_projects(now).await, limit, now);
        if let Some(projects) = settle(OP, Tier::SourceControl, TierOutcome::collection(live)) {
            return projects;
        }
        let query = Self::published_projects_query()
            .eq("featured", true)
            .limit(limit);
        if let Some(projects) = settle(OP, Tier::RecordStore, self.store_projects(query).await) {
            return projects;
        }
        let fallback = TierOutcome::collection(self.fallback.featured(limit));
        settle(OP, Tier::Fallback, fallback).unwrap_or_default()
    }

    pub async fn project_by_id(&self, id: &str) -> Option<Project> {
        const OP: &str = "project_by_id";
        info!(id, "[FEED] Resolving project");

        let live = self
            .source_projects(Utc::now())
            .await
            .into_iter()
            .find(|p| p.id == id);
        if let Some(project) = settle(OP, Tier::SourceControl, TierOutcome::optional(live)) {
            return Some(project);
        }

        let stored = match self.store_rows(Query::from(PROJECTS).eq("id", id).limit(1)).await {
            TierOutcome::Found(rows) => match rows.into_iter().next().map(store::project_from_row) {
                Some(Ok(project)) => TierOutcome::Found(project),
                Some(Err(e)) => TierOutcome::Failed(e.to_string()),
                None => TierOutcome::Empty,
            },
            TierOutcome::Empty => TierOutcome::Empty,
            TierOutcome::Failed(reason) => TierOutcome::Failed(reason),
        };
        if let Some(project) = settle(OP, Tier::RecordStore, stored) {
            return Some(project);
        }

        settle(OP, Tier::Fallback, TierOutcome::optional(self.fallback.by_id(id)))
    }

    /// Published fallback projects in `category`, newest first.
    pub fn projects_by_category(&self, category: &str) -> Vec<Project> {
        self.fallback.by_category(category)
    }

    pub async fn realtime_technologies(&self) -> TechnologyReport {
        const OP: &str = "realtime_technologies";
        info!("[FEED] Resolving technology report");

        let live = match self.username() {
            Some(username) => {
                let repos = self
                    .source
                    .list_repositories(username, &RepositoryFilter::analysis())
                    .await;
                if repos.is_empty() {
                    TierOutcome::Empty
                } else {
                    let report = self.analyzer.complete_analysis(Some(username), &repos).await;
                    if report.technologies.is_empty() {
                        TierOutcome::Empty
                    } else {
                        TierOutcome::Found(report)
                    }
                }
            }
            None => TierOutcome::Empty,
        };
        if let Some(report) = settle(OP, Tier::SourceControl, live) {
            return report;
        }

        let stored = match &self.records {
            Some(records) => match store::setting(records.as_ref(), "technologies").await {
                Ok(Some(value)) => match serde_json::from_value::<TechnologyReport>(value) {
                    Ok(report) if !report.technologies.is_empty() => TierOutcome::Found(report),
                    Ok(_) => TierOutcome::Empty,
                    Err(e) => TierOutcome::Failed(e.to_string()),
                },
                Ok(None) => TierOutcome::Empty,
                Err(e) => TierOutcome::Failed(e.to_string()),
            },
            None => TierOutcome::Empty,
        };
        if let Some(report) = settle(OP, Tier::RecordStore, stored) {
            return report;
        }

        let report = static_technologies();
        info!(operation = OP, tier = %Tier::Fallback, "[FEED][TIER] Served");
        report
    }

    pub async fn all_published_posts(&self) -> Vec<Post> {
        let query = Query::from(POSTS)
            .eq("status", "published")
            .order("published_at", false);
        match self.store_rows(query).await {
            TierOutcome::Found(rows) => {
                let posts = decode_rows(rows, store::post_from_row);
                info!(posts = posts.len(), "[FEED] Loaded published posts");
                posts
            }
            TierOutcome::Empty => Vec::new(),
            TierOutcome::Failed(reason) => {
                error!(error = %reason, "[FEED][ERROR] Failed to load posts");
                Vec::new()
            }
        }
    }

    pub async fn post_by_slug(&self, slug: &str) -> Option<Post> {
        let query = Query::from(POSTS)
            .eq("slug", slug)
            .eq("status", "published")
            .limit(1);
        match self.store_rows(query).await {
            TierOutcome::Found(rows) => rows
                .into_iter()
                .next()
                .and_then(|row| match store::post_from_row(row) {
                    Ok(post) => Some(post),
                    Err(e) => {
                        warn!(slug, error = %e, "[FEED] Malformed post record");
                        None
                    }
                }),
            TierOutcome::Empty => None,
            TierOutcome::Failed(reason) => {
                error!(slug, error = %reason, "[FEED][ERROR] Failed to load post");
                None
            }
        }
    }

    pub async fn all_post_slugs(&self) -> Vec<String> {
        let query = Query::from(POSTS).select("slug").eq("status", "published");
        match self.store_rows(query).await {
            TierOutcome::Found(rows) => rows
                .iter()
                .filter_map(|row| row.get("slug").and_then(Value::as_str))
                .filter(|slug| !slug.is_empty())
                .map(str::to_string)
                .collect(),
            TierOutcome::Empty => Vec::new(),
            TierOutcome::Failed(reason) => {
                error!(error = %reason, "[FEED][ERROR] Failed to load post slugs");
                Vec::new()
            }
        }
    }

    /// About-page content; the built-in default when no setting is stored.
    pub async fn about_data(&self) -> AboutData {
        let Some(records) = &self.records else {
            return AboutData::default();
        };
        match store::setting(records.as_ref(), "about").await {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(error = %e, "[FEED] Malformed about setting, using default");
                AboutData::default()
            }),
            Ok(None) => {
                debug!("[FEED] No about setting stored, using default");
                AboutData::default()
            }
            Err(e) => {
                error!(error = %e, "[FEED][ERROR] Failed to load about setting");
                AboutData::default()
            }
        }
    }

    /// Stores `about` with a fresh `updatedAt`. Returns whether the write succeeded.
    pub async fn update_about_data(&self, about: &AboutData) -> bool {
        let Some(records) = &self.records else {
            warn!("[FEED] No record store configured, about data not saved");
            return false;
        };
        let mut about = about.clone();
        about.updated_at = Some(Utc::now());
        let row = match serde_json::to_value(&about) {
            Ok(value) => serde_json::json!({ "key": "about", "value": value }),
            Err(e) => {
                error!(error = %e, "[FEED][ERROR] Could not serialize about data");
                return false;
            }
        };
        match records.upsert(SETTINGS, &row).await {
            Ok(()) => {
                info!("[FEED] Updated about setting");
                true
            }
            Err(e) => {
                error!(error = %e, "[FEED][ERROR] Failed to update about setting");
                false
            }
        }
    }

    /// Uploads an image to blob storage and returns its stored path.
    pub async fn upload_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        bucket: &str,
    ) -> Result<String, StoreError> {
        let blobs = self.blobs.as_ref().ok_or(StoreError::NotConfigured)?;
        store::upload_image(blobs.as_ref(), file_name, bytes, bucket).await
    }

    pub fn image_url(&self, path: &str, bucket: &str) -> String {
        match &self.blobs {
            Some(blobs) => store::image_url(blobs.as_ref(), path, bucket),
            None => String::new(),
        }
    }
}
