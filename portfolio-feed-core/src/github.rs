//! GitHub REST v3 implementation of [`RepositorySource`].
//!
//! Every method is fail-soft: transport errors, non-success statuses and
//! malformed bodies are logged and turned into empty values. Repository
//! listings go through the shared [`TtlCache`] so repeated queries for the
//! same user within the TTL hit the API once.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::cache::TtlCache;
use crate::config::FetchConfig;
use crate::contract::RepositorySource;
use crate::error::FetchError;
use crate::http::HttpClient;
use crate::model::{ContentEntry, LanguageStats, Repository};

pub const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

/// Which repositories of a listing are worth showing.
///
/// Forks, archived and empty repositories are always dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryFilter {
    pub require_description: bool,
    pub require_language: bool,
    /// Drop non-public repositories, `.github` meta repositories and the
    /// profile repository named after its owner.
    pub public_only: bool,
    /// Case-insensitive name substrings to skip.
    pub exclude: Vec<String>,
}

impl RepositoryFilter {
    /// Repositories rendered as portfolio projects.
    pub fn portfolio(exclude: &[String]) -> Self {
        Self {
            require_description: true,
            require_language: false,
            public_only: true,
            exclude: exclude.to_vec(),
        }
    }

    /// Repositories that feed the technology analysis.
    pub fn analysis() -> Self {
        Self {
            require_description: false,
            require_language: true,
            public_only: false,
            exclude: Vec::new(),
        }
    }

    pub fn accepts(&self, repo: &Repository) -> bool {
        if repo.fork || repo.archived || repo.size == 0 {
            return false;
        }
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        if self.require_description && !present(&repo.description) {
            return false;
        }
        if self.require_language && !present(&repo.language) {
            return false;
        }
        if self.public_only && (repo.visibility != "public" || is_meta_repository(repo)) {
            return false;
        }
        let name = repo.name.to_lowercase();
        !self
            .exclude
            .iter()
            .any(|pattern| name.contains(&pattern.to_lowercase()))
    }
}

fn is_meta_repository(repo: &Repository) -> bool {
    repo.name.contains(".github") || repo.name.eq_ignore_ascii_case(&repo.owner.login)
}

pub struct GitHubClient {
    http: HttpClient,
    api_base: String,
    cache: Arc<TtlCache<Vec<Repository>>>,
    cache_ttl: Duration,
}

impl GitHubClient {
    /// Builds a client sending the version `Accept` header, the configured
    /// `User-Agent` and, when a token is set, `Authorization: token <token>`.
    pub fn new(
        config: &FetchConfig,
        cache: Arc<TtlCache<Vec<Repository>>>,
    ) -> Result<Self, FetchError> {
        let mut builder = HttpClient::builder()
            .timeout(config.timeout())
            .max_attempts(config.max_attempts)
            .base_backoff(config.backoff())
            .user_agent(config.user_agent.clone())
            .header("accept", ACCEPT_HEADER)?;
        let token = config.auth_token();
        if let Some(token) = token {
            builder = builder.header("authorization", &format!("token {token}"))?;
        }

        info!(
            api_base = %config.api_base,
            authenticated = token.is_some(),
            "Initialized GitHubClient"
        );
        Ok(Self {
            http: builder.build()?,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            cache,
            cache_ttl: config.cache_ttl(),
        })
    }

    /// Raw, unfiltered listing. Errors are not cached.
    pub async fn try_list_repositories(
        &self,
        username: &str,
    ) -> Result<Vec<Repository>, FetchError> {
        let key = format!("repos:{username}");
        self.cache
            .get_or_try_fetch(&key, self.cache_ttl, || async {
                let url = format!(
                    "{}/users/{}/repos?sort=updated&per_page=100",
                    self.api_base, username
                );
                info!(%url, "Fetching repositories from GitHub");
                self.http.get_json::<Vec<Repository>>(&url).await
            })
            .await
    }
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn list_repositories(
        &self,
        username: &str,
        filter: &RepositoryFilter,
    ) -> Vec<Repository> {
        match self.try_list_repositories(username).await {
            Ok(repos) => {
                let total = repos.len();
                let kept: Vec<Repository> =
                    repos.into_iter().filter(|r| filter.accepts(r)).collect();
                info!(username, total, kept = kept.len(), "Filtered repositories");
                kept
            }
            Err(e) => {
                error!(username, error = %e, "Failed to list GitHub repositories");
                Vec::new()
            }
        }
    }

    async fn fetch_languages(&self, owner: &str, repo: &str) -> LanguageStats {
        let url = format!("{}/repos/{}/{}/languages", self.api_base, owner, repo);
        match self.http.get_json::<LanguageStats>(&url).await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(owner, repo, error = %e, "Failed to fetch repository languages");
                LanguageStats::new()
            }
        }
    }

    async fn fetch_file_listing(&self, owner: &str, repo: &str) -> Vec<String> {
        let url = format!("{}/repos/{}/{}/contents", self.api_base, owner, repo);
        match self.http.get_json::<Vec<ContentEntry>>(&url).await {
            Ok(entries) => entries
                .into_iter()
                .filter(ContentEntry::is_file)
                .map(|entry| entry.name)
                .collect(),
            Err(e) => {
                warn!(owner, repo, error = %e, "Failed to list repository contents");
                Vec::new()
            }
        }
    }
}
