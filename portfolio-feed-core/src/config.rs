use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::rules::RuleSet;

/// Everything the pipeline needs to know about whose portfolio it builds and how.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    pub github: GithubConfig,
    pub display: DisplayConfig,
    pub links: LinksConfig,
    pub fetch: FetchConfig,
    pub rules: RuleSet,
}

impl PortfolioConfig {
    pub fn trace_loaded(&self) {
        info!(
            username = %self.github.username,
            excluded = self.github.exclude_repos.len(),
            rules = self.rules.categories.len(),
            api_base = %self.fetch.api_base,
            token_set = self.fetch.auth_token().is_some(),
            "Loaded PortfolioConfig"
        );
        debug!(display = ?self.display, links = ?self.links, "PortfolioConfig loaded (display/links)");
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub username: String,
    /// Case-insensitive substrings; matching repository names are skipped.
    pub exclude_repos: Vec<String>,
    /// Case-insensitive substrings of name/description that mark a project as featured.
    pub featured_keywords: Vec<String>,
    /// Projects updated within this many days are featured.
    pub recent_days: i64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            exclude_repos: ["dotfiles", "learning", "test", "template"]
                .into_iter()
                .map(String::from)
                .collect(),
            featured_keywords: [
                "portfolio",
                "website",
                "app",
                "platform",
                "dashboard",
                "system",
                "api",
                "fullstack",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            recent_days: 90,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub max_technologies: usize,
    pub max_description_length: usize,
    pub featured_projects_count: usize,
    pub projects_per_page: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_technologies: 6,
            max_description_length: 150,
            featured_projects_count: 3,
            projects_per_page: 12,
        }
    }
}

pub const DEFAULT_DEMO_URL_PATTERN: &str = "https://{name}.vercel.app";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    /// Demo URL used when a repository has no homepage. `{name}` and
    /// `{full_name}` are substituted. `null` or `""` disables it.
    pub demo_url_pattern: Option<String>,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            demo_url_pattern: Some(DEFAULT_DEMO_URL_PATTERN.to_string()),
        }
    }
}

/// Transport, caching and pacing knobs for the hosting API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub api_base: String,
    pub user_agent: String,
    /// Never read from the config file; injected from `GITHUB_TOKEN`.
    #[serde(skip)]
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub max_attempts: usize,
    pub backoff_ms: u64,
    pub cache_ttl_secs: u64,
    /// Delay between successive per-repository requests of the analyzer.
    pub request_pacing_ms: u64,
    /// Repositories converted into projects per call.
    pub max_projects: usize,
    pub language_repo_limit: usize,
    pub file_repo_limit: usize,
    pub top_technologies: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            user_agent: "Portfolio-App".to_string(),
            token: None,
            timeout_secs: 10,
            max_attempts: 3,
            backoff_ms: 200,
            cache_ttl_secs: 300,
            request_pacing_ms: 50,
            max_projects: 20,
            language_repo_limit: 20,
            file_repo_limit: 15,
            top_technologies: 15,
        }
    }
}

impl FetchConfig {
    /// The token sent as `Authorization`; blank tokens count as unset.
    pub fn auth_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_pacing(&self) -> Duration {
        Duration::from_millis(self.request_pacing_ms)
    }
}
