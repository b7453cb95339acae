/// `load_config` module: reads the static YAML config and injects secrets from the environment.
///
/// The YAML file only ever holds non-secret settings (whose portfolio, display
/// limits, fetch knobs, classification rules). The GitHub token and the
/// record-store credentials are read from the environment, after `.env` has
/// been loaded by the binary.
///
/// Every section is optional; a missing section takes the defaults of
/// [`PortfolioConfig`].
///
/// # Errors
/// Failures are reported as `anyhow::Error` with the offending path in the message.
use anyhow::{Context, Result};
use portfolio_feed_core::config::{DisplayConfig, FetchConfig, GithubConfig, LinksConfig, PortfolioConfig};
use portfolio_feed_core::rules::RuleSet;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub const DEFAULT_OUTPUT: &str = "portfolio-feed.json";

const BACKEND_URL_VARS: &[&str] = &["PUBLIC_SUPABASE_URL", "SUPABASE_URL"];
const BACKEND_KEY_VARS: &[&str] = &["PUBLIC_SUPABASE_ANON_KEY", "SUPABASE_ANON_KEY"];
const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Connection details for the PostgREST-compatible record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub portfolio: PortfolioConfig,
    /// Replaces the embedded fallback dataset when set.
    pub fallback_path: Option<PathBuf>,
    pub output: PathBuf,
    /// `None` when the environment does not name a backend; the record-store tier is skipped.
    pub backend: Option<BackendConfig>,
}

impl CliConfig {
    /// Defaults plus whatever the environment provides.
    pub fn from_env() -> Self {
        let mut config = Self {
            portfolio: PortfolioConfig::default(),
            fallback_path: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            backend: None,
        };
        config.inject_env();
        config
    }

    fn inject_env(&mut self) {
        self.portfolio.fetch.token = env_first(&[GITHUB_TOKEN_VAR]);
        self.backend = match (env_first(BACKEND_URL_VARS), env_first(BACKEND_KEY_VARS)) {
            (Some(url), Some(anon_key)) => Some(BackendConfig { url, anon_key }),
            (Some(_), None) => {
                warn!("Backend URL set without an anon key; record store disabled");
                None
            }
            _ => None,
        };
    }

    pub fn trace_loaded(&self) {
        self.portfolio.trace_loaded();
        info!(
            output = %self.output.display(),
            fallback_path = ?self.fallback_path,
            backend = self.backend.as_ref().map(|b| b.url.as_str()),
            "Loaded CliConfig"
        );
    }
}

/// First non-empty value among `names`.
fn env_first(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    github: GithubConfig,
    display: DisplayConfig,
    links: LinksConfig,
    fetch: FetchConfig,
    rules: RuleSet,
    fallback_path: Option<PathBuf>,
    output: Option<PathBuf>,
}

/// Loads a static YAML config file (no secrets) and injects secrets from the environment.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
        anyhow::anyhow!("Failed to read config file {:?}: {}", path_ref, e)
    })?;

    let raw: RawConfig = if config_content.trim().is_empty() {
        RawConfig::default()
    } else {
        serde_yaml::from_str(&config_content)
            .inspect_err(|e| error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML"))
            .with_context(|| format!("Failed to parse config YAML {:?}", path_ref))?
    };
    info!(config_path = ?path_ref, "Parsed config YAML successfully");

    let mut config = CliConfig {
        portfolio: PortfolioConfig {
            github: raw.github,
            display: raw.display,
            links: raw.links,
            fetch: raw.fetch,
            rules: raw.rules,
        },
        fallback_path: raw.fallback_path,
        output: raw.output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
        backend: None,
    };
    config.inject_env();
    Ok(config)
}
