//! Skills breakdown across all repositories.
//!
//! Two independent signals are combined:
//!
//! 1. **Language bytes**: per-repository language maps summed across the most
//!    recently updated repositories, turned into percentage shares.
//! 2. **Marker files**: well-known top-level filenames (`Cargo.toml`,
//!    `package.json`, ...) that imply a technology. These are presence signals
//!    with a fixed placeholder share.
//!
//! Per-repository requests are issued one at a time with a pacing delay
//! between them to stay under the host's rate limits; the two signals are
//! gathered concurrently with each other.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::FetchConfig;
use crate::contract::RepositorySource;
use crate::model::{
    Experience, Provenance, Repository, TechCategory, TechMetadata, Technology, TechnologyReport,
};

/// Share reported for technologies only seen through marker files.
pub const FILE_DETECTED_PERCENTAGE: f64 = 15.0;
/// Technologies at or below this share are dropped.
pub const MIN_PERCENTAGE: f64 = 0.5;
const TOP_LANGUAGES: usize = 8;
const DEFAULT_COLOR: &str = "#6b7280";
const DEFAULT_ICON: &str = "🔧";

struct CatalogEntry {
    language: &'static str,
    name: &'static str,
    category: TechCategory,
    color: &'static str,
    icon: &'static str,
    weight: f64,
}

const fn entry(
    language: &'static str,
    name: &'static str,
    category: TechCategory,
    color: &'static str,
    icon: &'static str,
    weight: f64,
) -> CatalogEntry {
    CatalogEntry {
        language,
        name,
        category,
        color,
        icon,
        weight,
    }
}

use TechCategory::{Backend, Data, Devops, Frontend, Mobile, Tools};

const CATALOG: &[CatalogEntry] = &[
    entry("JavaScript", "JavaScript", Frontend, "#f7df1e", "⚡", 1.2),
    entry("TypeScript", "TypeScript", Frontend, "#3178c6", "🔷", 1.3),
    entry("HTML", "HTML5", Frontend, "#e34f26", "🌐", 0.8),
    entry("CSS", "CSS3", Frontend, "#1572b6", "🎨", 0.9),
    entry("SCSS", "Sass", Frontend, "#cc6699", "🎨", 0.9),
    entry("Vue", "Vue.js", Frontend, "#4fc08d", "💚", 1.2),
    entry("Svelte", "Svelte", Frontend, "#ff3e00", "🔥", 1.1),
    entry("Python", "Python", Backend, "#3776ab", "🐍", 1.2),
    entry("Java", "Java", Backend, "#ed8b00", "☕", 1.2),
    entry("C#", "C#", Backend, "#239120", "🔷", 1.2),
    entry("PHP", "PHP", Backend, "#777bb4", "🐘", 1.1),
    entry("Go", "Go", Backend, "#00add8", "🐹", 1.2),
    entry("Rust", "Rust", Backend, "#ce422b", "🦀", 1.3),
    entry("C++", "C++", Backend, "#00599c", "⚙️", 1.2),
    entry("C", "C", Backend, "#a8b9cc", "🔧", 1.1),
    entry("Ruby", "Ruby", Backend, "#cc342d", "💎", 1.1),
    entry("Swift", "Swift", Mobile, "#fa7343", "📱", 1.2),
    entry("Kotlin", "Kotlin", Mobile, "#7f52ff", "📱", 1.2),
    entry("Dart", "Flutter", Mobile, "#02569b", "📱", 1.3),
    entry("Objective-C", "Objective-C", Mobile, "#438eff", "📱", 1.0),
    entry("Shell", "Shell Script", Devops, "#89e051", "🐚", 0.9),
    entry("PowerShell", "PowerShell", Devops, "#012456", "💙", 0.9),
    entry("Dockerfile", "Docker", Devops, "#2496ed", "🐳", 1.2),
    entry("YAML", "YAML", Devops, "#cb171e", "⚙️", 0.8),
    entry("JSON", "JSON", Tools, "#000000", "📄", 0.7),
    entry("R", "R", Data, "#276dc3", "📊", 1.1),
    entry("MATLAB", "MATLAB", Data, "#e16737", "📈", 1.0),
    entry("Jupyter Notebook", "Jupyter", Data, "#da5b0b", "📓", 1.1),
];

/// Case-insensitive filename patterns and the technologies they imply.
const MARKER_FILES: &[(&str, &[&str])] = &[
    (r"^package\.json$", &["Node.js", "JavaScript"]),
    (r"^requirements\.txt$", &["Python"]),
    (r"^dockerfile$", &["Docker"]),
    (r"^docker-compose\.ya?ml$", &["Docker"]),
    (r"^astro\.config\.mjs$", &["Astro"]),
    (r"^vite\.config\.[jt]s$", &["Vite"]),
    (r"^tailwind\.config\.js$", &["Tailwind CSS"]),
    (r"^next\.config\.js$", &["Next.js"]),
    (r"^nuxt\.config\.js$", &["Nuxt.js"]),
    (r"^vue\.config\.js$", &["Vue.js"]),
    (r"^angular\.json$", &["Angular"]),
    (r"^pubspec\.yaml$", &["Flutter"]),
    (r"^cargo\.toml$", &["Rust"]),
    (r"^go\.mod$", &["Go"]),
    (r"^composer\.json$", &["PHP"]),
    (r"^pom\.xml$", &["Java"]),
    (r"\.csproj$", &["C#"]),
    (r"^gemfile$", &["Ruby"]),
];

fn catalog_by_language(language: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.language == language)
}

fn catalog_by_name(name: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.name == name)
}

/// Tier from the unrounded share and the number of repositories using the technology.
pub fn experience_for(percentage: f64, repos: u32) -> Experience {
    if percentage > 25.0 && repos > 4 {
        Experience::Expert
    } else if percentage > 15.0 && repos > 2 {
        Experience::Advanced
    } else if percentage > 5.0 && repos > 1 {
        Experience::Intermediate
    } else {
        Experience::Beginner
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn by_percentage_desc(a: &Technology, b: &Technology) -> std::cmp::Ordering {
    b.percentage.total_cmp(&a.percentage)
}

/// Limits and pacing for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    pub request_pacing: Duration,
    pub language_repo_limit: usize,
    pub file_repo_limit: usize,
    pub top_technologies: usize,
}

impl From<&FetchConfig> for AnalyzerSettings {
    fn from(config: &FetchConfig) -> Self {
        Self {
            request_pacing: config.request_pacing(),
            language_repo_limit: config.language_repo_limit,
            file_repo_limit: config.file_repo_limit,
            top_technologies: config.top_technologies,
        }
    }
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self::from(&FetchConfig::default())
    }
}

struct Marker {
    pattern: Regex,
    technologies: &'static [&'static str],
}

pub struct TechAnalyzer {
    source: Arc<dyn RepositorySource>,
    settings: AnalyzerSettings,
    markers: Vec<Marker>,
}

impl TechAnalyzer {
    pub fn new(source: Arc<dyn RepositorySource>, settings: AnalyzerSettings) -> Self {
        let markers = MARKER_FILES
            .iter()
            .filter_map(|(pattern, technologies)| {
                match Regex::new(&format!("(?i){pattern}")) {
                    Ok(pattern) => Some(Marker {
                        pattern,
                        technologies,
                    }),
                    Err(e) => {
                        warn!(pattern, error = %e, "Skipping invalid marker pattern");
                        None
                    }
                }
            })
            .collect();
        Self {
            source,
            settings,
            markers,
        }
    }

    async fn pace(&self) {
        if !self.settings.request_pacing.is_zero() {
            tokio::time::sleep(self.settings.request_pacing).await;
        }
    }

    /// Byte-weighted language shares across the first `language_repo_limit` repositories.
    pub async fn analyze_languages(&self, repositories: &[Repository]) -> Vec<Technology> {
        let mut totals: BTreeMap<String, (u64, u32)> = BTreeMap::new();
        let mut total_bytes: u64 = 0;
        let mut processed = 0usize;

        for repo in repositories.iter().take(self.settings.language_repo_limit) {
            let languages = self
                .source
                .fetch_languages(&repo.owner.login, &repo.name)
                .await;
            if !languages.is_empty() {
                processed += 1;
            }
            for (language, bytes) in languages.iter() {
                let slot = totals.entry(language.to_string()).or_insert((0, 0));
                slot.0 += bytes;
                slot.1 += 1;
                total_bytes += bytes;
            }
            self.pace().await;
        }
        info!(processed, languages = totals.len(), "Analyzed repository languages");

        let mut technologies: Vec<Technology> = totals
            .into_iter()
            .filter_map(|(language, (bytes, repos))| {
                let share = if total_bytes > 0 {
                    bytes as f64 / total_bytes as f64 * 100.0
                } else {
                    0.0
                };
                let percentage = round_one_decimal(share);
                if percentage <= MIN_PERCENTAGE {
                    debug!(%language, percentage, "Dropping minor language");
                    return None;
                }
                let (name, category, color, icon, weight) = match catalog_by_language(&language)
                {
                    Some(e) => (e.name.to_string(), e.category, e.color, e.icon, e.weight),
                    None => (language, TechCategory::Other, DEFAULT_COLOR, DEFAULT_ICON, 1.0),
                };
                Some(Technology {
                    name,
                    category,
                    color: color.to_string(),
                    icon: icon.to_string(),
                    weight,
                    percentage,
                    bytes,
                    repos,
                    experience: experience_for(share, repos),
                    source: Provenance::Languages,
                })
            })
            .collect();
        technologies.sort_by(by_percentage_desc);
        technologies
    }

    /// Technologies implied by marker files in the first `file_repo_limit` repositories.
    pub async fn detect_technologies_by_files(
        &self,
        repositories: &[Repository],
    ) -> Vec<Technology> {
        let mut detected: Vec<&'static str> = Vec::new();

        for repo in repositories.iter().take(self.settings.file_repo_limit) {
            let files = self
                .source
                .fetch_file_listing(&repo.owner.login, &repo.name)
                .await;
            for file in &files {
                for marker in self.markers.iter().filter(|m| m.pattern.is_match(file)) {
                    for tech in marker.technologies {
                        if !detected.contains(tech) {
                            detected.push(tech);
                        }
                    }
                }
            }
            self.pace().await;
        }
        info!(detected = detected.len(), "Detected technologies from marker files");

        detected
            .into_iter()
            .map(|tech| {
                let (category, color, icon, weight) = match catalog_by_name(tech) {
                    Some(e) => (e.category, e.color, e.icon, e.weight),
                    None => (TechCategory::Tools, DEFAULT_COLOR, DEFAULT_ICON, 1.0),
                };
                Technology {
                    name: tech.to_string(),
                    category,
                    color: color.to_string(),
                    icon: icon.to_string(),
                    weight,
                    percentage: FILE_DETECTED_PERCENTAGE,
                    bytes: 0,
                    repos: 1,
                    experience: Experience::Intermediate,
                    source: Provenance::Files,
                }
            })
            .collect()
    }

    /// Runs both analyses concurrently and merges them; language-derived entries win on name clashes.
    pub async fn complete_analysis(
        &self,
        username: Option<&str>,
        repositories: &[Repository],
    ) -> TechnologyReport {
        info!(repositories = repositories.len(), "Starting complete technology analysis");
        let (languages, detected) = futures::join!(
            self.analyze_languages(repositories),
            self.detect_technologies_by_files(repositories)
        );

        let mut merged: Vec<Technology> = languages.clone();
        for tech in detected {
            if !merged.iter().any(|existing| existing.name == tech.name) {
                merged.push(tech);
            }
        }
        let total_techs = merged.len();

        let mut techs_by_category: BTreeMap<TechCategory, Vec<Technology>> = BTreeMap::new();
        for tech in &merged {
            techs_by_category
                .entry(tech.category)
                .or_default()
                .push(tech.clone());
        }
        for group in techs_by_category.values_mut() {
            group.sort_by(by_percentage_desc);
        }

        merged.sort_by(by_percentage_desc);
        merged.truncate(self.settings.top_technologies);

        let report = TechnologyReport {
            languages: languages.into_iter().take(TOP_LANGUAGES).collect(),
            technologies: merged,
            metadata: TechMetadata {
                source: "github_api_realtime".to_string(),
                total_techs,
                categories: techs_by_category.keys().copied().collect(),
                last_updated: Utc::now(),
                username: username.map(str::to_string),
            },
            techs_by_category,
        };
        info!(
            technologies = report.technologies.len(),
            categories = report.techs_by_category.len(),
            "Technology analysis complete"
        );
        report
    }
}
