//! Data shapes shared across the pipeline.
//!
//! [`Repository`] and [`LanguageStats`] mirror what the GitHub REST API
//! returns. [`Project`], [`Post`], [`AboutData`] and [`TechnologyReport`] are
//! the unified camelCase shapes handed to page-rendering code, whichever tier
//! produced them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Owner of a repository (user or organisation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
}

/// Snapshot of one repository as listed by the hosting API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    pub description: Option<String>,
    #[serde(default = "default_visibility")]
    pub visibility: String,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub size: u64,
    pub homepage: Option<String>,
    #[serde(default)]
    pub html_url: String,
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(rename = "stargazers_count", default)]
    pub stars: u64,
    #[serde(rename = "forks_count", default)]
    pub forks: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: Owner,
}

fn default_visibility() -> String {
    "public".to_string()
}

/// One entry of a repository's top-level contents listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl ContentEntry {
    /// Directories and submodules never match a marker filename.
    pub fn is_file(&self) -> bool {
        matches!(self.kind.as_str(), "file" | "symlink" | "")
    }
}

/// Language name to byte count for a single repository.
///
/// Keeps the order the host returned (largest language first), which is the
/// order technology labels are derived in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageStats(Vec<(String, u64)>);

impl LanguageStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds bytes for a language, merging with an existing entry.
    pub fn insert(&mut self, language: impl Into<String>, bytes: u64) {
        let language = language.into();
        match self.0.iter_mut().find(|(name, _)| *name == language) {
            Some((_, existing)) => *existing += bytes,
            None => self.0.push((language, bytes)),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(name, bytes)| (name.as_str(), *bytes))
    }

    pub fn total_bytes(&self) -> u64 {
        self.0.iter().map(|(_, bytes)| bytes).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for LanguageStats {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut stats = LanguageStats::new();
        for (language, bytes) in iter {
            stats.insert(language, bytes);
        }
        stats
    }
}

impl Serialize for LanguageStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

impl<'de> Deserialize<'de> for LanguageStats {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StatsVisitor;

        impl<'de> Visitor<'de> for StatsVisitor {
            type Value = LanguageStats;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of language name to byte count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut stats = LanguageStats::new();
                while let Some((language, bytes)) = map.next_entry::<String, u64>()? {
                    stats.insert(language, bytes);
                }
                Ok(stats)
            }
        }

        deserializer.deserialize_map(StatsVisitor)
    }
}

/// Publication state of a project or post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Published,
    Draft,
    #[serde(other)]
    Unknown,
}

/// The unified project shape rendered by the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub demo_link: Option<String>,
    #[serde(default)]
    pub github_link: Option<String>,
    #[serde(default)]
    pub download_link: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stars: Option<u64>,
    #[serde(default)]
    pub forks: Option<u64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl Project {
    pub fn is_published(&self) -> bool {
        self.status == ProjectStatus::Published
    }
}

/// A blog post from the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub content_markdown: Option<String>,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Links shown on the about page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    pub github: String,
    pub linkedin: String,
    pub twitter: String,
    pub email: String,
}

/// Content of the about page, stored as the value of the `about` setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AboutData {
    pub bio: String,
    pub profile_image: String,
    pub skills: BTreeMap<String, Vec<String>>,
    pub experience: Vec<serde_json::Value>,
    pub education: Vec<serde_json::Value>,
    pub certifications: Vec<serde_json::Value>,
    pub social_links: SocialLinks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for AboutData {
    fn default() -> Self {
        let skills = [
            (
                "frontend",
                &["HTML5", "CSS3", "JavaScript", "TypeScript", "React", "Vue.js", "Astro"][..],
            ),
            (
                "backend",
                &["Node.js", "Python", "PHP", "Express.js", "FastAPI", "Laravel"][..],
            ),
            (
                "database",
                &["MySQL", "PostgreSQL", "MongoDB", "Firebase", "Redis"][..],
            ),
            (
                "tools",
                &["Git", "Docker", "AWS", "Vercel", "Figma", "VS Code"][..],
            ),
        ]
        .into_iter()
        .map(|(group, names)| {
            (
                group.to_string(),
                names.iter().map(|n| n.to_string()).collect(),
            )
        })
        .collect();

        Self {
            bio: "Hi! I'm a full stack developer who loves building digital products.".to_string(),
            profile_image: String::new(),
            skills,
            experience: Vec::new(),
            education: Vec::new(),
            certifications: Vec::new(),
            social_links: SocialLinks::default(),
            updated_at: None,
        }
    }
}

/// Broad technology family used to group the analysis output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TechCategory {
    Frontend,
    Backend,
    Mobile,
    Devops,
    Data,
    Tools,
    Other,
}

impl TechCategory {
    pub const ALL: [TechCategory; 7] = [
        TechCategory::Frontend,
        TechCategory::Backend,
        TechCategory::Mobile,
        TechCategory::Devops,
        TechCategory::Data,
        TechCategory::Tools,
        TechCategory::Other,
    ];
}

/// Experience tier derived from share and repository count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Experience {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

/// Where a [`Technology`] entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Languages,
    Files,
    Static,
}

/// One technology in the skills breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technology {
    pub name: String,
    pub category: TechCategory,
    pub color: String,
    pub icon: String,
    pub weight: f64,
    pub percentage: f64,
    pub bytes: u64,
    pub repos: u32,
    pub experience: Experience,
    pub source: Provenance,
}

/// Descriptive metadata attached to a [`TechnologyReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechMetadata {
    pub source: String,
    pub total_techs: usize,
    pub categories: Vec<TechCategory>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Skills breakdown as rendered by the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyReport {
    pub technologies: Vec<Technology>,
    #[serde(default)]
    pub languages: Vec<Technology>,
    pub techs_by_category: BTreeMap<TechCategory, Vec<Technology>>,
    pub metadata: TechMetadata,
}

/// Accepts ids stored either as JSON strings or numbers.
pub(crate) fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}
