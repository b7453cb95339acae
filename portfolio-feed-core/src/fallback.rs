//! The last tier of the cascade: a static dataset that is always available.
//!
//! The default dataset is compiled into the binary. A deployment can point at
//! its own JSON file with the same shape (an array of camelCase projects).

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use tracing::{error, info};

use crate::error::CatalogError;
use crate::model::{
    Experience, Project, Provenance, TechCategory, TechMetadata, Technology, TechnologyReport,
};

const EMBEDDED_PROJECTS: &str = include_str!("../data/fallback_projects.json");

#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    projects: Vec<Project>,
}

impl StaticCatalog {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    /// The dataset shipped with the crate.
    pub fn embedded() -> Self {
        match Self::from_json(EMBEDDED_PROJECTS) {
            Ok(catalog) => catalog,
            Err(e) => {
                error!(error = %e, "Embedded fallback dataset is malformed");
                Self::default()
            }
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;
        info!(path = %path.display(), projects = catalog.len(), "Loaded fallback dataset");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Published projects, newest first. Undated projects sort last.
    pub fn all_published(&self) -> Vec<Project> {
        let mut published: Vec<Project> = self
            .projects
            .iter()
            .filter(|p| p.is_published())
            .cloned()
            .collect();
        published.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        published
    }

    pub fn featured(&self, limit: usize) -> Vec<Project> {
        self.all_published()
            .into_iter()
            .filter(|p| p.featured)
            .take(limit)
            .collect()
    }

    pub fn by_id(&self, id: &str) -> Option<Project> {
        self.projects.iter().find(|p| p.id == id).cloned()
    }

    pub fn by_category(&self, category: &str) -> Vec<Project> {
        self.all_published()
            .into_iter()
            .filter(|p| p.category == category)
            .collect()
    }
}

const STATIC_TECHNOLOGIES: &[(&str, TechCategory, f64, &str)] = &[
    ("React", TechCategory::Frontend, 85.0, "#61dafb"),
    ("JavaScript", TechCategory::Frontend, 90.0, "#f7df1e"),
    ("TypeScript", TechCategory::Frontend, 80.0, "#3178c6"),
    ("Vue.js", TechCategory::Frontend, 75.0, "#4fc08d"),
    ("Astro", TechCategory::Frontend, 70.0, "#ff5d01"),
    ("Node.js", TechCategory::Backend, 85.0, "#339933"),
    ("Python", TechCategory::Backend, 80.0, "#3776ab"),
    ("Express.js", TechCategory::Backend, 75.0, "#000000"),
    ("FastAPI", TechCategory::Backend, 70.0, "#009688"),
    ("PostgreSQL", TechCategory::Backend, 80.0, "#336791"),
    ("Docker", TechCategory::Devops, 75.0, "#2496ed"),
    ("Git", TechCategory::Devops, 90.0, "#f05032"),
    ("AWS", TechCategory::Devops, 70.0, "#ff9900"),
    ("Vercel", TechCategory::Devops, 80.0, "#000000"),
    ("Linux", TechCategory::Devops, 75.0, "#fcc624"),
];

/// Hand-maintained skills breakdown used when no live analysis is available.
pub fn static_technologies() -> TechnologyReport {
    let mut technologies: Vec<Technology> = STATIC_TECHNOLOGIES
        .iter()
        .map(|(name, category, percentage, color)| Technology {
            name: name.to_string(),
            category: *category,
            color: color.to_string(),
            icon: "🔧".to_string(),
            weight: 1.0,
            percentage: *percentage,
            bytes: 0,
            repos: 0,
            experience: Experience::Advanced,
            source: Provenance::Static,
        })
        .collect();
    technologies.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));

    let mut techs_by_category: BTreeMap<TechCategory, Vec<Technology>> = BTreeMap::new();
    for tech in &technologies {
        techs_by_category
            .entry(tech.category)
            .or_default()
            .push(tech.clone());
    }

    TechnologyReport {
        metadata: TechMetadata {
            source: "static_fallback".to_string(),
            total_techs: technologies.len(),
            categories: techs_by_category.keys().copied().collect(),
            last_updated: Utc::now(),
            username: None,
        },
        languages: Vec::new(),
        techs_by_category,
        technologies,
    }
}
