//! Pure classification: repository snapshot in, [`Project`] out.
//!
//! Nothing here touches the network or keeps state; the clock is passed in so
//! converting the same repository twice yields the same project.

use chrono::{DateTime, Duration, Utc};

use crate::config::PortfolioConfig;
use crate::model::{LanguageStats, Project, ProjectStatus, Repository};
use crate::rules::RuleSet;

const ELLIPSIS: &str = "...";
const RECENT_ACTIVITY_BONUS: u64 = 10;
const RECENT_ACTIVITY_DAYS: i64 = 7;

/// First rule (in declared order) whose predicate holds, else the default category.
pub fn determine_category<'r>(
    rules: &'r RuleSet,
    languages: &[String],
    topics: &[String],
    repo_name: &str,
) -> &'r str {
    rules
        .categories
        .iter()
        .find(|rule| rule.matches(languages, topics, repo_name))
        .map(|rule| rule.name())
        .unwrap_or(rules.default_category.as_str())
}

/// `my-cool-app` -> `My Cool App`.
pub fn derive_title(repo_name: &str) -> String {
    repo_name
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cuts at `max_chars` characters and appends `...` when anything was cut.
pub fn truncate_description(description: &str, max_chars: usize) -> String {
    match description.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{ELLIPSIS}", &description[..byte_idx]),
        None => description.to_string(),
    }
}

/// Converts repositories to projects with the configured rules.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'c> {
    config: &'c PortfolioConfig,
}

impl<'c> Classifier<'c> {
    pub fn new(config: &'c PortfolioConfig) -> Self {
        Self { config }
    }

    /// Mapped language names, then mapped topics; deduplicated in first-seen order and capped.
    pub fn technologies(&self, repo: &Repository, languages: &LanguageStats) -> Vec<String> {
        let rules = &self.config.rules;
        let from_languages = languages
            .iter()
            .map(|(lang, _)| rules.tech_name(lang).unwrap_or(lang).to_string());
        let from_topics = repo
            .topics
            .iter()
            .filter_map(|topic| rules.tech_name(topic).map(str::to_string));

        let mut technologies: Vec<String> = Vec::new();
        for tech in from_languages.chain(from_topics) {
            if !technologies.contains(&tech) {
                technologies.push(tech);
            }
        }
        technologies.truncate(self.config.display.max_technologies);
        technologies
    }

    pub fn is_featured(&self, repo: &Repository, now: DateTime<Utc>) -> bool {
        if repo.stars > 0 || repo.forks > 0 {
            return true;
        }
        let name = repo.name.to_lowercase();
        let description = repo.description.as_deref().unwrap_or_default().to_lowercase();
        let keyword_hit = self.config.github.featured_keywords.iter().any(|keyword| {
            let keyword = keyword.to_lowercase();
            name.contains(&keyword) || description.contains(&keyword)
        });
        keyword_hit || repo.updated_at > now - Duration::days(self.config.github.recent_days)
    }

    fn demo_link(&self, repo: &Repository) -> Option<String> {
        if let Some(homepage) = repo.homepage.as_deref().filter(|h| !h.trim().is_empty()) {
            return Some(homepage.to_string());
        }
        let pattern = self.config.links.demo_url_pattern.as_deref();
        pattern.filter(|p| !p.trim().is_empty()).map(|pattern| {
            pattern
                .replace("{full_name}", &repo.full_name)
                .replace("{name}", &repo.name)
        })
    }

    pub fn convert_repo_to_project(
        &self,
        repo: &Repository,
        languages: &LanguageStats,
        now: DateTime<Utc>,
    ) -> Project {
        let description = truncate_description(
            repo.description.as_deref().unwrap_or_default(),
            self.config.display.max_description_length,
        );
        let category = determine_category(
            &self.config.rules,
            &languages.names(),
            &repo.topics,
            &repo.name,
        );

        Project {
            id: repo.id.to_string(),
            title: derive_title(&repo.name),
            description,
            image: None,
            demo_link: self.demo_link(repo),
            github_link: Some(repo.html_url.clone()),
            download_link: None,
            technologies: self.technologies(repo, languages),
            category: category.to_string(),
            featured: self.is_featured(repo, now),
            status: ProjectStatus::Published,
            published_at: Some(repo.created_at),
            created_at: Some(repo.created_at),
            updated_at: Some(repo.updated_at),
            stars: Some(repo.stars),
            forks: Some(repo.forks),
            language: repo.language.clone(),
            topics: repo.topics.clone(),
        }
    }
}

/// Popularity plus a bonus for activity during the last week.
pub fn featured_score(project: &Project, now: DateTime<Utc>) -> u64 {
    let recent = project
        .updated_at
        .is_some_and(|updated| updated > now - Duration::days(RECENT_ACTIVITY_DAYS));
    project.stars.unwrap_or(0)
        + project.forks.unwrap_or(0)
        + if recent { RECENT_ACTIVITY_BONUS } else { 0 }
}

/// Featured projects, most relevant first, at most `limit`.
pub fn rank_featured(projects: Vec<Project>, limit: usize, now: DateTime<Utc>) -> Vec<Project> {
    let mut featured: Vec<Project> = projects.into_iter().filter(|p| p.featured).collect();
    featured.sort_by(|a, b| featured_score(b, now).cmp(&featured_score(a, now)));
    featured.truncate(limit);
    featured
}
