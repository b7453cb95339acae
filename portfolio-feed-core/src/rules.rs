//! Classification rule set: category rules and technology display names.
//!
//! Category rules are evaluated in declaration order and the first match
//! wins, so the order of [`RuleSet::categories`] is part of the contract.
//! Rules can be overridden from the YAML config:
//!
//! ```yaml
//! rules:
//!   categories:
//!     - type: simple
//!       name: Mobile
//!       languages: [Swift, Kotlin]
//!       topics: [android, ios]
//!     - type: compound
//!       name: Full Stack
//!       frontend: [JavaScript, TypeScript]
//!       backend: [Python, Go]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One category rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CategoryRule {
    /// Matches on any listed language, any listed topic, or a topic appearing in the repo name.
    Simple {
        name: String,
        #[serde(default)]
        languages: Vec<String>,
        #[serde(default)]
        topics: Vec<String>,
    },
    /// Matches only when both a frontend and a backend technology are present.
    Compound {
        name: String,
        frontend: Vec<String>,
        backend: Vec<String>,
    },
}

impl CategoryRule {
    pub fn simple(name: &str, languages: &[&str], topics: &[&str]) -> Self {
        CategoryRule::Simple {
            name: name.to_string(),
            languages: to_strings(languages),
            topics: to_strings(topics),
        }
    }

    pub fn compound(name: &str, frontend: &[&str], backend: &[&str]) -> Self {
        CategoryRule::Compound {
            name: name.to_string(),
            frontend: to_strings(frontend),
            backend: to_strings(backend),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CategoryRule::Simple { name, .. } | CategoryRule::Compound { name, .. } => name,
        }
    }

    /// `languages` are raw host language names; `topics` are repository topics as tagged.
    pub fn matches(&self, languages: &[String], topics: &[String], repo_name: &str) -> bool {
        match self {
            CategoryRule::Compound {
                frontend, backend, ..
            } => {
                let present = |tech: &String| {
                    languages.contains(tech) || topics.contains(&tech.to_lowercase())
                };
                frontend.iter().any(&present) && backend.iter().any(&present)
            }
            CategoryRule::Simple {
                languages: wanted_languages,
                topics: wanted_topics,
                ..
            } => {
                if wanted_languages.iter().any(|l| languages.contains(l)) {
                    return true;
                }
                let repo_name = repo_name.to_lowercase();
                wanted_topics
                    .iter()
                    .any(|t| topics.contains(t) || repo_name.contains(&t.to_lowercase()))
            }
        }
    }
}

/// Friendly display name (and brand color) for a language or topic key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechLabel {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub categories: Vec<CategoryRule>,
    pub default_category: String,
    /// Keyed by raw language name (`JavaScript`) or topic (`nextjs`).
    pub tech_names: BTreeMap<String, TechLabel>,
}

impl RuleSet {
    /// Display name for a language or topic key, if one is configured.
    pub fn tech_name(&self, key: &str) -> Option<&str> {
        self.tech_names.get(key).map(|label| label.name.as_str())
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        let categories = vec![
            CategoryRule::simple(
                "Mobile",
                &["Swift", "Kotlin", "Dart"],
                &["android", "ios", "flutter", "react-native", "mobile", "ionic"],
            ),
            CategoryRule::compound(
                "Full Stack",
                &["JavaScript", "TypeScript", "HTML", "CSS", "React", "Vue", "Angular"],
                &["Python", "Node.js", "Java", "C#", "PHP", "Go", "Ruby"],
            ),
            CategoryRule::simple(
                "Frontend",
                &["JavaScript", "TypeScript", "HTML", "CSS"],
                &["frontend", "react", "vue", "angular", "svelte", "website", "ui", "css"],
            ),
            CategoryRule::simple(
                "Backend",
                &["Python", "Java", "C#", "PHP", "Go", "Rust", "Ruby"],
                &["backend", "api", "server", "database", "microservices"],
            ),
            CategoryRule::simple(
                "DevOps",
                &[],
                &[
                    "docker",
                    "kubernetes",
                    "ci-cd",
                    "deployment",
                    "infrastructure",
                    "aws",
                    "gcp",
                    "azure",
                ],
            ),
            CategoryRule::simple(
                "Data Science",
                &["Python", "R", "Julia"],
                &[
                    "machine-learning",
                    "data-science",
                    "ai",
                    "analytics",
                    "jupyter",
                    "tensorflow",
                    "pytorch",
                ],
            ),
            CategoryRule::simple(
                "Game Development",
                &["C#", "C++", "JavaScript"],
                &["game", "unity", "unreal", "godot", "gamedev"],
            ),
        ];

        let tech_names = [
            ("JavaScript", "JavaScript", "#f7df1e"),
            ("TypeScript", "TypeScript", "#3178c6"),
            ("Python", "Python", "#3776ab"),
            ("Java", "Java", "#ed8b00"),
            ("C#", "C#", "#239120"),
            ("PHP", "PHP", "#777bb4"),
            ("Go", "Go", "#00add8"),
            ("Rust", "Rust", "#000000"),
            ("Swift", "Swift", "#fa7343"),
            ("Kotlin", "Kotlin", "#7f52ff"),
            ("react", "React", "#61dafb"),
            ("nextjs", "Next.js", "#000000"),
            ("vuejs", "Vue.js", "#4fc08d"),
            ("angular", "Angular", "#dd0031"),
            ("svelte", "Svelte", "#ff3e00"),
            ("nodejs", "Node.js", "#339933"),
            ("express", "Express.js", "#000000"),
            ("django", "Django", "#092e20"),
            ("flask", "Flask", "#000000"),
            ("fastapi", "FastAPI", "#009688"),
            ("mongodb", "MongoDB", "#47a248"),
            ("postgresql", "PostgreSQL", "#336791"),
            ("mysql", "MySQL", "#4479a1"),
            ("sqlite", "SQLite", "#003b57"),
            ("docker", "Docker", "#2496ed"),
            ("kubernetes", "Kubernetes", "#326ce5"),
            ("aws", "AWS", "#ff9900"),
            ("vercel", "Vercel", "#000000"),
            ("netlify", "Netlify", "#00c7b7"),
            ("firebase", "Firebase", "#ffca28"),
            ("supabase", "Supabase", "#3ecf8e"),
        ]
        .into_iter()
        .map(|(key, name, color)| {
            (
                key.to_string(),
                TechLabel {
                    name: name.to_string(),
                    color: color.to_string(),
                },
            )
        })
        .collect();

        Self {
            categories,
            default_category: "Other".to_string(),
            tech_names,
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        to_strings(values)
    }

    #[test]
    fn compound_rule_needs_both_sides() {
        let rule = CategoryRule::compound("Full Stack", &["TypeScript"], &["Python"]);
        assert!(rule.matches(&strings(&["TypeScript", "Python"]), &[], "x"));
        assert!(!rule.matches(&strings(&["TypeScript"]), &[], "x"));
        // Topics are compared against the lower-cased technology.
        assert!(rule.matches(&strings(&["TypeScript"]), &strings(&["python"]), "x"));
    }

    #[test]
    fn simple_rule_matches_topic_inside_repo_name() {
        let rule = CategoryRule::simple("Backend", &[], &["api"]);
        assert!(rule.matches(&[], &[], "Weather-API-Proxy"));
        assert!(!rule.matches(&[], &[], "weather-dashboard"));
    }

    #[test]
    fn rules_deserialize_from_tagged_yaml_shape() {
        let json = r#"[
            {"type": "compound", "name": "FS", "frontend": ["CSS"], "backend": ["Go"]},
            {"type": "simple", "name": "Ops", "topics": ["docker"]}
        ]"#;
        let rules: Vec<CategoryRule> = serde_json::from_str(json).unwrap();
        assert_eq!(rules[0].name(), "FS");
        assert!(matches!(rules[1], CategoryRule::Simple { ref languages, .. } if languages.is_empty()));
    }
}
