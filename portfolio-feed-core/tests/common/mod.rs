#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use portfolio_feed_core::model::{Owner, Repository};
use serde_json::{json, Value};

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

/// A public, described, non-empty repository last updated a year before [`fixed_now`].
pub fn repo(id: u64, name: &str) -> Repository {
    Repository {
        id,
        name: name.to_string(),
        full_name: format!("octo/{name}"),
        description: Some(format!("{name} description")),
        visibility: "public".to_string(),
        fork: false,
        archived: false,
        size: 128,
        homepage: None,
        html_url: format!("https://github.com/octo/{name}"),
        language: Some("Rust".to_string()),
        topics: Vec::new(),
        stars: 0,
        forks: 0,
        created_at: fixed_now() - Duration::days(700),
        updated_at: fixed_now() - Duration::days(365),
        owner: Owner {
            login: "octo".to_string(),
        },
    }
}

/// The same shape the GitHub API returns for one entry of a repository listing.
pub fn repo_json(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "full_name": format!("octo/{name}"),
        "description": format!("{name} description"),
        "visibility": "public",
        "fork": false,
        "archived": false,
        "size": 128,
        "homepage": null,
        "html_url": format!("https://github.com/octo/{name}"),
        "language": "Rust",
        "topics": [],
        "stargazers_count": 0,
        "forks_count": 0,
        "created_at": "2023-07-01T00:00:00Z",
        "updated_at": "2024-06-01T00:00:00Z",
        "owner": { "login": "octo" }
    })
}

pub fn with(mut value: Value, key: &str, field: Value) -> Value {
    value[key] = field;
    value
}
