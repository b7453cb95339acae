mod common;

use std::sync::Arc;

use chrono::Utc;
use common::repo;
use portfolio_feed_core::aggregate::Portfolio;
use portfolio_feed_core::config::PortfolioConfig;
use portfolio_feed_core::contract::{MockRecordStore, MockRepositorySource, Query};
use portfolio_feed_core::error::StoreError;
use portfolio_feed_core::fallback::StaticCatalog;
use portfolio_feed_core::model::{AboutData, LanguageStats};
use serde_json::json;

fn config() -> PortfolioConfig {
    let mut config = PortfolioConfig::default();
    config.github.username = "octo".to_string();
    config.fetch.request_pacing_ms = 0;
    config
}

fn empty_source() -> MockRepositorySource {
    let mut source = MockRepositorySource::new();
    source.expect_list_repositories().returning(|_, _| Vec::new());
    source
}

fn failing_store() -> MockRecordStore {
    let mut store = MockRecordStore::new();
    store.expect_select().returning(|_| {
        Err(StoreError::Status {
            status: 503,
            body: "unavailable".to_string(),
        })
    });
    store
}

#[tokio::test]
async fn test_empty_source_and_failing_store_fall_back_to_static_data() {
    let portfolio = Portfolio::new(config(), Arc::new(empty_source()))
        .with_record_store(Arc::new(failing_store()));

    let projects = portfolio.all_published_projects().await;
    assert_eq!(projects.len(), 8);
    assert_eq!(projects[0].title, "AI Content Generator");

    let featured = portfolio.featured_projects(3).await;
    assert_eq!(featured.len(), 3);
    assert!(featured.iter().all(|p| p.featured));

    let project = portfolio.project_by_id("2").await.expect("fallback has id 2");
    assert_eq!(project.title, "Task Management App");
    assert!(portfolio.project_by_id("999").await.is_none());
}

#[tokio::test]
async fn test_source_control_tier_wins_and_skips_the_store() {
    let mut source = MockRepositorySource::new();
    source.expect_list_repositories().returning(|_, _| {
        let mut popular = repo(2, "task-api");
        popular.stars = 12;
        vec![repo(1, "weather-dashboard"), popular]
    });
    source.expect_fetch_languages().returning(|_, name| {
        let mut stats = LanguageStats::new();
        match name {
            "task-api" => stats.insert("Python", 800),
            _ => stats.insert("TypeScript", 500),
        }
        stats
    });
    let mut store = MockRecordStore::new();
    store.expect_select().never();

    let portfolio =
        Portfolio::new(config(), Arc::new(source)).with_record_store(Arc::new(store));

    let projects = portfolio.all_published_projects().await;
    let titles: Vec<&str> = projects.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["Weather Dashboard", "Task Api"]);
    assert_eq!(projects[1].category, "Backend");
    assert_eq!(projects[1].github_link.as_deref(), Some("https://github.com/octo/task-api"));

    let featured = portfolio.featured_projects(1).await;
    assert_eq!(featured[0].title, "Task Api");

    let by_id = portfolio.project_by_id("1").await.unwrap();
    assert_eq!(by_id.technologies, ["TypeScript"]);
}

#[tokio::test]
async fn test_store_rows_are_normalized_when_source_is_empty() {
    let mut store = MockRecordStore::new();
    store
        .expect_select()
        .withf(|q: &Query| {
            q.collection == "projects"
                && q.filter_value("status") == Some(&json!("published"))
                && q.order.as_ref().is_some_and(|o| o.column == "published_at" && !o.ascending)
        })
        .returning(|_| {
            Ok(vec![json!({
                "id": 41,
                "title": "Inventory Service",
                "description": "Stock levels over gRPC",
                "demo_link": "https://inventory.example.com",
                "github_link": "https://github.com/octo/inventory",
                "technologies": ["Go", "PostgreSQL"],
                "category": "Backend",
                "featured": true,
                "status": "published",
                "published_at": "2024-09-01T10:00:00Z"
            })])
        });

    let portfolio =
        Portfolio::new(config(), Arc::new(empty_source())).with_record_store(Arc::new(store));
    let projects = portfolio.all_published_projects().await;

    assert_eq!(projects.len(), 1);
    let project = &projects[0];
    assert_eq!(project.id, "41");
    assert_eq!(project.demo_link.as_deref(), Some("https://inventory.example.com"));
    assert_eq!(project.technologies, ["Go", "PostgreSQL"]);
    assert!(project.featured);
}

#[tokio::test]
async fn test_technologies_fall_back_to_static_report() {
    let portfolio = Portfolio::new(config(), Arc::new(empty_source()))
        .with_record_store(Arc::new(failing_store()));

    let report = portfolio.realtime_technologies().await;
    assert_eq!(report.metadata.source, "static_fallback");
    assert_eq!(report.technologies.len(), 15);
}

#[tokio::test]
async fn test_technologies_come_from_stored_setting_before_static() {
    let stored = portfolio_feed_core::fallback::static_technologies();
    let mut stored_value = serde_json::to_value(&stored).unwrap();
    stored_value["metadata"]["source"] = json!("curated");

    let mut store = MockRecordStore::new();
    store
        .expect_select()
        .withf(|q: &Query| {
            q.collection == "settings" && q.filter_value("key") == Some(&json!("technologies"))
        })
        .returning(move |_| Ok(vec![json!({ "key": "technologies", "value": stored_value.clone() })]));

    let portfolio =
        Portfolio::new(config(), Arc::new(empty_source())).with_record_store(Arc::new(store));
    let report = portfolio.realtime_technologies().await;
    assert_eq!(report.metadata.source, "curated");
}

#[tokio::test]
async fn test_live_technologies_use_the_analysis_preset() {
    let mut source = MockRepositorySource::new();
    source
        .expect_list_repositories()
        .withf(|user, filter| user == "octo" && filter.require_language && !filter.require_description)
        .returning(|_, _| vec![repo(1, "cli")]);
    source.expect_fetch_languages().returning(|_, _| {
        let mut stats = LanguageStats::new();
        stats.insert("Rust", 4_000);
        stats
    });
    source.expect_fetch_file_listing().returning(|_, _| Vec::new());

    let portfolio = Portfolio::new(config(), Arc::new(source));
    let report = portfolio.realtime_technologies().await;
    assert_eq!(report.metadata.source, "github_api_realtime");
    assert_eq!(report.technologies[0].name, "Rust");
}

#[tokio::test]
async fn test_posts_and_slugs_come_from_the_store() {
    let mut store = MockRecordStore::new();
    store
        .expect_select()
        .withf(|q: &Query| q.collection == "posts" && q.columns == "slug")
        .returning(|_| Ok(vec![json!({"slug": "hello-world"}), json!({"slug": ""})]));
    store
        .expect_select()
        .withf(|q: &Query| q.collection == "posts" && q.filter_value("slug").is_some())
        .returning(|_| {
            Ok(vec![json!({
                "id": 3,
                "title": "Hello World",
                "slug": "hello-world",
                "content_markdown": "Hi there",
                "tags": ["intro"]
            })])
        });
    store
        .expect_select()
        .withf(|q: &Query| q.collection == "posts")
        .returning(|_| Err(StoreError::NotConfigured));

    let portfolio =
        Portfolio::new(config(), Arc::new(empty_source())).with_record_store(Arc::new(store));

    assert_eq!(portfolio.all_post_slugs().await, ["hello-world"]);
    let post = portfolio.post_by_slug("hello-world").await.unwrap();
    assert_eq!(post.id, "3");
    assert_eq!(post.tags, ["intro"]);
    assert!(portfolio.all_published_posts().await.is_empty());
}

#[tokio::test]
async fn test_about_defaults_without_store_and_updates_are_stamped() {
    let without_store = Portfolio::new(config(), Arc::new(empty_source()));
    assert_eq!(without_store.about_data().await, AboutData::default());
    assert!(!without_store.update_about_data(&AboutData::default()).await);

    let before = Utc::now();
    let mut store = MockRecordStore::new();
    store
        .expect_select()
        .returning(|_| Ok(Vec::new()));
    store
        .expect_upsert()
        .withf(move |collection, row| {
            let stamped = row["value"]["updatedAt"]
                .as_str()
                .and_then(|ts| chrono::DateTime::parse_from_rfc3339(ts).ok())
                .is_some_and(|ts| ts >= before);
            collection == "settings" && row["key"] == "about" && stamped
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let portfolio =
        Portfolio::new(config(), Arc::new(empty_source())).with_record_store(Arc::new(store));
    assert_eq!(portfolio.about_data().await, AboutData::default());
    assert!(portfolio.update_about_data(&AboutData::default()).await);
}

#[tokio::test]
async fn test_featured_store_tier_filters_on_featured_and_limit() {
    let mut store = MockRecordStore::new();
    store
        .expect_select()
        .withf(|q: &Query| {
            q.collection == "projects"
                && q.filter_value("status") == Some(&json!("published"))
                && q.filter_value("featured") == Some(&json!(true))
                && q.limit == Some(2)
        })
        .times(1)
        .returning(|_| {
            Ok(vec![json!({
                "id": "a1",
                "title": "A",
                "featured": true,
                "status": "published"
            })])
        });

    let portfolio =
        Portfolio::new(config(), Arc::new(empty_source())).with_record_store(Arc::new(store));
    let featured = portfolio.featured_projects(2).await;

    let titles: Vec<&str> = featured.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["A"]);
}

#[tokio::test]
async fn test_project_by_id_returns_the_stored_row() {
    let mut store = MockRecordStore::new();
    store
        .expect_select()
        .withf(|q: &Query| {
            q.collection == "projects"
                && q.filter_value("id") == Some(&json!("77"))
                && q.limit == Some(1)
        })
        .times(1)
        .returning(|_| {
            Ok(vec![json!({
                "id": 77,
                "title": "Stored",
                "github_link": "https://github.com/octo/stored",
                "published_at": "2024-05-01T00:00:00Z"
            })])
        });

    let portfolio =
        Portfolio::new(config(), Arc::new(empty_source())).with_record_store(Arc::new(store));
    let project = portfolio.project_by_id("77").await.expect("row is found");

    assert_eq!(project.id, "77");
    assert_eq!(project.title, "Stored");
    assert_eq!(project.github_link.as_deref(), Some("https://github.com/octo/stored"));
    assert!(project.is_published());
}

#[tokio::test]
async fn test_projects_by_category_keeps_published_newest_first() {
    let catalog = StaticCatalog::from_json(
        r#"[
            {"id": "1", "title": "Old Tool", "category": "Tools", "status": "published",
             "publishedAt": "2023-01-01T00:00:00Z"},
            {"id": "2", "title": "Draft Tool", "category": "Tools", "status": "draft",
             "publishedAt": "2024-06-01T00:00:00Z"},
            {"id": "3", "title": "New Tool", "category": "Tools", "status": "published",
             "publishedAt": "2024-03-01T00:00:00Z"},
            {"id": "4", "title": "Some App", "category": "Mobile", "status": "published",
             "publishedAt": "2024-04-01T00:00:00Z"}
        ]"#,
    )
    .expect("catalog parses");

    let portfolio = Portfolio::new(config(), Arc::new(empty_source())).with_fallback(catalog);
    let tools = portfolio.projects_by_category("Tools");

    let titles: Vec<&str> = tools.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["New Tool", "Old Tool"]);
    assert!(portfolio.projects_by_category("Backend").is_empty());
}

#[tokio::test]
async fn test_published_projects_are_paged() {
    let mut config = config();
    config.display.projects_per_page = 3;
    let portfolio = Portfolio::new(config, Arc::new(empty_source()));

    let titles = |projects: Vec<portfolio_feed_core::model::Project>| {
        projects.into_iter().map(|p| p.title).collect::<Vec<_>>()
    };
    assert_eq!(
        titles(portfolio.published_projects_page(1).await),
        ["AI Content Generator", "Learning Management System", "E-commerce Platform"]
    );
    assert_eq!(
        titles(portfolio.published_projects_page(3).await),
        ["Real-time Chat App", "Weather Dashboard"]
    );
    assert!(portfolio.published_projects_page(4).await.is_empty());
}
