mod common;

use std::sync::Arc;
use std::time::Duration;

use common::repo;
use portfolio_feed_core::analyzer::{AnalyzerSettings, TechAnalyzer};
use portfolio_feed_core::contract::MockRepositorySource;
use portfolio_feed_core::model::{Experience, LanguageStats, Provenance, TechCategory};

fn settings(pacing_ms: u64) -> AnalyzerSettings {
    AnalyzerSettings {
        request_pacing: Duration::from_millis(pacing_ms),
        language_repo_limit: 20,
        file_repo_limit: 15,
        top_technologies: 15,
    }
}

fn stats(entries: &[(&str, u64)]) -> LanguageStats {
    entries.iter().map(|(name, bytes)| (*name, *bytes)).collect()
}

#[tokio::test]
async fn test_language_shares_are_byte_weighted() {
    let mut source = MockRepositorySource::new();
    source
        .expect_fetch_languages()
        .returning(|_, _| stats(&[("Kotlin", 300), ("TypeScript", 700)]));

    let analyzer = TechAnalyzer::new(Arc::new(source), settings(0));
    let techs = analyzer.analyze_languages(&[repo(1, "app")]).await;

    let shares: Vec<(&str, f64)> = techs
        .iter()
        .map(|t| (t.name.as_str(), t.percentage))
        .collect();
    assert_eq!(shares, [("TypeScript", 70.0), ("Kotlin", 30.0)]);
    assert_eq!(techs[0].category, TechCategory::Frontend);
    assert_eq!(techs[1].category, TechCategory::Mobile);
}

#[tokio::test]
async fn test_minor_languages_are_dropped_and_unknown_ones_are_other() {
    let mut source = MockRepositorySource::new();
    source
        .expect_fetch_languages()
        .returning(|_, _| stats(&[("Zig", 9_960), ("Makefile", 40)]));

    let analyzer = TechAnalyzer::new(Arc::new(source), settings(0));
    let techs = analyzer.analyze_languages(&[repo(1, "tool")]).await;

    assert_eq!(techs.len(), 1);
    assert_eq!(techs[0].name, "Zig");
    assert_eq!(techs[0].category, TechCategory::Other);
    assert_eq!(techs[0].color, "#6b7280");
}

#[tokio::test]
async fn test_experience_uses_breadth_across_repositories() {
    let mut source = MockRepositorySource::new();
    source.expect_fetch_languages().returning(|_, repo| match repo {
        "r5" => stats(&[("Python", 100)]),
        _ => stats(&[("Rust", 100)]),
    });

    let repos: Vec<_> = (1..=5).map(|i| repo(i, &format!("r{i}"))).collect();
    let analyzer = TechAnalyzer::new(Arc::new(source), settings(0));
    let techs = analyzer.analyze_languages(&repos).await;

    let rust = techs.iter().find(|t| t.name == "Rust").unwrap();
    assert_eq!(rust.repos, 4);
    assert_eq!(rust.percentage, 80.0);
    assert_eq!(rust.experience, Experience::Advanced);
    let python = techs.iter().find(|t| t.name == "Python").unwrap();
    assert_eq!(python.experience, Experience::Beginner);
}

#[tokio::test]
async fn test_marker_files_are_matched_case_insensitively() {
    let mut source = MockRepositorySource::new();
    source.expect_fetch_file_listing().returning(|_, _| {
        vec![
            "DOCKERFILE".to_string(),
            "package.json".to_string(),
            "Api.csproj".to_string(),
            "README.md".to_string(),
        ]
    });

    let analyzer = TechAnalyzer::new(Arc::new(source), settings(0));
    let techs = analyzer
        .detect_technologies_by_files(&[repo(1, "a"), repo(2, "b")])
        .await;

    let names: Vec<&str> = techs.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Docker", "Node.js", "JavaScript", "C#"]);
    assert!(techs.iter().all(|t| t.percentage == 15.0
        && t.repos == 1
        && t.experience == Experience::Intermediate
        && t.source == Provenance::Files));
    assert_eq!(techs[0].category, TechCategory::Devops);
    assert_eq!(techs[1].category, TechCategory::Tools);
}

#[tokio::test]
async fn test_language_entries_win_over_file_detection() {
    let mut source = MockRepositorySource::new();
    source
        .expect_fetch_languages()
        .returning(|_, _| stats(&[("Rust", 1_000)]));
    source
        .expect_fetch_file_listing()
        .returning(|_, _| vec!["Cargo.toml".to_string(), "package.json".to_string()]);

    let analyzer = TechAnalyzer::new(Arc::new(source), settings(0));
    let report = analyzer.complete_analysis(Some("octo"), &[repo(1, "cli")]).await;

    let rust: Vec<_> = report
        .technologies
        .iter()
        .filter(|t| t.name == "Rust")
        .collect();
    assert_eq!(rust.len(), 1);
    assert_eq!(rust[0].source, Provenance::Languages);
    assert_eq!(rust[0].percentage, 100.0);

    assert_eq!(report.metadata.total_techs, 3);
    assert_eq!(report.metadata.username.as_deref(), Some("octo"));
    assert_eq!(
        report.metadata.categories,
        [TechCategory::Frontend, TechCategory::Backend, TechCategory::Tools]
    );
    assert_eq!(report.languages.len(), 1);
    assert_eq!(report.techs_by_category[&TechCategory::Backend][0].name, "Rust");
}

#[tokio::test]
async fn test_repository_limits_bound_request_count() {
    let mut source = MockRepositorySource::new();
    source
        .expect_fetch_languages()
        .times(20)
        .returning(|_, _| stats(&[("Go", 10)]));
    source
        .expect_fetch_file_listing()
        .times(15)
        .returning(|_, _| Vec::new());

    let repos: Vec<_> = (1..=25).map(|i| repo(i, &format!("svc-{i}"))).collect();
    let analyzer = TechAnalyzer::new(Arc::new(source), settings(0));
    let report = analyzer.complete_analysis(None, &repos).await;
    assert_eq!(report.technologies[0].repos, 20);
}

#[tokio::test(start_paused = true)]
async fn test_requests_are_paced_and_pipelines_overlap() {
    let mut source = MockRepositorySource::new();
    source
        .expect_fetch_languages()
        .returning(|_, _| stats(&[("Go", 10)]));
    source.expect_fetch_file_listing().returning(|_, _| Vec::new());

    let repos: Vec<_> = (1..=3).map(|i| repo(i, &format!("svc-{i}"))).collect();
    let analyzer = TechAnalyzer::new(Arc::new(source), settings(50));

    let started = tokio::time::Instant::now();
    analyzer.complete_analysis(None, &repos).await;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(150));
    assert!(elapsed < Duration::from_millis(300));
}
