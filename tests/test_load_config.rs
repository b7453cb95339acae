use portfolio_feed::load_config::{load_config, BackendConfig};
use portfolio_feed_core::rules::CategoryRule;
use serial_test::serial;
use std::env;
use std::fs::write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const ENV_VARS: &[&str] = &[
    "GITHUB_TOKEN",
    "PUBLIC_SUPABASE_URL",
    "SUPABASE_URL",
    "PUBLIC_SUPABASE_ANON_KEY",
    "SUPABASE_ANON_KEY",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).unwrap();
    file
}

#[test]
#[serial]
fn test_load_config_reads_sections_and_keeps_defaults() {
    clear_env();
    let file = config_file(
        r#"
github:
  username: octo
  exclude_repos: [sandbox]
display:
  max_technologies: 4
links:
  demo_url_pattern: "https://{name}.vercel.app"
fetch:
  timeout_secs: 5
  cache_ttl_secs: 60
output: public/feed.json
"#,
    );

    let config = load_config(file.path()).expect("Config should load");

    assert_eq!(config.portfolio.github.username, "octo");
    assert_eq!(config.portfolio.github.exclude_repos, ["sandbox"]);
    assert_eq!(config.portfolio.github.recent_days, 90);
    assert_eq!(config.portfolio.display.max_technologies, 4);
    assert_eq!(config.portfolio.display.max_description_length, 150);
    assert_eq!(
        config.portfolio.links.demo_url_pattern.as_deref(),
        Some("https://{name}.vercel.app")
    );
    assert_eq!(config.portfolio.fetch.timeout_secs, 5);
    assert_eq!(config.portfolio.fetch.user_agent, "Portfolio-App");
    assert_eq!(config.portfolio.rules.categories.len(), 7);
    assert_eq!(config.output, PathBuf::from("public/feed.json"));
    assert!(config.portfolio.fetch.token.is_none());
    assert!(config.backend.is_none());
}

#[test]
#[serial]
fn test_load_config_accepts_rule_overrides() {
    clear_env();
    let file = config_file(
        r#"
rules:
  default_category: Misc
  categories:
    - type: compound
      name: Full Stack
      frontend: [TypeScript]
      backend: [Go]
    - type: simple
      name: Tooling
      topics: [cli]
"#,
    );

    let config = load_config(file.path()).expect("Config should load");
    let rules = &config.portfolio.rules;
    assert_eq!(rules.default_category, "Misc");
    assert_eq!(rules.categories.len(), 2);
    assert!(matches!(rules.categories[1], CategoryRule::Simple { .. }));
    assert!(rules.tech_name("nextjs").is_some());
}

#[test]
#[serial]
fn test_secrets_come_from_environment() {
    clear_env();
    env::set_var("GITHUB_TOKEN", "ghp_test");
    env::set_var("SUPABASE_URL", "https://fallback.supabase.co");
    env::set_var("PUBLIC_SUPABASE_URL", "https://public.supabase.co");
    env::set_var("SUPABASE_ANON_KEY", "anon-key");
    let file = config_file("github:\n  username: octo\n");

    let config = load_config(file.path()).expect("Config should load");
    clear_env();

    assert_eq!(config.portfolio.fetch.token.as_deref(), Some("ghp_test"));
    assert_eq!(
        config.backend,
        Some(BackendConfig {
            url: "https://public.supabase.co".to_string(),
            anon_key: "anon-key".to_string(),
        })
    );
}

#[test]
#[serial]
fn test_backend_needs_both_url_and_key() {
    clear_env();
    env::set_var("SUPABASE_URL", "https://only-url.supabase.co");
    let file = config_file("");

    let config = load_config(file.path()).expect("Empty config is valid");
    clear_env();
    assert!(config.backend.is_none());
}

#[test]
#[serial]
fn test_missing_or_malformed_files_are_errors() {
    clear_env();
    let err = load_config("does/not/exist.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));

    let file = config_file("github: [not, a, map]\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config YAML"));
}

#[test]
#[serial]
fn test_demo_url_pattern_defaults_and_can_be_disabled() {
    clear_env();
    let defaults = load_config(config_file("github:\n  username: octo\n").path())
        .expect("Config should load");
    assert_eq!(
        defaults.portfolio.links.demo_url_pattern.as_deref(),
        Some("https://{name}.vercel.app")
    );

    let disabled = load_config(config_file("links:\n  demo_url_pattern: null\n").path())
        .expect("Config should load");
    assert_eq!(disabled.portfolio.links.demo_url_pattern, None);
}
