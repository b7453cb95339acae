///
/// This module implements the CLI for portfolio-feed: command parsing, wiring
/// the core facade to GitHub and the backend, and printing results.
///
/// All data logic (fetching, classification, tiered fallback) lives in the
/// [`portfolio-feed-core`] crate. This module is CLI glue only.
///
/// ## How To Use
/// - From a site build: `portfolio-feed --config portfolio.yaml build --out src/data/feed.json`.
/// - Single queries (`projects`, `featured`, `project`, `technologies`, `posts`, `post`,
///   `about`) print JSON on stdout.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`portfolio-feed-core`]: ../../portfolio-feed-core/
use crate::load_config::{load_config, CliConfig};
use crate::supabase::SupabaseClient;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use portfolio_feed_core::aggregate::Portfolio;
use portfolio_feed_core::cache::TtlCache;
use portfolio_feed_core::fallback::StaticCatalog;
use portfolio_feed_core::feed::build_feed;
use portfolio_feed_core::store::DEFAULT_BUCKET;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// CLI for portfolio-feed: build the data a portfolio site renders.
#[derive(Parser)]
#[clap(
    name = "portfolio-feed",
    version,
    about = "Aggregate GitHub repositories, posts and settings into a portfolio data feed"
)]
pub struct Cli {
    /// Path to the YAML config file. Without it, defaults and environment are used.
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the full feed document (projects, featured, technologies, posts, about)
    Build {
        /// Output path; overrides `output` from the config file
        #[clap(long)]
        out: Option<PathBuf>,
    },
    /// Print published projects
    Projects {
        /// Print only this page (1-based) of `display.projects_per_page` projects
        #[clap(long)]
        page: Option<usize>,
    },
    /// Print featured projects
    Featured {
        /// Defaults to `display.featured_projects_count`
        #[clap(long)]
        limit: Option<usize>,
    },
    /// Print one project by id
    Project {
        #[clap(long)]
        id: String,
    },
    /// Print the skills breakdown
    Technologies,
    /// Print all published posts
    Posts,
    /// Print one published post by slug
    Post {
        #[clap(long)]
        slug: String,
    },
    /// Print the about-page content
    About,
    /// Upload an image to blob storage and print its path and public URL
    UploadImage {
        #[clap(long)]
        file: PathBuf,
        #[clap(long, default_value = DEFAULT_BUCKET)]
        bucket: String,
    },
}

/// Facade wired to GitHub, the optional backend and the configured fallback dataset.
pub fn build_portfolio(config: &CliConfig) -> Result<Portfolio> {
    let cache = Arc::new(TtlCache::new(config.portfolio.fetch.cache_ttl()));
    let mut portfolio = Portfolio::with_github(config.portfolio.clone(), cache)
        .context("Failed to construct GitHub client")?;

    if let Some(path) = &config.fallback_path {
        portfolio = portfolio.with_fallback(StaticCatalog::from_path(path)?);
    }
    if let Some(backend) = &config.backend {
        let client = Arc::new(SupabaseClient::new(backend)?);
        portfolio = portfolio
            .with_record_store(client.clone())
            .with_blob_store(client);
    } else {
        tracing::info!("No backend configured; record-store tier disabled");
    }
    Ok(portfolio)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => CliConfig::from_env(),
    };
    config.trace_loaded();
    let portfolio = build_portfolio(&config)?;

    match cli.command {
        Commands::Build { out } => {
            tracing::info!(command = "build", "Building feed document");
            let feed = build_feed(&portfolio).await;
            let path = out.unwrap_or_else(|| config.output.clone());
            write_json(&path, &feed)?;
            tracing::info!(command = "build", path = %path.display(), "Feed written");
            println!("Wrote feed to {}", path.display());
        }
        Commands::Projects { page: None } => {
            print_json(&portfolio.all_published_projects().await)?
        }
        Commands::Projects { page: Some(page) } => {
            print_json(&portfolio.published_projects_page(page).await)?
        }
        Commands::Featured { limit } => {
            let limit = limit.unwrap_or(config.portfolio.display.featured_projects_count);
            print_json(&portfolio.featured_projects(limit).await)?
        }
        Commands::Project { id } => print_json(&portfolio.project_by_id(&id).await)?,
        Commands::Technologies => print_json(&portfolio.realtime_technologies().await)?,
        Commands::Posts => print_json(&portfolio.all_published_posts().await)?,
        Commands::Post { slug } => print_json(&portfolio.post_by_slug(&slug).await)?,
        Commands::About => print_json(&portfolio.about_data().await)?,
        Commands::UploadImage { file, bucket } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read image {:?}", file))?;
            let file_name = file
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default();
            let path = portfolio.upload_image(file_name, bytes, &bucket).await?;
            let url = portfolio.image_url(&path, &bucket);
            tracing::info!(command = "upload-image", %path, "Image uploaded");
            print_json(&serde_json::json!({ "path": path, "url": url }))?
        }
    }

    Ok(())
}
