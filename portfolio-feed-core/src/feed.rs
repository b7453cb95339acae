//! The single JSON document the site generator reads at build time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::Portfolio;
use crate::model::{AboutData, Post, Project, TechnologyReport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub generated_at: DateTime<Utc>,
    pub projects: Vec<Project>,
    pub featured: Vec<Project>,
    pub technologies: TechnologyReport,
    pub posts: Vec<Post>,
    pub about: AboutData,
}

/// Resolves every section of the feed concurrently.
pub async fn build_feed(portfolio: &Portfolio) -> Feed {
    info!("[FEED] Building feed document");
    let featured_count = portfolio.config().display.featured_projects_count;
    let (projects, featured, technologies, posts, about) = futures::join!(
        portfolio.all_published_projects(),
        portfolio.featured_projects(featured_count),
        portfolio.realtime_technologies(),
        portfolio.all_published_posts(),
        portfolio.about_data()
    );
    info!(
        projects = projects.len(),
        featured = featured.len(),
        technologies = technologies.technologies.len(),
        posts = posts.len(),
        "[FEED] Feed document ready"
    );
    Feed {
        generated_at: Utc::now(),
        projects,
        featured,
        technologies,
        posts,
        about,
    }
}
