//! CLI command implementations.

pub mod build;
pub mod process;
pub mod terms;

pub use build::build_site;
pub use process::process_file;
pub use terms::list_terms;

use anyhow::{Context, Result};
use linkweave_core::{build_registry, load_articles, Article, Config, Registry};
use std::path::Path;

/// Everything a command needs before touching individual documents
pub(crate) struct Site {
    pub config: Config,
    pub articles: Vec<Article>,
    pub registry: Registry,
}

/// Load the config, scan the content directory, and build the registry
pub(crate) fn load_site(config_path: &Path) -> Result<Site> {
    tracing::info!("Loading config from {:?}", config_path);
    let config =
        Config::load_or_default(config_path).context("Failed to load configuration")?;

    let articles = load_articles(&config.content_dir());
    let registry =
        build_registry(&config, &articles).context("Failed to build link registry")?;
    tracing::info!(
        "Registry has {} terms from {} articles",
        registry.len(),
        articles.len()
    );

    Ok(Site {
        config,
        articles,
        registry,
    })
}
