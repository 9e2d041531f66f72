//! Content directory discovery and article loading.

use crate::frontmatter::{parse_frontmatter, FrontmatterError};
use crate::models::Article;
use crate::slug::slug_from_path;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),

    #[error("Document has no front-matter title")]
    Untitled,
}

/// Find every `.md` / `.mdx` file under `dir`, sorted by path
pub fn discover_documents(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext == "md" || ext == "mdx")
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Read and parse a single article
pub fn load_article(path: &Path) -> Result<Article, ContentError> {
    let content = fs::read_to_string(path)?;
    let (frontmatter, body) = parse_frontmatter(&content)?;
    if frontmatter.title.is_empty() {
        return Err(ContentError::Untitled);
    }

    Ok(Article {
        slug: slug_from_path(path),
        source_path: path.to_path_buf(),
        frontmatter,
        body,
    })
}

/// Load every article under `dir`.
///
/// A file that cannot be read or parsed is logged and left out; it never
/// prevents the others from loading.
pub fn load_articles(dir: &Path) -> Vec<Article> {
    if !dir.is_dir() {
        tracing::warn!("Content directory {:?} does not exist", dir);
        return Vec::new();
    }

    let files = discover_documents(dir);
    tracing::info!("Found {} markdown files in {:?}", files.len(), dir);

    let articles: Vec<Article> = files
        .iter()
        .filter_map(|path| match load_article(path) {
            Ok(article) => Some(article),
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                None
            }
        })
        .collect();

    for (slug, paths) in duplicate_slugs(&articles) {
        tracing::warn!(
            "Slug {:?} is used by {:?}; they share one canonical path and output file",
            slug,
            paths
        );
    }

    articles
}

/// Slugs claimed by more than one article, with the files claiming them
pub fn duplicate_slugs(articles: &[Article]) -> BTreeMap<&str, Vec<&Path>> {
    let mut by_slug: BTreeMap<&str, Vec<&Path>> = BTreeMap::new();
    for article in articles {
        by_slug
            .entry(article.slug.as_str())
            .or_default()
            .push(article.source_path.as_path());
    }
    by_slug.retain(|_, paths| paths.len() > 1);
    by_slug
}
