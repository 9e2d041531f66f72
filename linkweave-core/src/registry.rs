//! Term registry: link definitions, alias resolution, and table merging.
//!
//! The registry is assembled once per process by [`RegistryBuilder`] from
//! the built-in table, the articles found in the content directory, and
//! any configured overlay. It is read-only afterwards and can be shared
//! between concurrently processed documents.

use crate::models::{canonical_path, Article};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Built-in term table, compiled into the binary
const BUILTIN_MAPPINGS: &str = include_str!("../data/link-mappings.yml");

/// Term → definition table
pub type LinkMappings = BTreeMap<String, LinkDefinition>;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to read mappings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid mappings YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// How a term is linked, or which other term it borrows its target from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// `url` is a site path to be joined onto the base URL
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub internal: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whole_word: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<String>,
}

impl LinkDefinition {
    pub fn external(url: impl Into<String>, title: Option<String>) -> Self {
        Self {
            url: Some(url.into()),
            title,
            ..Self::default()
        }
    }

    pub fn internal(path: impl Into<String>, title: Option<String>) -> Self {
        Self {
            url: Some(path.into()),
            internal: true,
            title,
            ..Self::default()
        }
    }

    pub fn alias(target: impl Into<String>) -> Self {
        Self {
            alias_of: Some(target.into()),
            ..Self::default()
        }
    }
}

/// A definition after following its alias chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLink {
    pub url: String,
    pub internal: bool,
    pub title: Option<String>,
    pub case_sensitive: bool,
    pub whole_word: bool,
}

impl ResolvedLink {
    /// Final link target: internal paths are joined onto `base_url` with
    /// exactly one slash between them, external URLs are used verbatim.
    pub fn href(&self, base_url: &str) -> String {
        if !self.internal {
            return self.url.clone();
        }
        join_site_path(base_url, &self.url)
    }
}

/// Append a site path to `base_url`, keeping any path the base already
/// has (`https://x.io/site` + `/blog/a` is `https://x.io/site/blog/a`)
pub fn join_site_path(base_url: &str, path: &str) -> String {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Why a term cannot be linked
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Unresolvable {
    #[error("term {0:?} is not in the registry")]
    UnknownTerm(String),

    #[error("alias cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("{term:?} aliases missing term {target:?}")]
    Dangling { term: String, target: String },

    #[error("{0:?} has neither a url nor an alias")]
    MissingUrl(String),
}

/// Immutable term table
#[derive(Debug, Clone, Default)]
pub struct Registry {
    mappings: LinkMappings,
}

impl Registry {
    pub fn from_mappings(mappings: LinkMappings) -> Self {
        Self { mappings }
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn get(&self, term: &str) -> Option<&LinkDefinition> {
        self.mappings.get(term)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LinkDefinition)> {
        self.mappings.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Terms in matching priority: longest first (in characters), equal
    /// lengths in lexicographic order. Blank keys are never matched.
    pub fn terms_by_priority(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self
            .mappings
            .keys()
            .map(String::as_str)
            .filter(|t| !t.trim().is_empty())
            .collect();
        terms.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        terms
    }

    /// Follow `term`'s alias chain to a URL-bearing definition.
    ///
    /// URL and title come from the end of the chain. Matching flags come
    /// from the end of the chain unless `term`'s own entry sets them. A
    /// definition carrying both `url` and `aliasOf` is treated as direct.
    pub fn resolve(&self, term: &str) -> Result<ResolvedLink, Unresolvable> {
        let own = self
            .mappings
            .get(term)
            .ok_or_else(|| Unresolvable::UnknownTerm(term.to_string()))?;

        let mut chain: Vec<&str> = vec![term];
        let mut current = own;

        loop {
            if let Some(url) = &current.url {
                return Ok(ResolvedLink {
                    url: url.clone(),
                    internal: current.internal,
                    title: current.title.clone(),
                    case_sensitive: own
                        .case_sensitive
                        .or(current.case_sensitive)
                        .unwrap_or(false),
                    whole_word: own.whole_word.or(current.whole_word).unwrap_or(true),
                });
            }

            let Some(target) = current.alias_of.as_deref() else {
                let last = chain.last().copied().unwrap_or(term);
                return Err(Unresolvable::MissingUrl(last.to_string()));
            };

            if chain.contains(&target) {
                let mut cycle: Vec<String> = chain.iter().map(|s| s.to_string()).collect();
                cycle.push(target.to_string());
                return Err(Unresolvable::Cycle(cycle));
            }

            current = self.mappings.get(target).ok_or_else(|| Unresolvable::Dangling {
                term: chain.last().copied().unwrap_or(term).to_string(),
                target: target.to_string(),
            })?;
            chain.push(target);
        }
    }
}

/// Assembles a [`Registry`]; later merges win on key collision
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    mappings: LinkMappings,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the built-in table
    pub fn with_builtin() -> Result<Self, RegistryError> {
        Ok(Self {
            mappings: builtin_mappings()?,
        })
    }

    /// Overlay `mappings` on top of what is already present
    pub fn merge(mut self, mappings: LinkMappings) -> Self {
        self.mappings.extend(mappings);
        self
    }

    /// Overlay a YAML mappings file
    pub fn merge_file(self, path: &Path) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path)?;
        let mappings: LinkMappings = serde_yaml::from_str(&contents)?;
        tracing::debug!("Loaded {} mappings from {:?}", mappings.len(), path);
        Ok(self.merge(mappings))
    }

    /// Overlay one entry per published article
    pub fn merge_articles(self, articles: &[Article], blog_path: &str) -> Self {
        let mappings = article_mappings(articles, blog_path);
        self.merge(mappings)
    }

    pub fn build(self) -> Registry {
        tracing::debug!("Registry built with {} terms", self.mappings.len());
        Registry {
            mappings: self.mappings,
        }
    }
}

/// Parse the compiled-in term table
pub fn builtin_mappings() -> Result<LinkMappings, RegistryError> {
    Ok(serde_yaml::from_str(BUILTIN_MAPPINGS)?)
}

/// Dynamic table: each non-draft article's title links to its canonical
/// path, and each of its `linkHooks` aliases that title.
///
/// Titles take precedence over hooks; a hook equal to some title is
/// dropped.
pub fn article_mappings(articles: &[Article], blog_path: &str) -> LinkMappings {
    let mut mappings = LinkMappings::new();

    for article in articles.iter().filter(|a| !a.is_draft()) {
        let title = article.frontmatter.title.trim();
        if title.is_empty() {
            continue;
        }
        let path = canonical_path(blog_path, &article.slug);
        if let Some(previous) = mappings.insert(
            title.to_string(),
            LinkDefinition::internal(path, Some(title.to_string())),
        ) {
            tracing::warn!(
                "Duplicate article title {:?} ({:?} replaces {:?})",
                title,
                article.slug,
                previous.url
            );
        }
    }

    for article in articles.iter().filter(|a| !a.is_draft()) {
        let title = article.frontmatter.title.trim();
        for hook in &article.frontmatter.link_hooks {
            let hook = hook.trim();
            if hook.is_empty() || hook == title {
                continue;
            }
            if mappings.contains_key(hook) {
                tracing::warn!(
                    "Link hook {:?} on {:?} collides with an existing term",
                    hook,
                    article.slug
                );
                continue;
            }
            mappings.insert(hook.to_string(), LinkDefinition::alias(title));
        }
    }

    mappings
}
