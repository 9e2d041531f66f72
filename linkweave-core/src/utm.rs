//! UTM parameter injection for every link in a document.
//!
//! Each link is resolved against the site base URL and gets
//! `utm_source`, `utm_medium`, `utm_campaign` and, when the link has
//! visible text, `utm_content`. Existing parameters are kept; the four
//! keys are overwritten in place, so tagging twice changes nothing.

use crate::config::DEFAULT_BASE_URL;
use crate::tree::{for_each_link_mut, text_content};
use linkweave_types::Node;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;
use url::Url;

/// Campaign used when the document has no value for the campaign field
pub const DEFAULT_CAMPAIGN: &str = "blog-post";

#[derive(Error, Debug)]
pub enum UtmError {
    #[error("Invalid base URL {0:?}: {1}")]
    InvalidBaseUrl(String, url::ParseError),
}

#[derive(Debug, Clone)]
pub struct UtmOptions {
    pub base_url: String,

    /// Defaults to the base URL's host
    pub source: Option<String>,

    pub medium: String,

    /// Hosts whose links are left untouched
    pub exclude_domains: Vec<String>,
}

impl Default for UtmOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            source: None,
            medium: String::from("blog"),
            exclude_domains: Vec::new(),
        }
    }
}

/// Why a link was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// In-page anchor (`#section`)
    Fragment,
    /// Root-relative reference that could not be resolved
    Relative,
    /// `mailto:`, `tel:` and other non-web schemes
    Scheme,
    ExcludedDomain,
}

/// Result of tagging one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    Modified(String),
    Skipped(SkipReason),
    Failed(url::ParseError),
}

/// Per-document counters; informational only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TagReport {
    pub modified: usize,
    pub skipped: usize,
    pub errored: usize,
}

#[derive(Debug, Clone)]
pub struct UtmTagger {
    base: Url,
    source: String,
    medium: String,
    exclude_domains: HashSet<String>,
}

impl UtmTagger {
    pub fn new(options: &UtmOptions) -> Result<Self, UtmError> {
        let base = Url::parse(&options.base_url)
            .map_err(|e| UtmError::InvalidBaseUrl(options.base_url.clone(), e))?;
        let source = options
            .source
            .clone()
            .unwrap_or_else(|| base.host_str().unwrap_or_default().to_string());

        Ok(Self {
            base,
            source,
            medium: options.medium.clone(),
            exclude_domains: options
                .exclude_domains
                .iter()
                .map(|d| d.trim().to_lowercase())
                .collect(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Tag every link under `children` in place
    pub fn tag_document(&self, children: &mut [Node], campaign: &str) -> TagReport {
        let mut report = TagReport::default();

        for_each_link_mut(children, &mut |link| {
            let content = text_content(&link.children);
            match self.tag_url(&link.url, campaign, &content) {
                TagOutcome::Modified(tagged) => {
                    tracing::debug!("Modified: {} → {}", link.url, tagged);
                    link.url = tagged;
                    report.modified += 1;
                }
                TagOutcome::Skipped(reason) => {
                    tracing::trace!("Skipped {} ({:?})", link.url, reason);
                    report.skipped += 1;
                }
                TagOutcome::Failed(e) => {
                    tracing::warn!("Could not parse URL {:?}: {}", link.url, e);
                    report.errored += 1;
                }
            }
        });

        report
    }

    /// Compute the tagged form of a single URL
    pub fn tag_url(&self, raw: &str, campaign: &str, content: &str) -> TagOutcome {
        let raw = raw.trim();
        if raw.starts_with('#') {
            return TagOutcome::Skipped(SkipReason::Fragment);
        }

        let mut url = match self.base.join(raw) {
            Ok(url) => url,
            Err(_) if raw.starts_with('/') => return TagOutcome::Skipped(SkipReason::Relative),
            Err(e) => return TagOutcome::Failed(e),
        };

        if !matches!(url.scheme(), "http" | "https") {
            return TagOutcome::Skipped(SkipReason::Scheme);
        }
        if url
            .host_str()
            .is_some_and(|host| self.exclude_domains.contains(&host.to_lowercase()))
        {
            return TagOutcome::Skipped(SkipReason::ExcludedDomain);
        }

        let mut updates = vec![
            ("utm_source", self.source.as_str()),
            ("utm_medium", self.medium.as_str()),
            ("utm_campaign", campaign),
        ];
        if !content.is_empty() {
            updates.push(("utm_content", content));
        }
        set_query_params(&mut url, &updates);

        TagOutcome::Modified(url.to_string())
    }
}

/// Set each key to its value, keeping the position of its first
/// occurrence and dropping later duplicates; new keys are appended
fn set_query_params(url: &mut Url, updates: &[(&str, &str)]) {
    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

    for &(key, value) in updates {
        match pairs.iter().position(|(k, _)| k == key) {
            Some(first) => {
                pairs[first].1 = value.to_string();
                let mut index = 0;
                pairs.retain(|(k, _)| {
                    let keep = k != key || index == first;
                    index += 1;
                    keep
                });
            }
            None => pairs.push((key.to_string(), value.to_string())),
        }
    }

    url.query_pairs_mut().clear().extend_pairs(pairs.iter());
}
