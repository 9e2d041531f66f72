//! List registry terms with their resolution.

use super::load_site;
use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Serialize)]
struct TermEntry<'a> {
    term: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    /// Present when the term can never be linked
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    excluded: bool,
}

/// Print every term in matching order
pub fn list_terms(config_path: &Path, unresolved: bool, json: bool) -> Result<()> {
    let site = load_site(config_path)?;
    let base_url = &site.config.site.base_url;
    let excluded_terms: HashSet<String> = site
        .config
        .auto_link
        .exclude_terms
        .iter()
        .map(|t| t.to_lowercase())
        .collect();

    let entries: Vec<TermEntry> = site
        .registry
        .terms_by_priority()
        .into_iter()
        .map(|term| {
            let excluded = excluded_terms.contains(&term.to_lowercase());
            match site.registry.resolve(term) {
                Ok(link) => TermEntry {
                    term,
                    url: Some(link.href(base_url)),
                    title: link.title,
                    error: None,
                    excluded,
                },
                Err(reason) => TermEntry {
                    term,
                    url: None,
                    title: None,
                    error: Some(reason.to_string()),
                    excluded,
                },
            }
        })
        .filter(|entry| !unresolved || entry.error.is_some())
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        let marker = if entry.excluded { " (excluded)" } else { "" };
        match (&entry.url, &entry.error) {
            (Some(url), _) => println!("{}{} → {}", entry.term, marker, url),
            (None, Some(error)) => println!("{}{} ✗ {}", entry.term, marker, error),
            (None, None) => println!("{}{}", entry.term, marker),
        }
    }
    println!("{} terms", entries.len());

    Ok(())
}
