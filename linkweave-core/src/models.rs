//! Content model: front-matter and the articles it describes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Front-matter metadata from a markdown file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Frontmatter {
    /// Required for an article to load; blank means absent
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub draft: bool,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Extra terms that should link to this article
    #[serde(default, rename = "linkHooks", alias = "link_hooks")]
    pub link_hooks: Vec<String>,

    /// Every other field, kept so the campaign name can come from any of them
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Frontmatter {
    /// Look up a field by name as a display string.
    ///
    /// Scalars are stringified; sequences, mappings and nulls yield `None`.
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "title" => Some(self.title.clone()).filter(|t| !t.is_empty()),
            "description" => self.description.clone(),
            _ => match self.extra.get(name)? {
                serde_yaml::Value::String(s) => Some(s.clone()),
                serde_yaml::Value::Number(n) => Some(n.to_string()),
                serde_yaml::Value::Bool(b) => Some(b.to_string()),
                _ => None,
            },
        }
    }
}

/// A single blog article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// URL slug (e.g., "oscp-exam-guide")
    pub slug: String,

    /// Source file
    pub source_path: PathBuf,

    pub frontmatter: Frontmatter,

    /// Markdown body without front-matter
    pub body: String,
}

impl Article {
    pub fn is_draft(&self) -> bool {
        self.frontmatter.draft
    }

    /// Site-relative canonical path, e.g. `/blog/oscp-exam-guide`
    pub fn canonical_path(&self, blog_path: &str) -> String {
        canonical_path(blog_path, &self.slug)
    }
}

/// Join a collection path and a slug into a site-relative path
pub fn canonical_path(blog_path: &str, slug: &str) -> String {
    let prefix = blog_path.trim().trim_matches('/');
    if prefix.is_empty() {
        format!("/{slug}")
    } else {
        format!("/{prefix}/{slug}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_path() {
        assert_eq!(canonical_path("/blog", "oscp"), "/blog/oscp");
        assert_eq!(canonical_path("blog/", "oscp"), "/blog/oscp");
        assert_eq!(canonical_path("", "oscp"), "/oscp");
    }

    #[test]
    fn test_field_lookup() {
        let yaml = "title: OSCP Guide\ncampaign: spring-launch\nyear: 2025\ndraft: false\n";
        let fm: Frontmatter = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(fm.field("title").as_deref(), Some("OSCP Guide"));
        assert_eq!(fm.field("campaign").as_deref(), Some("spring-launch"));
        assert_eq!(fm.field("year").as_deref(), Some("2025"));
        assert_eq!(fm.field("missing"), None);
        assert!(!fm.extra.contains_key("draft"));
    }

    #[test]
    fn test_link_hooks_accepts_both_spellings() {
        let camel: Frontmatter = serde_yaml::from_str("title: A\nlinkHooks: [x, y]\n").unwrap();
        let snake: Frontmatter = serde_yaml::from_str("title: A\nlink_hooks: [x]\n").unwrap();
        assert_eq!(camel.link_hooks, vec!["x", "y"]);
        assert_eq!(snake.link_hooks, vec!["x"]);
    }
}
