//! Splitting an article into its YAML front-matter and markdown body.

use crate::models::Frontmatter;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Invalid front-matter YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Front-matter has no title")]
    MissingTitle,
}

/// Opening fence, YAML block, closing fence, optional body
fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)\A\u{feff}?---[ \t]*\r?\n(.*?)\r?\n---[ \t]*(?:\r?\n(.*))?\z").unwrap()
    })
}

/// The raw YAML block and the body after it, if `content` opens with a
/// `---` fence
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let captures = fence_regex().captures(content)?;
    let yaml = captures.get(1)?.as_str();
    let body = captures.get(2).map_or("", |m| m.as_str());
    Some((yaml, body))
}

/// Parse an article's front-matter and return it with the body.
///
/// Content without a fence yields a default front-matter (blank title)
/// and the whole content as body. A fenced block must carry a non-blank
/// `title`.
///
/// ```
/// use linkweave_core::frontmatter::parse_frontmatter;
///
/// let content = "---\ntitle: OSCP Guide\nlinkHooks: [PEN-200]\n---\nBody\n";
/// let (fm, body) = parse_frontmatter(content).unwrap();
/// assert_eq!(fm.title, "OSCP Guide");
/// assert_eq!(fm.link_hooks, vec!["PEN-200"]);
/// assert_eq!(body, "Body\n");
/// ```
pub fn parse_frontmatter(content: &str) -> Result<(Frontmatter, String), FrontmatterError> {
    let Some((yaml, body)) = split_frontmatter(content) else {
        return Ok((Frontmatter::default(), content.to_string()));
    };

    let frontmatter: Frontmatter = serde_yaml::from_str(yaml)?;
    if frontmatter.title.trim().is_empty() {
        return Err(FrontmatterError::MissingTitle);
    }

    Ok((frontmatter, body.to_string()))
}
