//! Slug generation for content files.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

static HYPHEN_RUN: OnceLock<Regex> = OnceLock::new();

fn hyphen_run() -> &'static Regex {
    HYPHEN_RUN.get_or_init(|| Regex::new(r"-+").unwrap())
}

/// Convert a string to a URL-safe slug
///
/// Lowercases, turns whitespace and underscores into hyphens, drops
/// punctuation, and collapses hyphen runs.
///
/// ```
/// use linkweave_core::slugify;
///
/// assert_eq!(slugify("OSCP Exam Guide"), "oscp-exam-guide");
/// assert_eq!(slugify("CompTIA Security+ 2025"), "comptia-security-2025");
/// ```
pub fn slugify(input: &str) -> String {
    let cleaned = input
        .to_lowercase()
        .graphemes(true)
        .filter_map(|g| match g {
            " " | "_" | "\t" | "\n" => Some("-"),
            _ => {
                let c = g.chars().next()?;
                (c.is_alphanumeric() || c == '-').then_some(g)
            }
        })
        .collect::<String>();

    hyphen_run()
        .replace_all(&cleaned, "-")
        .trim_matches('-')
        .to_string()
}

/// Slug of a content file, as used in its canonical URL.
///
/// `index.md` files take the name of their directory, so
/// `blog/oscp-guide/index.mdx` and `blog/oscp-guide.md` share a slug.
pub fn slug_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    if stem.eq_ignore_ascii_case("index") {
        if let Some(dir) = path.parent().and_then(|p| p.file_name()) {
            return slugify(&dir.to_string_lossy());
        }
    }

    slugify(&stem)
}
