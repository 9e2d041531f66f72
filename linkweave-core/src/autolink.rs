//! Term auto-linking.
//!
//! Finds registry terms in the text runs of a document and turns the
//! first occurrences into links. Longer terms are tried first so that a
//! phrase wins over the words it contains; matches never overlap, never
//! nest inside an existing link, and never point back at the document
//! being processed.

use crate::config::DEFAULT_BASE_URL;
use crate::registry::{join_site_path, Registry, ResolvedLink};
use crate::tree::{walk_mut, Action};
use linkweave_types::Node;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum AutoLinkError {
    #[error("Invalid base URL {0:?}: {1}")]
    InvalidBaseUrl(String, url::ParseError),
}

/// Options for [`AutoLinker`]
#[derive(Debug, Clone)]
pub struct AutoLinkOptions {
    /// Base for internal targets and for comparing excluded URLs
    pub base_url: String,

    /// How many times one term may be linked in one document
    pub max_links_per_term: usize,

    /// Terms never linked, compared case-insensitively
    pub exclude_terms: Vec<String>,

    /// Targets never linked to, from any document
    pub exclude_urls: Vec<String>,
}

impl Default for AutoLinkOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_links_per_term: 1,
            exclude_terms: Vec::new(),
            exclude_urls: Vec::new(),
        }
    }
}

/// A term ready for scanning
#[derive(Debug)]
struct TermMatcher {
    term: String,
    /// Lowercased term; quota is tracked per key
    key: String,
    link: ResolvedLink,
    href: String,
    /// `href` normalized for exclusion checks
    target: String,
    pattern: Regex,
}

/// A match within one text node, `[start, end)` in bytes
#[derive(Debug, Clone, Copy)]
struct Match<'a> {
    matcher: &'a TermMatcher,
    start: usize,
    end: usize,
}

/// Per-document outcome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AutoLinkReport {
    /// Links created in this document
    pub created: usize,

    /// Links created per registry term
    pub per_term: BTreeMap<String, usize>,
}

/// Compiled term set, built once and reused for every document
#[derive(Debug)]
pub struct AutoLinker {
    base_url: String,
    max_links_per_term: usize,
    matchers: Vec<TermMatcher>,
}

impl AutoLinker {
    /// Resolve and compile every linkable term of `registry`.
    ///
    /// Terms that are excluded, unresolvable, or point at an excluded URL
    /// are dropped here.
    pub fn new(registry: &Registry, options: &AutoLinkOptions) -> Result<Self, AutoLinkError> {
        Url::parse(&options.base_url)
            .map_err(|e| AutoLinkError::InvalidBaseUrl(options.base_url.clone(), e))?;
        let base_url = options.base_url.as_str();

        let excluded_terms: HashSet<String> = options
            .exclude_terms
            .iter()
            .map(|t| t.to_lowercase())
            .collect();
        let excluded_urls: HashSet<String> = options
            .exclude_urls
            .iter()
            .map(|u| normalize_target(base_url, u))
            .collect();

        let mut matchers = Vec::new();
        for term in registry.terms_by_priority() {
            let key = term.to_lowercase();
            if excluded_terms.contains(&key) {
                continue;
            }

            let link = match registry.resolve(term) {
                Ok(link) => link,
                Err(reason) => {
                    tracing::trace!("Not linking {:?}: {}", term, reason);
                    continue;
                }
            };

            let href = link.href(base_url);
            let target = normalize_target(base_url, &href);
            if excluded_urls.contains(&target) {
                continue;
            }

            let pattern = match RegexBuilder::new(&regex::escape(term))
                .case_insensitive(!link.case_sensitive)
                .build()
            {
                Ok(pattern) => pattern,
                Err(e) => {
                    tracing::warn!("Cannot build pattern for {:?}: {}", term, e);
                    continue;
                }
            };

            matchers.push(TermMatcher {
                term: term.to_string(),
                key,
                link,
                href,
                target,
                pattern,
            });
        }

        tracing::debug!(
            "Auto-linker ready with {} of {} terms",
            matchers.len(),
            registry.len()
        );

        Ok(Self {
            base_url: base_url.to_string(),
            max_links_per_term: options.max_links_per_term,
            matchers,
        })
    }

    /// Number of terms that can be linked
    pub fn term_count(&self) -> usize {
        self.matchers.len()
    }

    /// Link terms in `children` (a document root's children) in place.
    ///
    /// `self_url` is the document's own canonical URL, absolute or
    /// site-relative; terms targeting it are not linked.
    pub fn link_document(&self, children: &mut Vec<Node>, self_url: Option<&str>) -> AutoLinkReport {
        let mut pass = LinkPass {
            linker: self,
            skip_target: self_url.map(|u| normalize_target(&self.base_url, u)),
            counts: HashMap::new(),
            report: AutoLinkReport::default(),
        };

        walk_mut(children, &mut |node, _index| match node {
            Node::Text(text) => pass.rewrite(&text.value),
            Node::Link(_) | Node::Opaque(_) => Action::Skip,
            Node::Container(_) => Action::Descend,
        });

        pass.report
    }
}

/// State for one document
struct LinkPass<'a> {
    linker: &'a AutoLinker,
    skip_target: Option<String>,
    /// Links created so far, per lowercased term
    counts: HashMap<String, usize>,
    report: AutoLinkReport,
}

impl<'a> LinkPass<'a> {
    fn rewrite(&mut self, text: &str) -> Action {
        if text.trim().is_empty() {
            return Action::Skip;
        }

        let mut matches = self.find_matches(text);
        if matches.is_empty() {
            return Action::Skip;
        }
        matches.sort_by_key(|m| m.start);

        let mut nodes = Vec::with_capacity(matches.len() * 2 + 1);
        let mut last = 0;
        for m in &matches {
            if m.start > last {
                nodes.push(Node::text(&text[last..m.start]));
            }
            let label = &text[m.start..m.end];
            tracing::debug!("Linked {:?} → {}", label, m.matcher.href);
            nodes.push(Node::link(
                m.matcher.href.clone(),
                m.matcher.link.title.clone(),
                vec![Node::text(label)],
            ));
            *self
                .report
                .per_term
                .entry(m.matcher.term.clone())
                .or_insert(0) += 1;
            self.report.created += 1;
            last = m.end;
        }
        if last < text.len() {
            nodes.push(Node::text(&text[last..]));
        }

        Action::Replace(nodes)
    }

    fn find_matches(&mut self, text: &str) -> Vec<Match<'a>> {
        let linker = self.linker;
        let max = linker.max_links_per_term;
        let mut matches: Vec<Match<'a>> = Vec::new();

        for matcher in &linker.matchers {
            if self.skip_target.as_deref() == Some(matcher.target.as_str()) {
                continue;
            }
            let used = self.counts.get(&matcher.key).copied().unwrap_or(0);
            if used >= max {
                continue;
            }

            let mut remaining = max - used;
            let mut pos = 0;
            while remaining > 0 && pos <= text.len() {
                let Some(found) = matcher.pattern.find_at(text, pos) else {
                    break;
                };
                let (start, end) = (found.start(), found.end());

                if matcher.link.whole_word && !is_word_bounded(text, start, end) {
                    pos = next_char_boundary(text, start);
                    continue;
                }
                pos = end;
                if overlaps(start, end, &matches) {
                    continue;
                }

                matches.push(Match {
                    matcher,
                    start,
                    end,
                });
                *self.counts.entry(matcher.key.clone()).or_insert(0) += 1;
                remaining -= 1;
            }
        }

        matches
    }
}

/// Any intersection with an accepted match counts, partial or full
fn overlaps(start: usize, end: usize, matches: &[Match<'_>]) -> bool {
    matches.iter().any(|m| start < m.end && m.start < end)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when `[start, end)` is preceded and followed by a non-word
/// character or the edge of `text`
fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

fn next_char_boundary(text: &str, index: usize) -> usize {
    text[index..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| index + c.len_utf8())
}

/// Absolute form of `raw` used to compare link targets.
///
/// Site-relative paths are joined the same way internal hrefs are, so a
/// base URL with a path of its own is kept.
fn normalize_target(base_url: &str, raw: &str) -> String {
    let raw = raw.trim();
    let absolute = match Url::parse(raw) {
        Ok(url) => url.to_string(),
        Err(_) => {
            let joined = join_site_path(base_url, raw);
            Url::parse(&joined).map_or(joined, |url| url.to_string())
        }
    };
    absolute.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{LinkDefinition, LinkMappings};
    use crate::tree::{links, text_content};

    fn registry(entries: &[(&str, LinkDefinition)]) -> Registry {
        Registry::from_mappings(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<LinkMappings>(),
        )
    }

    fn ext(url: &str) -> LinkDefinition {
        LinkDefinition::external(url, None)
    }

    fn paragraph(text: &str) -> Vec<Node> {
        vec![Node::container("paragraph", vec![Node::text(text)])]
    }

    fn run(reg: &Registry, options: AutoLinkOptions, nodes: &mut Vec<Node>) -> AutoLinkReport {
        AutoLinker::new(reg, &options)
            .unwrap()
            .link_document(nodes, None)
    }

    /// (label, url) of every link in document order
    fn linked(nodes: &[Node]) -> Vec<(String, String)> {
        links(nodes)
            .into_iter()
            .map(|l| (text_content(&l.children), l.url.clone()))
            .collect()
    }

    #[test]
    fn test_longest_term_wins() {
        let reg = registry(&[
            ("Red Team Specialist", ext("https://certdb.test/rts")),
            ("red team", ext("https://certdb.test/rt")),
        ]);
        let mut nodes = paragraph("Red Team Specialist career path");
        run(&reg, AutoLinkOptions::default(), &mut nodes);

        assert_eq!(
            linked(&nodes),
            vec![("Red Team Specialist".to_string(), "https://certdb.test/rts".to_string())]
        );
        let para = nodes[0].children().unwrap();
        assert_eq!(para.len(), 2);
        assert_eq!(para[1], Node::text(" career path"));
    }

    #[test]
    fn test_oscp_alias_example() {
        let reg = registry(&[
            ("OSCP", LinkDefinition::alias("OSCP - Offensive Security Certified Professional")),
            (
                "OSCP - Offensive Security Certified Professional",
                LinkDefinition::external(
                    "https://www.offsec.com/courses/pen-200/",
                    Some("OSCP".to_string()),
                ),
            ),
        ]);
        let mut nodes = paragraph("Prepare for OSCP now");
        run(&reg, AutoLinkOptions::default(), &mut nodes);

        let para = nodes[0].children().unwrap();
        assert_eq!(
            para,
            &vec![
                Node::text("Prepare for "),
                Node::link(
                    "https://www.offsec.com/courses/pen-200/",
                    Some("OSCP".to_string()),
                    vec![Node::text("OSCP")]
                ),
                Node::text(" now"),
            ]
        );
    }

    #[test]
    fn test_cap_is_shared_across_text_nodes() {
        let reg = registry(&[("CISSP", ext("https://isc2.test/cissp"))]);
        let mut nodes = vec![
            Node::container("paragraph", vec![Node::text("CISSP first. CISSP again.")]),
            Node::container("paragraph", vec![Node::text("More CISSP.")]),
        ];
        let report = run(&reg, AutoLinkOptions::default(), &mut nodes);
        assert_eq!(report.created, 1);
        assert_eq!(linked(&nodes).len(), 1);

        let mut nodes = vec![
            Node::container("paragraph", vec![Node::text("CISSP first. CISSP again.")]),
            Node::container("paragraph", vec![Node::text("More CISSP.")]),
        ];
        let options = AutoLinkOptions {
            max_links_per_term: 2,
            ..AutoLinkOptions::default()
        };
        let report = run(&reg, options, &mut nodes);
        assert_eq!(report.per_term.get("CISSP"), Some(&2));
        // Both links land in the first paragraph
        assert_eq!(links(&nodes[0..1]).len(), 2);
        assert!(links(&nodes[1..]).is_empty());
    }

    #[test]
    fn test_terms_differing_only_in_case_share_quota() {
        let reg = registry(&[
            ("CyberPath", ext("https://cyberpath.test/")),
            ("Cyberpath", ext("https://cyberpath.test/")),
        ]);
        let mut nodes = paragraph("Cyberpath and CyberPath");
        let report = run(&reg, AutoLinkOptions::default(), &mut nodes);
        assert_eq!(report.created, 1);
        // Equal length: the lexicographically smaller key is tried first
        assert_eq!(report.per_term.get("CyberPath"), Some(&1));
    }

    #[test]
    fn test_matches_never_overlap() {
        let reg = registry(&[
            ("cloud security", ext("https://a.test/")),
            ("security operations", ext("https://b.test/")),
            ("operations", ext("https://c.test/")),
        ]);
        let mut nodes = paragraph("cloud security operations teams");
        run(&reg, AutoLinkOptions::default(), &mut nodes);

        // "security operations" is longest and wins; "cloud security"
        // overlaps it; "operations" lies inside it
        assert_eq!(
            linked(&nodes),
            vec![("security operations".to_string(), "https://b.test/".to_string())]
        );
        assert_eq!(text_content(&nodes), "cloud security operations teams");
    }

    #[test]
    fn test_case_sensitivity() {
        let mut sensitive = ext("https://rust.test/");
        sensitive.case_sensitive = Some(true);
        let reg = registry(&[("Rust", sensitive), ("nmap", ext("https://nmap.test/"))]);

        let mut nodes = paragraph("rust and Rust with NMAP");
        run(&reg, AutoLinkOptions::default(), &mut nodes);
        assert_eq!(
            linked(&nodes),
            vec![
                ("Rust".to_string(), "https://rust.test/".to_string()),
                ("NMAP".to_string(), "https://nmap.test/".to_string()),
            ]
        );
    }

    #[test]
    fn test_whole_word_boundaries() {
        let reg = registry(&[
            ("CEH", ext("https://ceh.test/")),
            ("Security+", ext("https://secplus.test/")),
        ]);
        let mut nodes = paragraph("CEHv12 is not CEH. Security+ exam.");
        run(&reg, AutoLinkOptions::default(), &mut nodes);
        assert_eq!(
            linked(&nodes),
            vec![
                ("CEH".to_string(), "https://ceh.test/".to_string()),
                ("Security+".to_string(), "https://secplus.test/".to_string()),
            ]
        );
        let para = nodes[0].children().unwrap();
        assert_eq!(para[0], Node::text("CEHv12 is not "));
    }

    #[test]
    fn test_substring_match_when_whole_word_disabled() {
        let mut def = ext("https://pentest.test/");
        def.whole_word = Some(false);
        let reg = registry(&[("pentest", def)]);
        let mut nodes = paragraph("Pentesting basics");
        run(&reg, AutoLinkOptions::default(), &mut nodes);
        assert_eq!(
            linked(&nodes),
            vec![("Pentest".to_string(), "https://pentest.test/".to_string())]
        );
    }

    #[test]
    fn test_existing_links_and_code_untouched() {
        let reg = registry(&[("Nmap", ext("https://nmap.test/"))]);
        let mut nodes = vec![Node::container(
            "paragraph",
            vec![
                Node::link("https://other.test/", None, vec![Node::text("Nmap docs")]),
                Node::opaque("inlineCode", "nmap -sV"),
                Node::text(" then Nmap"),
            ],
        )];
        run(&reg, AutoLinkOptions::default(), &mut nodes);

        let found = linked(&nodes);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].1, "https://other.test/");
        assert_eq!(found[1], ("Nmap".to_string(), "https://nmap.test/".to_string()));
    }

    #[test]
    fn test_self_reference_excluded() {
        let reg = registry(&[
            ("Foo", LinkDefinition::alias("Foo Guide")),
            ("Foo Guide", LinkDefinition::internal("/blog/foo", None)),
        ]);
        let linker = AutoLinker::new(&reg, &AutoLinkOptions::default()).unwrap();

        let mut own = paragraph("Foo is great");
        let report = linker.link_document(&mut own, Some("/blog/foo/"));
        assert_eq!(report.created, 0);

        let mut other = paragraph("Foo is great");
        linker.link_document(&mut other, Some("https://cyberpath-hq.com/blog/bar"));
        assert_eq!(
            linked(&other),
            vec![("Foo".to_string(), "https://cyberpath-hq.com/blog/foo".to_string())]
        );
    }

    #[test]
    fn test_base_url_with_path() {
        let reg = registry(&[
            ("Foo", LinkDefinition::alias("Foo Guide")),
            ("Foo Guide", LinkDefinition::internal("/blog/foo", None)),
            ("Bar", LinkDefinition::internal("/blog/bar", None)),
        ]);
        let options = AutoLinkOptions {
            base_url: "https://example.github.io/site".to_string(),
            ..AutoLinkOptions::default()
        };
        let linker = AutoLinker::new(&reg, &options).unwrap();

        let mut own = paragraph("Foo Guide and Bar");
        let report = linker.link_document(&mut own, Some("/blog/foo"));
        assert_eq!(
            linked(&own),
            vec![("Bar".to_string(), "https://example.github.io/site/blog/bar".to_string())]
        );
        assert_eq!(report.created, 1);

        let options = AutoLinkOptions {
            base_url: "https://example.github.io/site/".to_string(),
            exclude_urls: vec!["/blog/foo".to_string()],
            ..AutoLinkOptions::default()
        };
        let linker = AutoLinker::new(&reg, &options).unwrap();
        assert_eq!(linker.term_count(), 1);
    }

    #[test]
    fn test_alias_cycle_links_nothing() {
        let reg = registry(&[("A", LinkDefinition::alias("B")), ("B", LinkDefinition::alias("A"))]);
        let mut nodes = paragraph("A and B");
        let report = run(&reg, AutoLinkOptions::default(), &mut nodes);
        assert_eq!(report.created, 0);
        assert_eq!(nodes, paragraph("A and B"));
    }

    #[test]
    fn test_excluded_terms_and_urls() {
        let reg = registry(&[
            ("Python", ext("https://python.test/")),
            ("Wireshark", ext("https://wireshark.test")),
            ("Kali", ext("https://kali.test/")),
        ]);
        let options = AutoLinkOptions {
            exclude_terms: vec!["python".to_string()],
            exclude_urls: vec!["https://wireshark.test/".to_string()],
            ..AutoLinkOptions::default()
        };
        let mut nodes = paragraph("Python, Wireshark and Kali");
        run(&reg, options, &mut nodes);
        assert_eq!(
            linked(&nodes),
            vec![("Kali".to_string(), "https://kali.test/".to_string())]
        );
    }

    #[test]
    fn test_zero_cap_links_nothing() {
        let reg = registry(&[("Nmap", ext("https://nmap.test/"))]);
        let options = AutoLinkOptions {
            max_links_per_term: 0,
            ..AutoLinkOptions::default()
        };
        let mut nodes = paragraph("Nmap");
        assert_eq!(run(&reg, options, &mut nodes).created, 0);
    }

    #[test]
    fn test_multibyte_text_offsets() {
        let reg = registry(&[("(ISC)²", ext("https://isc2.test/")), ("CCSP", ext("https://ccsp.test/"))]);
        let mut nodes = paragraph("Über (ISC)² — CCSP…");
        run(&reg, AutoLinkOptions::default(), &mut nodes);
        assert_eq!(linked(&nodes).len(), 2);
        assert_eq!(text_content(&nodes), "Über (ISC)² — CCSP…");
    }

    #[test]
    fn test_invalid_base_url() {
        let options = AutoLinkOptions {
            base_url: "not a url".to_string(),
            ..AutoLinkOptions::default()
        };
        assert!(AutoLinker::new(&Registry::default(), &options).is_err());
    }
}
