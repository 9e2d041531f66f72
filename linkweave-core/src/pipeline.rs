//! Document processing pipeline
//!
//! Flow: markdown body → tree → auto-link → UTM tagging
//!
//! The registry is assembled once from the built-in table, the published
//! articles, and the configured overlays; a [`DocumentPipeline`] then
//! processes any number of documents against it.

use crate::autolink::{AutoLinkError, AutoLinkOptions, AutoLinkReport, AutoLinker};
use crate::config::Config;
use crate::markdown::MarkdownParser;
use crate::models::Article;
use crate::registry::{Registry, RegistryBuilder, RegistryError};
use crate::utm::{TagReport, UtmError, UtmOptions, UtmTagger, DEFAULT_CAMPAIGN};
use linkweave_types::{DocId, Document, Node};
use serde::Serialize;

/// Errors raised while setting up the pipeline; document passes never fail
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Auto-link setup failed: {0}")]
    AutoLink(#[from] AutoLinkError),

    #[error("UTM setup failed: {0}")]
    Utm(#[from] UtmError),
}

/// Build the registry for a site.
///
/// Merge order, later entries winning: built-in table, one entry per
/// published article (plus its link hooks), the mappings file, then the
/// inline custom mappings.
pub fn build_registry(config: &Config, articles: &[Article]) -> Result<Registry, PipelineError> {
    let mut builder =
        RegistryBuilder::with_builtin()?.merge_articles(articles, &config.site.blog_path);

    if let Some(path) = config.mappings_file() {
        builder = builder.merge_file(&path)?;
    }

    Ok(builder
        .merge(config.auto_link.custom_mappings.clone())
        .build())
}

/// What happened to one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    pub slug: String,

    /// Site-relative canonical path
    pub path: String,

    pub links: AutoLinkReport,

    pub utm: TagReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    pub document: Document,
    pub report: DocumentReport,
}

/// The two link transforms configured for one site
pub struct DocumentPipeline {
    parser: MarkdownParser,
    linker: Option<AutoLinker>,
    tagger: Option<UtmTagger>,
    blog_path: String,
    campaign_field: String,
}

impl DocumentPipeline {
    pub fn new(config: &Config, registry: &Registry) -> Result<Self, PipelineError> {
        let linker = if config.auto_link.enabled {
            let options = AutoLinkOptions {
                base_url: config.site.base_url.clone(),
                max_links_per_term: config.auto_link.max_links_per_term,
                exclude_terms: config.auto_link.exclude_terms.clone(),
                exclude_urls: config.auto_link.exclude_urls.clone(),
            };
            Some(AutoLinker::new(registry, &options)?)
        } else {
            tracing::info!("Auto-linking disabled");
            None
        };

        let tagger = if config.utm.enabled {
            let options = UtmOptions {
                base_url: config.site.base_url.clone(),
                source: config.utm.source.clone(),
                medium: config.utm.medium.clone(),
                exclude_domains: config.utm.exclude_domains.clone(),
            };
            Some(UtmTagger::new(&options)?)
        } else {
            tracing::info!("UTM tagging disabled");
            None
        };

        Ok(Self {
            parser: MarkdownParser::new(),
            linker,
            tagger,
            blog_path: config.site.blog_path.clone(),
            campaign_field: config.utm.campaign_field.clone(),
        })
    }

    /// Number of terms the auto-linker will look for
    pub fn term_count(&self) -> usize {
        self.linker.as_ref().map_or(0, AutoLinker::term_count)
    }

    /// Parse an article body and run both transforms over it
    pub fn process(&self, article: &Article) -> ProcessedDocument {
        let path = article.canonical_path(&self.blog_path);
        let campaign = self.campaign_for(article);
        let mut document = Document::new(
            DocId::new(article.slug.clone()),
            self.parser.parse(&article.body),
        );

        let (links, utm) = match document.root.children_mut() {
            Some(children) => self.transform(children, Some(&path), &campaign),
            None => Default::default(),
        };

        tracing::debug!(
            "Processed {}: {} links created, {} URLs tagged",
            article.slug,
            links.created,
            utm.modified
        );

        ProcessedDocument {
            document,
            report: DocumentReport {
                slug: article.slug.clone(),
                path,
                links,
                utm,
            },
        }
    }

    /// Run auto-linking, then tagging, over an existing tree.
    ///
    /// Links created by the first pass are tagged by the second.
    pub fn transform(
        &self,
        children: &mut Vec<Node>,
        self_url: Option<&str>,
        campaign: &str,
    ) -> (AutoLinkReport, TagReport) {
        let links = self
            .linker
            .as_ref()
            .map(|linker| linker.link_document(children, self_url))
            .unwrap_or_default();
        let utm = self
            .tagger
            .as_ref()
            .map(|tagger| tagger.tag_document(children, campaign))
            .unwrap_or_default();
        (links, utm)
    }

    fn campaign_for(&self, article: &Article) -> String {
        article
            .frontmatter
            .field(&self.campaign_field)
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CAMPAIGN.to_string())
    }
}
