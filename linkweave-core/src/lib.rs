//! # linkweave-core
//!
//! Term auto-linking and UTM tagging for blog articles.
//!
//! This crate provides the term registry, the markdown-to-tree adapter, and
//! the two link transforms that run over every document.

pub mod autolink;
pub mod config;
pub mod content;
pub mod frontmatter;
pub mod markdown;
pub mod models;
pub mod pipeline;
pub mod registry;
pub mod slug;
pub mod tree;
pub mod utm;

pub use autolink::{AutoLinkOptions, AutoLinkReport, AutoLinker};
pub use config::Config;
pub use content::{load_article, load_articles};
pub use markdown::{parse_markdown, MarkdownParser};
pub use models::{Article, Frontmatter};
pub use pipeline::{build_registry, DocumentPipeline, DocumentReport, PipelineError, ProcessedDocument};
pub use registry::{LinkDefinition, LinkMappings, Registry, RegistryBuilder, ResolvedLink, Unresolvable};
pub use slug::slugify;
pub use utm::{TagOutcome, TagReport, UtmOptions, UtmTagger};
