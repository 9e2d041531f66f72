//! Process a single document and show the result.

use super::load_site;
use anyhow::{Context, Result};
use linkweave_core::tree::{links, text_content};
use linkweave_core::{load_article, DocumentPipeline};
use std::path::Path;

pub fn process_file(config_path: &Path, file: &Path, json: bool) -> Result<()> {
    let site = load_site(config_path)?;
    let article =
        load_article(file).with_context(|| format!("Failed to load {}", file.display()))?;
    let pipeline = DocumentPipeline::new(&site.config, &site.registry)
        .context("Failed to set up document pipeline")?;

    let processed = pipeline.process(&article);

    if json {
        println!("{}", serde_json::to_string_pretty(&processed)?);
        return Ok(());
    }

    println!("{} ({})", article.frontmatter.title, processed.report.path);
    if let Some(children) = processed.document.root.children() {
        for link in links(children) {
            println!("- {} → {}", text_content(&link.children), link.url);
        }
    }
    let report = &processed.report;
    println!(
        "{} links created, {} URLs tagged, {} skipped, {} errors",
        report.links.created, report.utm.modified, report.utm.skipped, report.utm.errored
    );

    Ok(())
}
