//! Build command implementation.

use super::load_site;
use anyhow::{Context, Result};
use linkweave_core::{DocumentPipeline, DocumentReport, ProcessedDocument};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinSet;

#[derive(Debug, Default, Serialize)]
struct BuildReport {
    documents: usize,
    links_created: usize,
    urls_tagged: usize,
    urls_skipped: usize,
    url_errors: usize,
    per_document: Vec<DocumentReport>,
}

impl BuildReport {
    fn add(&mut self, report: DocumentReport) {
        self.documents += 1;
        self.links_created += report.links.created;
        self.urls_tagged += report.utm.modified;
        self.urls_skipped += report.utm.skipped;
        self.url_errors += report.utm.errored;
        self.per_document.push(report);
    }
}

/// Process every published article and write one JSON tree per document
/// plus `report.json` into the output directory
pub async fn build_site(config_path: &Path) -> Result<()> {
    let site = load_site(config_path)?;
    let pipeline = Arc::new(
        DocumentPipeline::new(&site.config, &site.registry)
            .context("Failed to set up document pipeline")?,
    );
    tracing::info!("Auto-linking {} terms", pipeline.term_count());

    let output_dir = site.config.output_dir();
    fs::create_dir_all(&output_dir).context("Failed to create output directory")?;

    let mut tasks = JoinSet::new();
    for article in site.articles {
        if article.is_draft() {
            tracing::debug!("Skipping draft: {}", article.frontmatter.title);
            continue;
        }
        let pipeline = Arc::clone(&pipeline);
        tasks.spawn_blocking(move || pipeline.process(&article));
    }

    let mut report = BuildReport::default();
    while let Some(joined) = tasks.join_next().await {
        let processed = joined.context("Document task failed")?;
        write_document(&output_dir, &processed)?;
        report.add(processed.report);
    }
    report.per_document.sort_by(|a, b| a.slug.cmp(&b.slug));

    let report_path = output_dir.join("report.json");
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(&report_path, json)
        .with_context(|| format!("Failed to write {}", report_path.display()))?;

    println!(
        "Processed {} documents: {} links created, {} URLs tagged ({} skipped, {} errors)",
        report.documents,
        report.links_created,
        report.urls_tagged,
        report.urls_skipped,
        report.url_errors
    );
    tracing::info!("Output written to {:?}", output_dir);

    Ok(())
}

fn write_document(output_dir: &Path, processed: &ProcessedDocument) -> Result<()> {
    let path = output_dir.join(format!("{}.json", processed.document.id));
    let json = serde_json::to_string_pretty(&processed.document)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!("Wrote {:?}", path);
    Ok(())
}
