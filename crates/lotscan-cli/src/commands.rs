//! Subcommand handlers. Only `analyze` needs credentials; the others run
//! offline or against the listing host directly.

use std::path::Path;

use anyhow::Context;
use lotscan_analysis::ListingPipeline;
use lotscan_scraper::{extract_image_url, extract_text, UrlNormalizer};

const NORMALIZE_TIMEOUT_SECS: u64 = 10;

/// Run normalization, crawl, extraction, and analysis for one listing.
///
/// # Errors
///
/// Returns an error if configuration is missing or the HTTP clients cannot be
/// built. Pipeline failures are part of the printed report, not errors.
pub(crate) async fn run_analyze(url: &str, json: bool) -> anyhow::Result<()> {
    let config = lotscan_core::load_app_config().context("failed to load configuration")?;
    let pipeline =
        ListingPipeline::from_app_config(&config).context("failed to build listing pipeline")?;

    let report = pipeline.analyze_listing(url).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.text);
    }
    Ok(())
}

pub(crate) async fn run_normalize(url: &str, max_depth: u32) -> anyhow::Result<()> {
    let normalizer = UrlNormalizer::new(NORMALIZE_TIMEOUT_SECS, max_depth)
        .context("failed to build HTTP client")?;
    println!("{}", normalizer.normalize(url).await);
    Ok(())
}

/// Print the listing text and primary image found in a saved HTML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub(crate) fn run_extract(file: &Path, json: bool) -> anyhow::Result<()> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let text = extract_text(&html);
    let image_url = extract_image_url(&html);
    tracing::debug!(chars = text.len(), has_image = image_url.is_some(), "extracted");

    if json {
        let out = serde_json::json!({ "text": text, "imageUrl": image_url });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("image: {}", image_url.as_deref().unwrap_or("(none)"));
        println!();
        println!("{text}");
    }
    Ok(())
}
