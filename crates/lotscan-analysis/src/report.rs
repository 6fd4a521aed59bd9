//! Markdown rendering of pipeline outcomes for the `text` field of a
//! [`lotscan_core::ListingReport`].

use lotscan_core::{AnalysisResult, ListingValue, VehicleListingRecord};
use lotscan_scraper::{Platform, ScraperError};

use crate::analyzer::Section;
use crate::error::AnalysisError;

/// Renders a completed analysis.
#[must_use]
pub fn format_report(
    url: &str,
    platform: Platform,
    record: &VehicleListingRecord,
    analysis: &AnalysisResult,
) -> String {
    if analysis.unreliable_extraction == Some(true) {
        let mut blocks = vec![format!(
            "I couldn't identify the specific vehicle in this {platform} listing, so I \
             didn't run an analysis."
        )];
        blocks.extend(analysis.error.clone());
        blocks.push(
            "If you can, share the year, make, and model, or the VIN, and I'll take another look."
                .to_owned(),
        );
        blocks.push(format!("Source: {url}"));
        return blocks.join("\n\n");
    }

    let mut blocks = vec![format!("## {}", record.label())];
    let facts = facts_line(record);
    if !facts.is_empty() {
        blocks.push(facts);
    }
    blocks.push(format!("Source: {platform} ({url})"));

    let sections = analysis.sections();
    for section in Section::ALL {
        let text = sections
            .iter()
            .find(|(key, _)| *key == section.key())
            .map_or("", |(_, text)| *text);
        blocks.push(format!("### {}\n\n{text}", section.title()));
    }

    if let Some(validation) = analysis.data_validation.as_ref().filter(|v| v.has_errors) {
        let notes: Vec<String> = validation.errors.iter().map(|e| format!("- {e}")).collect();
        blocks.push(format!("### Data notes\n\n{}", notes.join("\n")));
    }

    blocks.join("\n\n").trim_end().to_owned()
}

/// Short message for a listing page that could not be fetched.
#[must_use]
pub fn crawl_failure_text(url: &str, err: &ScraperError) -> String {
    let detail = match err {
        ScraperError::Unauthorized => {
            "the page-rendering service rejected our credentials".to_owned()
        }
        ScraperError::RateLimited => "the page-rendering service is rate limiting requests".to_owned(),
        ScraperError::EmptyContent { .. } => {
            "the page came back empty; it may be removed, blocked, or behind a login".to_owned()
        }
        ScraperError::InvalidUrl { reason, .. } => format!("the URL is not valid ({reason})"),
        other => other.to_string(),
    };
    format!("I couldn't access the listing at {url}: {detail}. Please check the link and try again.")
}

/// Short message for a page whose data could not be extracted.
#[must_use]
pub fn extraction_failure_text(url: &str, err: &AnalysisError) -> String {
    format!(
        "I loaded the listing at {url} but couldn't extract the vehicle details from it ({err}). \
         Please try again, or paste the key details directly."
    )
}

/// Short message for a run that exceeded the pipeline deadline.
#[must_use]
pub fn timeout_text(url: &str, secs: u64) -> String {
    format!(
        "Analyzing the listing at {url} took longer than {secs} seconds and was cancelled. \
         Please try again in a moment."
    )
}

fn facts_line(record: &VehicleListingRecord) -> String {
    let mut facts = Vec::new();
    if let Some(price) = &record.price {
        facts.push(format!("**Price:** {}", format_price(price)));
    }
    if let Some(mileage) = &record.mileage {
        facts.push(format!("**Mileage:** {}", format_mileage(mileage)));
    }
    if let Some(vin) = &record.vin {
        facts.push(format!("**VIN:** {vin}"));
    }
    facts.join(" | ")
}

fn format_price(value: &ListingValue) -> String {
    match value.as_whole() {
        Some(whole) => format!("${}", group_thousands(whole)),
        None => value.to_string(),
    }
}

fn format_mileage(value: &ListingValue) -> String {
    match value.as_whole() {
        Some(whole) => format!("{} miles", group_thousands(whole)),
        None => value.to_string(),
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if n < 0 {
        grouped.insert(0, '-');
    }
    grouped
}
