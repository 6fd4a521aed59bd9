//! End-to-end listing analysis: normalize, detect, crawl, extract, validate,
//! analyze.

use std::time::Duration;

use lotscan_core::{AppConfig, ListingReport, VehicleListingAnalysis};
use lotscan_scraper::{
    extract_text, CrawlClient, CrawlSettings, CrawledPage, Platform, UrlNormalizer,
};

use crate::analyzer::VehicleAnalyzer;
use crate::error::AnalysisError;
use crate::extraction::StructuredDataExtractor;
use crate::llm::{CompletionClient, LlmSettings};
use crate::report;

/// HTML-derived text shorter than this falls back to the crawl's markdown.
pub const MIN_HTML_TEXT_CHARS: usize = 100;

/// Per-request timeout for shortener `HEAD` requests.
const SHORTENER_TIMEOUT_SECS: u64 = 10;

/// The full listing pipeline. Stateless between calls, so one instance can
/// serve concurrent requests.
#[derive(Debug)]
pub struct ListingPipeline {
    normalizer: UrlNormalizer,
    crawler: CrawlClient,
    extractor: StructuredDataExtractor,
    analyzer: VehicleAnalyzer,
    timeout: Duration,
}

impl ListingPipeline {
    #[must_use]
    pub fn new(
        normalizer: UrlNormalizer,
        crawler: CrawlClient,
        completion: CompletionClient,
        timeout: Duration,
    ) -> Self {
        Self {
            normalizer,
            crawler,
            extractor: StructuredDataExtractor::new(completion.clone()),
            analyzer: VehicleAnalyzer::new(completion),
            timeout,
        }
    }

    /// Builds every stage from application config.
    ///
    /// # Errors
    ///
    /// Returns an error if any HTTP client cannot be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, AnalysisError> {
        let normalizer = UrlNormalizer::new(SHORTENER_TIMEOUT_SECS, config.redirect_max_depth)?;
        let crawler = CrawlClient::new(CrawlSettings::from_app_config(config))?;
        let completion = CompletionClient::new(LlmSettings::from_app_config(config))?;
        Ok(Self::new(
            normalizer,
            crawler,
            completion,
            Duration::from_secs(config.pipeline_timeout_secs),
        ))
    }

    /// Runs the pipeline for `url`. Never fails: every failure is reported as
    /// a short message in [`ListingReport::text`] with no analysis attached.
    ///
    /// The whole run is bounded by the configured pipeline timeout; in-flight
    /// requests are dropped when it elapses.
    pub async fn analyze_listing(&self, url: &str) -> ListingReport {
        match tokio::time::timeout(self.timeout, self.run(url)).await {
            Ok(report) => report,
            Err(_) => {
                tracing::warn!(url, timeout_secs = self.timeout.as_secs(), "listing analysis timed out");
                ListingReport::failure(report::timeout_text(url, self.timeout.as_secs()))
            }
        }
    }

    async fn run(&self, url: &str) -> ListingReport {
        let url = self.normalizer.normalize(url).await;
        let platform = Platform::identify(&url);
        tracing::info!(url = %url, platform = %platform, "analyzing listing");

        let page = match self.crawler.crawl(&url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "could not crawl listing");
                return ListingReport::failure(report::crawl_failure_text(&url, &e));
            }
        };

        let text = listing_text(&page);
        let html = Some(page.html.as_str()).filter(|h| !h.trim().is_empty());
        let record = match self.extractor.extract(&text, platform, html).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "structured extraction failed");
                return ListingReport::failure(report::extraction_failure_text(&url, &e));
            }
        };

        let analysis = self.analyzer.analyze(&record).await;
        let text = report::format_report(&url, platform, &record, &analysis);

        ListingReport {
            text,
            vehicle_listing_analysis: Some(VehicleListingAnalysis {
                url,
                record,
                analysis,
            }),
        }
    }
}

/// Text handed to the extractor: cleaned HTML text, unless that is too thin
/// and the crawl also produced markdown.
fn listing_text(page: &CrawledPage) -> String {
    let from_html = if page.html.trim().is_empty() {
        String::new()
    } else {
        extract_text(&page.html)
    };
    let markdown = page.markdown.trim();

    if from_html.chars().count() < MIN_HTML_TEXT_CHARS && !markdown.is_empty() {
        tracing::debug!(
            html_text_chars = from_html.chars().count(),
            "HTML text too short; using markdown"
        );
        markdown.to_owned()
    } else {
        from_html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str, markdown: &str) -> CrawledPage {
        CrawledPage {
            url: "https://example.com/car".to_owned(),
            html: html.to_owned(),
            markdown: markdown.to_owned(),
            page_count: 1,
        }
    }

    #[test]
    fn prefers_html_text_when_long_enough() {
        let body = "2019 Honda Civic, one owner, clean title. ".repeat(5);
        let text = listing_text(&page(&format!("<p>{body}</p>"), "# markdown"));
        assert!(text.starts_with("2019 Honda Civic"));
    }

    #[test]
    fn falls_back_to_markdown_for_thin_html() {
        let text = listing_text(&page("<p>Loading...</p>", "# 2019 Honda Civic\n$15,000"));
        assert_eq!(text, "# 2019 Honda Civic\n$15,000");
    }

    #[test]
    fn keeps_thin_html_text_without_markdown() {
        let text = listing_text(&page("<p>2019 Civic</p>", "  "));
        assert_eq!(text, "2019 Civic");
    }

    #[test]
    fn markdown_only_page() {
        let text = listing_text(&page("", "2019 Honda Civic"));
        assert_eq!(text, "2019 Honda Civic");
    }
}
