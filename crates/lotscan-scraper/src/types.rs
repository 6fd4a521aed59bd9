use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Body of a crawl-service request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRequest {
    pub url: String,
    /// Only the listing page itself; never follow links away from it.
    pub limit: u32,
    pub follow_redirects: bool,
    pub scrape_options: ScrapeOptions,
}

/// Rendering options forwarded to the crawl service's headless browser.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOptions {
    pub formats: Vec<String>,
    /// Comma-separated CSS selector list, most listing-specific first.
    pub selector: String,
    pub follow_links: bool,
    pub wait_until: String,
    /// Per-page render budget in milliseconds.
    pub timeout: u64,
    pub javascript: bool,
    #[serde(rename = "imagesAndCSSRequired")]
    pub images_and_css_required: bool,
    pub scroll_to_bottom: bool,
    #[serde(rename = "extraHTTPHeaders")]
    pub extra_http_headers: BTreeMap<String, String>,
}

/// Raw crawl-service response. Every level is optional because blocked or
/// failed renders come back with parts missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlResponse {
    #[serde(default)]
    pub pages: Option<Vec<CrawlPage>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlPage {
    #[serde(default)]
    pub content: Option<PageContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageContent {
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

/// A successfully rendered listing page.
///
/// At least one of `html` and `markdown` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawledPage {
    pub url: String,
    pub html: String,
    pub markdown: String,
    /// Number of pages the service returned; only the first is used.
    pub page_count: usize,
}
