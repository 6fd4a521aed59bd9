//! Crawl request construction.

use std::collections::BTreeMap;

use crate::types::{CrawlRequest, ScrapeOptions};

/// Selectors handed to the renderer, most listing-specific first. Generic
/// content containers follow, and `body` guarantees something is captured.
pub(super) const LISTING_SELECTORS: &[&str] = &[
    "[class*='vehicle-details']",
    "[class*='vehicle-info']",
    "[class*='listing-details']",
    "[class*='cg-listing']",
    "#postingbody",
    ".attrgroup",
    "[data-testid='marketplace_pdp_component']",
    "[class*='vdp']",
    "[class*='vehicle-overview']",
    "main",
    "article",
    "#content",
    ".content",
    "body",
];

/// Render budget per page, in milliseconds.
pub(super) const PAGE_TIMEOUT_MS: u64 = 30_000;

pub(super) fn build_crawl_request(url: &str, user_agent: &str) -> CrawlRequest {
    let mut headers = BTreeMap::new();
    headers.insert("User-Agent".to_owned(), user_agent.to_owned());
    headers.insert("Accept-Language".to_owned(), "en-US,en;q=0.9".to_owned());
    headers.insert(
        "Accept".to_owned(),
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".to_owned(),
    );

    CrawlRequest {
        url: url.to_owned(),
        limit: 1,
        follow_redirects: true,
        scrape_options: ScrapeOptions {
            formats: vec!["markdown".to_owned(), "html".to_owned()],
            selector: LISTING_SELECTORS.join(", "),
            follow_links: false,
            wait_until: "networkidle0".to_owned(),
            timeout: PAGE_TIMEOUT_MS,
            javascript: true,
            images_and_css_required: true,
            scroll_to_bottom: true,
            extra_http_headers: headers,
        },
    }
}
