//! Listing acquisition: URL cleanup, marketplace detection, remote page
//! rendering, and regex-driven text/image extraction from listing HTML.

pub mod client;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod platform;
pub mod retry;
pub mod types;

mod html;

pub use client::{CrawlClient, CrawlSettings};
pub use error::ScraperError;
pub use extract::{extract_image_url, extract_text};
pub use normalize::{clean_listing_url, UrlNormalizer};
pub use platform::Platform;
pub use retry::RetryPolicy;
pub use types::CrawledPage;

/// Outcome of a crawl: the rendered page, or the terminal error after retries.
pub type CrawlResult = Result<CrawledPage, ScraperError>;
