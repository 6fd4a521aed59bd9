use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("crawl service rejected the API credentials (HTTP 401)")]
    Unauthorized,

    #[error("crawl service rate limited the request (HTTP 429)")]
    RateLimited,

    #[error("crawl service returned HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("no usable content for {url}: {reason}")]
    EmptyContent { url: String, reason: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}
