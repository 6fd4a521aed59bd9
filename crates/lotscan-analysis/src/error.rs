use thiserror::Error;

use lotscan_scraper::ScraperError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion endpoint returned {status}: {body}")]
    CompletionStatus { status: u16, body: String },

    #[error("completion response contained no message content")]
    EmptyCompletion,

    #[error("model output was not valid JSON: {snippet}")]
    MalformedJson { snippet: String },

    #[error("model output was valid JSON but not an object")]
    NotAnObject,

    #[error("scraper setup failed: {0}")]
    Scraper(#[from] ScraperError),
}
