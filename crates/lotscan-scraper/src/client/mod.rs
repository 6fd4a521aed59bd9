//! HTTP client for the remote page-rendering crawl service.

mod request;

use std::time::Duration;

use lotscan_core::AppConfig;
use reqwest::{Client, StatusCode};

use crate::error::ScraperError;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::types::{CrawlRequest, CrawlResponse, CrawledPage};

use request::build_crawl_request;

/// Longest slice of an error body kept in [`ScraperError::UnexpectedStatus`].
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Connection settings for [`CrawlClient`].
#[derive(Clone)]
pub struct CrawlSettings {
    pub api_url: String,
    pub api_key: String,
    /// Whole-request timeout per attempt; must exceed the 30 s render budget.
    pub timeout_secs: u64,
    pub user_agent: String,
    pub retry: RetryPolicy,
}

impl CrawlSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            api_url: config.crawl_api_url.clone(),
            api_key: config.crawl_api_key.clone(),
            timeout_secs: config.crawl_timeout_secs,
            user_agent: config.user_agent.clone(),
            retry: RetryPolicy {
                max_retries: config.crawl_max_retries,
                backoff_base_ms: config.crawl_backoff_base_ms,
                rate_limit_wait_ms: config.crawl_rate_limit_wait_ms,
            },
        }
    }
}

impl std::fmt::Debug for CrawlSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlSettings")
            .field("api_url", &self.api_url)
            .field("api_key", &"[redacted]")
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Fetches rendered listing pages (HTML + markdown) through the crawl service.
///
/// Status handling per attempt:
/// - 401: terminal, credentials cannot be fixed by retrying.
/// - 429: fixed wait, then retry.
/// - 400: logged as a likely unsupported URL, retried (some sites 400 intermittently).
/// - other non-2xx and transport errors: linear backoff, then retry.
/// - 2xx without usable page content: terminal content failure.
pub struct CrawlClient {
    client: Client,
    api_url: String,
    api_key: String,
    user_agent: String,
    retry: RetryPolicy,
}

impl std::fmt::Debug for CrawlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlClient")
            .field("api_url", &self.api_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl CrawlClient {
    /// Creates a client from explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(settings: CrawlSettings) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            api_url: settings.api_url,
            api_key: settings.api_key,
            user_agent: settings.user_agent,
            retry: settings.retry,
        })
    }

    /// Renders `url` and returns its first page.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`]: `url` is not an absolute http(s) URL.
    /// - [`ScraperError::Unauthorized`]: crawl service returned 401 (not retried).
    /// - [`ScraperError::EmptyContent`]: 2xx response without usable content.
    /// - [`ScraperError::RateLimited`], [`ScraperError::UnexpectedStatus`],
    ///   [`ScraperError::Http`]: the last failure after all retries.
    pub async fn crawl(&self, url: &str) -> Result<CrawledPage, ScraperError> {
        ensure_http_url(url)?;
        let body = build_crawl_request(url, &self.user_agent);

        tracing::info!(url, "crawling listing page");
        let page = retry_with_backoff(&self.retry, |attempt| self.crawl_once(&body, attempt)).await?;
        tracing::info!(
            url,
            html_len = page.html.len(),
            markdown_len = page.markdown.len(),
            "crawl succeeded"
        );
        Ok(page)
    }

    async fn crawl_once(
        &self,
        body: &CrawlRequest,
        attempt: u32,
    ) -> Result<CrawledPage, ScraperError> {
        tracing::debug!(url = %body.url, attempt, "sending crawl request");
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let text = response.text().await?;
            return parse_crawl_response(&body.url, &text);
        }

        let error_body = response.text().await.unwrap_or_default();
        Err(classify_status(&body.url, status, &error_body))
    }
}

fn ensure_http_url(url: &str) -> Result<(), ScraperError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;
    if matches!(parsed.scheme(), "http" | "https") {
        Ok(())
    } else {
        Err(ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
        })
    }
}

/// Maps a non-2xx crawl-service status to a typed error, logging the
/// conditions operators care about.
fn classify_status(url: &str, status: StatusCode, body: &str) -> ScraperError {
    match status {
        StatusCode::UNAUTHORIZED => {
            tracing::error!(url, "crawl service rejected credentials; check CRAWL_API_KEY");
            ScraperError::Unauthorized
        }
        StatusCode::TOO_MANY_REQUESTS => {
            tracing::warn!(url, "crawl service rate limited the request");
            ScraperError::RateLimited
        }
        StatusCode::BAD_REQUEST => {
            tracing::warn!(
                url,
                body = %truncate_chars(body, MAX_ERROR_BODY_CHARS),
                "crawl service returned 400; the URL may be invalid or unsupported"
            );
            unexpected_status(status, body)
        }
        s if s.is_server_error() => {
            tracing::warn!(url, status = s.as_u16(), "crawl service server error");
            unexpected_status(status, body)
        }
        _ => {
            tracing::warn!(url, status = status.as_u16(), "crawl service returned an error status");
            unexpected_status(status, body)
        }
    }
}

fn unexpected_status(status: StatusCode, body: &str) -> ScraperError {
    let text = truncate_chars(body.trim(), MAX_ERROR_BODY_CHARS);
    let body = if text.is_empty() {
        status.canonical_reason().unwrap_or("no response body").to_owned()
    } else {
        text
    };
    ScraperError::UnexpectedStatus {
        status: status.as_u16(),
        body,
    }
}

/// Validates a 2xx body: it must be JSON with a non-empty `pages` array whose
/// first page has non-empty HTML or markdown. Anything else means the page was
/// blocked, removed, or behind a login wall.
fn parse_crawl_response(url: &str, text: &str) -> Result<CrawledPage, ScraperError> {
    let empty = |reason: &str| ScraperError::EmptyContent {
        url: url.to_owned(),
        reason: reason.to_owned(),
    };

    let parsed: CrawlResponse = serde_json::from_str(text).map_err(|e| {
        tracing::warn!(url, error = %e, "crawl service returned a non-JSON body");
        empty("crawl service response was not valid JSON")
    })?;

    let pages = parsed
        .pages
        .filter(|p| !p.is_empty())
        .ok_or_else(|| empty("crawl service returned no pages"))?;
    let page_count = pages.len();

    let content = pages
        .into_iter()
        .next()
        .and_then(|p| p.content)
        .unwrap_or_default();
    let html = content.html.unwrap_or_default();
    let markdown = content.markdown.unwrap_or_default();

    if html.trim().is_empty() && markdown.trim().is_empty() {
        return Err(empty(
            "page content was empty; the listing may be blocked, removed, or behind a login",
        ));
    }

    Ok(CrawledPage {
        url: url.to_owned(),
        html,
        markdown,
        page_count,
    })
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
