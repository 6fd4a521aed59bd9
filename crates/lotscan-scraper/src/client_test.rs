use super::request::{build_crawl_request, LISTING_SELECTORS};
use super::*;

const UA: &str = "Mozilla/5.0 (test)";

#[test]
fn crawl_request_serializes_service_field_names() {
    let req = build_crawl_request("https://www.cargurus.com/listing/123", UA);
    let json = serde_json::to_value(&req).unwrap();

    assert_eq!(json["url"], "https://www.cargurus.com/listing/123");
    assert_eq!(json["limit"], 1);
    assert_eq!(json["followRedirects"], true);

    let opts = &json["scrapeOptions"];
    assert_eq!(opts["formats"], serde_json::json!(["markdown", "html"]));
    assert_eq!(opts["followLinks"], false);
    assert_eq!(opts["waitUntil"], "networkidle0");
    assert_eq!(opts["timeout"], 30_000);
    assert_eq!(opts["javascript"], true);
    assert_eq!(opts["imagesAndCSSRequired"], true);
    assert_eq!(opts["scrollToBottom"], true);
    assert_eq!(opts["extraHTTPHeaders"]["User-Agent"], UA);
    assert_eq!(opts["extraHTTPHeaders"]["Accept-Language"], "en-US,en;q=0.9");
}

#[test]
fn selector_list_ends_with_body_fallback() {
    let req = build_crawl_request("https://example.com/car", UA);
    let selector = req.scrape_options.selector;
    assert!(selector.starts_with("[class*='vehicle-details']"));
    assert!(selector.ends_with("body"));
    assert_eq!(selector.split(", ").count(), LISTING_SELECTORS.len());
}

#[test]
fn parse_response_returns_first_page() {
    let body = serde_json::json!({
        "pages": [
            { "content": { "markdown": "# 2019 Honda Civic", "html": "<h1>2019 Honda Civic</h1>" } },
            { "content": { "markdown": "other", "html": "<p>other</p>" } }
        ]
    })
    .to_string();
    let page = parse_crawl_response("https://example.com/car", &body).unwrap();
    assert_eq!(page.html, "<h1>2019 Honda Civic</h1>");
    assert_eq!(page.markdown, "# 2019 Honda Civic");
    assert_eq!(page.page_count, 2);
}

#[test]
fn parse_response_accepts_markdown_only_page() {
    let body = r#"{"pages":[{"content":{"markdown":"2019 Honda Civic","html":""}}]}"#;
    let page = parse_crawl_response("https://example.com/car", body).unwrap();
    assert!(page.html.is_empty());
    assert_eq!(page.markdown, "2019 Honda Civic");
}

#[test]
fn parse_response_rejects_missing_pages() {
    let err = parse_crawl_response("https://example.com/car", r#"{"status":"ok"}"#).unwrap_err();
    assert!(matches!(err, ScraperError::EmptyContent { .. }), "got {err:?}");
}

#[test]
fn parse_response_rejects_empty_pages_array() {
    let err = parse_crawl_response("https://example.com/car", r#"{"pages":[]}"#).unwrap_err();
    assert!(matches!(err, ScraperError::EmptyContent { .. }), "got {err:?}");
}

#[test]
fn parse_response_rejects_blank_content() {
    let body = r#"{"pages":[{"content":{"markdown":"","html":"   "}}]}"#;
    let err = parse_crawl_response("https://example.com/car", body).unwrap_err();
    match err {
        ScraperError::EmptyContent { reason, .. } => assert!(reason.contains("blocked")),
        other => panic!("expected EmptyContent, got {other:?}"),
    }
}

#[test]
fn parse_response_rejects_non_json() {
    let err = parse_crawl_response("https://example.com/car", "<html>captcha</html>").unwrap_err();
    assert!(matches!(err, ScraperError::EmptyContent { .. }), "got {err:?}");
}

#[test]
fn classify_status_maps_taxonomy() {
    let url = "https://example.com/car";
    assert!(matches!(
        classify_status(url, StatusCode::UNAUTHORIZED, ""),
        ScraperError::Unauthorized
    ));
    assert!(matches!(
        classify_status(url, StatusCode::TOO_MANY_REQUESTS, ""),
        ScraperError::RateLimited
    ));
    assert!(matches!(
        classify_status(url, StatusCode::BAD_REQUEST, "bad url"),
        ScraperError::UnexpectedStatus { status: 400, .. }
    ));
    assert!(matches!(
        classify_status(url, StatusCode::BAD_GATEWAY, "oops"),
        ScraperError::UnexpectedStatus { status: 502, .. }
    ));
}

#[test]
fn unexpected_status_falls_back_to_reason_phrase() {
    match unexpected_status(StatusCode::SERVICE_UNAVAILABLE, "  ") {
        ScraperError::UnexpectedStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "Service Unavailable");
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[test]
fn ensure_http_url_rejects_other_schemes() {
    assert!(ensure_http_url("https://example.com/a").is_ok());
    assert!(matches!(
        ensure_http_url("ftp://example.com/a"),
        Err(ScraperError::InvalidUrl { .. })
    ));
    assert!(matches!(
        ensure_http_url("not a url"),
        Err(ScraperError::InvalidUrl { .. })
    ));
}

#[test]
fn settings_debug_redacts_key() {
    let settings = CrawlSettings {
        api_url: "https://crawler.test".to_owned(),
        api_key: "secret-key".to_owned(),
        timeout_secs: 45,
        user_agent: UA.to_owned(),
        retry: RetryPolicy::default(),
    };
    let rendered = format!("{settings:?}");
    assert!(!rendered.contains("secret-key"));
}
