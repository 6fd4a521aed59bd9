//! End-to-end tests for `ListingPipeline::analyze_listing`.
//!
//! One `wiremock` server stands in for the crawl service (`/crawl`) and the
//! completion endpoint (`/v1/chat/completions`). Extraction and analysis
//! calls are told apart by their system prompts.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lotscan_analysis::{CompletionClient, ListingPipeline, LlmSettings};
use lotscan_core::ListingValue;
use lotscan_scraper::{CrawlClient, CrawlSettings, RetryPolicy, UrlNormalizer};

const EXTRACTION_MARKER: &str = "You extract structured data";
const ANALYSIS_MARKER: &str = "used-car inspector";

fn pipeline_for(server: &MockServer, timeout: Duration) -> ListingPipeline {
    let normalizer = UrlNormalizer::new(5, 5).expect("normalizer");
    let crawler = CrawlClient::new(CrawlSettings {
        api_url: format!("{}/crawl", server.uri()),
        api_key: "crawl-key".to_owned(),
        timeout_secs: 5,
        user_agent: "lotscan-test/0.1".to_owned(),
        retry: RetryPolicy {
            max_retries: 2,
            backoff_base_ms: 0,
            rate_limit_wait_ms: 0,
        },
    })
    .expect("crawler");
    let completion = CompletionClient::new(LlmSettings {
        api_key: "sk-test".to_owned(),
        base_url: format!("{}/v1", server.uri()),
        model: "gpt-4o-mini".to_owned(),
        timeout_secs: 5,
    })
    .expect("completion client");
    ListingPipeline::new(normalizer, crawler, completion, timeout)
}

fn completion(content: &serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": content.to_string() } }]
    }))
}

fn cargurus_html() -> String {
    let details = "<li>Exterior color: Crimson Pearl</li><li>Interior: Black cloth</li>\
                   <li>Transmission: Continuously variable</li><li>Drivetrain: FWD</li>\
                   <li>Fuel economy: 30 city / 38 highway</li><li>Title: Clean, one owner</li>\
                   <li>Accidents reported: none</li><li>Seller: Private party</li>";
    format!(
        r#"<html><head><title>Used 2019 Honda Civic</title>
        <meta property="og:image" content="https://static.cargurus.com/images/forsale/civic.jpg">
        </head><body>
        <nav>Buy | Sell | Finance</nav>
        <div class="sidebar">Get pre-approved for financing today</div>
        <div class="cg-listing-key-details">
          <h1>2019 Honda Civic, $15,000, 42,000 miles</h1>
          <ul>{details}</ul>
        </div>
        <footer>CarGurus footer</footer>
        </body></html>"#
    )
}

async fn mount_crawl(server: &MockServer, html: &str) {
    Mock::given(method("POST"))
        .and(path("/crawl"))
        .and(body_partial_json(json!({ "url": "https://www.cargurus.com/listing/123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pages": [{ "content": { "markdown": "# 2019 Honda Civic", "html": html } }]
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn cargurus_listing_end_to_end() {
    let server = MockServer::start().await;
    mount_crawl(&server, &cargurus_html()).await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains(EXTRACTION_MARKER))
        .and(body_string_contains("Platform: CarGurus"))
        .and(body_string_contains("2019 Honda Civic, $15,000, 42,000 miles"))
        .respond_with(completion(&json!({
            "make": "Honda",
            "model": "Civic",
            "year": 2019,
            "price": 15000,
            "mileage": 42000
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains(ANALYSIS_MARKER))
        .and(body_string_contains("Model: Civic"))
        .respond_with(completion(&json!({
            "reliability": "The 2019 Honda Civic is one of the most reliable compacts of its year.",
            "marketValue": "At $15,000 with 42,000 miles, this 2019 Honda Civic is priced fairly.",
            "maintenanceNeeds": "At 42,000 miles the 2019 Honda Civic is due for a CVT fluid change.",
            "redFlags": "No VIN is listed for this 2019 Honda Civic; request it.",
            "recommendation": "The 2019 Honda Civic is worth pursuing after an inspection."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let report = pipeline_for(&server, Duration::from_secs(30))
        .analyze_listing("https://www.cargurus.com/listing/123?partnerId=abc")
        .await;

    let vla = report
        .vehicle_listing_analysis
        .expect("analysis should be attached");
    assert_eq!(vla.url, "https://www.cargurus.com/listing/123");
    assert_eq!(vla.record.make.as_deref(), Some("Honda"));
    assert_eq!(vla.record.model.as_deref(), Some("Civic"));
    assert_eq!(vla.record.year, Some(ListingValue::Number(2019.0)));
    assert_eq!(vla.record.price, Some(ListingValue::Number(15_000.0)));
    assert_eq!(vla.record.mileage, Some(ListingValue::Number(42_000.0)));
    assert_eq!(
        vla.record.image_url.as_deref(),
        Some("https://static.cargurus.com/images/forsale/civic.jpg")
    );

    for (key, text) in vla.analysis.sections() {
        assert!(text.contains("2019 Honda Civic"), "{key}: {text}");
    }
    assert_eq!(vla.analysis.unreliable_extraction, None);

    assert!(report.text.starts_with("## 2019 Honda Civic"));
    assert!(report.text.contains("**Price:** $15,000"));

    let json = serde_json::to_value(&vla).unwrap();
    assert_eq!(json["year"], 2019);
    assert_eq!(json["price"], 15000);
    assert!(json["analysis"]["marketValue"].is_string());
}

#[tokio::test]
async fn unidentifiable_listing_skips_analysis_call() {
    let server = MockServer::start().await;
    mount_crawl(&server, &cargurus_html()).await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains(EXTRACTION_MARKER))
        .respond_with(completion(&json!({ "description": "nice car" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains(ANALYSIS_MARKER))
        .respond_with(completion(&json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let report = pipeline_for(&server, Duration::from_secs(30))
        .analyze_listing("https://www.cargurus.com/listing/123")
        .await;

    let vla = report.vehicle_listing_analysis.expect("analysis attached");
    assert_eq!(vla.analysis.unreliable_extraction, Some(true));
    assert!(report.text.contains("couldn't identify"));
}

#[tokio::test]
async fn crawl_auth_failure_is_reported_without_analysis() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/crawl"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion(&json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let report = pipeline_for(&server, Duration::from_secs(30))
        .analyze_listing("https://www.cargurus.com/listing/123")
        .await;

    assert!(report.vehicle_listing_analysis.is_none());
    assert!(report.text.starts_with("I couldn't access the listing"));
}

#[tokio::test]
async fn extraction_failure_is_reported_without_analysis() {
    let server = MockServer::start().await;
    mount_crawl(&server, &cargurus_html()).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion(&json!("not an object")))
        .expect(1)
        .mount(&server)
        .await;

    let report = pipeline_for(&server, Duration::from_secs(30))
        .analyze_listing("https://www.cargurus.com/listing/123")
        .await;

    assert!(report.vehicle_listing_analysis.is_none());
    assert!(report.text.contains("couldn't extract the vehicle details"));
}

#[tokio::test]
async fn slow_crawl_hits_pipeline_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/crawl"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let report = pipeline_for(&server, Duration::from_secs(1))
        .analyze_listing("https://www.cargurus.com/listing/123")
        .await;

    assert!(report.vehicle_listing_analysis.is_none());
    assert!(report.text.contains("took longer than 1 seconds"));
}
