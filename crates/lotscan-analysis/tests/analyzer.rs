//! Integration tests for `VehicleAnalyzer::analyze` against a mocked
//! completion endpoint.

use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lotscan_analysis::{CompletionClient, LlmSettings, VehicleAnalyzer};
use lotscan_core::{ListingValue, VehicleListingRecord};

fn analyzer_for(server: &MockServer) -> VehicleAnalyzer {
    let client = CompletionClient::new(LlmSettings {
        api_key: "sk-test".to_owned(),
        base_url: format!("{}/v1", server.uri()),
        model: "gpt-4o-mini".to_owned(),
        timeout_secs: 5,
    })
    .expect("failed to build CompletionClient");
    VehicleAnalyzer::new(client)
}

fn completion(content: &serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": content.to_string() } }]
    }))
}

fn civic() -> VehicleListingRecord {
    VehicleListingRecord {
        make: Some("Honda".to_owned()),
        model: Some("Civic".to_owned()),
        year: Some(ListingValue::from(2019)),
        price: Some(ListingValue::from(15_000)),
        mileage: Some(ListingValue::from(42_000)),
        ..VehicleListingRecord::default()
    }
}

#[tokio::test]
async fn description_only_record_is_unreliable_without_calling_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion(&json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let record = VehicleListingRecord {
        description: Some("nice car".to_owned()),
        ..VehicleListingRecord::default()
    };
    let result = analyzer_for(&server).analyze(&record).await;

    assert_eq!(result.unreliable_extraction, Some(true));
    assert!(result.error.is_some());
    assert!(result.sections().iter().all(|(_, text)| !text.is_empty()));
    let validation = result.data_validation.expect("validation attached");
    assert!(validation.has_errors);
    assert!(!validation.is_reliable);
}

#[tokio::test]
async fn full_response_is_used_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({ "temperature": 0.2 })))
        .and(body_string_contains("Make: Honda"))
        .respond_with(completion(&json!({
            "reliability": "The 2019 Honda Civic has a strong reliability record.",
            "marketValue": "$15,000 is fair for a 2019 Civic with 42,000 miles.",
            "maintenanceNeeds": "Expect brake pads and tires soon.",
            "redFlags": "No VIN was provided.",
            "recommendation": "Worth pursuing after an inspection."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = analyzer_for(&server).analyze(&civic()).await;

    assert_eq!(
        result.reliability,
        "The 2019 Honda Civic has a strong reliability record."
    );
    assert_eq!(result.recommendation, "Worth pursuing after an inspection.");
    assert_eq!(result.unreliable_extraction, None);
    assert_eq!(result.error, None);
    let validation = result.data_validation.expect("validation attached");
    assert!(!validation.has_errors);
    assert!(validation.is_reliable);
}

#[tokio::test]
async fn partial_response_is_backfilled() {
    let server = MockServer::start().await;
    let record = VehicleListingRecord {
        price: None,
        mileage: None,
        ..civic()
    };
    Mock::given(method("POST"))
        .respond_with(completion(&json!({
            "reliability": "Solid.",
            "redFlags": "None visible."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = analyzer_for(&server).analyze(&record).await;

    assert_eq!(result.reliability, "Solid.");
    assert!(result.market_value.contains("2019 Honda Civic"));
    assert!(result.market_value.contains("price or mileage"), "{}", result.market_value);
    assert!(result.maintenance_needs.contains("mileage"));
    assert!(!result.recommendation.is_empty());
}

#[tokio::test]
async fn prose_wrapped_json_is_recovered() {
    let server = MockServer::start().await;
    let content = "Sure! {\"reliability\":\"a\",\"marketValue\":\"b\",\"maintenanceNeeds\":\"c\",\"redFlags\":\"d\",\"recommendation\":\"e\"}";
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": content } }]
        })))
        .mount(&server)
        .await;

    let result = analyzer_for(&server).analyze(&civic()).await;
    assert_eq!(result.market_value, "b");
    assert_eq!(result.error, None);
}

#[tokio::test]
async fn endpoint_failure_yields_five_sections_mentioning_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let result = analyzer_for(&server).analyze(&civic()).await;

    for (key, text) in result.sections() {
        assert!(!text.is_empty(), "{key} empty");
        assert!(text.contains("failed"), "{key}: {text}");
    }
    assert!(result
        .error
        .as_deref()
        .is_some_and(|e| e.contains("upstream exploded")));
}

#[tokio::test]
async fn unparseable_response_yields_failure_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion(&json!("no object here")))
        .mount(&server)
        .await;

    let result = analyzer_for(&server).analyze(&civic()).await;
    assert!(result.error.is_some());
    assert!(result.sections().iter().all(|(_, text)| text.contains("failed")));
}

#[tokio::test]
async fn vin_alone_is_enough_identity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("VIN: 1HGCV1F34KA000001"))
        .respond_with(completion(&json!({ "reliability": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let record = VehicleListingRecord {
        vin: Some("1HGCV1F34KA000001".to_owned()),
        ..VehicleListingRecord::default()
    };
    let result = analyzer_for(&server).analyze(&record).await;

    assert_eq!(result.unreliable_extraction, None);
    assert!(result.market_value.contains("the vehicle with VIN 1HGCV1F34KA000001"));
    let validation = result.data_validation.expect("validation attached");
    assert!(validation.has_errors);
    assert!(validation.is_reliable);
}
