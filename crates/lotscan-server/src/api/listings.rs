use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use lotscan_core::ListingReport;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeListingRequest {
    url: String,
}

/// `POST /api/v1/listings/analyze`
///
/// Pipeline failures (unreachable listing, extraction failure, timeout) are
/// still 200 responses; the report text explains what happened.
pub(super) async fn analyze_listing(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<AnalyzeListingRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ListingReport>>, ApiError> {
    let Json(body) = payload.map_err(|e| {
        ApiError::new(req_id.0.clone(), "validation_error", e.body_text())
    })?;

    let url = validate_listing_url(&body.url)
        .map_err(|message| ApiError::new(req_id.0.clone(), "validation_error", message))?;

    tracing::info!(request_id = %req_id.0, url = %url, "analyze listing request");
    let report = state.pipeline.analyze_listing(&url).await;

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn validate_listing_url(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("url must not be empty".to_owned());
    }
    let parsed =
        reqwest::Url::parse(trimmed).map_err(|e| format!("url is not a valid absolute URL: {e}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("url scheme must be http or https, got \"{}\"", parsed.scheme()));
    }
    Ok(trimmed.to_owned())
}
