use serde::{Deserialize, Serialize};

use crate::listing::VehicleListingRecord;

/// Summary of the data-quality checks run before analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataValidation {
    pub has_errors: bool,
    pub errors: Vec<String>,
    /// Whether the record carried enough identity to be analyzed at all.
    pub is_reliable: bool,
}

impl DataValidation {
    #[must_use]
    pub fn new(errors: Vec<String>, is_reliable: bool) -> Self {
        Self {
            has_errors: !errors.is_empty(),
            errors,
            is_reliable,
        }
    }
}

/// Five-section critique of a listing.
///
/// All five sections are always populated, including on failure paths where
/// each one explains what went wrong or which inputs were missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub reliability: String,
    pub market_value: String,
    pub maintenance_needs: String,
    pub red_flags: String,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_validation: Option<DataValidation>,
    /// Set when the record lacked year/make/model and a VIN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unreliable_extraction: Option<bool>,
    /// Top-level message when analysis was skipped or failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// Returns the five sections in canonical order with their JSON keys.
    #[must_use]
    pub fn sections(&self) -> [(&'static str, &str); 5] {
        [
            ("reliability", &self.reliability),
            ("marketValue", &self.market_value),
            ("maintenanceNeeds", &self.maintenance_needs),
            ("redFlags", &self.red_flags),
            ("recommendation", &self.recommendation),
        ]
    }
}

/// Listing facts plus analysis, in the shape the chat UI consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleListingAnalysis {
    pub url: String,
    #[serde(flatten)]
    pub record: VehicleListingRecord,
    pub analysis: AnalysisResult,
}

/// Result of analyzing one listing URL.
///
/// `text` is always present; `vehicle_listing_analysis` is absent when the
/// page could not be fetched or no record could be extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingReport {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_listing_analysis: Option<VehicleListingAnalysis>,
}

impl ListingReport {
    #[must_use]
    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            vehicle_listing_analysis: None,
        }
    }
}
