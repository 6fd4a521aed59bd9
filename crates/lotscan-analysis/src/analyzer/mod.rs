//! Buyer-facing analysis of a validated listing record.

mod fallback;

use lotscan_core::{
    is_plausible_model_year, max_model_year, AnalysisResult, DataValidation, ListingValue,
    VehicleListingRecord, MIN_MODEL_YEAR,
};
use serde_json::{Map, Value};

use crate::error::AnalysisError;
use crate::json_repair::parse_json_object;
use crate::llm::CompletionClient;
use crate::validate::VIN_LENGTH;

pub(crate) use fallback::Section;

const ANALYSIS_TEMPERATURE: f64 = 0.2;
const NOT_SPECIFIED: &str = "Not specified";

const SYSTEM_PROMPT: &str = "You are an experienced used-car inspector advising a buyer. \
Respond with a single JSON object containing exactly these string keys: reliability, \
marketValue, maintenanceNeeds, redFlags, recommendation. Base every statement only on the \
vehicle details provided. Never substitute facts about a different vehicle, year, or trim. \
When a detail is marked \"Not specified\", say explicitly that the section is limited by \
that missing information.";

/// Produces an [`AnalysisResult`] for a record. Never fails: every error
/// path yields a complete five-section result explaining what went wrong.
#[derive(Debug, Clone)]
pub struct VehicleAnalyzer {
    client: CompletionClient,
}

impl VehicleAnalyzer {
    #[must_use]
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    /// Analyzes `record`.
    ///
    /// Records lacking both (year, make, model) and a VIN are returned as
    /// `unreliable_extraction` without contacting the model. Sections the
    /// model omits are filled with templated text naming the missing inputs.
    pub async fn analyze(&self, record: &VehicleListingRecord) -> AnalysisResult {
        let errors = validation_errors(record);
        if !errors.is_empty() {
            tracing::warn!(errors = ?errors, "listing record has data-quality issues");
        }

        if !record.has_identity() {
            tracing::warn!("insufficient vehicle identity; skipping analysis");
            return fallback::insufficient_identity(errors);
        }

        match self.request_analysis(record).await {
            Ok(sections) => {
                let result = assemble(record, &sections, errors);
                tracing::info!(vehicle = %record.label(), "analysis complete");
                result
            }
            Err(e) => {
                tracing::error!(vehicle = %record.label(), error = %e, "analysis failed");
                fallback::analysis_failed(record, &e.to_string(), errors)
            }
        }
    }

    async fn request_analysis(
        &self,
        record: &VehicleListingRecord,
    ) -> Result<Map<String, Value>, AnalysisError> {
        let prompt = build_prompt(record);
        let content = self
            .client
            .complete_json(SYSTEM_PROMPT, &prompt, ANALYSIS_TEMPERATURE)
            .await?;
        parse_json_object(&content)
    }
}

/// Collects data-quality problems. None of them is fatal on its own.
#[must_use]
pub fn validation_errors(record: &VehicleListingRecord) -> Vec<String> {
    let mut errors = Vec::new();

    if record.make.is_none() {
        errors.push("Missing make".to_owned());
    }
    if record.model.is_none() {
        errors.push("Missing model".to_owned());
    }
    match &record.year {
        None => errors.push("Missing year".to_owned()),
        Some(ListingValue::Number(year)) if !is_plausible_model_year(*year) => errors.push(format!(
            "Year {} is outside the plausible range {MIN_MODEL_YEAR}-{}",
            ListingValue::Number(*year),
            max_model_year()
        )),
        Some(ListingValue::Text(raw)) => errors.push(format!("Year \"{raw}\" is not a number")),
        Some(ListingValue::Number(_)) => {}
    }

    if let Some(price) = record.price.as_ref().and_then(ListingValue::as_number) {
        if price <= 0.0 {
            errors.push(format!(
                "Price must be positive (got {})",
                ListingValue::Number(price)
            ));
        }
    }
    if let Some(mileage) = record.mileage.as_ref().and_then(ListingValue::as_number) {
        if mileage < 0.0 {
            errors.push(format!(
                "Mileage cannot be negative (got {})",
                ListingValue::Number(mileage)
            ));
        }
    }
    if let Some(vin) = &record.vin {
        let len = vin.chars().count();
        if len != VIN_LENGTH {
            errors.push(format!("VIN should be {VIN_LENGTH} characters (got {len})"));
        }
    }

    errors
}

fn build_prompt(record: &VehicleListingRecord) -> String {
    fn text(value: Option<&str>) -> &str {
        value.unwrap_or(NOT_SPECIFIED)
    }
    fn value(value: Option<&ListingValue>) -> String {
        value.map_or_else(|| NOT_SPECIFIED.to_owned(), ToString::to_string)
    }

    format!(
        "Analyze this used-vehicle listing for a prospective buyer.\n\n\
         Make: {make}\n\
         Model: {model}\n\
         Year: {year}\n\
         Price: {price}\n\
         Mileage: {mileage}\n\
         VIN: {vin}\n\
         Seller description: {description}\n\n\
         Write one paragraph per key:\n\
         - reliability: known strengths and weak points of this exact year, make, and model\n\
         - marketValue: whether the price is fair for the year and mileage\n\
         - maintenanceNeeds: service items due at this age and mileage\n\
         - redFlags: concerns raised by the listing details\n\
         - recommendation: whether to pursue this vehicle and what to verify first\n\
         Use only the details above. If a detail is \"{NOT_SPECIFIED}\", state that the \
         section is limited by it.",
        make = text(record.make.as_deref()),
        model = text(record.model.as_deref()),
        year = value(record.year.as_ref()),
        price = value(record.price.as_ref()),
        mileage = value(record.mileage.as_ref()),
        vin = text(record.vin.as_deref()),
        description = text(record.description.as_deref()),
    )
}

/// Builds the final result from the model's sections, backfilling any
/// missing or blank ones.
fn assemble(
    record: &VehicleListingRecord,
    sections: &Map<String, Value>,
    errors: Vec<String>,
) -> AnalysisResult {
    let section = |s: Section| {
        section_text(sections.get(s.key())).unwrap_or_else(|| {
            tracing::debug!(section = s.key(), "backfilling missing analysis section");
            fallback::limited_section(s, record)
        })
    };

    AnalysisResult {
        reliability: section(Section::Reliability),
        market_value: section(Section::MarketValue),
        maintenance_needs: section(Section::MaintenanceNeeds),
        red_flags: section(Section::RedFlags),
        recommendation: section(Section::Recommendation),
        data_validation: Some(DataValidation::new(errors, true)),
        unreliable_extraction: None,
        error: None,
    }
}

/// Accepts a string, or a list of strings joined into one paragraph.
fn section_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_owned(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}
