//! LLM-backed conversion of listing text into a [`VehicleListingRecord`].

use lotscan_core::{ListingValue, VehicleListingRecord};
use lotscan_scraper::{extract_image_url, Platform};
use serde_json::{Map, Value};

use crate::error::AnalysisError;
use crate::json_repair::parse_json_object;
use crate::llm::CompletionClient;
use crate::validate::validate;

/// Listing text beyond this many characters is not sent to the model.
pub const MAX_PROMPT_TEXT_CHARS: usize = 8_000;

const EXTRACTION_TEMPERATURE: f64 = 0.1;

const SYSTEM_PROMPT: &str = "You extract structured data from used-vehicle listings. \
Respond with a single JSON object and nothing else. Only report values that are \
explicitly stated in the listing text. Never guess, infer, or invent a value: if a \
field is not clearly present, omit its key.";

/// Where each marketplace tends to put the fields we want.
fn platform_hint(platform: Platform) -> &'static str {
    match platform {
        Platform::Craigslist => {
            "Craigslist posts put the price next to the title and list structured \
             attributes (odometer, VIN, condition, title status) in an attribute group. \
             The seller's free-text description follows."
        }
        Platform::FacebookMarketplace => {
            "Facebook Marketplace listings show the price and a year/make/model title at \
             the top. Mileage is usually written as \"Driven N miles\". The seller's \
             description sits below the vehicle details."
        }
        Platform::CarGurus => {
            "CarGurus listings have a key-details block with mileage, price, and VIN. \
             Ignore CarGurus market estimates, deal ratings, and prices of other listed cars."
        }
        Platform::AutoTrader => {
            "AutoTrader vehicle pages show the year/make/model heading, the listed price, \
             and a details section with mileage and VIN. Ignore payment estimates and \
             sponsored listings."
        }
        Platform::CarsCom => {
            "Cars.com listings show the price below the year/make/model title and a \
             Basics section with mileage and VIN. Ignore estimated monthly payments and \
             price-drop history."
        }
        _ => {
            "Look for the year, make, and model in the title or main heading, the price \
             near a currency symbol, mileage near \"miles\" or \"odometer\", and a \
             17-character VIN."
        }
    }
}

fn build_prompt(text: &str, platform: Platform) -> String {
    let truncated: String = text.chars().take(MAX_PROMPT_TEXT_CHARS).collect();
    format!(
        "Platform: {platform}\n\
         {hint}\n\n\
         Return a JSON object with any of these keys that the listing clearly states:\n\
         - make (string)\n\
         - model (string, including trim if given)\n\
         - year (number)\n\
         - price (number, no currency symbols)\n\
         - mileage (number)\n\
         - vin (string)\n\
         - description (string, the seller's description)\n\
         - imageUrl (string, absolute URL of the main vehicle photo)\n\
         Omit every key whose value is not in the text.\n\n\
         Listing text:\n{truncated}",
        hint = platform_hint(platform),
    )
}

/// Turns listing text into a validated record with one JSON-mode completion.
#[derive(Debug, Clone)]
pub struct StructuredDataExtractor {
    client: CompletionClient,
}

impl StructuredDataExtractor {
    #[must_use]
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    /// Extracts a record from `text`.
    ///
    /// When `html` is given and the model reports no `imageUrl`, the photo
    /// found by [`extract_image_url`] is used. The result has already been
    /// through [`validate`].
    ///
    /// # Errors
    ///
    /// Propagates completion failures and [`AnalysisError::MalformedJson`] /
    /// [`AnalysisError::NotAnObject`] when no JSON object can be recovered.
    pub async fn extract(
        &self,
        text: &str,
        platform: Platform,
        html: Option<&str>,
    ) -> Result<VehicleListingRecord, AnalysisError> {
        let prompt = build_prompt(text, platform);
        tracing::info!(
            platform = %platform,
            text_chars = text.chars().count(),
            "extracting structured listing data"
        );

        let content = self
            .client
            .complete_json(SYSTEM_PROMPT, &prompt, EXTRACTION_TEMPERATURE)
            .await?;
        let object = parse_json_object(&content)?;
        let mut record = record_from_object(&object);

        if record.image_url.is_none() {
            if let Some(image) = html.and_then(extract_image_url) {
                tracing::debug!(image = %image, "using image found in page HTML");
                record.image_url = Some(image);
            }
        }

        let record = validate(record);
        tracing::info!(
            make = record.make.as_deref().unwrap_or_default(),
            model = record.model.as_deref().unwrap_or_default(),
            has_vin = record.vin.is_some(),
            "structured extraction complete"
        );
        Ok(record)
    }
}

/// Reads known keys leniently: nulls, empty strings, and values of the wrong
/// shape are treated as absent.
fn record_from_object(object: &Map<String, Value>) -> VehicleListingRecord {
    VehicleListingRecord {
        make: text_field(object, "make"),
        model: text_field(object, "model"),
        year: value_field(object, "year"),
        price: value_field(object, "price"),
        mileage: value_field(object, "mileage"),
        vin: text_field(object, "vin"),
        description: text_field(object, "description"),
        image_url: text_field(object, "imageUrl"),
    }
}

fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => Some(s.trim().to_owned()).filter(|s| !s.is_empty()),
        // "model": 3 for a Mazda 3
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_field(object: &Map<String, Value>, key: &str) -> Option<ListingValue> {
    match object.get(key)? {
        Value::Number(n) => n.as_f64().map(ListingValue::Number),
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| ListingValue::from(s))
        }
        _ => None,
    }
}
