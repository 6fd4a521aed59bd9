use chrono::Datelike;
use serde::{Deserialize, Serialize, Serializer};

/// Earliest model year accepted as plausible.
pub const MIN_MODEL_YEAR: i32 = 1900;

/// Latest plausible model year: next year's models go on sale this year.
#[must_use]
pub fn max_model_year() -> i32 {
    chrono::Utc::now().year() + 1
}

/// Returns `true` if `year` is a whole number within the plausible model-year range.
#[must_use]
pub fn is_plausible_model_year(year: f64) -> bool {
    year.fract().abs() < f64::EPSILON
        && year >= f64::from(MIN_MODEL_YEAR)
        && year <= f64::from(max_model_year())
}

/// A numeric listing field as it travels through the pipeline.
///
/// Extraction may yield either a JSON number or a free-form string such as
/// `"$12,500"`. Validation coerces clean strings to [`ListingValue::Number`]
/// and leaves anything else as [`ListingValue::Text`] rather than dropping it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListingValue {
    Number(f64),
    Text(String),
}

impl ListingValue {
    /// Returns the numeric value, or `None` if the field is still text.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// Returns the numeric value as a whole number when it has no fractional part.
    #[must_use]
    pub fn as_whole(&self) -> Option<i64> {
        let n = self.as_number()?;
        #[allow(clippy::cast_possible_truncation)]
        let whole = n as i64;
        #[allow(clippy::cast_precision_loss)]
        let exact = (whole as f64 - n).abs() < f64::EPSILON;
        exact.then_some(whole)
    }
}

impl std::fmt::Display for ListingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(_) => match self.as_whole() {
                Some(whole) => write!(f, "{whole}"),
                None => write!(f, "{}", self.as_number().unwrap_or_default()),
            },
            Self::Text(s) => f.write_str(s),
        }
    }
}

// Whole numbers serialize as JSON integers so `2019` never renders as `2019.0`.
impl Serialize for ListingValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => match self.as_whole() {
                Some(whole) => serializer.serialize_i64(whole),
                None => serializer.serialize_f64(*n),
            },
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<f64> for ListingValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for ListingValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for ListingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// The vehicle facts extracted from a single listing page.
///
/// Built empty by the structured extractor, populated from model output,
/// coerced in place by validation, and treated as read-only once handed to
/// the analyzer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleListingRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Model year; expected within `1900..=current_year + 1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<ListingValue>,
    /// Asking price with currency symbols and separators stripped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<ListingValue>,
    /// Odometer reading with unit suffixes stripped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<ListingValue>,
    /// Uppercased VIN; a length other than 17 is a warning, not a rejection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl VehicleListingRecord {
    /// Returns `true` when year, make, and model are all present, or a VIN is.
    ///
    /// Anything less is not enough identity to ground an analysis.
    #[must_use]
    pub fn has_identity(&self) -> bool {
        let named = self.year.is_some() && self.make.is_some() && self.model.is_some();
        named || self.vin.as_deref().is_some_and(|v| !v.trim().is_empty())
    }

    /// Human-readable label for prompts and messages, e.g. `"2019 Honda Civic"`.
    ///
    /// Falls back to the VIN, then to a generic phrase.
    #[must_use]
    pub fn label(&self) -> String {
        let parts: Vec<String> = [
            self.year.as_ref().map(ToString::to_string),
            self.make.clone(),
            self.model.clone(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect();

        if !parts.is_empty() {
            return parts.join(" ");
        }
        match self.vin.as_deref().filter(|v| !v.trim().is_empty()) {
            Some(vin) => format!("the vehicle with VIN {vin}"),
            None => "the vehicle in this listing".to_string(),
        }
    }
}
