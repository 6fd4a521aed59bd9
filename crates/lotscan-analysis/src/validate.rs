//! Post-extraction normalization of a [`VehicleListingRecord`].
//!
//! Model output is loose: prices arrive as `"$15,000"`, mileage as
//! `"42k miles"`. [`validate`] coerces what it can and leaves everything
//! else in place. It never removes a field and never fails.

use std::sync::LazyLock;

use lotscan_core::{is_plausible_model_year, ListingValue, VehicleListingRecord};
use regex::Regex;

pub const MAX_DESCRIPTION_CHARS: usize = 1_000;
pub const VIN_LENGTH: usize = 17;

static UNIT_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(usd|kilometers|kilometres|miles|mile|kms|km|mi)\b\.?")
        .expect("valid unit regex")
});

#[derive(Debug, Clone, Copy)]
enum NumericField {
    Year,
    Price,
    Mileage,
}

impl NumericField {
    fn name(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Price => "price",
            Self::Mileage => "mileage",
        }
    }
}

/// Normalizes a freshly extracted record.
///
/// - `year`, `price`, `mileage`: numeric strings become numbers; strings that
///   do not parse cleanly are kept as they were.
/// - `description`: cut to 1000 characters plus `...`.
/// - `vin`: trimmed and uppercased; a length other than 17 is logged.
#[must_use]
pub fn validate(mut record: VehicleListingRecord) -> VehicleListingRecord {
    record.year = record.year.map(|v| coerce(v, NumericField::Year));
    record.price = record.price.map(|v| coerce(v, NumericField::Price));
    record.mileage = record.mileage.map(|v| coerce(v, NumericField::Mileage));

    if let Some(year) = record.year.as_ref().and_then(ListingValue::as_number) {
        if !is_plausible_model_year(year) {
            tracing::warn!(year, "extracted model year looks implausible");
        }
    }

    record.description = record.description.map(truncate_description);

    record.vin = record.vin.map(|vin| {
        let vin = vin.trim().to_ascii_uppercase();
        if vin.chars().count() != VIN_LENGTH {
            tracing::warn!(vin = %vin, len = vin.chars().count(), "VIN is not 17 characters");
        }
        vin
    });

    record
}

fn coerce(value: ListingValue, field: NumericField) -> ListingValue {
    let ListingValue::Text(raw) = &value else {
        return value;
    };
    match parse_numeric(raw) {
        Some(n) if !matches!(field, NumericField::Year) || n.fract().abs() < f64::EPSILON => {
            tracing::debug!(field = field.name(), raw = %raw, value = n, "coerced numeric field");
            ListingValue::Number(n)
        }
        _ => {
            tracing::debug!(field = field.name(), raw = %raw, "left non-numeric field unchanged");
            value
        }
    }
}

/// Parses strings like `"$12,500"`, `"42,000 miles"`, `"42k"`, `"USD 9,999.99"`.
fn parse_numeric(raw: &str) -> Option<f64> {
    let without_units = UNIT_WORD_RE.replace_all(raw, "");
    let cleaned: String = without_units
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | '¥' | ',') && !c.is_whitespace())
        .collect();

    let (digits, multiplier) = match cleaned.strip_suffix(['k', 'K']) {
        Some(rest) => (rest, 1_000.0),
        None => (cleaned.as_str(), 1.0),
    };
    if digits.is_empty() || !digits.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let n = digits.parse::<f64>().ok()? * multiplier;
    n.is_finite().then_some(n)
}

fn truncate_description(description: String) -> String {
    if description.chars().count() <= MAX_DESCRIPTION_CHARS {
        return description;
    }
    let mut cut: String = description.chars().take(MAX_DESCRIPTION_CHARS).collect();
    cut.push_str("...");
    cut
}
