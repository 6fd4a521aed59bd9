//! Templated analysis text for sections the model did not produce, records
//! without enough identity, and total failures.

use lotscan_core::{AnalysisResult, DataValidation, VehicleListingRecord};

/// The five sections every [`AnalysisResult`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    Reliability,
    MarketValue,
    MaintenanceNeeds,
    RedFlags,
    Recommendation,
}

impl Section {
    pub(crate) const ALL: [Section; 5] = [
        Section::Reliability,
        Section::MarketValue,
        Section::MaintenanceNeeds,
        Section::RedFlags,
        Section::Recommendation,
    ];

    /// JSON key in the model response and the serialized result.
    pub(crate) fn key(self) -> &'static str {
        match self {
            Self::Reliability => "reliability",
            Self::MarketValue => "marketValue",
            Self::MaintenanceNeeds => "maintenanceNeeds",
            Self::RedFlags => "redFlags",
            Self::Recommendation => "recommendation",
        }
    }

    pub(crate) fn title(self) -> &'static str {
        match self {
            Self::Reliability => "Reliability",
            Self::MarketValue => "Market value",
            Self::MaintenanceNeeds => "Maintenance needs",
            Self::RedFlags => "Red flags",
            Self::Recommendation => "Recommendation",
        }
    }

    /// Record fields this section depends on.
    fn inputs(self) -> &'static [Input] {
        match self {
            Self::Reliability => &[Input::Make, Input::Model, Input::Year],
            Self::MarketValue => &[Input::Price, Input::Mileage, Input::Year],
            Self::MaintenanceNeeds => &[Input::Mileage, Input::Year],
            Self::RedFlags => &[Input::Vin, Input::Description],
            Self::Recommendation => &[Input::Price, Input::Mileage],
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Input {
    Make,
    Model,
    Year,
    Price,
    Mileage,
    Vin,
    Description,
}

impl Input {
    fn label(self) -> &'static str {
        match self {
            Self::Make => "make",
            Self::Model => "model",
            Self::Year => "year",
            Self::Price => "price",
            Self::Mileage => "mileage",
            Self::Vin => "VIN",
            Self::Description => "seller description",
        }
    }

    fn is_present(self, record: &VehicleListingRecord) -> bool {
        match self {
            Self::Make => record.make.is_some(),
            Self::Model => record.model.is_some(),
            Self::Year => record.year.is_some(),
            Self::Price => record.price.is_some(),
            Self::Mileage => record.mileage.is_some(),
            Self::Vin => record.vin.is_some(),
            Self::Description => record.description.is_some(),
        }
    }
}

/// Text for a section the model left out, naming the missing inputs.
pub(crate) fn limited_section(section: Section, record: &VehicleListingRecord) -> String {
    let label = record.label();
    let missing: Vec<&str> = section
        .inputs()
        .iter()
        .filter(|input| !input.is_present(record))
        .map(|input| input.label())
        .collect();

    if missing.is_empty() {
        return format!(
            "{} analysis for {label} is limited: the analysis did not cover this section, \
             so review it manually before buying.",
            section.title()
        );
    }

    let missing = join_words(&missing);
    match section {
        Section::Reliability => format!(
            "Reliability analysis for {label} is limited because the listing did not provide \
             the {missing}. Model-specific reliability history could not be assessed."
        ),
        Section::MarketValue => format!(
            "Market value for {label} could not be fully assessed because the listing did not \
             provide the {missing}. Compare against similar local listings before making an offer."
        ),
        Section::MaintenanceNeeds => format!(
            "Maintenance needs for {label} are uncertain because the listing did not provide the \
             {missing}. Ask the seller for service records."
        ),
        Section::RedFlags => format!(
            "Red-flag review for {label} is limited because the listing did not provide the \
             {missing}. Request a vehicle history report and an independent inspection."
        ),
        Section::Recommendation => format!(
            "A firm recommendation for {label} is not possible because the listing did not \
             provide the {missing}. Verify these details with the seller first."
        ),
    }
}

/// Result for a record that cannot be tied to a specific vehicle. No
/// analysis is attempted.
pub(crate) fn insufficient_identity(errors: Vec<String>) -> AnalysisResult {
    const REASON: &str = "the listing did not provide enough identifying information \
                          (year, make, and model, or a VIN)";
    AnalysisResult {
        reliability: format!("Reliability cannot be assessed: {REASON}."),
        market_value: format!("Market value cannot be estimated: {REASON}."),
        maintenance_needs: format!("Maintenance needs cannot be determined: {REASON}."),
        red_flags: format!(
            "The listing itself is a red flag: {REASON}. Ask the seller for the exact year, \
             make, model, and VIN."
        ),
        recommendation: format!(
            "No recommendation is possible because {REASON}. Confirm the vehicle's identity \
             before going further."
        ),
        data_validation: Some(DataValidation::new(errors, false)),
        unreliable_extraction: Some(true),
        error: Some(
            "Insufficient vehicle information: year, make, and model, or a VIN, are required \
             for analysis."
                .to_owned(),
        ),
    }
}

/// Result for an analysis call that failed outright. Every section names
/// the failure.
pub(crate) fn analysis_failed(
    record: &VehicleListingRecord,
    error: &str,
    errors: Vec<String>,
) -> AnalysisResult {
    let label = record.label();
    let section = |section: Section| {
        format!(
            "{} analysis for {label} failed: {error}. Review the listing manually.",
            section.title()
        )
    };
    AnalysisResult {
        reliability: section(Section::Reliability),
        market_value: section(Section::MarketValue),
        maintenance_needs: section(Section::MaintenanceNeeds),
        red_flags: section(Section::RedFlags),
        recommendation: section(Section::Recommendation),
        data_validation: Some(DataValidation::new(errors, true)),
        unreliable_extraction: None,
        error: Some(format!("Analysis failed: {error}")),
    }
}

fn join_words(words: &[&str]) -> String {
    match words {
        [] => String::new(),
        [one] => (*one).to_owned(),
        [first, second] => format!("{first} or {second}"),
        [init @ .., last] => format!("{}, or {last}", init.join(", ")),
    }
}
