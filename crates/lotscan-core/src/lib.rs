//! Shared configuration and domain types for the lotscan listing pipeline.

pub mod analysis;
pub mod app_config;
pub mod config;
pub mod listing;

use thiserror::Error;

pub use analysis::{AnalysisResult, DataValidation, ListingReport, VehicleListingAnalysis};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use listing::{
    is_plausible_model_year, max_model_year, ListingValue, VehicleListingRecord, MIN_MODEL_YEAR,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
