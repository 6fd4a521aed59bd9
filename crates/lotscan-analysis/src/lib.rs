//! LLM-backed listing understanding: structured extraction, validation,
//! buyer analysis, and the end-to-end [`ListingPipeline`].

pub mod analyzer;
pub mod error;
pub mod extraction;
pub mod json_repair;
pub mod llm;
pub mod pipeline;
pub mod report;
pub mod validate;

pub use analyzer::{validation_errors, VehicleAnalyzer};
pub use error::AnalysisError;
pub use extraction::StructuredDataExtractor;
pub use json_repair::parse_json_object;
pub use llm::{CompletionClient, LlmSettings};
pub use pipeline::ListingPipeline;
pub use validate::validate;
