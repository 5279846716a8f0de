// Gradient-boosted model and offline export
pub mod ml;

// Per-request prediction pipeline
pub mod pipeline;

// Store lookups around the pipeline
pub mod prediction_service;

pub use prediction_service::PredictionService;
