//! Prometheus metrics for the prediction service, rendered on demand by the
//! HTTP layer.

pub mod metrics;

pub use metrics::Metrics;
