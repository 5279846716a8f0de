//! Prometheus metrics definitions for Foresight
//!
//! All metrics use the `foresight_` prefix.

use prometheus::{
    CounterVec, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

/// Prometheus metrics for the prediction service
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Prediction requests by outcome ("ok" or an error kind)
    pub predictions_total: CounterVec,
    /// Wall time of one pipeline run
    pub pipeline_duration_seconds: Histogram,
    /// Rows used to fit the most recent model
    pub training_rows: GenericGauge<AtomicF64>,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let predictions_total = CounterVec::new(
            Opts::new(
                "foresight_predictions_total",
                "Total prediction requests by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        let pipeline_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "foresight_pipeline_duration_seconds",
                "Pipeline run duration in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        )?;
        registry.register(Box::new(pipeline_duration_seconds.clone()))?;

        let training_rows = GenericGauge::with_opts(Opts::new(
            "foresight_training_rows",
            "Rows in the training partition of the latest run",
        ))?;
        registry.register(Box::new(training_rows.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            predictions_total,
            pipeline_duration_seconds,
            training_rows,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_predictions(&self, outcome: &str) {
        self.predictions_total.with_label_values(&[outcome]).inc();
    }

    pub fn observe_pipeline(&self, seconds: f64, training_rows: usize) {
        self.pipeline_duration_seconds.observe(seconds);
        self.training_rows.set(training_rows as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_predictions("ok");
        assert!(metrics.render().contains("foresight_"));
    }

    #[test]
    fn test_prediction_counter_by_outcome() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_predictions("ok");
        metrics.inc_predictions("ok");
        metrics.inc_predictions("not_found");
        let output = metrics.render();
        assert!(output.contains("foresight_predictions_total{outcome=\"ok\"} 2"));
        assert!(output.contains("foresight_predictions_total{outcome=\"not_found\"} 1"));
    }

    #[test]
    fn test_pipeline_observation() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.observe_pipeline(0.02, 48);
        let output = metrics.render();
        assert!(output.contains("foresight_training_rows 48"));
        assert!(output.contains("foresight_pipeline_duration_seconds_count 1"));
    }
}
