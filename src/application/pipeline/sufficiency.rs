use super::label_composer::LabeledTable;
use super::table::retain_by;
use crate::domain::errors::PredictionError;
use tracing::debug;

/// Minimum-row precondition applied after trailing-window trimming.
#[derive(Debug, Clone, Copy)]
pub struct SufficiencyGate {
    pub min_rows: usize,
}

impl Default for SufficiencyGate {
    fn default() -> Self {
        Self { min_rows: 20 }
    }
}

impl SufficiencyGate {
    pub fn new(min_rows: usize) -> Self {
        Self { min_rows }
    }

    /// Drops rows missing any trailing average, then enforces the floor.
    pub fn apply(&self, mut labeled: LabeledTable) -> Result<LabeledTable, PredictionError> {
        let table = &labeled.features.table;
        let keep: Vec<bool> = (0..table.len())
            .map(|row| {
                labeled
                    .features
                    .rolling_columns
                    .iter()
                    .all(|name| table.value(name, row).is_some())
            })
            .collect();

        let before = labeled.len();
        labeled.features.table.retain_rows(&keep);
        labeled.labels = retain_by(&labeled.labels, &keep);
        debug!(
            "Sufficiency gate kept {} of {} rows (floor {})",
            labeled.len(),
            before,
            self.min_rows
        );

        if labeled.len() < self.min_rows {
            return Err(PredictionError::InsufficientData {
                rows: labeled.len(),
                required: self.min_rows,
            });
        }
        Ok(labeled)
    }
}
