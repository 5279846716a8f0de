use super::feature_builder::FeatureTable;
use crate::domain::condition::{ComparisonOperator, StatThreshold, ThresholdCondition, target_identifier};
use crate::domain::errors::PredictionError;
use crate::domain::ml::DAYS_REST_COLUMN;
use crate::domain::ml::feature_registry::is_rolling_column;

/// Feature table with one binary label per row.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledTable {
    pub features: FeatureTable,
    pub labels: Vec<u8>,
    pub conditions: Vec<ThresholdCondition>,
    /// Bookkeeping name of the label column, e.g. `target_pts_gt_20`.
    pub target: String,
}

impl LabeledTable {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn positive_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 1).count()
    }
}

/// Checks each threshold against the table's raw columns and parses its
/// operator (default ">").
pub fn validate_conditions(
    features: &FeatureTable,
    thresholds: &[StatThreshold],
) -> Result<Vec<ThresholdCondition>, PredictionError> {
    if thresholds.is_empty() {
        return Err(PredictionError::MissingConditions);
    }

    thresholds
        .iter()
        .map(|threshold| {
            let is_raw = features.table.has_column(&threshold.key)
                && !is_rolling_column(&threshold.key)
                && threshold.key != DAYS_REST_COLUMN;
            if !is_raw {
                return Err(PredictionError::UnknownStat {
                    stat: threshold.key.clone(),
                });
            }

            let operator = match threshold.op.as_deref() {
                None => ComparisonOperator::default(),
                Some(symbol) => symbol.parse::<ComparisonOperator>().map_err(|operator| {
                    PredictionError::UnsupportedOperator {
                        stat: threshold.key.clone(),
                        operator,
                    }
                })?,
            };

            Ok(ThresholdCondition {
                stat: threshold.key.clone(),
                operator,
                threshold: threshold.value,
            })
        })
        .collect()
}

/// Labels each row 1 when every condition holds on that row's raw values.
pub fn compose_labels(
    features: FeatureTable,
    thresholds: &[StatThreshold],
) -> Result<LabeledTable, PredictionError> {
    let conditions = validate_conditions(&features, thresholds)?;

    let labels = (0..features.table.len())
        .map(|row| {
            let all_hold = conditions.iter().all(|c| {
                c.operator
                    .evaluate(features.table.value(&c.stat, row), c.threshold)
            });
            u8::from(all_hold)
        })
        .collect();

    Ok(LabeledTable {
        target: target_identifier(&conditions),
        features,
        labels,
        conditions,
    })
}
