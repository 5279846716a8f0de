use super::label_composer::LabeledTable;
use super::table::GameTable;
use crate::application::ml::gradient_boosting::{BoosterParams, GradientBoostedClassifier};
use crate::domain::errors::PredictionError;
use crate::domain::ml::model_feature_names;
use crate::domain::prediction::FeatureImportance;
use ndarray::{Array2, s};
use tracing::{debug, info};

/// Scores of the fitted model on the chronologically later slice. Logged,
/// never part of the response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HoldoutReport {
    pub rows: usize,
    pub accuracy: Option<f64>,
    pub brier_score: Option<f64>,
    pub log_loss: Option<f64>,
    pub positive_rate: Option<f64>,
}

impl HoldoutReport {
    pub fn evaluate(probabilities: &[f64], labels: &[u8]) -> Self {
        let n = probabilities.len().min(labels.len());
        if n == 0 {
            return Self::default();
        }

        let mut correct = 0usize;
        let mut brier = 0.0;
        let mut log_loss = 0.0;
        let mut positives = 0usize;
        for (&p, &label) in probabilities.iter().zip(labels) {
            let y = f64::from(label);
            if (p >= 0.5) == (label == 1) {
                correct += 1;
            }
            positives += usize::from(label == 1);
            brier += (p - y).powi(2);
            let p = p.clamp(1e-15, 1.0 - 1e-15);
            log_loss -= y * p.ln() + (1.0 - y) * (1.0 - p).ln();
        }

        let n_f = n as f64;
        Self {
            rows: n,
            accuracy: Some(correct as f64 / n_f),
            brier_score: Some(brier / n_f),
            log_loss: Some(log_loss / n_f),
            positive_rate: Some(positives as f64 / n_f),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Unrounded positive-class probability for the most recent row.
    pub probability: f64,
    /// Split-count importances, descending.
    pub importances: Vec<FeatureImportance>,
    pub train_rows: usize,
    pub holdout: HoldoutReport,
}

/// Builds the model matrix, fits on the earlier partition and scores the
/// latest row.
#[derive(Debug, Clone)]
pub struct Trainer {
    pub params: BoosterParams,
    pub train_fraction: f64,
}

impl Default for Trainer {
    fn default() -> Self {
        Self {
            params: BoosterParams::default(),
            train_fraction: 0.8,
        }
    }
}

impl Trainer {
    pub fn new(params: BoosterParams, train_fraction: f64) -> Self {
        Self {
            params,
            train_fraction,
        }
    }

    /// Row index where the holdout partition starts.
    pub fn split_index(&self, rows: usize) -> usize {
        (self.train_fraction * rows as f64).floor() as usize
    }

    pub fn train_and_predict(&self, labeled: &LabeledTable) -> Result<TrainingOutcome, PredictionError> {
        let feature_names = model_feature_names(&labeled.features.rolling_columns);
        let matrix = design_matrix(&labeled.features.table, &feature_names)?;
        let rows = matrix.nrows();
        if rows == 0 {
            return Err(PredictionError::InsufficientData {
                rows: 0,
                required: 1,
            });
        }
        let split = self.split_index(rows);

        info!(
            "Training {} on {} rows ({} held out), {} features, {} positives",
            labeled.target,
            split,
            rows - split,
            feature_names.len(),
            labeled.positive_count()
        );

        let x_train = matrix.slice(s![..split, ..]).to_owned();
        let model = GradientBoostedClassifier::fit(&x_train, &labeled.labels[..split], &self.params)
            .map_err(|e| PredictionError::Training {
                reason: e.to_string(),
            })?;

        let holdout_probs = (split..rows)
            .map(|i| self.score_row(&model, &matrix, i))
            .collect::<Result<Vec<_>, _>>()?;
        let holdout = HoldoutReport::evaluate(&holdout_probs, &labeled.labels[split..]);
        info!(
            "Holdout: rows={} accuracy={:?} brier={:?} log_loss={:?}",
            holdout.rows, holdout.accuracy, holdout.brier_score, holdout.log_loss
        );

        let probability = self.score_row(&model, &matrix, rows - 1)?;
        debug!("Latest-row probability {:.6}", probability);

        let mut importances: Vec<FeatureImportance> = feature_names
            .into_iter()
            .zip(model.feature_importances())
            .map(|(feature, importance)| FeatureImportance {
                feature,
                importance,
            })
            .collect();
        importances.sort_by(|a, b| b.importance.total_cmp(&a.importance));

        Ok(TrainingOutcome {
            probability,
            importances,
            train_rows: split,
            holdout,
        })
    }

    fn score_row(
        &self,
        model: &GradientBoostedClassifier,
        matrix: &Array2<f64>,
        row: usize,
    ) -> Result<f64, PredictionError> {
        let features = matrix.row(row).to_vec();
        model
            .predict_proba(&features)
            .map_err(|e| PredictionError::Training {
                reason: e.to_string(),
            })
    }
}

/// Stacks the named columns into a row-major matrix. A named column that is
/// absent is a configuration inconsistency; a missing cell becomes NaN and is
/// rejected by the booster.
pub fn design_matrix(table: &GameTable, feature_names: &[String]) -> Result<Array2<f64>, PredictionError> {
    let columns = feature_names
        .iter()
        .map(|name| {
            table
                .column(name)
                .ok_or_else(|| PredictionError::MissingFeatureColumn {
                    column: name.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Array2::from_shape_fn(
        (table.len(), columns.len()),
        |(row, col)| columns[col][row].unwrap_or(f64::NAN),
    ))
}
