//! Gradient-boosted decision trees for binary classification.
//!
//! Trees are grown depth-wise on the logistic loss using first and second
//! order gradients. Leaf outputs apply L1 soft-thresholding and L2 shrinkage
//! to the gradient sum before the Newton step, then the learning rate.
//! Splits are exact: every boundary between distinct sorted feature values
//! is considered.

use ndarray::{Array2, ArrayView1};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const PROBABILITY_EPSILON: f64 = 1e-15;
const MIN_HESSIAN: f64 = 1e-16;

/// Booster hyperparameters. Missing keys in a TOML override keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoosterParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    /// Minimum rows on each side of a split.
    pub min_child_samples: usize,
    /// Minimum hessian sum on each side of a split.
    pub min_child_weight: f64,
    pub reg_alpha: f64,
    pub reg_lambda: f64,
    pub learning_rate: f64,
    pub min_split_gain: f64,
    /// Row fraction sampled per tree (1.0 disables sampling).
    pub subsample: f64,
    /// Feature fraction sampled per tree (1.0 disables sampling).
    pub colsample_bytree: f64,
    pub seed: u64,
}

impl Default for BoosterParams {
    fn default() -> Self {
        Self {
            n_estimators: 150,
            max_depth: 3,
            min_child_samples: 10,
            min_child_weight: 1e-3,
            reg_alpha: 0.1,
            reg_lambda: 0.1,
            learning_rate: 0.1,
            min_split_gain: 0.0,
            subsample: 1.0,
            colsample_bytree: 1.0,
            seed: 42,
        }
    }
}

impl BoosterParams {
    pub fn validate(&self) -> Result<(), BoosterError> {
        let invalid = |reason: &str| {
            Err(BoosterError::InvalidParams {
                reason: reason.to_string(),
            })
        };
        if self.learning_rate.is_nan() || self.learning_rate <= 0.0 {
            return invalid("learning_rate must be positive");
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return invalid("subsample must be in (0, 1]");
        }
        if !(self.colsample_bytree > 0.0 && self.colsample_bytree <= 1.0) {
            return invalid("colsample_bytree must be in (0, 1]");
        }
        if self.reg_alpha < 0.0 || self.reg_lambda < 0.0 {
            return invalid("regularization terms must be non-negative");
        }
        if self.min_child_samples == 0 {
            return invalid("min_child_samples must be at least 1");
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BoosterError {
    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Label count {labels} does not match row count {rows}")]
    ShapeMismatch { rows: usize, labels: usize },

    #[error("Expected {expected} features, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    #[error("Non-finite value in feature {feature} at row {row}")]
    NonFiniteFeature { row: usize, feature: usize },

    #[error("Invalid booster parameter: {reason}")]
    InvalidParams { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone)]
struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    fn predict(&self, row: ArrayView1<f64>) -> f64 {
        let mut idx = 0usize;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Grows a single tree against fixed gradients.
struct TreeGrower<'a> {
    x: &'a Array2<f64>,
    grad: &'a [f64],
    hess: &'a [f64],
    sorted: &'a [Vec<usize>],
    features: &'a [usize],
    params: &'a BoosterParams,
    nodes: Vec<Node>,
    split_counts: Vec<usize>,
}

impl TreeGrower<'_> {
    fn leaf_weight(&self, g: f64, h: f64) -> f64 {
        -soft_threshold(g, self.params.reg_alpha) / (h + self.params.reg_lambda)
    }

    fn score(&self, g: f64, h: f64) -> f64 {
        let t = soft_threshold(g, self.params.reg_alpha);
        t * t / (h + self.params.reg_lambda)
    }

    fn grow(&mut self, rows: &[usize], depth: usize) -> usize {
        let g_sum: f64 = rows.iter().map(|&r| self.grad[r]).sum();
        let h_sum: f64 = rows.iter().map(|&r| self.hess[r]).sum();

        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: self.leaf_weight(g_sum, h_sum) * self.params.learning_rate,
        });

        if depth >= self.params.max_depth || rows.len() < 2 * self.params.min_child_samples {
            return idx;
        }

        let Some(best) = self.best_split(rows, g_sum, h_sum) else {
            return idx;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|&&r| self.x[[r, best.feature]] <= best.threshold);

        self.split_counts[best.feature] += 1;

        let left = self.grow(&left_rows, depth + 1);
        let right = self.grow(&right_rows, depth + 1);
        self.nodes[idx] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        idx
    }

    fn best_split(&self, rows: &[usize], g_sum: f64, h_sum: f64) -> Option<SplitCandidate> {
        let min_samples = self.params.min_child_samples;
        let parent_score = self.score(g_sum, h_sum);

        let mut member = vec![false; self.x.nrows()];
        for &r in rows {
            member[r] = true;
        }

        let mut best: Option<SplitCandidate> = None;
        for &feature in self.features {
            let ordered: Vec<usize> = self.sorted[feature]
                .iter()
                .copied()
                .filter(|&r| member[r])
                .collect();

            let (mut g_left, mut h_left) = (0.0, 0.0);
            for k in 0..ordered.len().saturating_sub(1) {
                let r = ordered[k];
                g_left += self.grad[r];
                h_left += self.hess[r];

                let left_count = k + 1;
                let right_count = ordered.len() - left_count;
                if left_count < min_samples {
                    continue;
                }
                if right_count < min_samples {
                    break;
                }

                let here = self.x[[r, feature]];
                let next = self.x[[ordered[k + 1], feature]];
                if here >= next {
                    continue;
                }

                let h_right = h_sum - h_left;
                if h_left < self.params.min_child_weight || h_right < self.params.min_child_weight
                {
                    continue;
                }

                let gain = self.score(g_left, h_left) + self.score(g_sum - g_left, h_right)
                    - parent_score;
                if gain <= self.params.min_split_gain {
                    continue;
                }
                if best.is_none_or(|b| gain > b.gain) {
                    let mid = here + (next - here) / 2.0;
                    let threshold = if mid < next { mid } else { here };
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }
        best
    }
}

/// Fitted ensemble. Owned by a single prediction run.
#[derive(Debug, Clone)]
pub struct GradientBoostedClassifier {
    base_score: f64,
    trees: Vec<RegressionTree>,
    n_features: usize,
    split_counts: Vec<usize>,
}

impl GradientBoostedClassifier {
    /// Fits on `x` (rows = samples) against 0/1 labels.
    pub fn fit(x: &Array2<f64>, y: &[u8], params: &BoosterParams) -> Result<Self, BoosterError> {
        params.validate()?;
        let (n_rows, n_features) = x.dim();
        if n_rows == 0 {
            return Err(BoosterError::EmptyTrainingSet);
        }
        if y.len() != n_rows {
            return Err(BoosterError::ShapeMismatch {
                rows: n_rows,
                labels: y.len(),
            });
        }
        if let Some(((row, feature), _)) = x.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(BoosterError::NonFiniteFeature { row, feature });
        }

        let targets: Vec<f64> = y.iter().map(|&v| if v > 0 { 1.0 } else { 0.0 }).collect();
        let positive_rate = targets.iter().sum::<f64>() / n_rows as f64;
        let p = positive_rate.clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);
        let base_score = (p / (1.0 - p)).ln();

        let sorted: Vec<Vec<usize>> = (0..n_features)
            .map(|f| {
                let mut order: Vec<usize> = (0..n_rows).collect();
                order.sort_by(|&a, &b| x[[a, f]].total_cmp(&x[[b, f]]));
                order
            })
            .collect();

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut raw = vec![base_score; n_rows];
        let mut grad = vec![0.0; n_rows];
        let mut hess = vec![0.0; n_rows];
        let mut trees = Vec::with_capacity(params.n_estimators);
        let mut split_counts = vec![0usize; n_features];

        for _ in 0..params.n_estimators {
            for i in 0..n_rows {
                let prob = sigmoid(raw[i]);
                grad[i] = prob - targets[i];
                hess[i] = (prob * (1.0 - prob)).max(MIN_HESSIAN);
            }

            let rows: Vec<usize> = if params.subsample < 1.0 {
                let amount = ((n_rows as f64 * params.subsample).round() as usize).clamp(1, n_rows);
                let mut picked = sample(&mut rng, n_rows, amount).into_vec();
                picked.sort_unstable();
                picked
            } else {
                (0..n_rows).collect()
            };

            let features: Vec<usize> = if params.colsample_bytree < 1.0 && n_features > 0 {
                let amount = ((n_features as f64 * params.colsample_bytree).round() as usize)
                    .clamp(1, n_features);
                let mut picked = sample(&mut rng, n_features, amount).into_vec();
                picked.sort_unstable();
                picked
            } else {
                (0..n_features).collect()
            };

            let mut grower = TreeGrower {
                x,
                grad: &grad,
                hess: &hess,
                sorted: &sorted,
                features: &features,
                params,
                nodes: Vec::new(),
                split_counts: vec![0; n_features],
            };
            grower.grow(&rows, 0);

            for (total, count) in split_counts.iter_mut().zip(&grower.split_counts) {
                *total += count;
            }
            let tree = RegressionTree {
                nodes: grower.nodes,
            };

            for (i, score) in raw.iter_mut().enumerate() {
                *score += tree.predict(x.row(i));
            }
            trees.push(tree);
        }

        Ok(Self {
            base_score,
            trees,
            n_features,
            split_counts,
        })
    }

    /// Positive-class probability for one feature vector.
    pub fn predict_proba(&self, row: &[f64]) -> Result<f64, BoosterError> {
        if row.len() != self.n_features {
            return Err(BoosterError::FeatureCountMismatch {
                expected: self.n_features,
                actual: row.len(),
            });
        }
        let view = ArrayView1::from(row);
        let raw = self.base_score + self.trees.iter().map(|t| t.predict(view)).sum::<f64>();
        Ok(sigmoid(raw))
    }

    /// Number of splits that used each feature, in input column order.
    pub fn feature_importances(&self) -> Vec<f64> {
        self.split_counts.iter().map(|&c| c as f64).collect()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn soft_threshold(g: f64, alpha: f64) -> f64 {
    g.signum() * (g.abs() - alpha).max(0.0)
}
