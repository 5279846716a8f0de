//! Multistat prediction pipeline.
//!
//! One run per request, strictly linear:
//! normalizer -> rolling features -> labels -> sufficiency gate ->
//! trainer/predictor -> response assembler. Nothing outlives a run.

pub mod feature_builder;
pub mod label_composer;
pub mod normalizer;
pub mod response;
pub mod sufficiency;
pub mod table;
pub mod trainer;

pub use feature_builder::{FeatureTable, RollingFeatureBuilder};
pub use label_composer::{LabeledTable, compose_labels};
pub use normalizer::normalize_games;
pub use response::ResponseAssembler;
pub use sufficiency::SufficiencyGate;
pub use table::GameTable;
pub use trainer::{HoldoutReport, Trainer};

use crate::application::ml::gradient_boosting::BoosterParams;
use crate::domain::condition::StatThreshold;
use crate::domain::errors::PredictionError;
use crate::domain::game::GameRecord;
use crate::domain::prediction::{PredictionResult, ResponseProfile};
use tracing::info;

/// Tunables of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub rolling_window: usize,
    pub rolling_min_periods: usize,
    pub min_training_rows: usize,
    pub train_fraction: f64,
    pub top_features: usize,
    pub recent_games: usize,
    pub profile: ResponseProfile,
    pub booster: BoosterParams,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            rolling_window: 10,
            rolling_min_periods: 5,
            min_training_rows: 20,
            train_fraction: 0.8,
            top_features: 10,
            recent_games: 5,
            profile: ResponseProfile::FeatureImportance,
            booster: BoosterParams::default(),
        }
    }
}

/// Everything a run produces. Only `result` is returned to callers.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub result: PredictionResult,
    pub target: String,
    pub training_rows: usize,
    pub holdout: HoldoutReport,
}

/// Normalizes, derives trailing features and labels every game. No rows are
/// dropped yet.
pub fn engineer_features(
    games: Vec<GameRecord>,
    thresholds: &[StatThreshold],
    settings: &PipelineSettings,
) -> Result<LabeledTable, PredictionError> {
    let table = normalize_games(games);
    let features =
        RollingFeatureBuilder::new(settings.rolling_window, settings.rolling_min_periods).build(table);
    compose_labels(features, thresholds)
}

/// Runs the full pipeline over one player-season's games.
pub fn predict_multistat(
    player_id: &str,
    season: i32,
    games: Vec<GameRecord>,
    thresholds: &[StatThreshold],
    settings: &PipelineSettings,
) -> Result<PipelineOutcome, PredictionError> {
    info!(
        "Running multistat pipeline for {} season {} over {} games",
        player_id,
        season,
        games.len()
    );

    let labeled = engineer_features(games, thresholds, settings)?;
    let recent_games = match settings.profile {
        ResponseProfile::RecentForm => {
            response::recent_played_games(&labeled.features.table, settings.recent_games)
        }
        ResponseProfile::FeatureImportance => Vec::new(),
    };

    let labeled = SufficiencyGate::new(settings.min_training_rows).apply(labeled)?;

    let outcome =
        Trainer::new(settings.booster.clone(), settings.train_fraction).train_and_predict(&labeled)?;

    let assembler = ResponseAssembler {
        profile: settings.profile,
        top_features: settings.top_features,
    };
    let result = assembler.assemble(player_id, season, &labeled, &outcome, recent_games);
    info!(
        "{} season {}: P({}) = {}",
        player_id, season, result.target_description, result.probability
    );

    Ok(PipelineOutcome {
        result,
        target: labeled.target,
        training_rows: outcome.train_rows,
        holdout: outcome.holdout,
    })
}
