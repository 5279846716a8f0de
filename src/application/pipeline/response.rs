use super::label_composer::LabeledTable;
use super::table::GameTable;
use super::trainer::TrainingOutcome;
use crate::domain::condition::describe_conditions;
use crate::domain::ml::MINUTES_COLUMN;
use crate::domain::prediction::{AuxiliaryContext, PredictionResult, RecentGame, ResponseProfile};
use std::collections::BTreeMap;

/// Rounds to 4 decimal places after clamping into [0, 1].
pub fn round_probability(p: f64) -> f64 {
    (p.clamp(0.0, 1.0) * 10_000.0).round() / 10_000.0
}

/// Up to `limit` most recent games with positive minutes, oldest first.
pub fn recent_played_games(table: &GameTable, limit: usize) -> Vec<RecentGame> {
    let mut games: Vec<RecentGame> = (0..table.len())
        .rev()
        .filter(|&row| table.value(MINUTES_COLUMN, row).is_some_and(|mp| mp > 0.0))
        .take(limit)
        .map(|row| RecentGame {
            date: table.dates()[row],
            pts: table.value("pts", row),
            trb: table.value("trb", row),
            ast: table.value("ast", row),
        })
        .collect();
    games.reverse();
    games
}

/// Trailing averages at the latest row.
pub fn latest_rolling_snapshot(labeled: &LabeledTable) -> BTreeMap<String, f64> {
    let table = &labeled.features.table;
    let Some(last) = table.len().checked_sub(1) else {
        return BTreeMap::new();
    };
    labeled
        .features
        .rolling_columns
        .iter()
        .filter_map(|name| table.value(name, last).map(|v| (name.clone(), v)))
        .collect()
}

/// Packages the probability with the auxiliary context selected by the profile.
#[derive(Debug, Clone, Copy)]
pub struct ResponseAssembler {
    pub profile: ResponseProfile,
    pub top_features: usize,
}

impl Default for ResponseAssembler {
    fn default() -> Self {
        Self {
            profile: ResponseProfile::default(),
            top_features: 10,
        }
    }
}

impl ResponseAssembler {
    pub fn assemble(
        &self,
        player_id: &str,
        season: i32,
        labeled: &LabeledTable,
        outcome: &TrainingOutcome,
        recent_games: Vec<RecentGame>,
    ) -> PredictionResult {
        let context = match self.profile {
            ResponseProfile::FeatureImportance => AuxiliaryContext::FeatureImportance {
                top_features: outcome
                    .importances
                    .iter()
                    .take(self.top_features)
                    .cloned()
                    .collect(),
            },
            ResponseProfile::RecentForm => AuxiliaryContext::RecentForm {
                recent_averages: latest_rolling_snapshot(labeled),
                recent_games,
            },
        };

        PredictionResult {
            player_id: player_id.to_string(),
            season,
            target_description: describe_conditions(&labeled.conditions),
            probability: round_probability(outcome.probability),
            context,
        }
    }
}
