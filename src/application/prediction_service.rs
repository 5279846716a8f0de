use crate::application::pipeline::{self, LabeledTable, PipelineOutcome, PipelineSettings};
use crate::domain::condition::StatThreshold;
use crate::domain::errors::PredictionError;
use crate::domain::game::{GameRecord, SeasonBundle};
use crate::domain::prediction::{PredictionRequest, PredictionResult};
use crate::domain::repositories::GameLogRepository;
use crate::infrastructure::observability::Metrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

/// Resolves a request against the document store and runs the pipeline.
/// Holds no per-request state; every call trains its own model.
#[derive(Clone)]
pub struct PredictionService {
    repository: Arc<dyn GameLogRepository>,
    settings: PipelineSettings,
    default_season: i32,
    metrics: Option<Metrics>,
}

impl PredictionService {
    pub fn new(
        repository: Arc<dyn GameLogRepository>,
        settings: PipelineSettings,
        default_season: i32,
    ) -> Self {
        Self {
            repository,
            settings,
            default_season,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub async fn predict(
        &self,
        request: PredictionRequest,
    ) -> Result<PredictionResult, PredictionError> {
        let request_id = Uuid::new_v4();
        let season = request.season.unwrap_or(self.default_season);
        let span = info_span!("predict", %request_id, player = %request.player_id, season);

        let outcome = self
            .run(request.player_id, season, request.stat_thresholds)
            .instrument(span)
            .await;

        match outcome {
            Ok(outcome) => {
                self.record("ok");
                Ok(outcome.result)
            }
            Err(e) => {
                warn!("Prediction {} failed: {}", request_id, e);
                self.record(e.kind().as_str());
                Err(e)
            }
        }
    }

    /// Loads games and labels them without training. Used for offline export.
    pub async fn engineer(
        &self,
        player_id: &str,
        season: Option<i32>,
        thresholds: &[StatThreshold],
    ) -> Result<LabeledTable, PredictionError> {
        let season = season.unwrap_or(self.default_season);
        let games = self.load_games(player_id, season).await?;
        pipeline::engineer_features(games, thresholds, &self.settings)
    }

    /// Distinct seasons stored for the player, ascending.
    pub async fn list_seasons(&self, player_id: &str) -> Result<Vec<i32>, PredictionError> {
        Ok(self.load_bundle(player_id).await?.season_numbers())
    }

    async fn run(
        &self,
        player_id: String,
        season: i32,
        thresholds: Vec<StatThreshold>,
    ) -> Result<PipelineOutcome, PredictionError> {
        let games = self.load_games(&player_id, season).await?;
        info!("Loaded {} games", games.len());

        let settings = self.settings.clone();
        let span = tracing::Span::current();
        let started = Instant::now();

        // CPU-bound; keep it off the async workers.
        let outcome = tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            pipeline::predict_multistat(&player_id, season, games, &thresholds, &settings)
        })
        .await
        .map_err(|e| PredictionError::Training {
            reason: format!("pipeline task failed: {e}"),
        })??;

        if let Some(metrics) = &self.metrics {
            metrics.observe_pipeline(started.elapsed().as_secs_f64(), outcome.training_rows);
        }
        Ok(outcome)
    }

    async fn load_bundle(&self, player_id: &str) -> Result<SeasonBundle, PredictionError> {
        let player = self
            .repository
            .find_player(player_id)
            .await
            .map_err(PredictionError::store)?
            .ok_or_else(|| PredictionError::PlayerNotFound {
                player_id: player_id.to_string(),
            })?;

        let bundle_missing = || PredictionError::SeasonBundleNotFound {
            player_id: player_id.to_string(),
        };
        let bundle_ref = player.seasons_ref.ok_or_else(bundle_missing)?;
        self.repository
            .find_season_bundle(&bundle_ref)
            .await
            .map_err(PredictionError::store)?
            .ok_or_else(bundle_missing)
    }

    async fn load_games(
        &self,
        player_id: &str,
        season: i32,
    ) -> Result<Vec<GameRecord>, PredictionError> {
        self.load_bundle(player_id)
            .await?
            .games_for_season(season)
            .ok_or_else(|| PredictionError::SeasonNotFound {
                player_id: player_id.to_string(),
                season,
            })
    }

    fn record(&self, outcome: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.inc_predictions(outcome);
        }
    }
}
