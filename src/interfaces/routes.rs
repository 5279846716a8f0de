//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::application::PredictionService;
use crate::domain::errors::{ErrorKind, PredictionError};
use crate::domain::prediction::{PredictionRequest, PredictionResult};
use crate::infrastructure::observability::Metrics;

/// Application state shared across handlers.
pub struct AppState {
    pub service: PredictionService,
    pub metrics: Option<Metrics>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeasonsResponse {
    #[serde(rename = "bbrID")]
    pub player_id: String,
    pub seasons: Vec<i32>,
}

/// Error type for API handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<PredictionError> for ApiError {
    fn from(err: PredictionError) -> Self {
        let status = match err.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidCondition | ErrorKind::InsufficientData => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorKind::ConfigurationInconsistency | ErrorKind::Store | ErrorKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.status.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Prediction endpoint.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let Json(req) = payload?;
    if req.player_id.trim().is_empty() {
        return Err(ApiError::bad_request("bbrID is required"));
    }
    if req.stat_thresholds.is_empty() {
        return Err(ApiError::bad_request("At least one stat threshold is required"));
    }
    if let Some(t) = req.stat_thresholds.iter().find(|t| t.key.trim().is_empty()) {
        return Err(ApiError::bad_request(format!(
            "Stat threshold with value {} has an empty key",
            t.value
        )));
    }

    let result = state.service.predict(req).await?;
    Ok(Json(result))
}

pub async fn player_seasons(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> Result<Json<SeasonsResponse>, ApiError> {
    let seasons = state.service.list_seasons(&player_id).await?;
    Ok(Json(SeasonsResponse { player_id, seasons }))
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(metrics) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            metrics.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/players/:id/seasons", get(player_seasons))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pipeline::PipelineSettings;
    use crate::domain::condition::StatThreshold;
    use crate::infrastructure::InMemoryGameLogRepository;
    use axum::body::{Body, to_bytes};
    use axum::extract::FromRequest;
    use axum::http::Request;

    fn state() -> Arc<AppState> {
        let service = PredictionService::new(
            Arc::new(InMemoryGameLogRepository::new()),
            PipelineSettings::default(),
            2025,
        );
        Arc::new(AppState {
            service,
            metrics: None,
        })
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn test_empty_thresholds_is_bad_request() {
        let req = PredictionRequest {
            player_id: "doncilu01".to_string(),
            season: None,
            stat_thresholds: vec![],
        };
        let err = predict(State(state()), Ok(Json(req))).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    async fn extract(body: &'static str) -> Result<Json<PredictionRequest>, JsonRejection> {
        let request = Request::builder()
            .method("POST")
            .uri("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        Json::<PredictionRequest>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request_with_json_error() {
        for body in [
            r#"{"bbrID": "doncilu01"}"#,
            r#"{"statThresholds": [{"key": "pts", "value": 20}]}"#,
            r#"{"bbrID": "doncilu01", "statThresholds": [{"key": "pts", "value": "lots"}]}"#,
        ] {
            let err = predict(State(state()), extract(body).await)
                .await
                .unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "{body}");

            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let error: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(error.error, StatusCode::BAD_REQUEST.to_string());
            assert!(!error.message.is_empty());
        }

        let err = predict(State(state()), extract(r#"{"bbrID": "doncilu01"}"#).await)
            .await
            .unwrap_err();
        assert!(err.message().contains("statThresholds"));
    }

    #[tokio::test]
    async fn test_unknown_player_is_not_found() {
        let req = PredictionRequest {
            player_id: "ghost01".to_string(),
            season: Some(2025),
            stat_thresholds: vec![StatThreshold::new("pts", ">", 20.0)],
        };
        let err = predict(State(state()), Ok(Json(req))).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(err.message().contains("ghost01"));
    }

    #[test]
    fn test_error_kind_status_mapping() {
        let status = |e: PredictionError| ApiError::from(e).status();
        assert_eq!(
            status(PredictionError::UnknownStat {
                stat: "dunks".to_string()
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(PredictionError::InsufficientData {
                rows: 3,
                required: 20
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(PredictionError::MissingFeatureColumn {
                column: "home".to_string()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_metrics_disabled() {
        let response = metrics(State(state())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
