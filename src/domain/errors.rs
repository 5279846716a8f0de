use thiserror::Error;

/// Coarse classification of a prediction failure, used by request layers to
/// pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidCondition,
    InsufficientData,
    ConfigurationInconsistency,
    Store,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidCondition => "invalid_condition",
            Self::InsufficientData => "insufficient_data",
            Self::ConfigurationInconsistency => "configuration",
            Self::Store => "store",
            Self::Internal => "internal",
        }
    }
}

/// Errors raised by a single prediction run. All are terminal for the request.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("No player found with id: {player_id}")]
    PlayerNotFound { player_id: String },

    #[error("No season data found for player {player_id}")]
    SeasonBundleNotFound { player_id: String },

    #[error("No data found for season {season} (player {player_id})")]
    SeasonNotFound { player_id: String, season: i32 },

    #[error("At least one stat threshold is required")]
    MissingConditions,

    #[error("Stat '{stat}' not found in data")]
    UnknownStat { stat: String },

    #[error("Unsupported operator '{operator}' for stat '{stat}'")]
    UnsupportedOperator { stat: String, operator: String },

    #[error("Not enough data to train: {rows} rows after windowing, need at least {required}")]
    InsufficientData { rows: usize, required: usize },

    #[error("Feature column '{column}' is missing from the feature table")]
    MissingFeatureColumn { column: String },

    #[error("Document store failure: {reason}")]
    Store { reason: String },

    #[error("Model training failed: {reason}")]
    Training { reason: String },
}

impl PredictionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PlayerNotFound { .. }
            | Self::SeasonBundleNotFound { .. }
            | Self::SeasonNotFound { .. } => ErrorKind::NotFound,
            Self::MissingConditions
            | Self::UnknownStat { .. }
            | Self::UnsupportedOperator { .. } => ErrorKind::InvalidCondition,
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
            Self::MissingFeatureColumn { .. } => ErrorKind::ConfigurationInconsistency,
            Self::Store { .. } => ErrorKind::Store,
            Self::Training { .. } => ErrorKind::Internal,
        }
    }

    pub fn store(err: anyhow::Error) -> Self {
        Self::Store {
            reason: format!("{err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_operator_formatting() {
        let error = PredictionError::UnsupportedOperator {
            stat: "pts".to_string(),
            operator: "!=".to_string(),
        };

        let msg = error.to_string();
        assert!(msg.contains("!="));
        assert!(msg.contains("pts"));
        assert_eq!(error.kind(), ErrorKind::InvalidCondition);
    }

    #[test]
    fn test_error_kinds() {
        let not_found = PredictionError::SeasonNotFound {
            player_id: "doncilu01".to_string(),
            season: 2019,
        };
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert!(not_found.to_string().contains("2019"));

        let short = PredictionError::InsufficientData {
            rows: 12,
            required: 20,
        };
        assert_eq!(short.kind(), ErrorKind::InsufficientData);
        assert!(short.to_string().contains("12"));

        let missing = PredictionError::MissingFeatureColumn {
            column: "days_rest".to_string(),
        };
        assert_eq!(missing.kind(), ErrorKind::ConfigurationInconsistency);
    }

    #[test]
    fn test_store_error_keeps_context_chain() {
        let err = anyhow::anyhow!("connection refused").context("Failed to load player");
        let msg = PredictionError::store(err).to_string();
        assert!(msg.contains("Failed to load player"));
        assert!(msg.contains("connection refused"));
    }
}
