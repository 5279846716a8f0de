//! Pipeline configuration parsing from environment variables.
//!
//! Window sizes, row floors and the response shape, plus an optional TOML
//! file overriding the booster hyperparameters.

use crate::application::ml::gradient_boosting::BoosterParams;
use crate::application::pipeline::PipelineSettings;
use crate::domain::prediction::ResponseProfile;
use anyhow::{Context, Result};
use std::env;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct PipelineEnvConfig {
    pub rolling_window: usize,
    pub rolling_min_periods: usize,
    pub min_training_rows: usize,
    pub train_fraction: f64,
    pub top_features: usize,
    pub recent_games: usize,
    pub response_profile: ResponseProfile,
    pub booster: BoosterParams,
}

impl PipelineEnvConfig {
    pub fn from_env() -> Result<Self> {
        let rolling_window = parse_usize("ROLLING_WINDOW", 10)?;
        let rolling_min_periods = parse_usize("ROLLING_MIN_PERIODS", 5)?;
        if rolling_window == 0 || rolling_min_periods == 0 {
            anyhow::bail!("ROLLING_WINDOW and ROLLING_MIN_PERIODS must be positive");
        }
        if rolling_min_periods > rolling_window {
            anyhow::bail!(
                "ROLLING_MIN_PERIODS ({}) cannot exceed ROLLING_WINDOW ({})",
                rolling_min_periods,
                rolling_window
            );
        }

        let train_fraction = parse_f64("TRAIN_FRACTION", 0.8)?;
        if !(train_fraction > 0.0 && train_fraction < 1.0) {
            anyhow::bail!("TRAIN_FRACTION must be in (0, 1), got {}", train_fraction);
        }

        let profile_str = env::var("RESPONSE_PROFILE").unwrap_or_else(|_| "features".to_string());
        let response_profile = ResponseProfile::from_str(&profile_str)?;

        let booster = match env::var("BOOSTER_CONFIG") {
            Ok(path) if !path.trim().is_empty() => load_booster_params(Path::new(path.trim()))?,
            _ => BoosterParams::default(),
        };

        Ok(Self {
            rolling_window,
            rolling_min_periods,
            min_training_rows: parse_usize("MIN_TRAINING_ROWS", 20)?,
            train_fraction,
            top_features: parse_usize("TOP_FEATURES", 10)?,
            recent_games: parse_usize("RECENT_GAMES", 5)?,
            response_profile,
            booster,
        })
    }

    pub fn to_settings(&self) -> PipelineSettings {
        PipelineSettings {
            rolling_window: self.rolling_window,
            rolling_min_periods: self.rolling_min_periods,
            min_training_rows: self.min_training_rows,
            train_fraction: self.train_fraction,
            top_features: self.top_features,
            recent_games: self.recent_games,
            profile: self.response_profile,
            booster: self.booster.clone(),
        }
    }
}

/// Reads booster hyperparameters from a TOML file. Omitted keys keep their
/// defaults.
pub fn load_booster_params(path: &Path) -> Result<BoosterParams> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read BOOSTER_CONFIG {}", path.display()))?;
    parse_booster_params(&text)
        .with_context(|| format!("Invalid BOOSTER_CONFIG {}", path.display()))
}

pub fn parse_booster_params(text: &str) -> Result<BoosterParams> {
    let params: BoosterParams = toml::from_str(text).context("Failed to parse booster TOML")?;
    params.validate()?;
    Ok(params)
}

fn parse_usize(key: &str, default: usize) -> Result<usize> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<usize>()
        .context(format!("Failed to parse {}", key))
}

fn parse_f64(key: &str, default: f64) -> Result<f64> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<f64>()
        .context(format!("Failed to parse {}", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_config_defaults() {
        let config = PipelineEnvConfig::from_env().expect("Should parse with defaults");
        assert_eq!(config.to_settings(), PipelineSettings::default());
    }

    #[test]
    fn test_booster_toml_overrides_subset() {
        let params = parse_booster_params("n_estimators = 50\nlearning_rate = 0.05\n").unwrap();
        assert_eq!(params.n_estimators, 50);
        assert_eq!(params.learning_rate, 0.05);
        assert_eq!(params.max_depth, BoosterParams::default().max_depth);
        assert_eq!(params.seed, 42);
    }

    #[test]
    fn test_booster_toml_rejects_invalid_values() {
        assert!(parse_booster_params("subsample = 1.5").is_err());
        assert!(parse_booster_params("n_estimators = \"many\"").is_err());
    }
}
