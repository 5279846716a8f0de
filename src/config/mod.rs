//! Configuration module for Foresight.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Pipeline and Server.

mod pipeline_config;
mod server_config;

pub use pipeline_config::{PipelineEnvConfig, load_booster_params, parse_booster_params};
pub use server_config::ServerEnvConfig;

use crate::application::pipeline::PipelineSettings;
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use std::env;

/// First month of a new NBA season.
const SEASON_START_MONTH: u32 = 10;

/// Season in progress on `today`. Seasons are named by the year they end, so
/// October 2025 belongs to 2026.
pub fn current_season(today: NaiveDate) -> i32 {
    if today.month() >= SEASON_START_MONTH {
        today.year() + 1
    } else {
        today.year()
    }
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub default_season: i32,
    pub pipeline: PipelineEnvConfig,
    pub server: ServerEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/foresight.db".to_string());

        let default_season = match env::var("DEFAULT_SEASON") {
            Ok(raw) => raw
                .trim()
                .parse::<i32>()
                .context("Failed to parse DEFAULT_SEASON")?,
            Err(_) => current_season(chrono::Local::now().date_naive()),
        };

        let pipeline = PipelineEnvConfig::from_env().context("Failed to load pipeline config")?;
        let server = ServerEnvConfig::from_env().context("Failed to load server config")?;

        Ok(Self {
            database_url,
            default_season,
            pipeline,
            server,
        })
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        self.pipeline.to_settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_defaults() {
        let config = Config::from_env().expect("Should parse with defaults");
        assert_eq!(config.database_url, "sqlite://data/foresight.db");
        assert_eq!(config.pipeline.rolling_window, 10);
        assert_eq!(config.server.port, 8000);
        assert!(config.default_season >= 2025);
    }

    #[test]
    fn test_current_season_rolls_over_in_october() {
        let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(current_season(day(2025, 3, 15)), 2025);
        assert_eq!(current_season(day(2025, 9, 30)), 2025);
        assert_eq!(current_season(day(2025, 10, 1)), 2026);
        assert_eq!(current_season(day(2025, 12, 25)), 2026);
    }
}
