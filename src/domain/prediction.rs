use crate::domain::condition::StatThreshold;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Prediction request as accepted by the request layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(rename = "bbrID")]
    pub player_id: String,
    /// Falls back to the configured default season when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<i32>,
    #[serde(rename = "statThresholds")]
    pub stat_thresholds: Vec<StatThreshold>,
}

/// Which auxiliary context accompanies the probability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseProfile {
    #[default]
    FeatureImportance,
    RecentForm,
}

impl FromStr for ResponseProfile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "features" | "feature_importance" => Ok(Self::FeatureImportance),
            "recent" | "recent_form" => Ok(Self::RecentForm),
            _ => anyhow::bail!(
                "Invalid RESPONSE_PROFILE: {}. Must be 'features' or 'recent'",
                s
            ),
        }
    }
}

impl fmt::Display for ResponseProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FeatureImportance => f.write_str("features"),
            Self::RecentForm => f.write_str("recent"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Raw line of a recently played game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentGame {
    pub date: NaiveDate,
    pub pts: Option<f64>,
    pub trb: Option<f64>,
    pub ast: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuxiliaryContext {
    FeatureImportance {
        top_features: Vec<FeatureImportance>,
    },
    RecentForm {
        recent_averages: BTreeMap<String, f64>,
        recent_games: Vec<RecentGame>,
    },
}

/// Final payload returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub player_id: String,
    pub season: i32,
    pub target_description: String,
    /// Probability the target holds next game, rounded to 4 decimals.
    pub probability: f64,
    #[serde(flatten)]
    pub context: AuxiliaryContext,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_format() {
        let request: PredictionRequest = serde_json::from_value(json!({
            "bbrID": "jokicni01",
            "statThresholds": [
                {"key": "pts", "op": ">", "value": 25},
                {"key": "ast", "value": 8}
            ]
        }))
        .unwrap();

        assert_eq!(request.player_id, "jokicni01");
        assert_eq!(request.season, None);
        assert_eq!(request.stat_thresholds.len(), 2);
        assert_eq!(request.stat_thresholds[1].op, None);
    }

    #[test]
    fn test_result_flattens_context() {
        let result = PredictionResult {
            player_id: "jokicni01".to_string(),
            season: 2025,
            target_description: "pts > 25".to_string(),
            probability: 0.4321,
            context: AuxiliaryContext::FeatureImportance {
                top_features: vec![FeatureImportance {
                    feature: "pts_last10_avg".to_string(),
                    importance: 12.0,
                }],
            },
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["probability"], json!(0.4321));
        assert_eq!(value["top_features"][0]["feature"], json!("pts_last10_avg"));
        assert!(value.get("context").is_none());
    }

    #[test]
    fn test_response_profile_parsing() {
        assert_eq!(
            "recent".parse::<ResponseProfile>().unwrap(),
            ResponseProfile::RecentForm
        );
        assert_eq!(
            "FEATURES".parse::<ResponseProfile>().unwrap(),
            ResponseProfile::FeatureImportance
        );
        assert!("both".parse::<ResponseProfile>().is_err());
    }
}
