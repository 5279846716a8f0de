//! Raw documents as stored by the scraper: player profiles, season bundles
//! and per-game box scores.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Player profile document. `seasons_ref` points at the player's season bundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerProfile {
    #[serde(rename = "bbrID")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "seasons", default)]
    pub seasons_ref: Option<String>,
}

/// All season entries for one player. A season traded mid-way appears as
/// several entries sharing the same `season` number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonBundle {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "player_bbrID", default)]
    pub player_id: String,
    #[serde(default)]
    pub seasons: Vec<SeasonEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonEntry {
    pub season: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default)]
    pub games: Vec<GameRecord>,
}

impl SeasonBundle {
    /// Concatenated games of every entry matching `season`, in stored order.
    /// `None` when no entry matches or the matching entries hold no games.
    pub fn games_for_season(&self, season: i32) -> Option<Vec<GameRecord>> {
        let games: Vec<GameRecord> = self
            .seasons
            .iter()
            .filter(|s| s.season == season)
            .flat_map(|s| s.games.iter().cloned())
            .collect();
        (!games.is_empty()).then_some(games)
    }

    /// Distinct season numbers, ascending.
    pub fn season_numbers(&self) -> Vec<i32> {
        self.seasons
            .iter()
            .map(|s| s.season)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Export of the document store: profiles plus their season bundles.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentSet {
    #[serde(default)]
    pub players: Vec<PlayerProfile>,
    #[serde(default)]
    pub seasons: Vec<SeasonBundle>,
}

/// One played game. `mp` and `home` are kept raw; the normalizer interprets
/// them. Every other key lands in `stats`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameRecord {
    #[serde(deserialize_with = "deserialize_game_date")]
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub mp: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub home: Value,
    #[serde(flatten)]
    pub stats: BTreeMap<String, Value>,
}

impl GameRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            mp: Value::Null,
            home: Value::Null,
            stats: BTreeMap::new(),
        }
    }

    pub fn with_minutes(mut self, mp: &str) -> Self {
        self.mp = Value::String(mp.to_string());
        self
    }

    pub fn with_stat(mut self, key: &str, value: f64) -> Self {
        self.stats.insert(key.to_string(), Value::from(value));
        self
    }

    pub fn away(mut self) -> Self {
        self.home = Value::String("@".to_string());
        self
    }
}

fn deserialize_game_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_game_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised game date: {raw}")))
}

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.date())
}
