#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use foresight::domain::game::{DocumentSet, GameRecord, PlayerProfile, SeasonBundle, SeasonEntry};
use foresight::infrastructure::InMemoryGameLogRepository;
use serde_json::json;

pub const PLAYER: &str = "brunsja01";
pub const SEASON: i32 = 2025;

/// Deterministic box score for game `i` of a synthetic season.
pub fn game(i: usize) -> GameRecord {
    let start = NaiveDate::from_ymd_opt(2024, 10, 22).unwrap();
    // Mostly every other day with an occasional three-day break.
    let date = start + Duration::days((2 * i + i / 4) as i64);
    let pts = 14.0 + ((i * 7) % 17) as f64;
    let fga = 12.0 + ((i * 5) % 9) as f64;
    let fg = (fga * 0.45).round();

    let mut record = GameRecord::new(date)
        .with_minutes(&format!("{}:{:02}", 28 + i % 9, (i * 13) % 60))
        .with_stat("pts", pts)
        .with_stat("ast", 3.0 + ((i * 5) % 7) as f64)
        .with_stat("trb", 2.0 + ((i * 3) % 9) as f64)
        .with_stat("fg", fg)
        .with_stat("fga", fga)
        .with_stat("fgp", fg / fga)
        .with_stat("stl", (i % 3) as f64)
        .with_stat("tov", ((i * 2) % 5) as f64)
        .with_stat("gmsc", pts * 0.6 + ((i * 11) % 7) as f64);
    if i % 2 == 1 {
        record = record.away();
    }
    record
}

pub fn season_games(n: usize) -> Vec<GameRecord> {
    (0..n).map(game).collect()
}

/// A season split across two teams, stored out of date order.
pub fn documents(n: usize) -> DocumentSet {
    let mut games = season_games(n);
    games.reverse();
    let second_team = games.split_off(n / 3);

    DocumentSet {
        players: vec![PlayerProfile {
            id: PLAYER.to_string(),
            name: Some("Jalen Brunson".to_string()),
            seasons_ref: Some(format!("{PLAYER}-seasons")),
        }],
        seasons: vec![SeasonBundle {
            id: format!("{PLAYER}-seasons"),
            player_id: PLAYER.to_string(),
            seasons: vec![
                SeasonEntry {
                    season: SEASON - 1,
                    team: Some("NYK".to_string()),
                    games: vec![game(0)],
                },
                SeasonEntry {
                    season: SEASON,
                    team: Some("NYK".to_string()),
                    games,
                },
                SeasonEntry {
                    season: SEASON,
                    team: Some("DAL".to_string()),
                    games: second_team,
                },
            ],
        }],
    }
}

pub fn repository(n: usize) -> InMemoryGameLogRepository {
    InMemoryGameLogRepository::from_documents(documents(n))
}

/// Appends games that should never show up in a recent-form list.
pub fn with_unplayed_tail(mut games: Vec<GameRecord>) -> Vec<GameRecord> {
    let last = games.last().map(|g| g.date).unwrap();
    let mut dnp = GameRecord::new(last + Duration::days(2));
    dnp.mp = json!("Did Not Play");
    games.push(dnp);
    games.push(
        GameRecord::new(last + Duration::days(4))
            .with_minutes("0:00")
            .with_stat("pts", 0.0),
    );
    games
}
