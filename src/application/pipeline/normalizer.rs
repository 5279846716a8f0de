use super::table::GameTable;
use crate::domain::game::GameRecord;
use crate::domain::ml::{HOME_COLUMN, MINUTES_COLUMN};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

const AWAY_MARKER: &str = "@";

/// Parses "MM:SS" into fractional minutes. Anything else is a missing value.
pub fn parse_minutes(raw: &Value) -> Option<f64> {
    let text = raw.as_str()?;
    let (mins, secs) = text.split_once(':')?;
    let mins: i64 = mins.trim().parse().ok()?;
    let secs: i64 = secs.trim().parse().ok()?;
    Some(mins as f64 + secs as f64 / 60.0)
}

/// "@" marks an away game; any other marker (or none) is home.
pub fn home_indicator(raw: &Value) -> f64 {
    match raw.as_str() {
        Some(marker) if marker == AWAY_MARKER => 0.0,
        _ => 1.0,
    }
}

/// Numbers and numeric strings count as observations; everything else is missing.
fn numeric_value(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Builds the chronological table: sorts by date, parses minutes, encodes
/// home/away and keeps every stat key observed numerically at least once.
pub fn normalize_games(mut games: Vec<GameRecord>) -> GameTable {
    games.sort_by_key(|g| g.date);

    let stat_keys: BTreeSet<&str> = games
        .iter()
        .flat_map(|g| g.stats.iter())
        .filter(|(key, value)| {
            key.as_str() != MINUTES_COLUMN
                && key.as_str() != HOME_COLUMN
                && numeric_value(value).is_some()
        })
        .map(|(key, _)| key.as_str())
        .collect();

    let mut table = GameTable::new(games.iter().map(|g| g.date).collect());
    table.push_column(
        HOME_COLUMN,
        games.iter().map(|g| Some(home_indicator(&g.home))).collect(),
    );

    let minutes: Vec<Option<f64>> = games.iter().map(|g| parse_minutes(&g.mp)).collect();
    let unparsed = minutes.iter().filter(|m| m.is_none()).count();
    if unparsed > 0 {
        debug!("{} of {} games have no parsable minutes", unparsed, games.len());
    }
    if minutes.iter().any(Option::is_some) {
        table.push_column(MINUTES_COLUMN, minutes);
    }

    for key in stat_keys {
        let values = games
            .iter()
            .map(|g| g.stats.get(key).and_then(numeric_value))
            .collect();
        table.push_column(key, values);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_minutes(&json!("34:30")), Some(34.5));
        assert_eq!(parse_minutes(&json!("0:00")), Some(0.0));
        assert_eq!(parse_minutes(&json!("Did Not Play")), None);
        assert_eq!(parse_minutes(&json!("12:3x")), None);
        assert_eq!(parse_minutes(&json!(34)), None);
        assert_eq!(parse_minutes(&Value::Null), None);
    }

    #[test]
    fn test_home_indicator() {
        assert_eq!(home_indicator(&json!("@")), 0.0);
        assert_eq!(home_indicator(&json!("")), 1.0);
        assert_eq!(home_indicator(&json!("vs")), 1.0);
        assert_eq!(home_indicator(&Value::Null), 1.0);
    }

    #[test]
    fn test_rows_sorted_chronologically() {
        let games = vec![
            GameRecord::new(day(9)).with_stat("pts", 9.0),
            GameRecord::new(day(2)).with_stat("pts", 2.0),
            GameRecord::new(day(5)).with_stat("pts", 5.0),
            GameRecord::new(day(1)).with_stat("pts", 1.0),
        ];
        let table = normalize_games(games);

        assert!(table.dates().windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(
            table.column("pts").unwrap(),
            &[Some(1.0), Some(2.0), Some(5.0), Some(9.0)]
        );
    }

    #[test]
    fn test_unparsable_minutes_become_missing() {
        let games = vec![
            GameRecord::new(day(1)).with_minutes("30:00"),
            GameRecord::new(day(2)).with_minutes("DNP"),
            GameRecord::new(day(3)).with_minutes("12:30").away(),
        ];
        let table = normalize_games(games);

        assert_eq!(
            table.column(MINUTES_COLUMN).unwrap(),
            &[Some(30.0), None, Some(12.5)]
        );
        assert_eq!(
            table.column(HOME_COLUMN).unwrap(),
            &[Some(1.0), Some(1.0), Some(0.0)]
        );
    }

    #[test]
    fn test_non_numeric_keys_are_not_columns() {
        let mut game = GameRecord::new(day(1)).with_stat("ast", 4.0);
        game.stats.insert("opponent".into(), json!("BOS"));
        game.stats.insert("fgp".into(), json!(".512"));
        game.stats.insert("plusMinus".into(), Value::Null);
        let table = normalize_games(vec![game]);

        assert!(table.has_column("ast"));
        assert_eq!(table.value("fgp", 0), Some(0.512));
        assert!(!table.has_column("opponent"));
        assert!(!table.has_column("plusMinus"));
    }
}
