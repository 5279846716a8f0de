/// Raw box-score columns that get a trailing-average feature.
/// Order is preserved into the model's feature vector; changing it changes
/// which column a split index refers to.
pub const TRACKED_STATS: &[&str] = &[
    "mp", "pts", "fg", "fga", "fgp", "threep", "threepa", "threepap", "ft", "fta", "ftp", "orb",
    "drb", "trb", "ast", "stl", "blk", "tov", "pf", "gmsc",
];

/// Minutes played, parsed from "MM:SS" into fractional minutes.
pub const MINUTES_COLUMN: &str = "mp";

/// 0 for away games, 1 otherwise.
pub const HOME_COLUMN: &str = "home";

/// Days elapsed since the previous game (0 for the first game).
pub const DAYS_REST_COLUMN: &str = "days_rest";

const ROLLING_SUFFIX: &str = "_last10_avg";

/// Column name of the trailing average derived from `stat`.
pub fn rolling_column_name(stat: &str) -> String {
    format!("{stat}{ROLLING_SUFFIX}")
}

pub fn is_rolling_column(name: &str) -> bool {
    name.ends_with(ROLLING_SUFFIX)
}

/// Model input columns in order: every trailing average present, then the
/// home indicator and days of rest.
pub fn model_feature_names(rolling_columns: &[String]) -> Vec<String> {
    rolling_columns
        .iter()
        .cloned()
        .chain([HOME_COLUMN.to_string(), DAYS_REST_COLUMN.to_string()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_column_naming() {
        assert_eq!(rolling_column_name("pts"), "pts_last10_avg");
        assert!(is_rolling_column("trb_last10_avg"));
        assert!(!is_rolling_column("trb"));
    }

    #[test]
    fn test_model_feature_order() {
        let rolling = vec![rolling_column_name("mp"), rolling_column_name("pts")];
        let names = model_feature_names(&rolling);
        assert_eq!(
            names,
            vec!["mp_last10_avg", "pts_last10_avg", "home", "days_rest"]
        );
    }
}
