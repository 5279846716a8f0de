use super::table::GameTable;
use crate::domain::ml::{DAYS_REST_COLUMN, TRACKED_STATS, rolling_column_name};
use statrs::statistics::{Data, Distribution};

/// Table augmented with trailing averages and rest days.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub table: GameTable,
    /// Trailing-average columns that were derived, in tracked-stat order.
    pub rolling_columns: Vec<String>,
}

/// Trailing-window feature derivation over a chronological game table.
#[derive(Debug, Clone, Copy)]
pub struct RollingFeatureBuilder {
    pub window: usize,
    pub min_periods: usize,
}

impl Default for RollingFeatureBuilder {
    fn default() -> Self {
        Self {
            window: 10,
            min_periods: 5,
        }
    }
}

impl RollingFeatureBuilder {
    pub fn new(window: usize, min_periods: usize) -> Self {
        Self {
            window,
            min_periods,
        }
    }

    pub fn build(&self, mut table: GameTable) -> FeatureTable {
        let mut rolling_columns = Vec::new();
        for &stat in TRACKED_STATS {
            let Some(values) = table.column(stat) else {
                continue;
            };
            let averaged = trailing_mean(values, self.window, self.min_periods);
            let name = rolling_column_name(stat);
            table.push_column(name.clone(), averaged);
            rolling_columns.push(name);
        }

        let rest = days_since_previous(&table);
        table.push_column(DAYS_REST_COLUMN, rest);

        FeatureTable {
            table,
            rolling_columns,
        }
    }
}

/// Mean of the observed values among the `window` rows strictly before each
/// row. Missing values are skipped; fewer than `min_periods` observations
/// leave the row undefined.
pub fn trailing_mean(values: &[Option<f64>], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(window);
            let observed: Vec<f64> = values[start..i].iter().flatten().copied().collect();
            if observed.is_empty() || observed.len() < min_periods {
                return None;
            }
            Data::new(observed).mean()
        })
        .collect()
}

/// Whole days since the previous game; the first game has a zero gap.
fn days_since_previous(table: &GameTable) -> Vec<Option<f64>> {
    let dates = table.dates();
    dates
        .iter()
        .enumerate()
        .map(|(i, date)| match i {
            0 => Some(0.0),
            _ => Some((*date - dates[i - 1]).num_days() as f64),
        })
        .collect()
}
