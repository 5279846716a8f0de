use crate::application::pipeline::LabeledTable;
use anyhow::{Context, Result};
use std::io::Write;

/// Writes the engineered table as CSV: date, every column, then the label
/// under its target name. Missing values are written as empty fields.
/// Returns the number of data rows written.
pub fn write_labeled_csv<W: Write>(labeled: &LabeledTable, writer: W) -> Result<usize> {
    let table = &labeled.features.table;
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);

    let header = std::iter::once("date".to_string())
        .chain(table.columns().iter().map(|c| c.name.clone()))
        .chain(std::iter::once(labeled.target.clone()));
    wtr.write_record(header)
        .context("Failed to write CSV header")?;

    for row in 0..table.len() {
        let record = std::iter::once(table.dates()[row].to_string())
            .chain(table.columns().iter().map(|c| match c.values[row] {
                Some(v) => v.to_string(),
                None => String::new(),
            }))
            .chain(std::iter::once(labeled.labels[row].to_string()));
        wtr.write_record(record)
            .with_context(|| format!("Failed to write CSV row {row}"))?;
    }

    wtr.flush().context("Failed to flush CSV writer")?;
    Ok(table.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pipeline::{PipelineSettings, engineer_features};
    use crate::domain::condition::StatThreshold;
    use crate::domain::game::GameRecord;
    use chrono::NaiveDate;

    #[test]
    fn test_csv_layout() {
        let games = (1..=3)
            .map(|d| {
                GameRecord::new(NaiveDate::from_ymd_opt(2025, 2, d).unwrap())
                    .with_minutes("30:00")
                    .with_stat("pts", 10.0 * d as f64)
            })
            .collect();
        let labeled = engineer_features(
            games,
            &[StatThreshold::new("pts", ">", 15.0)],
            &PipelineSettings::default(),
        )
        .unwrap();

        let mut buffer = Vec::new();
        let rows = write_labeled_csv(&labeled, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(rows, 3);
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "date,home,mp,pts,mp_last10_avg,pts_last10_avg,days_rest,target_pts_gt_15"
        );
        assert_eq!(lines[1], "2025-02-01,1,30,10,,,0,0");
        assert_eq!(lines[3], "2025-02-03,1,30,30,,,1,1");
    }
}
