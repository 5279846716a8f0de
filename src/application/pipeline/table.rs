use chrono::NaiveDate;

/// Named column of optional values; `None` marks a missing observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Column-oriented game log. Rows are in chronological order once built by
/// the normalizer; every column has exactly one value per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameTable {
    dates: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl GameTable {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn value(&self, name: &str, row: usize) -> Option<f64> {
        self.column(name).and_then(|values| values.get(row).copied().flatten())
    }

    /// Appends or replaces a column. Values must line up with the rows.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.len(), "column length must match row count");
        let name = name.into();
        if let Some(existing) = self.columns.iter_mut().find(|c| c.name == name) {
            existing.values = values;
        } else {
            self.columns.push(Column { name, values });
        }
    }

    /// Keeps rows whose flag is true, preserving order.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.len());
        self.dates = retain_by(&self.dates, keep);
        for column in &mut self.columns {
            column.values = retain_by(&column.values, keep);
        }
    }
}

pub(crate) fn retain_by<T: Clone>(values: &[T], keep: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(keep)
        .filter(|(_, k)| **k)
        .map(|(v, _)| v.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn test_push_and_lookup() {
        let mut table = GameTable::new(vec![day(1), day(2)]);
        table.push_column("pts", vec![Some(10.0), None]);

        assert!(table.has_column("pts"));
        assert_eq!(table.value("pts", 0), Some(10.0));
        assert_eq!(table.value("pts", 1), None);
        assert_eq!(table.value("ast", 0), None);

        table.push_column("pts", vec![Some(1.0), Some(2.0)]);
        assert_eq!(table.columns().len(), 1);
        assert_eq!(table.value("pts", 1), Some(2.0));
    }

    #[test]
    fn test_retain_rows_keeps_columns_aligned() {
        let mut table = GameTable::new(vec![day(1), day(2), day(3)]);
        table.push_column("pts", vec![Some(1.0), Some(2.0), Some(3.0)]);
        table.retain_rows(&[false, true, true]);

        assert_eq!(table.dates(), &[day(2), day(3)]);
        assert_eq!(table.column("pts").unwrap(), &[Some(2.0), Some(3.0)]);
    }
}
