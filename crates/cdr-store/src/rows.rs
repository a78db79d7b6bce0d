//! Row sets exchanged with a table store, and their DataFrame conversion.

use cdr_ingest::{any_to_string, to_iso};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// A page of text cells with a shared column list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    pub fn push_row(&mut self, row: Vec<Option<String>>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(StoreError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Checks that every row has one cell per column.
    pub fn validate(&self) -> Result<()> {
        for (idx, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(StoreError::RowWidth {
                    row: idx,
                    expected: self.columns.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(())
    }

    /// Appends `other`'s rows. Columns unknown to `self` are added; cells a
    /// row does not carry become null.
    pub fn append(&mut self, other: &RowSet) {
        for column in &other.columns {
            if self.column_index(column).is_none() {
                self.columns.push(column.clone());
                for row in &mut self.rows {
                    row.push(None);
                }
            }
        }
        let mapping: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|column| other.column_index(column))
            .collect();
        for row in &other.rows {
            self.rows.push(
                mapping
                    .iter()
                    .map(|source| source.and_then(|idx| row.get(idx).cloned().flatten()))
                    .collect(),
            );
        }
    }

    /// Rows `offset..offset + limit`, clamped to the set.
    pub fn slice(&self, offset: usize, limit: usize) -> RowSet {
        let start = offset.min(self.rows.len());
        let end = offset.saturating_add(limit).min(self.rows.len());
        RowSet {
            columns: self.columns.clone(),
            rows: self.rows[start..end].to_vec(),
        }
    }

    /// Splits into consecutive batches of at most `size` rows.
    pub fn batches(&self, size: usize) -> Vec<RowSet> {
        let size = size.max(1);
        self.rows
            .chunks(size)
            .map(|chunk| RowSet {
                columns: self.columns.clone(),
                rows: chunk.to_vec(),
            })
            .collect()
    }

    /// Adds or overwrites a column with the same value in every row.
    pub fn set_constant(&mut self, column: &str, value: &str) {
        let idx = match self.column_index(column) {
            Some(idx) => idx,
            None => {
                self.columns.push(column.to_string());
                for row in &mut self.rows {
                    row.push(None);
                }
                self.columns.len() - 1
            }
        };
        for row in &mut self.rows {
            row[idx] = Some(value.to_string());
        }
    }

    pub fn from_frame(df: &DataFrame) -> Result<RowSet> {
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let mut rows = vec![Vec::with_capacity(columns.len()); df.height()];
        for column in df.get_columns() {
            for (idx, row) in rows.iter_mut().enumerate() {
                row.push(match column.get(idx)? {
                    AnyValue::Null => None,
                    other => Some(any_to_string(other)),
                });
            }
        }
        Ok(RowSet { columns, rows })
    }

    /// Builds a string-typed DataFrame with the set's column order.
    pub fn to_frame(&self) -> Result<DataFrame> {
        self.validate()?;
        let columns: Vec<Column> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let values: Vec<Option<&str>> =
                    self.rows.iter().map(|row| row[idx].as_deref()).collect();
                Series::new(name.as_str().into(), values).into()
            })
            .collect();
        Ok(DataFrame::new(columns)?)
    }

    /// Rewrites the named date columns to `YYYY-MM-DD`; unparseable cells become null.
    pub fn iso_date_columns(&mut self, columns: &[&str]) -> usize {
        let mut rejected = 0;
        for column in columns {
            let Some(idx) = self.column_index(column) else {
                continue;
            };
            for row in &mut self.rows {
                let raw = row[idx].take();
                let iso = to_iso(raw.as_deref());
                if iso.is_none() && raw.as_deref().is_some_and(|text| !text.trim().is_empty()) {
                    rejected += 1;
                }
                row[idx] = iso;
            }
        }
        rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn append_widens_columns() {
        let mut left = RowSet::new(vec!["a".into(), "b".into()]);
        left.push_row(cells(&[Some("1"), Some("2")])).unwrap();
        let mut right = RowSet::new(vec!["b".into(), "c".into()]);
        right.push_row(cells(&[Some("3"), Some("4")])).unwrap();

        left.append(&right);

        assert_eq!(left.columns, vec!["a", "b", "c"]);
        assert_eq!(left.rows[0], cells(&[Some("1"), Some("2"), None]));
        assert_eq!(left.rows[1], cells(&[None, Some("3"), Some("4")]));
    }

    #[test]
    fn slices_and_batches() {
        let mut set = RowSet::new(vec!["a".into()]);
        for idx in 0..5 {
            set.push_row(vec![Some(idx.to_string())]).unwrap();
        }
        assert_eq!(set.slice(3, 10).len(), 2);
        assert_eq!(set.slice(9, 10).len(), 0);
        let sizes: Vec<usize> = set.batches(2).iter().map(RowSet::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn frame_round_trip_keeps_order_and_nulls() {
        let df = df! {
            "z" => [Some("1"), None],
            "a" => [Some("x"), Some("y")],
        }
        .unwrap();
        let set = RowSet::from_frame(&df).unwrap();
        assert_eq!(set.columns, vec!["z", "a"]);
        assert_eq!(set.get(1, "z"), None);
        assert!(set.to_frame().unwrap().equals_missing(&df));
    }

    #[test]
    fn iso_dates_at_the_boundary() {
        let mut set = RowSet::new(vec!["Outbound date".into()]);
        set.push_row(cells(&[Some("45292")])).unwrap();
        set.push_row(cells(&[Some("31/12/2024")])).unwrap();
        set.push_row(cells(&[Some("soon")])).unwrap();
        set.push_row(cells(&[None])).unwrap();

        let rejected = set.iso_date_columns(&["Outbound date", "Missing"]);

        assert_eq!(rejected, 1);
        assert_eq!(set.get(0, "Outbound date"), Some("2024-01-01"));
        assert_eq!(set.get(1, "Outbound date"), Some("2024-12-31"));
        assert_eq!(set.get(2, "Outbound date"), None);
    }
}
