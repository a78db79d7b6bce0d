//! Group-by-key sums, pivot tables and status summaries.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use polars::prelude::{Column, DataFrame, NamedFrom, Series};
use serde::Serialize;

use crate::data_utils::{column_f64s, column_strings, optional_column_f64s};
use crate::error::Result;

/// Per-key sums. Lookups for unknown keys read as zero, never null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyTotals {
    totals: HashMap<String, f64>,
}

impl KeyTotals {
    pub fn get(&self, key: &str) -> f64 {
        self.totals.get(key).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.totals.contains_key(key)
    }

    pub fn add(&mut self, key: &str, quantity: f64) {
        *self.totals.entry(key.to_string()).or_default() += quantity;
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Sum over every key.
    pub fn total(&self) -> f64 {
        self.totals.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.totals.iter().map(|(key, value)| (key.as_str(), *value))
    }
}

/// Groups rows by key and sums their quantity.
///
/// Rows with a null key are skipped. A missing or non-numeric quantity counts
/// as zero but still registers the key. `include` decides per row index.
pub fn sum_by_key(
    keys: &[Option<String>],
    quantities: &[Option<f64>],
    include: impl Fn(usize) -> bool,
) -> KeyTotals {
    let mut totals = KeyTotals::default();
    for (idx, (key, quantity)) in keys.iter().zip(quantities).enumerate() {
        let Some(key) = key else {
            continue;
        };
        if include(idx) {
            totals.add(key, quantity.unwrap_or(0.0));
        }
    }
    totals
}

/// Sums `quantity_column` per `key_column` over all rows.
pub fn sum_column_by_key(df: &DataFrame, key_column: &str, quantity_column: &str) -> Result<KeyTotals> {
    let keys = column_strings(df, key_column)?;
    let quantities = column_f64s(df, quantity_column)?;
    Ok(sum_by_key(&keys, &quantities, |_| true))
}

/// Sums `quantity_column` per `key_column` over rows whose status equals `status`.
pub fn sum_by_status(
    df: &DataFrame,
    status_column: &str,
    status: &str,
    key_column: &str,
    quantity_column: &str,
) -> Result<KeyTotals> {
    let statuses = column_strings(df, status_column)?;
    let keys = column_strings(df, key_column)?;
    let quantities = column_f64s(df, quantity_column)?;
    Ok(sum_by_key(&keys, &quantities, |idx| {
        statuses[idx].as_deref() == Some(status)
    }))
}

/// Record count and MegaWattage for one status value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub records: usize,
    pub megawattage: f64,
}

/// Status distribution of a frame, most frequent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusSummary {
    pub column: String,
    pub counts: Vec<StatusCount>,
}

impl StatusSummary {
    pub fn total_records(&self) -> usize {
        self.counts.iter().map(|count| count.records).sum()
    }

    pub fn total_megawattage(&self) -> f64 {
        self.counts.iter().map(|count| count.megawattage).sum()
    }

    pub fn get(&self, status: &str) -> Option<&StatusCount> {
        self.counts.iter().find(|count| count.status == status)
    }
}

impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for count in &self.counts {
            writeln!(
                f,
                "{}: {} records, Total MegaWattage: {:.2} MW",
                count.status, count.records, count.megawattage
            )?;
        }
        Ok(())
    }
}

/// Counts rows and sums MegaWattage per value of `status_column`.
///
/// Null statuses are not counted. Unparseable MegaWattage counts as zero.
pub fn status_summary(df: &DataFrame, status_column: &str, mw_column: &str) -> Result<StatusSummary> {
    let statuses = column_strings(df, status_column)?;
    let megawattage = optional_column_f64s(df, mw_column)?;

    let mut order: Vec<String> = Vec::new();
    let mut acc: HashMap<String, (usize, f64)> = HashMap::new();
    for (status, mw) in statuses.iter().zip(&megawattage) {
        let Some(status) = status else {
            continue;
        };
        let entry = acc.entry(status.clone()).or_insert_with(|| {
            order.push(status.clone());
            (0, 0.0)
        });
        entry.0 += 1;
        entry.1 += mw.unwrap_or(0.0);
    }

    let mut counts: Vec<StatusCount> = order
        .into_iter()
        .map(|status| {
            let (records, megawattage) = acc.get(&status).copied().unwrap_or((0, 0.0));
            StatusCount {
                status,
                records,
                megawattage,
            }
        })
        .collect();
    // Stable: ties keep first-seen order.
    counts.sort_by(|a, b| b.records.cmp(&a.records));

    Ok(StatusSummary {
        column: status_column.to_string(),
        counts,
    })
}

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sums of several value columns per group, groups in key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedSums {
    pub key_column: String,
    pub value_columns: Vec<String>,
    pub groups: BTreeMap<String, Vec<f64>>,
}

impl GroupedSums {
    /// Column totals over every group.
    pub fn totals(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.value_columns.len()];
        for sums in self.groups.values() {
            for (total, value) in totals.iter_mut().zip(sums) {
                *total += value;
            }
        }
        totals
    }

    /// One row per group plus a `total_label` row, sums rounded to two decimals.
    pub fn to_frame(&self, total_label: &str) -> Result<DataFrame> {
        let mut labels: Vec<String> = self.groups.keys().cloned().collect();
        labels.push(total_label.to_string());
        let mut columns: Vec<Column> = vec![Series::new(self.key_column.as_str().into(), labels).into()];
        let totals = self.totals();
        for (idx, name) in self.value_columns.iter().enumerate() {
            let values: Vec<f64> = self
                .groups
                .values()
                .map(|sums| sums[idx])
                .chain(std::iter::once(totals[idx]))
                .map(round2)
                .collect();
            columns.push(Series::new(name.as_str().into(), values).into());
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Groups the rows selected by `include` on `key_column` and sums each value column.
///
/// Null keys are skipped and unparseable values count as zero.
pub fn grouped_sums(
    df: &DataFrame,
    key_column: &str,
    value_columns: &[&str],
    include: &[bool],
) -> Result<GroupedSums> {
    let keys = column_strings(df, key_column)?;
    let values = value_columns
        .iter()
        .map(|column| column_f64s(df, column))
        .collect::<Result<Vec<_>>>()?;

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (idx, key) in keys.iter().enumerate() {
        let Some(key) = key else {
            continue;
        };
        if !include.get(idx).copied().unwrap_or(false) {
            continue;
        }
        let sums = groups
            .entry(key.clone())
            .or_insert_with(|| vec![0.0; value_columns.len()]);
        for (sum, column) in sums.iter_mut().zip(&values) {
            *sum += column[idx].unwrap_or(0.0);
        }
    }
    Ok(GroupedSums {
        key_column: key_column.to_string(),
        value_columns: value_columns.iter().map(|c| (*c).to_string()).collect(),
        groups,
    })
}

/// Two-key sum table with row and column margins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotTable {
    pub index_column: String,
    pub row_keys: BTreeSet<String>,
    pub column_keys: BTreeSet<String>,
    pub cells: BTreeMap<(String, String), f64>,
}

impl PivotTable {
    /// Missing combinations read as zero.
    pub fn get(&self, row: &str, column: &str) -> f64 {
        self.cells
            .get(&(row.to_string(), column.to_string()))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn row_total(&self, row: &str) -> f64 {
        self.column_keys.iter().map(|column| self.get(row, column)).sum()
    }

    pub fn column_total(&self, column: &str) -> f64 {
        self.row_keys.iter().map(|row| self.get(row, column)).sum()
    }

    pub fn grand_total(&self) -> f64 {
        self.cells.values().sum()
    }

    /// Index column, one column per column key, then `margin` as the last
    /// column and the last row. Values are rounded to two decimals.
    pub fn to_frame(&self, margin: &str) -> Result<DataFrame> {
        let mut index: Vec<String> = self.row_keys.iter().cloned().collect();
        index.push(margin.to_string());
        let mut columns: Vec<Column> = vec![Series::new(self.index_column.as_str().into(), index).into()];

        for column in &self.column_keys {
            let values: Vec<f64> = self
                .row_keys
                .iter()
                .map(|row| self.get(row, column))
                .chain(std::iter::once(self.column_total(column)))
                .map(round2)
                .collect();
            columns.push(Series::new(column.as_str().into(), values).into());
        }
        let margins: Vec<f64> = self
            .row_keys
            .iter()
            .map(|row| self.row_total(row))
            .chain(std::iter::once(self.grand_total()))
            .map(round2)
            .collect();
        columns.push(Series::new(margin.into(), margins).into());
        Ok(DataFrame::new(columns)?)
    }
}

/// Sums `value_column` over the rows selected by `include`, keyed by
/// `(index_column, columns_column)`. Rows missing either key are skipped.
pub fn pivot_sum(
    df: &DataFrame,
    index_column: &str,
    columns_column: &str,
    value_column: &str,
    include: &[bool],
) -> Result<PivotTable> {
    let rows = column_strings(df, index_column)?;
    let cols = column_strings(df, columns_column)?;
    let values = column_f64s(df, value_column)?;

    let mut pivot = PivotTable {
        index_column: index_column.to_string(),
        ..PivotTable::default()
    };
    for (idx, (row, col)) in rows.iter().zip(&cols).enumerate() {
        let (Some(row), Some(col)) = (row, col) else {
            continue;
        };
        if !include.get(idx).copied().unwrap_or(false) {
            continue;
        }
        pivot.row_keys.insert(row.clone());
        pivot.column_keys.insert(col.clone());
        *pivot.cells.entry((row.clone(), col.clone())).or_default() += values[idx].unwrap_or(0.0);
    }
    Ok(pivot)
}
