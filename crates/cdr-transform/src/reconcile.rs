//! Left joins of a primary frame against secondary datasets.
//!
//! Every function keeps the primary rows exactly once and in input order:
//! joins only ever append columns.

use std::collections::HashMap;

use polars::prelude::DataFrame;
use tracing::debug;

use crate::aggregate::KeyTotals;
use crate::data_utils::{column_f64s, column_strings, set_bools, set_f64s, set_strings};
use crate::error::{Result, TransformError};

/// Appends one zero-filled numeric column per summary, looked up by `key_column`.
pub fn left_join_totals(
    primary: &mut DataFrame,
    key_column: &str,
    summaries: &[(&str, &KeyTotals)],
) -> Result<()> {
    let keys = column_strings(primary, key_column)?;
    for (column, totals) in summaries {
        let values: Vec<Option<f64>> = keys
            .iter()
            .map(|key| Some(key.as_deref().map_or(0.0, |key| totals.get(key))))
            .collect();
        let matched = keys
            .iter()
            .filter(|key| key.as_deref().is_some_and(|key| totals.contains(key)))
            .count();
        debug!(column, matched, rows = keys.len(), "joined totals");
        set_f64s(primary, column, values)?;
    }
    Ok(())
}

/// Copies descriptive `columns` from `secondary` onto `primary`.
///
/// Each primary key takes the values of the first secondary row with the
/// same key, so duplicate secondary keys never multiply primary rows.
/// Unmatched rows get nulls.
pub fn left_join_lookup(
    primary: &mut DataFrame,
    key_column: &str,
    secondary: &DataFrame,
    secondary_key: &str,
    columns: &[&str],
) -> Result<()> {
    let secondary_keys = column_strings(secondary, secondary_key)?;
    let mut first_row: HashMap<&str, usize> = HashMap::new();
    for (idx, key) in secondary_keys.iter().enumerate() {
        if let Some(key) = key.as_deref() {
            first_row.entry(key).or_insert(idx);
        }
    }

    let keys = column_strings(primary, key_column)?;
    let rows: Vec<Option<usize>> = keys
        .iter()
        .map(|key| key.as_deref().and_then(|key| first_row.get(key).copied()))
        .collect();

    for column in columns {
        let source = column_strings(secondary, column).map_err(|_| TransformError::ColumnNotFound {
            column: (*column).to_string(),
        })?;
        let values = rows
            .iter()
            .map(|row| row.and_then(|idx| source[idx].clone()))
            .collect();
        set_strings(primary, column, values)?;
    }
    Ok(())
}

/// Row-wise equality of two numeric columns. A null on either side is unequal.
pub fn equal_flag(left: &[Option<f64>], right: &[Option<f64>]) -> Vec<bool> {
    left.iter()
        .zip(right)
        .map(|(l, r)| matches!((l, r), (Some(l), Some(r)) if l == r))
        .collect()
}

/// Adds `flag_column` = `left_column == right_column` and returns the flags.
pub fn add_equal_flag(
    df: &mut DataFrame,
    flag_column: &str,
    left_column: &str,
    right_column: &str,
) -> Result<Vec<bool>> {
    let left = column_f64s(df, left_column)?;
    let right = column_f64s(df, right_column)?;
    let flags = equal_flag(&left, &right);
    set_bools(df, flag_column, flags.clone())?;
    Ok(flags)
}
