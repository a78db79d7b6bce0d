//! DataFrame value extraction and column replacement.
//!
//! Frames arrive string-typed from ingestion; these helpers read a column as
//! text, numbers or dates and write derived columns back.

use cdr_ingest::{any_to_f64, any_to_string, parse_date};
use cdr_model::DateField;
use polars::prelude::*;

use crate::error::{Result, TransformError};

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name).map_err(|_| TransformError::ColumnNotFound {
        column: name.to_string(),
    })
}

/// True for `None` and whitespace-only text.
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|text| text.trim().is_empty())
}

/// All values of a column as text; null cells are `None`.
pub fn column_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = require_column(df, name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = column.get(idx)?;
        values.push(match value {
            AnyValue::Null => None,
            other => Some(any_to_string(other)),
        });
    }
    Ok(values)
}

/// Like [`column_strings`], but an absent column reads as all-null.
pub fn optional_column_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    if has_column(df, name) {
        column_strings(df, name)
    } else {
        Ok(vec![None; df.height()])
    }
}

/// Numeric view of a column. Text that does not parse becomes `None`.
pub fn column_f64s(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = require_column(df, name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_f64(column.get(idx)?));
    }
    Ok(values)
}

pub fn optional_column_f64s(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    if has_column(df, name) {
        column_f64s(df, name)
    } else {
        Ok(vec![None; df.height()])
    }
}

/// Resolves every cell of a date column once.
pub fn column_dates(df: &DataFrame, name: &str) -> Result<Vec<DateField>> {
    Ok(column_strings(df, name)?
        .iter()
        .map(|raw| parse_date(raw.as_deref()))
        .collect())
}

pub fn optional_column_dates(df: &DataFrame, name: &str) -> Result<Vec<DateField>> {
    if has_column(df, name) {
        column_dates(df, name)
    } else {
        Ok(vec![DateField::Missing; df.height()])
    }
}

fn check_len(df: &DataFrame, name: &str, actual: usize) -> Result<()> {
    // A frame without columns takes the height of its first column.
    if df.width() > 0 && df.height() != actual {
        return Err(TransformError::LengthMismatch {
            column: name.to_string(),
            expected: df.height(),
            actual,
        });
    }
    Ok(())
}

/// Adds or replaces a text column.
pub fn set_strings(df: &mut DataFrame, name: &str, values: Vec<Option<String>>) -> Result<()> {
    check_len(df, name, values.len())?;
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

pub fn set_f64s(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> Result<()> {
    check_len(df, name, values.len())?;
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

pub fn set_bools(df: &mut DataFrame, name: &str, values: Vec<bool>) -> Result<()> {
    check_len(df, name, values.len())?;
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

/// Keeps the rows whose mask entry is `true`, preserving order.
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> Result<DataFrame> {
    if keep.len() != df.height() {
        return Err(TransformError::LengthMismatch {
            column: "row mask".to_string(),
            expected: df.height(),
            actual: keep.len(),
        });
    }
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    Ok(df.filter(&mask)?)
}

/// Removes the named columns; names the frame does not carry are ignored.
pub fn drop_columns(df: &DataFrame, names: &[&str]) -> Result<DataFrame> {
    let mut result = df.clone();
    for name in names {
        if has_column(&result, name) {
            result = result.drop(name)?;
        }
    }
    Ok(result)
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}
