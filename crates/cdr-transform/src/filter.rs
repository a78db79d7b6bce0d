//! Row predicates and report projections.
//!
//! Each predicate returns one `bool` per row so reports can combine them
//! and apply the result once with [`crate::data_utils::filter_rows`].

use cdr_model::{DateField, Projection};
use polars::prelude::DataFrame;

use crate::data_utils::{column_names, drop_columns, is_blank};
use crate::error::Result;

/// Rows whose date year is not listed. Missing or unparseable dates are kept.
pub fn year_not_in(dates: &[DateField], years: &[i32]) -> Vec<bool> {
    dates
        .iter()
        .map(|date| !date.year().is_some_and(|year| years.contains(&year)))
        .collect()
}

/// Rows whose date falls in `year`.
pub fn year_equals(dates: &[DateField], year: i32) -> Vec<bool> {
    dates.iter().map(|date| date.year() == Some(year)).collect()
}

/// Exact membership test.
pub fn value_in<S: AsRef<str>>(values: &[Option<String>], allowed: &[S]) -> Vec<bool> {
    values
        .iter()
        .map(|value| {
            value
                .as_deref()
                .is_some_and(|v| allowed.iter().any(|a| a.as_ref() == v))
        })
        .collect()
}

pub fn starts_with_any<S: AsRef<str>>(values: &[Option<String>], prefixes: &[S]) -> Vec<bool> {
    values
        .iter()
        .map(|value| {
            value
                .as_deref()
                .is_some_and(|v| prefixes.iter().any(|prefix| v.starts_with(prefix.as_ref())))
        })
        .collect()
}

pub fn non_blank(values: &[Option<String>]) -> Vec<bool> {
    values.iter().map(|value| !is_blank(value.as_deref())).collect()
}

/// Trimmed, case-insensitive equality.
pub fn equals_ignore_case(values: &[Option<String>], target: &str) -> Vec<bool> {
    let target = target.trim();
    values
        .iter()
        .map(|value| {
            value
                .as_deref()
                .is_some_and(|v| v.trim().eq_ignore_ascii_case(target))
        })
        .collect()
}

/// Element-wise AND of two masks.
pub fn and(left: &[bool], right: &[bool]) -> Vec<bool> {
    left.iter().zip(right).map(|(l, r)| *l && *r).collect()
}

pub fn not(mask: &[bool]) -> Vec<bool> {
    mask.iter().map(|keep| !keep).collect()
}

/// Applies a projection: drop listed columns, then move leading and trailing
/// columns into place. Names the frame does not carry are ignored.
pub fn project(df: &DataFrame, projection: &Projection) -> Result<DataFrame> {
    let dropped = drop_columns(df, projection.drop)?;
    let present = column_names(&dropped);
    let has = |name: &&str| present.iter().any(|column| column == name);

    let leading: Vec<&str> = projection.leading.iter().copied().filter(has).collect();
    let trailing: Vec<&str> = projection.trailing.iter().copied().filter(has).collect();
    let middle = present
        .iter()
        .map(String::as_str)
        .filter(|name| !leading.contains(name) && !trailing.contains(name));

    let order: Vec<&str> = leading
        .iter()
        .copied()
        .chain(middle)
        .chain(trailing.iter().copied())
        .collect();
    Ok(dropped.select(order)?)
}
