//! Identifier normalization and composite keys.

use polars::prelude::DataFrame;

use crate::data_utils::{column_strings, has_column, set_strings};
use crate::error::Result;

/// Drops every character outside `[A-Za-z0-9 ]`, then trims.
///
/// `None` passes through so callers can still tell "absent" from "blank".
pub fn strip_special_chars(value: Option<&str>) -> Option<String> {
    value.map(|text| {
        text.chars()
            .filter(|ch| ch.is_ascii_alphanumeric() || *ch == ' ')
            .collect::<String>()
            .trim()
            .to_string()
    })
}

/// `Ref1`: normalized release number followed by normalized container number.
///
/// There is no separator, so `"12" + "AB"` and `"1" + "2AB"` share a key.
/// A missing side contributes nothing.
pub fn build_ref1(release: Option<&str>, container: Option<&str>) -> String {
    let release = strip_special_chars(release).unwrap_or_default();
    let container = strip_special_chars(container).unwrap_or_default();
    format!("{release}{container}")
}

/// `Ref2`: `Ref1` followed by the wattage exactly as exported.
pub fn build_ref2(release: Option<&str>, container: Option<&str>, wattage_text: Option<&str>) -> String {
    let mut key = build_ref1(release, container);
    key.push_str(wattage_text.unwrap_or_default());
    key
}

/// Normalizes the named identifier columns in place; absent columns are skipped.
pub fn normalize_identifier_columns(df: &mut DataFrame, columns: &[&str]) -> Result<()> {
    for name in columns {
        if !has_column(df, name) {
            continue;
        }
        let values = column_strings(df, name)?
            .iter()
            .map(|value| strip_special_chars(value.as_deref()))
            .collect();
        set_strings(df, name, values)?;
    }
    Ok(())
}

/// Builds the `Ref1` values for a frame from two identifier columns.
pub fn ref1_values(df: &DataFrame, release_column: &str, container_column: &str) -> Result<Vec<String>> {
    let releases = column_strings(df, release_column)?;
    let containers = column_strings(df, container_column)?;
    Ok(releases
        .iter()
        .zip(&containers)
        .map(|(release, container)| build_ref1(release.as_deref(), container.as_deref()))
        .collect())
}
