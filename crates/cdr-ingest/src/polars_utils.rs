//! Polars AnyValue utility functions.
//!
//! Helpers for turning string-typed cells back into text and numbers.

use polars::prelude::*;

/// Cell text that spreadsheet exports use for "no value".
const NULL_TOKENS: &[&str] = &[
    "", "nan", "NaN", "NAN", "NaT", "None", "null", "NULL", "N/A", "n/a", "#N/A", "<NA>",
];

/// True for blank cells and the textual nulls spreadsheet exports emit.
pub fn is_null_token(value: &str) -> bool {
    NULL_TOKENS.contains(&value.trim())
}

/// Converts a Polars AnyValue to a String representation.
/// Returns empty string for Null, formats floats without trailing zeros.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Converts AnyValue to String, returning None for null or blank cells.
pub fn any_to_string_non_empty(value: AnyValue<'_>) -> Option<String> {
    let s = any_to_string(value);
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Formats a float without a trailing `.0` for whole numbers.
pub fn format_numeric(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Converts an AnyValue to f64, returning None for non-numeric or null values.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    }
}

/// Parses a string as f64, returning None for null tokens and invalid text.
pub fn parse_f64(value: &str) -> Option<f64> {
    if is_null_token(value) {
        return None;
    }
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_numeric() {
        assert_eq!(format_numeric(100.0), "100");
        assert_eq!(format_numeric(0.341), "0.341");
        assert_eq!(format_numeric(-5.0), "-5");
    }

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64(" 620 "), Some(620.0));
        assert_eq!(parse_f64("nan"), None);
        assert_eq!(parse_f64("abc"), None);
        assert_eq!(parse_f64(""), None);
    }

    #[test]
    fn test_any_to_string() {
        assert_eq!(any_to_string(AnyValue::Null), "");
        assert_eq!(any_to_string(AnyValue::Float64(2.5)), "2.5");
        assert_eq!(any_to_string(AnyValue::String("ABC")), "ABC");
        assert_eq!(any_to_string_non_empty(AnyValue::String("  ")), None);
    }
}
