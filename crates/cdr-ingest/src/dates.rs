//! Date cells from spreadsheet exports.
//!
//! A date column can hold spreadsheet serial numbers, ISO strings, day-first
//! strings or nothing at all, often mixed in one file. Each cell is tagged
//! once as a [`DateValue`] and resolved to a [`DateField`]; nothing
//! downstream re-inspects the raw text.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use cdr_model::DateField;

use crate::polars_utils::is_null_token;

/// Largest serial a spreadsheet can represent (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y", "%d/%m/%y", "%d.%m.%y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

/// Epoch used by spreadsheet serial dates (day 0).
pub fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN)
}

/// A raw date cell, tagged by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum DateValue {
    Missing,
    /// Days since 1899-12-30; the fraction is a time of day and is ignored.
    Serial(f64),
    Text(String),
}

impl DateValue {
    /// Tags a cell. Numeric-looking text is treated as a serial date.
    pub fn from_cell(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return DateValue::Missing;
        };
        let trimmed = raw.trim();
        if is_null_token(trimmed) {
            return DateValue::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(serial) if serial.is_finite() => DateValue::Serial(serial),
            _ => DateValue::Text(trimmed.to_string()),
        }
    }

    pub fn resolve(&self) -> DateField {
        match self {
            DateValue::Missing => DateField::Missing,
            DateValue::Serial(serial) => match serial_to_date(*serial) {
                Some(date) => DateField::Valid(date),
                None => DateField::Invalid(serial.to_string()),
            },
            DateValue::Text(text) => match parse_date_text(text) {
                Some(date) => DateField::Valid(date),
                None => DateField::Invalid(text.clone()),
            },
        }
    }
}

/// Tags and resolves a cell in one step.
pub fn parse_date(raw: Option<&str>) -> DateField {
    DateValue::from_cell(raw).resolve()
}

pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(0.0..=MAX_SERIAL).contains(&serial) {
        return None;
    }
    serial_epoch().checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Parses ISO or day-first text, with or without a time part.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim().trim_end_matches('Z');

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }

    // Timestamps with offsets or odd time parts: keep the leading ISO date.
    let head = text.get(..10)?;
    let rest = text.get(10..)?;
    if rest.starts_with([' ', 'T']) {
        return NaiveDate::parse_from_str(head, "%Y-%m-%d").ok();
    }
    None
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Rewrites one cell as `YYYY-MM-DD`. Missing and unparseable cells become `None`.
pub fn to_iso(raw: Option<&str>) -> Option<String> {
    parse_date(raw).date().map(format_iso)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn serial_dates_use_spreadsheet_epoch() {
        assert_eq!(parse_date(Some("45292")), DateField::Valid(ymd(2024, 1, 1)));
        assert_eq!(parse_date(Some("45292.75")), DateField::Valid(ymd(2024, 1, 1)));
        assert_eq!(serial_to_date(0.0), Some(ymd(1899, 12, 30)));
        assert_eq!(serial_to_date(-1.0), None);
    }

    #[test]
    fn text_dates_are_day_first() {
        assert_eq!(parse_date_text("2024-01-10"), Some(ymd(2024, 1, 10)));
        assert_eq!(parse_date_text("10/01/2024"), Some(ymd(2024, 1, 10)));
        assert_eq!(parse_date_text("10.01.2024"), Some(ymd(2024, 1, 10)));
        assert_eq!(parse_date_text("2024-01-10 13:45:00"), Some(ymd(2024, 1, 10)));
        assert_eq!(parse_date_text("2024-01-10T13:45:00.000Z"), Some(ymd(2024, 1, 10)));
        assert_eq!(parse_date_text("2024-01-10T13:45:00+01:00"), Some(ymd(2024, 1, 10)));
    }

    #[test]
    fn null_tokens_are_missing() {
        for raw in ["", "  ", "nan", "NaT", "None"] {
            assert_eq!(parse_date(Some(raw)), DateField::Missing, "{raw:?}");
        }
        assert_eq!(parse_date(None), DateField::Missing);
    }

    #[test]
    fn garbage_is_invalid_not_missing() {
        assert_eq!(
            parse_date(Some("next week")),
            DateField::Invalid("next week".to_string())
        );
        assert!(matches!(parse_date(Some("99999999")), DateField::Invalid(_)));
    }

    #[test]
    fn iso_rewrite() {
        assert_eq!(to_iso(Some("45292")).as_deref(), Some("2024-01-01"));
        assert_eq!(to_iso(Some("31/12/2024")).as_deref(), Some("2024-12-31"));
        assert_eq!(to_iso(Some("later")), None);
    }
}
