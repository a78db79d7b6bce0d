//! Typed view of one logistics transaction line.

use chrono::{Datelike, NaiveDate};

/// A date cell after it has been resolved once at ingestion.
///
/// `Invalid` keeps the raw text so reports can show what was rejected; the
/// classifiers treat it as "present but unparseable".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DateField {
    #[default]
    Missing,
    Valid(NaiveDate),
    Invalid(String),
}

impl DateField {
    pub fn is_missing(&self) -> bool {
        matches!(self, DateField::Missing)
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DateField::Valid(date) => Some(*date),
            _ => None,
        }
    }

    pub fn year(&self) -> Option<i32> {
        self.date().map(|date| date.year())
    }
}

impl From<Option<NaiveDate>> for DateField {
    fn from(value: Option<NaiveDate>) -> Self {
        match value {
            Some(date) => DateField::Valid(date),
            None => DateField::Missing,
        }
    }
}

/// One shipment line with the fields the classifiers and aggregators need.
///
/// Identifiers are stored already normalized (see `cdr_transform::normalize`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipmentRecord {
    pub release_number: Option<String>,
    pub container_number: Option<String>,
    /// Wattage exactly as exported; `Ref2` concatenates this text.
    pub wattage_text: Option<String>,
    pub wattage: Option<f64>,
    pub piece: Option<f64>,
    pub inbound_date: DateField,
    pub outbound_date: DateField,
    pub agreed_delivery_date: DateField,
    pub delivery_date: DateField,
    pub release_date: DateField,
}

impl ShipmentRecord {
    /// `Piece × Wattage`, or `None` when either side is missing.
    pub fn power(&self) -> Option<f64> {
        Some(self.piece? * self.wattage?)
    }

    pub fn megawattage(&self) -> Option<f64> {
        self.power().map(|power| power / 1_000_000.0)
    }
}
