//! Shared state for one run of the reports.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::path::PathBuf;

use cdr_ingest::format_iso;
use cdr_model::AppConfig;

/// Configuration and the reference date every window is anchored on.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub config: &'a AppConfig,
    pub reference: NaiveDate,
}

impl<'a> ReportContext<'a> {
    pub fn new(config: &'a AppConfig, reference: NaiveDate) -> Self {
        Self { config, reference }
    }

    /// Anchors the run on the local calendar date.
    pub fn today(config: &'a AppConfig) -> Self {
        Self::new(config, Local::now().date_naive())
    }

    /// `YYYY-MM-DD` of the reference date, used in output file names.
    pub fn run_date(&self) -> String {
        format_iso(self.reference)
    }

    /// `YYYYMMDD` of the reference date, for the RNO and WMS file names.
    pub fn file_stamp(&self) -> String {
        self.reference.format("%Y%m%d").to_string()
    }
}

/// What one report read and wrote.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportSummary {
    pub report: String,
    pub input_rows: usize,
    pub output_rows: usize,
    pub outputs: Vec<PathBuf>,
    /// Report-specific figures, in display order.
    pub details: Vec<(String, String)>,
}

impl ReportSummary {
    pub fn new(report: impl Into<String>) -> Self {
        Self {
            report: report.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_rows(mut self, input_rows: usize, output_rows: usize) -> Self {
        self.input_rows = input_rows;
        self.output_rows = output_rows;
        self
    }

    pub fn push_output(&mut self, path: PathBuf) {
        self.outputs.push(path);
    }

    pub fn push_detail(&mut self, key: impl Into<String>, value: impl ToString) {
        self.details.push((key.into(), value.to_string()));
    }

    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}
