//! CSV output for report frames.
//!
//! A workbook with several sheets is written as one `<stem>.<sheet>.csv`
//! file per sheet. Existing outputs are deleted first; the write is not
//! atomic and the last writer wins.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::WriterBuilder;
use polars::prelude::DataFrame;
use tracing::{debug, info};

use cdr_transform::data_utils::{column_names, column_strings};

/// File name of one sheet of a workbook.
pub fn sheet_file_name(stem: &str, sheet: &str) -> String {
    format!("{stem}.{sheet}.csv")
}

/// Writes report files into one output directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writes `<stem>.csv`.
    pub fn write_table(&self, stem: &str, frame: &DataFrame) -> Result<PathBuf> {
        let path = self.dir.join(format!("{stem}.csv"));
        self.replace(&path, frame)?;
        Ok(path)
    }

    /// Writes one file per `(sheet name, frame)` pair.
    pub fn write_workbook(&self, stem: &str, sheets: &[(&str, &DataFrame)]) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(sheets.len());
        for (sheet, frame) in sheets {
            let path = self.dir.join(sheet_file_name(stem, sheet));
            self.replace(&path, frame)?;
            paths.push(path);
        }
        Ok(paths)
    }

    fn replace(&self, path: &Path, frame: &DataFrame) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create {}", self.dir.display()))?;
        if path.exists() {
            fs::remove_file(path).with_context(|| format!("delete {}", path.display()))?;
            debug!(path = %path.display(), "deleted existing output");
        }
        write_frame_csv(path, frame)?;
        info!(path = %path.display(), rows = frame.height(), "wrote report");
        Ok(())
    }
}

/// Writes `frame` as a comma-separated file with a header row. Nulls are empty cells.
pub fn write_frame_csv(path: &Path, frame: &DataFrame) -> Result<()> {
    let headers = column_names(frame);
    let mut columns = Vec::with_capacity(headers.len());
    for name in &headers {
        columns.push(column_strings(frame, name).with_context(|| format!("read column {name}"))?);
    }

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    writer
        .write_record(&headers)
        .with_context(|| format!("write header: {}", path.display()))?;
    for row in 0..frame.height() {
        let record = columns
            .iter()
            .map(|values| values[row].as_deref().unwrap_or(""));
        writer
            .write_record(record)
            .with_context(|| format!("write record {row}: {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}
