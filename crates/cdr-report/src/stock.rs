//! Stock extract: current CDR rows that are still in the warehouse.

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{info, info_span};

use cdr_ingest::{CDR_REPORT_PATTERNS, find_latest_report, read_with_schema};
use cdr_model::CurrentStatus;
use cdr_model::columns::{CURRENT_STATUS, DATA_SOURCE};
use cdr_model::schema::CDR_SCHEMA;
use cdr_transform::data_utils::{filter_rows, optional_column_strings};
use cdr_transform::filter::{and, equals_ignore_case};

use crate::consolidate::CURRENT_SOURCE;
use crate::context::{ReportContext, ReportSummary};
use crate::writer::ReportWriter;

/// Dated snapshots only; the wider CDR patterns are the fallback.
pub const STOCK_SOURCE_PATTERNS: &[&str] = &["CDR_????-??-??.csv"];

/// Rows tagged `current` whose `Current_Status` is in-stock, ignoring case
/// and surrounding whitespace.
pub fn build_stock(cdr: &DataFrame) -> Result<DataFrame> {
    let current = equals_ignore_case(&optional_column_strings(cdr, DATA_SOURCE)?, CURRENT_SOURCE);
    let in_stock = equals_ignore_case(
        &optional_column_strings(cdr, CURRENT_STATUS)?,
        CurrentStatus::InStock.as_str(),
    );
    Ok(filter_rows(cdr, &and(&current, &in_stock))?)
}

pub fn run_stock(ctx: &ReportContext<'_>) -> Result<ReportSummary> {
    let span = info_span!("stock", reference = %ctx.reference);
    let _guard = span.enter();
    let paths = &ctx.config.paths;

    let source = find_latest_report(&paths.cdr_reports_dir, STOCK_SOURCE_PATTERNS)
        .or_else(|_| find_latest_report(&paths.cdr_reports_dir, CDR_REPORT_PATTERNS))
        .with_context(|| format!("locate latest CDR in {}", paths.cdr_reports_dir.display()))?;
    let cdr = read_with_schema(&source, &CDR_SCHEMA)
        .with_context(|| format!("read {}", source.display()))?;

    let stock = build_stock(&cdr)?;
    info!(rows = cdr.height(), in_stock = stock.height(), "extracted stock");

    let stem = source
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("CDR")
        .to_string();
    let path = ReportWriter::new(&paths.stock_reports_dir).write_table(&stem, &stock)?;

    let mut summary = ReportSummary::new("stock").with_rows(cdr.height(), stock.height());
    summary.push_output(path);
    summary.push_detail("source", source.display());
    Ok(summary)
}
