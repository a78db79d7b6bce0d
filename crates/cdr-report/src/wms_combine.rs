//! WMS export preparation.
//!
//! Raw exports carry title lines above their header row. Every outbound
//! export is stacked into one `Combined_Outbound_WMS_<YYYYMMDD>` report,
//! tagged with the file it came from; only the newest stock export becomes
//! `WMS_Stock_Report_<YYYYMMDD>`. Both gain a `Ref1` key, and both land in
//! the folders the RNO and WMS comparisons read from.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{info, info_span, warn};

use cdr_ingest::{find_latest_report, list_matching, read_with_schema_skipping};
use cdr_model::columns::{REF1, SOURCE_FILE, WMS_CONTAINER_NUMBER, WMS_RELEASE_NUMBER};
use cdr_model::schema::{WMS_COMBINED_PROJECTION, WMS_SCHEMA};
use cdr_store::RowSet;
use cdr_transform::data_utils::{has_column, set_strings};
use cdr_transform::normalize::ref1_values;
use cdr_transform::project;

use crate::context::{ReportContext, ReportSummary};
use crate::error::CdrError;
use crate::inputs::WMS_EXPORT_PATTERNS;
use crate::writer::ReportWriter;

pub const COMBINED_OUTBOUND_STEM: &str = "Combined_Outbound_WMS";
pub const WMS_STOCK_STEM: &str = "WMS_Stock_Report";

/// Reads one raw export and keys it by release and container number.
/// An export that already carries `Ref1` keeps it.
pub fn read_wms_export(path: &Path, preamble_rows: usize) -> Result<DataFrame> {
    let mut frame = read_with_schema_skipping(path, &WMS_SCHEMA, preamble_rows)
        .with_context(|| format!("read WMS export {}", path.display()))?;
    if has_column(&frame, REF1) {
        return Ok(frame);
    }
    if !(has_column(&frame, WMS_RELEASE_NUMBER) && has_column(&frame, WMS_CONTAINER_NUMBER)) {
        return Err(CdrError::MissingWmsKey {
            path: path.to_path_buf(),
        }
        .into());
    }
    let keys = ref1_values(&frame, WMS_RELEASE_NUMBER, WMS_CONTAINER_NUMBER)?;
    set_strings(&mut frame, REF1, keys.into_iter().map(Some).collect())?;
    Ok(frame)
}

#[derive(Debug, Clone)]
pub struct CombinedExports {
    pub frame: DataFrame,
    pub combined: Vec<PathBuf>,
    /// Exports that could not be read; they are logged and left out.
    pub skipped: Vec<PathBuf>,
}

/// Stacks every export in `dir`. Columns are the union over all files.
pub fn combine_wms_exports(dir: &Path, preamble_rows: usize) -> Result<CombinedExports> {
    let mut files = Vec::new();
    for pattern in WMS_EXPORT_PATTERNS {
        files.extend(list_matching(dir, pattern)?);
    }

    let mut rows = RowSet::default();
    let (mut combined, mut skipped) = (Vec::new(), Vec::new());
    for path in files {
        let frame = match read_wms_export(&path, preamble_rows) {
            Ok(frame) => frame,
            Err(error) => {
                warn!(path = %path.display(), error = %format!("{error:#}"), "skipping WMS export");
                skipped.push(path);
                continue;
            }
        };
        let mut part = RowSet::from_frame(&frame)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        part.set_constant(SOURCE_FILE, &name);
        info!(file = %name, rows = part.len(), "combined WMS export");
        rows.append(&part);
        combined.push(path);
    }

    if combined.is_empty() {
        return Err(CdrError::NoWmsExports {
            dir: dir.to_path_buf(),
        }
        .into());
    }
    let frame = project(&rows.to_frame()?, &WMS_COMBINED_PROJECTION)?;
    Ok(CombinedExports {
        frame,
        combined,
        skipped,
    })
}

pub fn run_wms_combine(ctx: &ReportContext<'_>) -> Result<ReportSummary> {
    let span = info_span!("wms_combine", reference = %ctx.reference);
    let _guard = span.enter();
    let paths = &ctx.config.paths;
    let preamble_rows = ctx.config.wms.preamble_rows;

    let outbound = combine_wms_exports(&paths.wms_outbound_exports_dir, preamble_rows)?;
    let outbound_path = ReportWriter::new(&paths.wms_outbound_dir).write_table(
        &format!("{COMBINED_OUTBOUND_STEM}_{}", ctx.file_stamp()),
        &outbound.frame,
    )?;

    let stock_source = find_latest_report(&paths.wms_stock_exports_dir, WMS_EXPORT_PATTERNS)
        .with_context(|| {
            format!(
                "locate latest WMS stock export in {}",
                paths.wms_stock_exports_dir.display()
            )
        })?;
    let stock = read_wms_export(&stock_source, preamble_rows)?;
    let stock_path = ReportWriter::new(&paths.wms_stock_dir)
        .write_table(&format!("{WMS_STOCK_STEM}_{}", ctx.file_stamp()), &stock)?;

    let mut summary = ReportSummary::new("wms-combine")
        .with_rows(outbound.frame.height() + stock.height(), outbound.frame.height());
    summary.push_output(outbound_path);
    summary.push_output(stock_path);
    summary.push_detail("outbound exports", outbound.combined.len());
    summary.push_detail("outbound rows", outbound.frame.height());
    summary.push_detail("skipped exports", outbound.skipped.len());
    summary.push_detail("stock source", stock_source.display());
    summary.push_detail("stock rows", stock.height());
    Ok(summary)
}
