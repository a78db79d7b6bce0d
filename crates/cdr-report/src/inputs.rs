//! Loading the files reports share: the latest CDR, WMS exports and the removal list.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::info;

use cdr_ingest::{CDR_REPORT_PATTERNS, find_latest_report, read_with_schema};
use cdr_model::columns::{REF1, WMS_CONTAINER_NUMBER, WMS_QUANTITY, WMS_RELEASE_NUMBER};
use cdr_model::schema::{CDR_SCHEMA, REMOVAL_LIST_SCHEMA, WMS_SCHEMA};
use cdr_transform::data_utils::{column_f64s, column_strings, has_column};
use cdr_transform::normalize::ref1_values;
use cdr_transform::{KeyTotals, sum_by_key};

use crate::error::CdrError;

/// Exports in a WMS folder; any CSV qualifies.
pub const WMS_EXPORT_PATTERNS: &[&str] = &["*.csv"];

/// Reads the newest CDR snapshot in `dir`.
pub fn load_latest_cdr(dir: &Path) -> Result<(PathBuf, DataFrame)> {
    let path = find_latest_report(dir, CDR_REPORT_PATTERNS)
        .with_context(|| format!("locate latest CDR in {}", dir.display()))?;
    let frame =
        read_with_schema(&path, &CDR_SCHEMA).with_context(|| format!("read {}", path.display()))?;
    info!(path = %path.display(), rows = frame.height(), "loaded CDR");
    Ok((path, frame))
}

/// Sums `Quantity` per `Ref1` over one WMS export.
///
/// Exports without a `Ref1` column get one built from their release and
/// container numbers.
pub fn load_wms_totals(path: &Path) -> Result<KeyTotals> {
    let frame =
        read_with_schema(path, &WMS_SCHEMA).with_context(|| format!("read {}", path.display()))?;
    let keys: Vec<Option<String>> = if has_column(&frame, REF1) {
        column_strings(&frame, REF1)?
    } else if has_column(&frame, WMS_RELEASE_NUMBER) && has_column(&frame, WMS_CONTAINER_NUMBER) {
        ref1_values(&frame, WMS_RELEASE_NUMBER, WMS_CONTAINER_NUMBER)?
            .into_iter()
            .map(Some)
            .collect()
    } else {
        return Err(CdrError::MissingWmsKey {
            path: path.to_path_buf(),
        }
        .into());
    };
    let quantities = column_f64s(&frame, WMS_QUANTITY)?;
    let totals = sum_by_key(&keys, &quantities, |_| true);
    info!(
        path = %path.display(),
        rows = frame.height(),
        keys = totals.len(),
        pieces = totals.total(),
        "loaded WMS export"
    );
    Ok(totals)
}

/// [`load_wms_totals`] over the newest export in `dir`.
pub fn load_latest_wms_totals(dir: &Path) -> Result<KeyTotals> {
    let path = find_latest_report(dir, WMS_EXPORT_PATTERNS)
        .with_context(|| format!("locate latest WMS export in {}", dir.display()))?;
    load_wms_totals(&path)
}

/// `Ref1` values listed in a removal file.
pub fn load_removal_keys(path: &Path) -> Result<BTreeSet<String>> {
    let frame = read_with_schema(path, &REMOVAL_LIST_SCHEMA)
        .with_context(|| format!("read removal list {}", path.display()))?;
    Ok(column_strings(&frame, REF1)?
        .into_iter()
        .flatten()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .collect())
}
