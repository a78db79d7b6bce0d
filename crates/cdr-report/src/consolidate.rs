//! Consolidated CDR: `current_report` ∪ `archive_data`, written as a dated
//! snapshot and into `consolidated_report`.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use cdr_model::columns::{DATA_SOURCE, STORE_DATE_COLUMNS};
use cdr_store::{RowSet, TableStore, fetch_all, replace_all};

use crate::context::{ReportContext, ReportSummary};
use crate::error::CdrError;
use crate::writer::ReportWriter;

pub const CURRENT_SOURCE: &str = "current";
pub const ARCHIVE_SOURCE: &str = "archive";

/// Stacks the current and archive rows, tagging each with its source.
///
/// The column list is the union of both, current columns first. An empty
/// side contributes nothing, not even its tag.
pub fn union_sources(mut current: RowSet, mut archive: RowSet) -> RowSet {
    if !current.is_empty() {
        current.set_constant(DATA_SOURCE, CURRENT_SOURCE);
    }
    if !archive.is_empty() {
        archive.set_constant(DATA_SOURCE, ARCHIVE_SOURCE);
    }
    let mut combined = RowSet::default();
    for part in [&current, &archive] {
        if !part.is_empty() {
            combined.append(part);
        }
    }
    combined
}

pub fn run_consolidate(
    ctx: &ReportContext<'_>,
    store: &mut dyn TableStore,
) -> Result<ReportSummary> {
    let span = info_span!("consolidate", reference = %ctx.reference);
    let _guard = span.enter();
    let settings = &ctx.config.store;

    let current = fetch_all(&*store, &settings.current_table, settings.page_size)
        .with_context(|| format!("fetch {}", settings.current_table))?;
    let archive = fetch_all(&*store, &settings.archive_table, settings.page_size)
        .with_context(|| format!("fetch {}", settings.archive_table))?;
    let (current_rows, archive_rows) = (current.len(), archive.len());
    info!(current = current_rows, archive = archive_rows, "fetched sources");

    let mut combined = union_sources(current, archive);
    if combined.is_empty() {
        return Err(CdrError::NothingToConsolidate {
            tables: vec![settings.current_table.clone(), settings.archive_table.clone()],
        }
        .into());
    }
    let rejected_dates = combined.iso_date_columns(STORE_DATE_COLUMNS);

    let frame = combined.to_frame()?;
    let writer = ReportWriter::new(&ctx.config.paths.cdr_reports_dir);
    let path = writer.write_table(&format!("CDR_{}", ctx.run_date()), &frame)?;

    let replaced = replace_all(
        store,
        &settings.consolidated_table,
        &combined,
        settings.batch_size,
        settings.consolidate_failure,
    )
    .with_context(|| format!("replace {}", settings.consolidated_table))?;

    let mut summary = ReportSummary::new("consolidate")
        .with_rows(current_rows + archive_rows, combined.len());
    summary.push_output(path);
    summary.push_detail("current rows", current_rows);
    summary.push_detail("archive rows", archive_rows);
    summary.push_detail("columns", combined.columns.len());
    summary.push_detail("unparseable dates nulled", rejected_dates);
    summary.push_detail("rows stored", replaced.inserted);
    summary.push_detail("failed batches", replaced.failed_batches.len());
    Ok(summary)
}
