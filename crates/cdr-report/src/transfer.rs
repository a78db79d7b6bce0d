//! Daily transfer: `daily_report` → enriched `current_report`.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use cdr_ingest::reconcile_headers;
use cdr_model::columns::STORE_DATE_COLUMNS;
use cdr_model::schema::DAILY_REPORT_SCHEMA;
use cdr_store::{RowSet, TableStore, fetch_non_empty, replace_all};
use cdr_transform::enrich_daily;

use crate::context::{ReportContext, ReportSummary};

pub fn run_transfer(ctx: &ReportContext<'_>, store: &mut dyn TableStore) -> Result<ReportSummary> {
    let span = info_span!("transfer", reference = %ctx.reference);
    let _guard = span.enter();
    let settings = &ctx.config.store;

    let raw = fetch_non_empty(&*store, &settings.daily_table, settings.page_size)
        .with_context(|| format!("fetch {}", settings.daily_table))?;
    let mut frame = raw.to_frame()?;
    reconcile_headers(&mut frame, &DAILY_REPORT_SCHEMA)
        .with_context(|| format!("match {} headers", settings.daily_table))?;

    let enriched = enrich_daily(&frame, &ctx.config.rules, ctx.reference)?;
    let mut rows = RowSet::from_frame(&enriched.frame)?;
    let rejected_dates = rows.iso_date_columns(STORE_DATE_COLUMNS);

    let replaced = replace_all(
        store,
        &settings.current_table,
        &rows,
        settings.batch_size,
        settings.transfer_failure,
    )
    .with_context(|| format!("replace {}", settings.current_table))?;

    info!(
        table = %settings.current_table,
        inserted = replaced.inserted,
        rejected_dates,
        "transfer complete"
    );

    let stats = &enriched.stats;
    let mut summary = ReportSummary::new("transfer").with_rows(stats.input_rows, replaced.inserted);
    summary.push_detail("blank container rows", stats.blank_container_rows);
    summary.push_detail("archived rows", stats.archived_rows);
    summary.push_detail("blanked agreed dates", stats.blanked_agreed_dates);
    summary.push_detail("unparseable outbound dates", stats.invalid_outbound_dates);
    summary.push_detail("unparseable dates nulled", rejected_dates);
    summary.push_detail("failed batches", replaced.failed_batches.len());
    Ok(summary)
}
