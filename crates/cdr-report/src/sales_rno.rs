//! Final RNO and Sales RNO reports.
//!
//! The sales team annotates the RNO report with a `Status Check` code per
//! row and their own volume columns (`Final_Pcs`, `Final_MWp`). The Final
//! RNO report drops the reconciliation working columns and the settled rows;
//! the Sales RNO report summarises what is left per status, salesman and
//! location. BMO reads the push figures back from its `Main Data` sheet.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{info, info_span, warn};

use cdr_ingest::{read_with_schema_skipping, reconcile_headers};
use cdr_model::SalesRnoConfig;
use cdr_model::columns::{
    ESCALATION_REMINDER, FINAL_MWP, FINAL_OUTBOUND_PLAN, FINAL_PCS, OUTBOUND_MONTH, REGION_INFO,
    SALESMAN, STATUS_CHECK, STATUS_LOCATION, STATUS_STANDARD_DUE,
};
use cdr_model::schema::{
    ANNOTATED_RNO_SCHEMA, FINAL_RNO_PROJECTION, SALES_RNO_PROJECTION, SALES_RNO_SCHEMA,
};
use cdr_transform::data_utils::{
    column_f64s, column_strings, filter_rows, has_column, optional_column_dates,
};
use cdr_transform::filter::{and, non_blank, not, value_in};
use cdr_transform::{
    GroupedSums, PivotTable, Window, grouped_sums, pivot_sum, project, round2, window_mask,
};

use crate::context::{ReportContext, ReportSummary};
use crate::error::CdrError;
use crate::writer::ReportWriter;

pub const FINAL_RNO_STEM: &str = "Final_RNO_Report";
pub const SALES_RNO_STEM: &str = "Sales_RNO_Report";
pub const MAIN_DATA_SHEET: &str = "Main Data";
pub const STATUS_SUMMARY_SHEET: &str = "Status Summary";
pub const SALES_PUSH_SHEET: &str = "Sales to Push(B_D)";
pub const LOCATION_SHEET: &str = "Current Location Goods";
pub const GRAND_TOTAL: &str = "Grand Total";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FinalRnoStats {
    pub input_rows: usize,
    pub status_dropped: usize,
    pub escalation_dropped: usize,
}

/// Drops working columns, settled or unchecked statuses and escalated rows.
///
/// Each row filter only applies when the workbook carries its column.
pub fn build_final_rno(
    annotated: &DataFrame,
    config: &SalesRnoConfig,
) -> Result<(DataFrame, FinalRnoStats)> {
    let mut stats = FinalRnoStats {
        input_rows: annotated.height(),
        ..FinalRnoStats::default()
    };
    let mut frame = project(annotated, &FINAL_RNO_PROJECTION)?;

    if has_column(&frame, STATUS_CHECK) {
        let statuses = column_strings(&frame, STATUS_CHECK)?;
        let keep = and(
            &non_blank(&statuses),
            &not(&value_in(&statuses, &config.final_excluded_statuses)),
        );
        let before = frame.height();
        frame = filter_rows(&frame, &keep)?;
        stats.status_dropped = before - frame.height();
    }
    if has_column(&frame, ESCALATION_REMINDER) {
        let escalations = column_strings(&frame, ESCALATION_REMINDER)?;
        let before = frame.height();
        frame = filter_rows(&frame, &not(&value_in(&escalations, &config.excluded_escalations)))?;
        stats.escalation_dropped = before - frame.height();
    }
    info!(
        status = stats.status_dropped,
        escalation = stats.escalation_dropped,
        remaining = frame.height(),
        "filtered Final RNO rows"
    );
    Ok((frame, stats))
}

/// The four Sales RNO sheets plus the monthly figures that are only logged.
#[derive(Debug, Clone)]
pub struct SalesRnoReport {
    pub main: DataFrame,
    /// `Final_Pcs` and `Final_MWp` per `Status Check`.
    pub status_summary: GroupedSums,
    /// `Final_MWp` per salesman and region over the sales push statuses.
    pub sales_push: Option<PivotTable>,
    /// `Final_MWp` per location and due state.
    pub location: Option<PivotTable>,
    /// `Final_MWp` per `Outbound_Month` for the monthly status.
    pub monthly: Option<GroupedSums>,
}

fn pivot_if_present(
    frame: &DataFrame,
    index: &str,
    columns: &str,
    include: &[bool],
) -> Result<Option<PivotTable>> {
    if !(has_column(frame, index) && has_column(frame, columns)) {
        warn!(index, columns, "pivot columns missing; sheet skipped");
        return Ok(None);
    }
    Ok(Some(pivot_sum(frame, index, columns, FINAL_MWP, include)?))
}

pub fn build_sales_rno(final_rno: &DataFrame, config: &SalesRnoConfig) -> Result<SalesRnoReport> {
    let frame = project(final_rno, &SALES_RNO_PROJECTION)?;
    let statuses = column_strings(&frame, STATUS_CHECK)?;
    let main = filter_rows(
        &frame,
        &not(&value_in(&statuses, &config.sales_excluded_statuses)),
    )?;

    let statuses = column_strings(&main, STATUS_CHECK)?;
    let every_row = vec![true; main.height()];
    let status_summary = grouped_sums(&main, STATUS_CHECK, &[FINAL_PCS, FINAL_MWP], &every_row)?;
    let sales_push = pivot_if_present(
        &main,
        SALESMAN,
        REGION_INFO,
        &value_in(&statuses, &config.sales_push_statuses),
    )?;
    let location = pivot_if_present(&main, STATUS_LOCATION, STATUS_STANDARD_DUE, &every_row)?;
    let monthly = if has_column(&main, OUTBOUND_MONTH) {
        let monthly_rows = value_in(&statuses, &[config.monthly_status.as_str()]);
        Some(grouped_sums(&main, OUTBOUND_MONTH, &[FINAL_MWP], &monthly_rows)?)
    } else {
        None
    };

    Ok(SalesRnoReport {
        main,
        status_summary,
        sales_push,
        location,
        monthly,
    })
}

/// Open RNO volume by who has to act, in MWp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PushFigures {
    #[serde(rename = "Sales to Push")]
    pub sales_to_push: f64,
    #[serde(rename = "Logistics to Push")]
    pub logistics_to_push: f64,
    /// `Final_MWp` whose `Final_Outbound_Plan` falls in the reference month.
    #[serde(rename = "Outbound_Planned")]
    pub outbound_planned: f64,
}

/// Reads the push figures off a Sales RNO `Main Data` sheet.
pub fn push_figures(
    main: &DataFrame,
    config: &SalesRnoConfig,
    reference: NaiveDate,
) -> Result<PushFigures> {
    let statuses = column_strings(main, STATUS_CHECK)?;
    let megawatts = column_f64s(main, FINAL_MWP)?;
    let planned = window_mask(
        &optional_column_dates(main, FINAL_OUTBOUND_PLAN)?,
        Window::CurrentMonth,
        reference,
    );
    let sum_where = |mask: &[bool]| -> f64 {
        let total: f64 = megawatts
            .iter()
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .map(|(mw, _)| mw.unwrap_or(0.0))
            .sum();
        round2(total)
    };

    Ok(PushFigures {
        sales_to_push: sum_where(&value_in(&statuses, &config.sales_push_statuses)),
        logistics_to_push: sum_where(&value_in(&statuses, &config.logistics_push_statuses)),
        outbound_planned: sum_where(&planned),
    })
}

pub fn run_sales_rno(ctx: &ReportContext<'_>) -> Result<ReportSummary> {
    let span = info_span!("sales_rno", reference = %ctx.reference);
    let _guard = span.enter();
    let paths = &ctx.config.paths;
    let config = &ctx.config.sales_rno;

    let source = paths.annotated_rno();
    let annotated = read_with_schema_skipping(&source, &ANNOTATED_RNO_SCHEMA, config.preamble_rows)
        .with_context(|| format!("read annotated RNO report {}", source.display()))?;
    if annotated.height() == 0 {
        return Err(CdrError::EmptyInput { path: source }.into());
    }

    let (mut final_rno, stats) = build_final_rno(&annotated, config)?;
    let final_path = ReportWriter::new(&paths.rno_reports_dir).write_table(FINAL_RNO_STEM, &final_rno)?;

    reconcile_headers(&mut final_rno, &SALES_RNO_SCHEMA)
        .with_context(|| format!("Sales RNO columns in {}", final_path.display()))?;
    let report = build_sales_rno(&final_rno, config)?;

    let status_frame = report.status_summary.to_frame(GRAND_TOTAL)?;
    let sales_push_frame = report
        .sales_push
        .as_ref()
        .map(|pivot| pivot.to_frame(GRAND_TOTAL))
        .transpose()?;
    let location_frame = report
        .location
        .as_ref()
        .map(|pivot| pivot.to_frame(GRAND_TOTAL))
        .transpose()?;
    let mut sheets: Vec<(&str, &DataFrame)> = vec![
        (MAIN_DATA_SHEET, &report.main),
        (STATUS_SUMMARY_SHEET, &status_frame),
    ];
    if let Some(frame) = &sales_push_frame {
        sheets.push((SALES_PUSH_SHEET, frame));
    }
    if let Some(frame) = &location_frame {
        sheets.push((LOCATION_SHEET, frame));
    }
    let outputs = ReportWriter::new(&paths.sales_rno_reports_dir)
        .write_workbook(&format!("{SALES_RNO_STEM}_{}", ctx.file_stamp()), &sheets)?;

    for (status, sums) in &report.status_summary.groups {
        info!(status = %status, pieces = sums[0], mw = round2(sums[1]), "status check");
    }
    if let Some(monthly) = &report.monthly {
        for (month, sums) in &monthly.groups {
            info!(
                month = %month,
                status = %config.monthly_status,
                mw = round2(sums[0]),
                "monthly outbound"
            );
        }
    }

    let mut summary =
        ReportSummary::new("sales-rno").with_rows(annotated.height(), report.main.height());
    summary.push_output(final_path);
    for path in outputs {
        summary.push_output(path);
    }
    summary.push_detail("source", source.display());
    summary.push_detail("final RNO rows", final_rno.height());
    summary.push_detail("status dropped", stats.status_dropped);
    summary.push_detail("escalation dropped", stats.escalation_dropped);
    let totals = report.status_summary.totals();
    summary.push_detail("total MWp", round2(totals[1]));
    Ok(summary)
}
