//! BMO report: month-to-date outbound rows and the target summary.
//!
//! When a Sales RNO report exists, the summary also carries the open volume
//! still to push and the gap to the month target.

use std::fmt;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use polars::prelude::{DataFrame, NamedFrom, Series};
use serde::Serialize;
use tracing::{info, info_span, warn};

use cdr_ingest::{IngestError, find_latest_report, read_with_schema, to_iso};
use cdr_model::BmoConfig;
use cdr_model::columns::{MEGAWATTAGE, MEGAWATTAGE_NUMERIC, OUTBOUND_DATE};
use cdr_model::schema::{
    BMO_PROJECTION, BMO_SHEET_SCHEMA, OUTBOUND_SHEET_SCHEMA, SALES_RNO_SCHEMA,
};
use cdr_transform::data_utils::{
    column_strings, filter_rows, has_column, optional_column_dates, optional_column_f64s,
    set_strings,
};
use cdr_transform::{Window, project, round2, window_mask};

use crate::context::{ReportContext, ReportSummary};
use crate::logistics::{LOGISTICS_STEM, OUTBOUND_SHEET};
use crate::sales_rno::{MAIN_DATA_SHEET, PushFigures, SALES_RNO_STEM, push_figures};
use crate::writer::{ReportWriter, sheet_file_name};

pub const BMO_STEM: &str = "bmo-report";
pub const BMO_SHEET: &str = BMO_SHEET_SCHEMA.name;
pub const SUMMARY_SHEET: &str = "Summary";
pub const SUMMARY_LABEL_COLUMN: &str = "JA Solar Logistics Report";
pub const SUMMARY_VALUE_COLUMN: &str = "Mwps";

/// Month target against what has left the warehouse so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BmoSummary {
    pub month_target: f64,
    pub total_working_days: u32,
    pub working_days_till_today: u32,
    pub outbound_today: f64,
    #[serde(rename = "Accumulated_Outbound_MTD")]
    pub accumulated_outbound_mtd: f64,
    pub outbound_needed_to_achieve_target: f64,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub push: Option<PushFigures>,
}

/// `value` as a share of `target`, e.g. `62.5%`. A zero target reads `0%`.
fn percent_of(value: f64, target: f64) -> String {
    let share = if target == 0.0 {
        0.0
    } else {
        round2(value / target * 100.0)
    };
    format!("{share}%")
}

impl BmoSummary {
    #[must_use]
    pub fn with_push(mut self, push: PushFigures) -> Self {
        self.push = Some(push);
        self
    }

    /// Accumulated outbound plus what is planned for the rest of the month.
    pub fn accumulated_and_planned(&self) -> Option<f64> {
        self.push
            .map(|push| round2(self.accumulated_outbound_mtd + push.outbound_planned))
    }

    /// Distance between the month target and accumulated plus planned outbound.
    pub fn gap_target(&self) -> Option<f64> {
        self.accumulated_and_planned()
            .map(|planned| round2(self.month_target - planned).abs())
    }

    /// `(label, value)` pairs in sheet order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("Month_Target", self.month_target.to_string()),
            ("Total_Working_Days", self.total_working_days.to_string()),
            ("Working_Days_Till_Today", self.working_days_till_today.to_string()),
            ("Outbound_Today", self.outbound_today.to_string()),
            ("Accumulated_Outbound_MTD", self.accumulated_outbound_mtd.to_string()),
            (
                "Outbound_Needed_To_Achieve_Target",
                self.outbound_needed_to_achieve_target.to_string(),
            ),
        ];
        if let (Some(push), Some(planned), Some(gap)) =
            (self.push, self.accumulated_and_planned(), self.gap_target())
        {
            rows.extend([
                ("Sales to Push", push.sales_to_push.to_string()),
                ("Logistics to Push", push.logistics_to_push.to_string()),
                ("Outbound_Planned", push.outbound_planned.to_string()),
                ("Accumlate_&_Planned_Outbound", planned.to_string()),
                ("Gap_Target", gap.to_string()),
                (
                    "Vs_Target_Outbound_(%)",
                    percent_of(self.accumulated_outbound_mtd, self.month_target),
                ),
                (
                    "Vs_Target_Outbound_Planned_(%)",
                    percent_of(planned, self.month_target),
                ),
            ]);
        }
        rows
    }

    /// The two-column `Summary` sheet.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let (labels, values): (Vec<&str>, Vec<String>) = self.rows().into_iter().unzip();
        Ok(DataFrame::new(vec![
            Series::new(SUMMARY_LABEL_COLUMN.into(), labels).into(),
            Series::new(SUMMARY_VALUE_COLUMN.into(), values).into(),
        ])?)
    }
}

impl fmt::Display for BmoSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in self.rows() {
            writeln!(f, "{label}: {value}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BmoReport {
    pub mtd: DataFrame,
    pub summary: BmoSummary,
}

/// Numeric MegaWattage per row, preferring the pre-parsed column.
fn megawattage_values(frame: &DataFrame) -> Result<Vec<Option<f64>>> {
    let column = if has_column(frame, MEGAWATTAGE_NUMERIC) {
        MEGAWATTAGE_NUMERIC
    } else {
        MEGAWATTAGE
    };
    Ok(optional_column_f64s(frame, column)?)
}

/// Keeps outbound rows dated from the first of the month through `reference`.
pub fn build_bmo(sheet: &DataFrame, config: &BmoConfig, reference: NaiveDate) -> Result<BmoReport> {
    let dates = optional_column_dates(sheet, OUTBOUND_DATE)?;
    let mtd_mask = window_mask(&dates, Window::MonthToDate, reference);
    let today_mask = window_mask(&dates, Window::Day, reference);
    let megawattage = megawattage_values(sheet)?;

    let sum_where = |mask: &[bool]| -> f64 {
        megawattage
            .iter()
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .map(|(mw, _)| mw.unwrap_or(0.0))
            .sum()
    };
    let accumulated = round2(sum_where(&mtd_mask));
    let summary = BmoSummary {
        month_target: config.month_target_mw,
        total_working_days: config.total_working_days,
        working_days_till_today: config.working_days_till_today,
        outbound_today: round2(sum_where(&today_mask)),
        accumulated_outbound_mtd: accumulated,
        outbound_needed_to_achieve_target: round2(config.month_target_mw - accumulated),
        push: None,
    };

    let mut mtd = filter_rows(sheet, &mtd_mask)?;
    if has_column(&mtd, OUTBOUND_DATE) {
        let iso = column_strings(&mtd, OUTBOUND_DATE)?
            .iter()
            .map(|raw| to_iso(raw.as_deref()))
            .collect();
        set_strings(&mut mtd, OUTBOUND_DATE, iso)?;
    }
    let mtd = project(&mtd, &BMO_PROJECTION)?;

    Ok(BmoReport { mtd, summary })
}

/// Push figures from the newest Sales RNO `Main Data` sheet, if there is one.
fn latest_push_figures(ctx: &ReportContext<'_>) -> Result<Option<PushFigures>> {
    let dir = &ctx.config.paths.sales_rno_reports_dir;
    let pattern = sheet_file_name(&format!("{SALES_RNO_STEM}_*"), MAIN_DATA_SHEET);
    let path = match find_latest_report(dir, &[pattern.as_str()]) {
        Ok(path) => path,
        Err(IngestError::DirectoryNotFound { .. } | IngestError::NoReportFound { .. }) => {
            warn!(dir = %dir.display(), "no Sales RNO report; push figures omitted");
            return Ok(None);
        }
        Err(error) => return Err(error).context("locate latest Sales RNO report"),
    };
    let main = read_with_schema(&path, &SALES_RNO_SCHEMA)
        .with_context(|| format!("read {}", path.display()))?;
    let push = push_figures(&main, &ctx.config.sales_rno, ctx.reference)?;
    info!(
        path = %path.display(),
        sales_mw = push.sales_to_push,
        logistics_mw = push.logistics_to_push,
        planned_mw = push.outbound_planned,
        "push figures"
    );
    Ok(Some(push))
}

pub fn run_bmo(ctx: &ReportContext<'_>) -> Result<ReportSummary> {
    let span = info_span!("bmo", reference = %ctx.reference);
    let _guard = span.enter();
    let paths = &ctx.config.paths;

    let pattern = sheet_file_name(&format!("{LOGISTICS_STEM}_*"), OUTBOUND_SHEET);
    let source = find_latest_report(&paths.logistics_reports_dir, &[pattern.as_str()])
        .context("locate latest logistics report")?;
    let sheet = read_with_schema(&source, &OUTBOUND_SHEET_SCHEMA)
        .with_context(|| format!("read {}", source.display()))?;

    let mut report = build_bmo(&sheet, &ctx.config.bmo, ctx.reference)?;
    if let Some(push) = latest_push_figures(ctx)? {
        report.summary = report.summary.with_push(push);
    }
    info!(
        rows = report.mtd.height(),
        accumulated_mw = report.summary.accumulated_outbound_mtd,
        today_mw = report.summary.outbound_today,
        needed_mw = report.summary.outbound_needed_to_achieve_target,
        "month-to-date outbound"
    );

    let summary_frame = report.summary.to_frame()?;
    let outputs = ReportWriter::new(&paths.bmo_reports_dir).write_workbook(
        &format!("{BMO_STEM}_{}", ctx.run_date()),
        &[(BMO_SHEET, &report.mtd), (SUMMARY_SHEET, &summary_frame)],
    )?;

    let mut summary = ReportSummary::new("bmo").with_rows(sheet.height(), report.mtd.height());
    summary.push_detail("source", source.display());
    for (label, value) in report.summary.rows() {
        summary.push_detail(label, value);
    }
    for path in outputs {
        summary.push_output(path);
    }
    Ok(summary)
}
