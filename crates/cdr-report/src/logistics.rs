//! Logistics report: the CDR sheet and the outbound sheet built from the latest CDR.

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use polars::prelude::DataFrame;
use tracing::{info, info_span};

use cdr_model::columns::{
    CURRENT_STATUS, MEGAWATTAGE, MEGAWATTAGE_NUMERIC, OUTBOUND_DATE, OUTBOUND_STATUS,
    RELEASE_NUMBER,
};
use cdr_model::schema::{LOGISTICS_OUTBOUND_PROJECTION, OUTBOUND_SHEET_SCHEMA};
use cdr_model::{OutboundClass, RulesConfig};
use cdr_transform::data_utils::{
    column_strings, filter_rows, has_column, optional_column_dates, optional_column_f64s,
    set_f64s,
};
use cdr_transform::filter::{and, starts_with_any, year_equals, year_not_in};
use cdr_transform::{StatusSummary, Window, project, status_summary, window_mask};

use crate::context::{ReportContext, ReportSummary};
use crate::inputs::load_latest_cdr;
use crate::writer::ReportWriter;

pub const LOGISTICS_STEM: &str = "logistics-report";
pub const CDR_SHEET: &str = "CDR Report";
pub const OUTBOUND_SHEET: &str = OUTBOUND_SHEET_SCHEMA.name;

/// Both sheets plus the status distributions logged along the way.
#[derive(Debug, Clone)]
pub struct LogisticsReport {
    pub cdr: DataFrame,
    pub outbound: DataFrame,
    /// `Current_Status` over the unfiltered CDR.
    pub before_filters: Option<StatusSummary>,
    /// `Current_Status` over the CDR sheet.
    pub after_filters: Option<StatusSummary>,
    /// `Outbound_status` over the outbound sheet.
    pub outbound_status: Option<StatusSummary>,
    /// `Outbound_status` over outbound rows dated in the reference month.
    pub current_month: Option<StatusSummary>,
}

fn summary_if_present(frame: &DataFrame, status_column: &str) -> Result<Option<StatusSummary>> {
    if !has_column(frame, status_column) {
        return Ok(None);
    }
    Ok(Some(status_summary(frame, status_column, MEGAWATTAGE)?))
}

/// Rows the outbound sheet keeps, before projection.
fn outbound_mask(frame: &DataFrame, rules: &RulesConfig, reference: NaiveDate) -> Result<Vec<bool>> {
    let mut keep = vec![true; frame.height()];
    if has_column(frame, OUTBOUND_STATUS) {
        let moving: Vec<bool> = column_strings(frame, OUTBOUND_STATUS)?
            .iter()
            .map(|class| {
                class
                    .as_deref()
                    .and_then(|class| class.parse::<OutboundClass>().ok())
                    .is_some_and(|class| class.is_outbound_movement())
            })
            .collect();
        keep = and(&keep, &moving);
    }
    if has_column(frame, RELEASE_NUMBER) {
        let releases = column_strings(frame, RELEASE_NUMBER)?;
        keep = and(&keep, &starts_with_any(&releases, &rules.release_prefixes));
    }
    if has_column(frame, OUTBOUND_DATE) {
        let dates = optional_column_dates(frame, OUTBOUND_DATE)?;
        keep = and(&keep, &year_equals(&dates, reference.year()));
        keep = and(&keep, &year_not_in(&dates, &rules.excluded_outbound_years));
    }
    Ok(keep)
}

/// Adds `MegaWattage_numeric` when the frame carries `MegaWattage`.
fn with_numeric_megawattage(mut frame: DataFrame) -> Result<DataFrame> {
    if has_column(&frame, MEGAWATTAGE) {
        let values = optional_column_f64s(&frame, MEGAWATTAGE)?;
        set_f64s(&mut frame, MEGAWATTAGE_NUMERIC, values)?;
    }
    Ok(frame)
}

pub fn build_logistics(
    raw: &DataFrame,
    rules: &RulesConfig,
    reference: NaiveDate,
) -> Result<LogisticsReport> {
    let before_filters = summary_if_present(raw, CURRENT_STATUS)?;

    let dates = optional_column_dates(raw, OUTBOUND_DATE)?;
    let cdr = filter_rows(raw, &year_not_in(&dates, &rules.excluded_outbound_years))?;
    info!(
        removed = raw.height() - cdr.height(),
        remaining = cdr.height(),
        years = ?rules.excluded_outbound_years,
        "removed excluded outbound years"
    );

    let outbound = filter_rows(raw, &outbound_mask(raw, rules, reference)?)?;
    let outbound = project(&outbound, &LOGISTICS_OUTBOUND_PROJECTION)?;

    let after_filters = summary_if_present(&cdr, CURRENT_STATUS)?;
    let outbound_status = summary_if_present(&outbound, OUTBOUND_STATUS)?;
    let current_month = if has_column(&outbound, OUTBOUND_STATUS) {
        let month = window_mask(
            &optional_column_dates(&outbound, OUTBOUND_DATE)?,
            Window::CurrentMonth,
            reference,
        );
        summary_if_present(&filter_rows(&outbound, &month)?, OUTBOUND_STATUS)?
    } else {
        None
    };

    Ok(LogisticsReport {
        cdr: with_numeric_megawattage(cdr)?,
        outbound: with_numeric_megawattage(outbound)?,
        before_filters,
        after_filters,
        outbound_status,
        current_month,
    })
}

/// Logs one status distribution, one line per status.
pub fn log_status_summary(label: &str, summary: &StatusSummary) {
    info!(
        label,
        column = %summary.column,
        records = summary.total_records(),
        megawattage = summary.total_megawattage(),
        "status distribution"
    );
    for count in &summary.counts {
        info!(
            label,
            "  {}: {} records, Total MegaWattage: {:.2} MW",
            count.status,
            count.records,
            count.megawattage
        );
    }
}

pub fn run_logistics(ctx: &ReportContext<'_>) -> Result<ReportSummary> {
    let span = info_span!("logistics", reference = %ctx.reference);
    let _guard = span.enter();
    let paths = &ctx.config.paths;

    let (source, raw) = load_latest_cdr(&paths.cdr_reports_dir)?;
    let report = build_logistics(&raw, &ctx.config.rules, ctx.reference)?;

    let month_label = ctx.reference.format("%B %Y").to_string();
    for (label, summary) in [
        ("status distribution", &report.before_filters),
        ("current status after the filters", &report.after_filters),
        ("outbound status after the filters", &report.outbound_status),
        (month_label.as_str(), &report.current_month),
    ] {
        if let Some(summary) = summary {
            log_status_summary(label, summary);
        }
    }

    let writer = ReportWriter::new(&paths.logistics_reports_dir);
    let outputs = writer.write_workbook(
        &format!("{LOGISTICS_STEM}_{}", ctx.run_date()),
        &[(CDR_SHEET, &report.cdr), (OUTBOUND_SHEET, &report.outbound)],
    )?;

    let mut summary =
        ReportSummary::new("logistics").with_rows(raw.height(), report.outbound.height());
    summary.push_detail("source", source.display());
    summary.push_detail("CDR sheet rows", report.cdr.height());
    summary.push_detail("outbound sheet rows", report.outbound.height());
    if let Some(month) = &report.current_month {
        summary.push_detail(
            format!("{month_label} outbound MW"),
            format!("{:.2}", month.total_megawattage()),
        );
    }
    for path in outputs {
        summary.push_output(path);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdr_transform::data_utils::column_names;
    use polars::prelude::*;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn cdr() -> DataFrame {
        df! {
            "Release Number" => ["2001", "5002", "9003", "2004", "2005"],
            "Container No." => ["C1", "C2", "C3", "C4", "C5"],
            "Outbound date" => [Some("2025-03-05"), Some("2025-03-20"), Some("2025-03-01"), Some("2023-06-01"), None],
            "Outbound_status" => ["outbounded", "outbound-planned", "outbounded", "outbounded", "not-outbounded"],
            "Current_Status" => ["Outbounded", "In-Stock", "Outbounded", "Outbounded", "On Sea"],
            "MegaWattage" => ["0.5", "0.25", "1", "2", "0.1"],
            "Vessel" => ["A", "B", "C", "D", "E"],
            "Ref1" => ["2001C1", "5002C2", "9003C3", "2004C4", "2005C5"],
        }
        .unwrap()
    }

    #[test]
    fn builds_both_sheets() {
        let report = build_logistics(&cdr(), &RulesConfig::default(), reference()).unwrap();

        assert_eq!(report.cdr.height(), 4);
        assert_eq!(
            column_strings(&report.outbound, RELEASE_NUMBER).unwrap(),
            vec![Some("2001".to_string()), Some("5002".to_string())]
        );
        let columns = column_names(&report.outbound);
        assert!(!columns.contains(&"Vessel".to_string()));
        assert!(!columns.contains(&"Ref1".to_string()));
        assert!(columns.contains(&MEGAWATTAGE_NUMERIC.to_string()));
        assert!(has_column(&report.cdr, MEGAWATTAGE_NUMERIC));
    }

    #[test]
    fn status_summaries_follow_the_filters() {
        let report = build_logistics(&cdr(), &RulesConfig::default(), reference()).unwrap();

        let before = report.before_filters.unwrap();
        assert_eq!(before.get("Outbounded").unwrap().records, 3);
        let after = report.after_filters.unwrap();
        assert_eq!(after.get("Outbounded").unwrap().records, 2);

        let month = report.current_month.unwrap();
        assert_eq!(month.total_records(), 2);
        assert!((month.total_megawattage() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn only_outbound_movements_reach_the_outbound_sheet() {
        let frame = df! {
            "Release Number" => ["2001", "2002", "2003", "2004"],
            "Outbound date" => ["2025-03-05", "2025-03-06", "2025-03-07", "2025-03-08"],
            "Outbound_status" => [Some(" Outbound-Planned"), Some("not-outbounded"), None, Some("outbounded")],
        }
        .unwrap();

        let keep = outbound_mask(&frame, &RulesConfig::default(), reference()).unwrap();
        assert_eq!(keep, vec![true, false, false, true]);
    }
}
