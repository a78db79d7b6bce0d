//! Released-not-outbounded (RNO) reconciliation.
//!
//! The Europe stock export is the primary side. Every released stock row is
//! enriched with its CDR status, CDR piece sums per status and per container,
//! and the WMS outbound pieces, then compared through the `Case*` flags.
//! Rows the CDR already reports as outbounded are not part of the output.
//!
//! Stock rows with neither a DN nor a sold date are written separately as
//! the EU stock (not released) report.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{info, info_span, warn};

use cdr_ingest::read_with_schema;
use cdr_model::CurrentStatus;
use cdr_model::columns::{
    AGREED_DELIVERY_DATE, CASE1, CASE2, CASE3, CASE4, CNT_OUTBOUND_PCS_CDR, CNT_TOTAL_PCS_CDR,
    CONTAINER_NO, CONTAINER_NUMBER, CURRENT_STATUS, DELIVERY_DATE, DELIVERY_STATUS,
    IN_STOCK_PCS, INVOICE_NUMBER, ON_SEA_PCS, OUTBOUND_COMPARISON, OUTBOUND_DATE,
    OUTBOUNDED_PCS, PCS_FROM_WMS, PIECE, QTY_PC, REF1, RELEASE_NUMBER, SOLD_DATE,
    STOCK_CONTAINER, STOCK_DN, STOCK_INVOICE,
};
use cdr_model::schema::{
    EUROPE_STOCK_PROJECTION, EUROPE_STOCK_SCHEMA, NOT_RELEASED_PROJECTION, RNO_PROJECTION,
};
use cdr_transform::data_utils::{
    column_f64s, column_strings, filter_rows, has_column, set_bools, set_f64s, set_strings,
};
use cdr_transform::filter::{and, non_blank, not, value_in};
use cdr_transform::normalize::ref1_values;
use cdr_transform::{
    KeyTotals, add_equal_flag, equal_flag, left_join_lookup, left_join_totals,
    normalize_identifier_columns, project, sum_by_status, sum_column_by_key,
};

use crate::context::{ReportContext, ReportSummary};
use crate::error::CdrError;
use crate::inputs::{load_latest_cdr, load_latest_wms_totals, load_removal_keys};
use crate::writer::ReportWriter;

pub const RNO_STEM: &str = "RNO_Report";
pub const EU_STOCK_STEM: &str = "EU_Stock_Report";

const STOCK_RENAMES: &[(&str, &str)] = &[
    (STOCK_CONTAINER, CONTAINER_NUMBER),
    (STOCK_DN, RELEASE_NUMBER),
    (STOCK_INVOICE, INVOICE_NUMBER),
];

/// CDR columns copied onto each stock row.
const CDR_LOOKUP_COLUMNS: &[&str] = &[
    CURRENT_STATUS,
    OUTBOUND_DATE,
    AGREED_DELIVERY_DATE,
    DELIVERY_DATE,
    DELIVERY_STATUS,
];

/// Row counts at each filtering step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RnoStats {
    pub stock_rows: usize,
    pub released: usize,
    pub not_released: usize,
    pub outbounded_dropped: usize,
    pub blank_container_dropped: usize,
    pub removal_dropped: usize,
}

#[derive(Debug, Clone)]
pub struct RnoReport {
    pub frame: DataFrame,
    /// Stock rows with a blank DN and a blank sold date.
    pub not_released: DataFrame,
    pub stats: RnoStats,
}

/// Normalizes identifiers, renames them to CDR names and adds `Ref1`.
fn prepare_stock(stock: &DataFrame) -> Result<DataFrame> {
    let mut frame = stock.clone();
    normalize_identifier_columns(&mut frame, &[STOCK_CONTAINER, STOCK_DN, STOCK_INVOICE])?;
    for (from, to) in STOCK_RENAMES {
        if has_column(&frame, from) {
            frame.rename(from, (*to).into())?;
        }
    }
    let mut frame = project(&frame, &EUROPE_STOCK_PROJECTION)?;
    let keys = ref1_values(&frame, RELEASE_NUMBER, CONTAINER_NUMBER)?;
    set_strings(&mut frame, REF1, keys.into_iter().map(Some).collect())?;
    Ok(frame)
}

fn cdr_with_ref1(cdr: &DataFrame) -> Result<DataFrame> {
    let mut frame = cdr.clone();
    if !has_column(&frame, REF1) {
        let keys = ref1_values(&frame, RELEASE_NUMBER, CONTAINER_NO)?;
        set_strings(&mut frame, REF1, keys.into_iter().map(Some).collect())?;
    }
    Ok(frame)
}

/// `Outbounded_Pcs - Qty(PC)` for outbounded rows, `Qty(PC)` otherwise.
/// A negative difference falls back to `Qty(PC)`.
pub fn outbound_comparison(
    status: Option<&str>,
    outbounded_pcs: Option<f64>,
    qty: Option<f64>,
) -> Option<f64> {
    let value = if status == Some(CurrentStatus::Outbounded.as_str()) {
        outbounded_pcs.zip(qty).map(|(outbounded, qty)| outbounded - qty)
    } else {
        qty
    };
    match value {
        Some(difference) if difference < 0.0 => qty,
        other => other,
    }
}

pub fn build_rno(
    stock: &DataFrame,
    cdr: &DataFrame,
    wms_outbound: &KeyTotals,
    removal: &BTreeSet<String>,
) -> Result<RnoReport> {
    let mut stats = RnoStats {
        stock_rows: stock.height(),
        ..RnoStats::default()
    };

    let prepared = prepare_stock(stock)?;
    let has_dn = non_blank(&column_strings(&prepared, RELEASE_NUMBER)?);
    let has_sold_date = non_blank(&column_strings(&prepared, SOLD_DATE)?);
    let mut rno = filter_rows(&prepared, &and(&has_dn, &has_sold_date))?;
    let not_released = filter_rows(&prepared, &and(&not(&has_dn), &not(&has_sold_date)))?;
    stats.released = rno.height();
    stats.not_released = not_released.height();
    info!(
        released = stats.released,
        not_released = stats.not_released,
        "split Europe stock"
    );

    let cdr = cdr_with_ref1(cdr)?;
    let present: Vec<&str> = CDR_LOOKUP_COLUMNS
        .iter()
        .copied()
        .filter(|column| has_column(&cdr, column))
        .collect();
    left_join_lookup(&mut rno, REF1, &cdr, REF1, &present)?;
    let height = rno.height();
    for column in CDR_LOOKUP_COLUMNS {
        if !present.contains(column) {
            set_strings(&mut rno, column, vec![None; height])?;
        }
    }

    let by_status = |status: CurrentStatus, key: &str| {
        sum_by_status(&cdr, CURRENT_STATUS, status.as_str(), key, PIECE)
    };
    let on_sea = by_status(CurrentStatus::OnSea, REF1)?;
    let in_stock = by_status(CurrentStatus::InStock, REF1)?;
    let outbounded = by_status(CurrentStatus::Outbounded, REF1)?;
    left_join_totals(
        &mut rno,
        REF1,
        &[
            (ON_SEA_PCS, &on_sea),
            (IN_STOCK_PCS, &in_stock),
            (OUTBOUNDED_PCS, &outbounded),
        ],
    )?;

    let statuses = column_strings(&rno, CURRENT_STATUS)?;
    let quantities = column_f64s(&rno, QTY_PC)?;
    let outbounded_pcs = column_f64s(&rno, OUTBOUNDED_PCS)?;
    let comparison: Vec<Option<f64>> = statuses
        .iter()
        .zip(&outbounded_pcs)
        .zip(&quantities)
        .map(|((status, outbounded), qty)| outbound_comparison(status.as_deref(), *outbounded, *qty))
        .collect();
    let case1 = equal_flag(&comparison, &quantities);
    set_f64s(&mut rno, OUTBOUND_COMPARISON, comparison)?;
    set_bools(&mut rno, CASE1, case1)?;

    let container_total = sum_column_by_key(&cdr, CONTAINER_NO, PIECE)?;
    let container_outbound = by_status(CurrentStatus::Outbounded, CONTAINER_NO)?;
    left_join_totals(
        &mut rno,
        CONTAINER_NUMBER,
        &[
            (CNT_TOTAL_PCS_CDR, &container_total),
            (CNT_OUTBOUND_PCS_CDR, &container_outbound),
        ],
    )?;
    add_equal_flag(&mut rno, CASE4, CNT_OUTBOUND_PCS_CDR, QTY_PC)?;

    left_join_totals(&mut rno, REF1, &[(PCS_FROM_WMS, wms_outbound)])?;
    add_equal_flag(&mut rno, CASE2, PCS_FROM_WMS, OUTBOUNDED_PCS)?;
    add_equal_flag(&mut rno, CASE3, PCS_FROM_WMS, QTY_PC)?;

    let before = rno.height();
    let outbounded_rows = value_in(&statuses, &[CurrentStatus::Outbounded.as_str()]);
    rno = filter_rows(&rno, &not(&outbounded_rows))?;
    stats.outbounded_dropped = before - rno.height();

    let before = rno.height();
    rno = filter_rows(&rno, &non_blank(&column_strings(&rno, CONTAINER_NUMBER)?))?;
    stats.blank_container_dropped = before - rno.height();

    if !removal.is_empty() {
        let before = rno.height();
        let listed: Vec<bool> = column_strings(&rno, REF1)?
            .iter()
            .map(|key| key.as_deref().is_some_and(|key| removal.contains(key)))
            .collect();
        rno = filter_rows(&rno, &not(&listed))?;
        stats.removal_dropped = before - rno.height();
    }
    info!(
        outbounded = stats.outbounded_dropped,
        blank_container = stats.blank_container_dropped,
        removal_list = stats.removal_dropped,
        remaining = rno.height(),
        "filtered RNO rows"
    );

    Ok(RnoReport {
        frame: project(&rno, &RNO_PROJECTION)?,
        not_released: project(&not_released, &NOT_RELEASED_PROJECTION)?,
        stats,
    })
}

pub fn run_rno(ctx: &ReportContext<'_>) -> Result<ReportSummary> {
    let span = info_span!("rno", reference = %ctx.reference);
    let _guard = span.enter();
    let paths = &ctx.config.paths;

    let stock_path = &paths.europe_stock_file;
    let stock = read_with_schema(stock_path, &EUROPE_STOCK_SCHEMA)
        .with_context(|| format!("read Europe stock {}", stock_path.display()))?;
    if stock.height() == 0 {
        return Err(CdrError::EmptyInput {
            path: stock_path.clone(),
        }
        .into());
    }
    let (cdr_path, cdr) = load_latest_cdr(&paths.cdr_reports_dir)?;
    let wms = load_latest_wms_totals(&paths.wms_outbound_dir)?;
    let removal = match &paths.removal_file {
        Some(path) if path.exists() => load_removal_keys(path)?,
        Some(path) => {
            warn!(path = %path.display(), "removal list not found; keeping all rows");
            BTreeSet::new()
        }
        None => BTreeSet::new(),
    };

    let report = build_rno(&stock, &cdr, &wms, &removal)?;
    let path = ReportWriter::new(&paths.rno_reports_dir).write_table(RNO_STEM, &report.frame)?;
    let eu_stock = ReportWriter::new(&paths.eu_stock_reports_dir).write_table(
        &format!("{EU_STOCK_STEM}_{}", ctx.file_stamp()),
        &report.not_released,
    )?;

    let stats = &report.stats;
    let mut summary = ReportSummary::new("rno").with_rows(stats.stock_rows, report.frame.height());
    summary.push_output(path);
    summary.push_output(eu_stock);
    summary.push_detail("CDR", cdr_path.display());
    summary.push_detail("released", stats.released);
    summary.push_detail("not released", stats.not_released);
    summary.push_detail("outbounded dropped", stats.outbounded_dropped);
    summary.push_detail("blank container dropped", stats.blank_container_dropped);
    summary.push_detail("removal list dropped", stats.removal_dropped);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdr_model::columns::DESTINATION_WAREHOUSE;
    use cdr_transform::data_utils::column_names;
    use cdr_transform::sum_by_key;
    use polars::prelude::*;

    fn stock() -> DataFrame {
        df! {
            "Container" => ["MSCU-1", "C2", "C3", "C4", ""],
            "DN" => ["2001", "2002", "", "2004", "2005"],
            "Inv." => ["I-1", "I-2", "I-3", "I-4", "I-5"],
            "Sold Date" => ["2025-03-01", "2025-03-02", "2025-03-03", "2025-03-04", "2025-03-05"],
            "Qty(PC)" => ["620", "300", "100", "50", "10"],
            "Factory" => ["F", "F", "F", "F", "F"],
        }
        .unwrap()
    }

    fn cdr() -> DataFrame {
        df! {
            "Ref1" => ["2001MSCU1", "2001MSCU1", "2002C2"],
            "Container No." => ["MSCU1", "MSCU1", "C2"],
            "Release Number" => ["2001", "2001", "2002"],
            "Current_Status" => ["In-Stock", "Outbounded", "Outbounded"],
            "Piece" => ["400", "220", "300"],
            "Outbound date" => [None, Some("2025-03-05"), Some("2025-03-06")],
            "Delivery_Status" => ["Partial_delivery", "Partial_delivery", "Full_delivery"],
        }
        .unwrap()
    }

    fn wms() -> KeyTotals {
        sum_by_key(&[Some("2001MSCU1".to_string())], &[Some(220.0)], |_| true)
    }

    #[test]
    fn reconciles_released_stock_rows() {
        let report = build_rno(&stock(), &cdr(), &wms(), &BTreeSet::new()).unwrap();
        let frame = &report.frame;

        assert_eq!(
            column_strings(frame, REF1).unwrap(),
            vec![Some("2001MSCU1".to_string()), Some("2004C4".to_string())]
        );
        assert_eq!(&column_names(frame)[..3], &["Ref1", "Container Number", "Release Number"]);
        assert!(!has_column(frame, "Factory"));
        assert_eq!(
            column_strings(frame, INVOICE_NUMBER).unwrap(),
            vec![Some("I1".to_string()), Some("I4".to_string())]
        );

        assert_eq!(column_f64s(frame, IN_STOCK_PCS).unwrap(), vec![Some(400.0), Some(0.0)]);
        assert_eq!(column_f64s(frame, OUTBOUNDED_PCS).unwrap(), vec![Some(220.0), Some(0.0)]);
        assert_eq!(
            column_f64s(frame, OUTBOUND_COMPARISON).unwrap(),
            vec![Some(620.0), Some(50.0)]
        );
        assert_eq!(column_f64s(frame, CNT_TOTAL_PCS_CDR).unwrap(), vec![Some(620.0), Some(0.0)]);
        assert_eq!(
            column_f64s(frame, CNT_OUTBOUND_PCS_CDR).unwrap(),
            vec![Some(220.0), Some(0.0)]
        );
        assert_eq!(column_f64s(frame, PCS_FROM_WMS).unwrap(), vec![Some(220.0), Some(0.0)]);
        assert_eq!(
            column_strings(frame, CASE2).unwrap(),
            vec![Some("true".to_string()), Some("true".to_string())]
        );
        assert_eq!(
            column_strings(frame, CASE4).unwrap(),
            vec![Some("false".to_string()), Some("false".to_string())]
        );
        assert_eq!(
            column_strings(frame, DELIVERY_STATUS).unwrap(),
            vec![Some("Partial_delivery".to_string()), None]
        );
        assert!(has_column(frame, AGREED_DELIVERY_DATE));

        assert_eq!(
            report.stats,
            RnoStats {
                stock_rows: 5,
                released: 4,
                not_released: 0,
                outbounded_dropped: 1,
                blank_container_dropped: 1,
                removal_dropped: 0,
            }
        );
    }

    #[test]
    fn not_released_needs_both_dn_and_sold_date_blank() {
        let stock = df! {
            "Container" => ["C1", "C2", "C3"],
            "DN" => [Some("2001"), Some("2002"), Some(" ")],
            "Inv." => ["I-1", "I-2", "I-3"],
            "Sold Date" => [Some("2025-03-01"), None, Some("")],
            "Qty(PC)" => ["10", "20", "30"],
            "DestinationWarehouse" => ["WH-A", "WH-B", "WH-C"],
        }
        .unwrap();

        let report = build_rno(&stock, &cdr(), &wms(), &BTreeSet::new()).unwrap();

        assert_eq!(report.stats.released, 1);
        assert_eq!(report.stats.not_released, 1);
        assert_eq!(
            &column_names(&report.not_released)[..4],
            &["Ref1", "Container Number", "Release Number", "DestinationWarehouse"]
        );
        assert_eq!(
            column_strings(&report.not_released, DESTINATION_WAREHOUSE).unwrap(),
            vec![Some("WH-C".to_string())]
        );
    }

    #[test]
    fn removal_list_drops_keys() {
        let removal = BTreeSet::from(["2004C4".to_string()]);
        let report = build_rno(&stock(), &cdr(), &wms(), &removal).unwrap();

        assert_eq!(report.frame.height(), 1);
        assert_eq!(report.stats.removal_dropped, 1);
    }

    #[test]
    fn comparison_falls_back_to_quantity() {
        let outbounded = Some(CurrentStatus::Outbounded.as_str());
        assert_eq!(outbound_comparison(outbounded, Some(400.0), Some(300.0)), Some(100.0));
        assert_eq!(outbound_comparison(outbounded, Some(100.0), Some(300.0)), Some(300.0));
        assert_eq!(outbound_comparison(Some("In-Stock"), Some(100.0), Some(300.0)), Some(300.0));
        assert_eq!(outbound_comparison(None, None, None), None);
    }
}
