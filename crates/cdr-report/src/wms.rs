//! WMS outbound comparison: BMO pieces against the warehouse exports.

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{info, info_span};

use cdr_ingest::{find_latest_report, read_with_schema};
use cdr_model::columns::{
    CASE_1, CONTAINER_NO, MEGAWATTAGE_NUMERIC, OUTBOUND_PCS_WMS, PIECE, REF1, RELEASE_NUMBER,
    STOCK_PCS_WMS,
};
use cdr_model::schema::{BMO_SHEET_SCHEMA, WMS_COMPARE_PROJECTION};
use cdr_transform::data_utils::{filter_rows, optional_column_f64s, set_strings};
use cdr_transform::filter::not;
use cdr_transform::normalize::ref1_values;
use cdr_transform::{KeyTotals, add_equal_flag, left_join_totals, project};

use crate::bmo::{BMO_SHEET, BMO_STEM};
use crate::context::{ReportContext, ReportSummary};
use crate::inputs::load_latest_wms_totals;
use crate::writer::{ReportWriter, sheet_file_name};

pub const WMS_COMPARE_STEM: &str = "compared_data";

#[derive(Debug, Clone)]
pub struct WmsComparison {
    /// Rows whose BMO pieces differ from the WMS outbound pieces.
    pub mismatches: DataFrame,
    pub matched: usize,
    pub mismatched: usize,
    pub matched_mw: f64,
    pub mismatched_mw: f64,
}

pub fn build_wms_compare(
    bmo: &DataFrame,
    outbound: &KeyTotals,
    stock: &KeyTotals,
) -> Result<WmsComparison> {
    let mut frame = bmo.clone();
    let keys = ref1_values(&frame, RELEASE_NUMBER, CONTAINER_NO)?;
    set_strings(&mut frame, REF1, keys.into_iter().map(Some).collect())?;
    left_join_totals(
        &mut frame,
        REF1,
        &[(OUTBOUND_PCS_WMS, outbound), (STOCK_PCS_WMS, stock)],
    )?;
    let flags = add_equal_flag(&mut frame, CASE_1, PIECE, OUTBOUND_PCS_WMS)?;

    let megawattage = optional_column_f64s(&frame, MEGAWATTAGE_NUMERIC)?;
    let (mut matched_mw, mut mismatched_mw) = (0.0, 0.0);
    for (flag, mw) in flags.iter().zip(&megawattage) {
        let mw = mw.unwrap_or(0.0);
        if *flag {
            matched_mw += mw;
        } else {
            mismatched_mw += mw;
        }
    }
    let matched = flags.iter().filter(|flag| **flag).count();

    let mismatches = filter_rows(&frame, &not(&flags))?;
    let mismatches = project(&mismatches, &WMS_COMPARE_PROJECTION)?;

    Ok(WmsComparison {
        mismatched: mismatches.height(),
        mismatches,
        matched,
        matched_mw,
        mismatched_mw,
    })
}

pub fn run_wms_compare(ctx: &ReportContext<'_>) -> Result<ReportSummary> {
    let span = info_span!("wms_compare", reference = %ctx.reference);
    let _guard = span.enter();
    let paths = &ctx.config.paths;

    let pattern = sheet_file_name(&format!("{BMO_STEM}_*"), BMO_SHEET);
    let source = find_latest_report(&paths.bmo_reports_dir, &[pattern.as_str()])
        .context("locate latest BMO report")?;
    let bmo = read_with_schema(&source, &BMO_SHEET_SCHEMA)
        .with_context(|| format!("read {}", source.display()))?;

    let outbound = load_latest_wms_totals(&paths.wms_outbound_dir)?;
    let stock = load_latest_wms_totals(&paths.wms_stock_dir)?;
    let comparison = build_wms_compare(&bmo, &outbound, &stock)?;
    info!(
        matched = comparison.matched,
        matched_mw = comparison.matched_mw,
        "rows where Case_1 is true"
    );
    info!(
        mismatched = comparison.mismatched,
        mismatched_mw = comparison.mismatched_mw,
        "rows where Case_1 is false"
    );

    let stem = format!("{WMS_COMPARE_STEM}_{}", ctx.file_stamp());
    let path = ReportWriter::new(&paths.wms_compare_dir).write_table(&stem, &comparison.mismatches)?;

    let mut summary = ReportSummary::new("wms-compare").with_rows(bmo.height(), comparison.mismatched);
    summary.push_output(path);
    summary.push_detail("source", source.display());
    summary.push_detail("matched", comparison.matched);
    summary.push_detail("matched MW", format!("{:.2}", comparison.matched_mw));
    summary.push_detail("mismatched", comparison.mismatched);
    summary.push_detail("mismatched MW", format!("{:.2}", comparison.mismatched_mw));
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdr_transform::data_utils::{column_f64s, column_names, column_strings};
    use cdr_transform::sum_by_key;
    use polars::prelude::*;

    fn totals(pairs: &[(&str, f64)]) -> KeyTotals {
        let keys: Vec<Option<String>> = pairs.iter().map(|(k, _)| Some((*k).to_string())).collect();
        let quantities: Vec<Option<f64>> = pairs.iter().map(|(_, q)| Some(*q)).collect();
        sum_by_key(&keys, &quantities, |_| true)
    }

    #[test]
    fn keeps_only_mismatches() {
        let bmo = df! {
            "Release Number" => ["2001", "2002", "2003"],
            "Container No." => ["AB-1", "C2", "C3"],
            "Piece" => ["620", "310", "100"],
            "MegaWattage_numeric" => ["0.5", "0.25", "0.1"],
        }
        .unwrap();
        let outbound = totals(&[("2001AB1", 620.0), ("2002C2", 300.0)]);
        let stock = totals(&[("2002C2", 10.0)]);

        let comparison = build_wms_compare(&bmo, &outbound, &stock).unwrap();

        assert_eq!(comparison.matched, 1);
        assert_eq!(comparison.mismatched, 2);
        assert!((comparison.matched_mw - 0.5).abs() < 1e-9);
        assert!((comparison.mismatched_mw - 0.35).abs() < 1e-9);

        let frame = &comparison.mismatches;
        assert_eq!(
            column_names(frame),
            vec![
                "Ref1",
                "Release Number",
                "Container No.",
                "Piece",
                "MegaWattage_numeric",
                "Outbound_Pcs_wms",
                "Stock_Pcs_wms",
            ]
        );
        assert_eq!(
            column_strings(frame, REF1).unwrap(),
            vec![Some("2002C2".to_string()), Some("2003C3".to_string())]
        );
        assert_eq!(
            column_f64s(frame, OUTBOUND_PCS_WMS).unwrap(),
            vec![Some(300.0), Some(0.0)]
        );
        assert_eq!(
            column_f64s(frame, STOCK_PCS_WMS).unwrap(),
            vec![Some(10.0), Some(0.0)]
        );
    }
}
