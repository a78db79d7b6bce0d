//! The full daily sequence over an in-memory store and a temporary report tree.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tempfile::TempDir;

use cdr_ingest::read_csv_frame;
use cdr_model::{AppConfig, Stage};
use cdr_report::{ReportContext, ReportSummary, run_stage};
use cdr_store::{InMemoryTableStore, RowSet};
use cdr_transform::data_utils::{column_strings, has_column};

fn reference() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

fn row_set(columns: &[&str], rows: &[&[Option<&str>]]) -> RowSet {
    let mut set = RowSet::new(columns.iter().map(|c| (*c).to_string()).collect());
    for row in rows {
        set.push_row(row.iter().map(|v| v.map(str::to_string)).collect())
            .unwrap();
    }
    set
}

fn daily_report() -> RowSet {
    row_set(
        &[
            "Container No.",
            "Release Number",
            "Piece",
            "Wattage",
            "Inbound date",
            "Outbound date",
        ],
        &[
            &[Some("MSCU-1"), Some("2001"), Some("620"), Some("550"), Some("2025-01-10"), Some("05/03/2025")],
            &[Some("C2"), Some("5002"), Some("310"), Some("550"), Some("2025-01-12"), Some("2025-03-20")],
            &[Some("C3"), Some("2003"), Some("100"), Some("500"), Some("2025-02-01"), None],
            &[None, Some("2004"), Some("10"), Some("500"), None, None],
            &[Some("C5"), Some("2005"), Some("50"), Some("400"), None, Some("2024-06-01")],
        ],
    )
}

fn archive_data() -> RowSet {
    row_set(
        &["Ref1", "Container No.", "Release Number", "Piece", "Current_Status", "Outbound date"],
        &[&[
            Some("1999OLD1"),
            Some("OLD1"),
            Some("1999"),
            Some("10"),
            Some("Outbounded"),
            Some("2023-01-02"),
        ]],
    )
}

fn config(root: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.sales_rno.preamble_rows = 1;
    let paths = &mut config.paths;
    paths.cdr_reports_dir = root.join("reports/cdr");
    paths.logistics_reports_dir = root.join("reports/logistics");
    paths.bmo_reports_dir = root.join("reports/bmo");
    paths.rno_reports_dir = root.join("reports/rno");
    paths.eu_stock_reports_dir = root.join("reports/eu-stock");
    paths.sales_rno_reports_dir = root.join("reports/sales-rno");
    paths.stock_reports_dir = root.join("reports/stock");
    paths.wms_compare_dir = root.join("reports/wms-compare");
    paths.wms_outbound_dir = root.join("reports/wms/outbound");
    paths.wms_stock_dir = root.join("reports/wms/stock");
    paths.wms_outbound_exports_dir = root.join("inputs/wms/outbound");
    paths.wms_stock_exports_dir = root.join("inputs/wms/stock");
    paths.europe_stock_file = root.join("inputs/europe-stock.csv");
    paths.annotated_rno_file = Some(root.join("inputs/RNO_Report_annotated.csv"));
    config
}

/// A raw WMS export: two title lines above the header.
fn wms_export(path: &Path, body: &str) {
    fs::write(path, format!("WMS export\nprinted 10.03.2025\n{body}")).unwrap();
}

fn write_inputs(config: &AppConfig) {
    let paths = &config.paths;
    fs::create_dir_all(&paths.wms_outbound_exports_dir).unwrap();
    fs::create_dir_all(&paths.wms_stock_exports_dir).unwrap();
    wms_export(
        &paths.wms_outbound_exports_dir.join("outbound_a.csv"),
        "Release number,Container number,Quantity\n2001,MSCU1,400\n",
    );
    wms_export(
        &paths.wms_outbound_exports_dir.join("outbound_b.csv"),
        "Release number,Container number,Quantity\n2001,MSCU1,220\n",
    );
    wms_export(
        &paths.wms_stock_exports_dir.join("stock_2025-03-09.csv"),
        "Release number,Container number,Quantity\n2001,MSCU1,999\n",
    );
    wms_export(
        &paths.wms_stock_exports_dir.join("stock_2025-03-10.csv"),
        "Release number,Container number,Quantity\n2001,MSCU1,20\n",
    );
    fs::write(
        &paths.europe_stock_file,
        "Container,DN,Inv.,Sold Date,Qty(PC),Factory\n\
         MSCU-1,2001,I-1,2025-03-01,620,F\n\
         C3,2003,I-3,2025-03-02,100,F\n\
         C9,,I-9,,40,F\n",
    )
    .unwrap();
    fs::write(
        config.paths.annotated_rno(),
        "RNO Report 2025-03-10\n\
         Ref1,Container Number,Case1,Status Check ,Escalation/Reminder,Final_Pcs,Final_MWp,\
         Salesman,Region info,Status (Location),Status (Standard/Due),Outbound_Month,Final_Outbound_Plan\n\
         2003C3,C3,true,B,,100,0.05,Anna,DE,WH,Due,Mar,2025-03-25\n\
         2006C6,C6,true,A,,40,0.02,Ben,PL,Port,Standard,Apr,2025-04-02\n\
         2007C7,C7,true,F,,10,0.005,Ben,PL,WH,Due,Mar,\n",
    )
    .unwrap();
}

fn run_all(config: &AppConfig, store: &mut InMemoryTableStore) -> Vec<ReportSummary> {
    let ctx = ReportContext::new(config, reference());
    Stage::ALL
        .into_iter()
        .map(|stage| {
            run_stage(stage, &ctx, store).unwrap_or_else(|err| panic!("{stage} failed: {err:#}"))
        })
        .collect()
}

fn strings(path: &Path, column: &str) -> Vec<Option<String>> {
    let frame = read_csv_frame(path).unwrap();
    column_strings(&frame, column).unwrap()
}

#[test]
fn daily_sequence_writes_every_report() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    write_inputs(&config);
    let mut store = InMemoryTableStore::new()
        .with_table("daily_report", daily_report())
        .with_table("archive_data", archive_data());

    let summaries = run_all(&config, &mut store);
    let by_name = |name: &str| {
        summaries
            .iter()
            .find(|summary| summary.report == name)
            .unwrap()
    };

    let current = store.table("current_report").unwrap();
    assert_eq!(current.len(), 3);
    assert_eq!(current.get(0, "Ref1"), Some("2001MSCU1"));
    assert_eq!(current.get(0, "Outbound date"), Some("2025-03-05"));
    assert_eq!(by_name("transfer").detail("archived rows"), Some("1"));

    let consolidated = store.table("consolidated_report").unwrap();
    assert_eq!(consolidated.len(), 4);
    assert_eq!(consolidated.get(3, "data_source"), Some("archive"));
    let cdr_path = config.paths.cdr_reports_dir.join("CDR_2025-03-10.csv");
    assert!(cdr_path.exists());

    let outbound = config
        .paths
        .logistics_reports_dir
        .join("logistics-report_2025-03-10.Outbound_logistics_report.csv");
    assert_eq!(
        strings(&outbound, "Release Number"),
        vec![Some("2001".to_string()), Some("5002".to_string())]
    );
    let cdr_sheet = config
        .paths
        .logistics_reports_dir
        .join("logistics-report_2025-03-10.CDR Report.csv");
    assert_eq!(read_csv_frame(&cdr_sheet).unwrap().height(), 3);

    let bmo = config
        .paths
        .bmo_reports_dir
        .join("bmo-report_2025-03-10.BMO Report MTD.csv");
    assert_eq!(strings(&bmo, "Release Number"), vec![Some("2001".to_string())]);
    assert_eq!(by_name("bmo").detail("Accumulated_Outbound_MTD"), Some("0.34"));
    assert!(
        config
            .paths
            .bmo_reports_dir
            .join("bmo-report_2025-03-10.Summary.csv")
            .exists()
    );

    let compared = config.paths.wms_compare_dir.join("compared_data_20250310.csv");
    assert!(compared.exists());
    assert_eq!(by_name("wms-compare").detail("matched"), Some("1"));
    assert_eq!(by_name("wms-compare").detail("mismatched"), Some("0"));

    let combined = config
        .paths
        .wms_outbound_dir
        .join("Combined_Outbound_WMS_20250310.csv");
    assert_eq!(
        strings(&combined, "Source_File"),
        vec![Some("outbound_a.csv".to_string()), Some("outbound_b.csv".to_string())]
    );
    let wms_stock = config.paths.wms_stock_dir.join("WMS_Stock_Report_20250310.csv");
    assert_eq!(strings(&wms_stock, "Quantity"), vec![Some("20".to_string())]);

    let rno = config.paths.rno_reports_dir.join("RNO_Report.csv");
    assert_eq!(strings(&rno, "Ref1"), vec![Some("2003C3".to_string())]);
    assert_eq!(by_name("rno").detail("outbounded dropped"), Some("1"));
    assert_eq!(by_name("rno").detail("not released"), Some("1"));
    let eu_stock = config
        .paths
        .eu_stock_reports_dir
        .join("EU_Stock_Report_20250310.csv");
    assert_eq!(strings(&eu_stock, "Container Number"), vec![Some("C9".to_string())]);

    let final_rno = config.paths.rno_reports_dir.join("Final_RNO_Report.csv");
    assert_eq!(
        strings(&final_rno, "Ref1"),
        vec![Some("2003C3".to_string()), Some("2006C6".to_string())]
    );
    let status = config
        .paths
        .sales_rno_reports_dir
        .join("Sales_RNO_Report_20250310.Status Summary.csv");
    assert_eq!(
        strings(&status, "Status Check"),
        vec![Some("A".to_string()), Some("B".to_string()), Some("Grand Total".to_string())]
    );
    assert_eq!(by_name("sales-rno").detail("total MWp"), Some("0.07"));

    let stock = config.paths.stock_reports_dir.join("CDR_2025-03-10.csv");
    let stock_frame = read_csv_frame(&stock).unwrap();
    assert!(has_column(&stock_frame, "data_source"));
    assert_eq!(
        column_strings(&stock_frame, "Ref1").unwrap(),
        vec![Some("5002C2".to_string()), Some("2003C3".to_string())]
    );
}

#[test]
fn wms_mismatches_are_written() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    write_inputs(&config);
    wms_export(
        &config.paths.wms_outbound_exports_dir.join("outbound_b.csv"),
        "Release number,Container number,Quantity\n2001,MSCU1,200\n",
    );
    let mut store = InMemoryTableStore::new()
        .with_table("daily_report", daily_report())
        .with_table("archive_data", archive_data());

    run_all(&config, &mut store);

    let compared = config.paths.wms_compare_dir.join("compared_data_20250310.csv");
    assert_eq!(strings(&compared, "Ref1"), vec![Some("2001MSCU1".to_string())]);
    assert_eq!(
        strings(&compared, "Outbound_Pcs_wms"),
        vec![Some("600".to_string())]
    );
    assert_eq!(strings(&compared, "Stock_Pcs_wms"), vec![Some("20".to_string())]);
}

#[test]
fn bmo_picks_up_push_figures_from_the_previous_sales_rno() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    write_inputs(&config);
    let mut store = InMemoryTableStore::new()
        .with_table("daily_report", daily_report())
        .with_table("archive_data", archive_data());

    let first = run_all(&config, &mut store);
    let first_bmo = first.iter().find(|summary| summary.report == "bmo").unwrap();
    assert_eq!(first_bmo.detail("Sales to Push"), None);

    let ctx = ReportContext::new(&config, reference());
    let bmo = run_stage(Stage::Bmo, &ctx, &mut store).unwrap();
    assert_eq!(bmo.detail("Sales to Push"), Some("0.05"));
    assert_eq!(bmo.detail("Logistics to Push"), Some("0.02"));
    assert_eq!(bmo.detail("Outbound_Planned"), Some("0.05"));
    assert_eq!(bmo.detail("Accumlate_&_Planned_Outbound"), Some("0.39"));
}

#[test]
fn consolidate_without_rows_fails() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let mut store = InMemoryTableStore::new()
        .with_table("current_report", RowSet::default())
        .with_table("archive_data", RowSet::default());
    let ctx = ReportContext::new(&config, reference());

    let err = run_stage(Stage::Consolidate, &ctx, &mut store).unwrap_err();
    assert!(err.to_string().contains("nothing to consolidate"));
}
