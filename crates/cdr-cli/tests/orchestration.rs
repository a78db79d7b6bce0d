//! Stage sequences over an in-memory store.

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use tempfile::TempDir;

use cdr_cli::config::parse_config;
use cdr_cli::orchestrate::run_sequence;
use cdr_model::{AppConfig, Stage};
use cdr_report::ReportContext;
use cdr_store::{InMemoryTableStore, RowSet};

fn reference() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

fn daily_report() -> RowSet {
    let mut set = RowSet::new(
        [
            "Container No.",
            "Release Number",
            "Piece",
            "Wattage",
            "Inbound date",
            "Outbound date",
        ]
        .map(str::to_string)
        .to_vec(),
    );
    set.push_row(
        [
            Some("MSCU-1"),
            Some("2001"),
            Some("620"),
            Some("550"),
            Some("2025-01-10"),
            Some("05/03/2025"),
        ]
        .map(|value| value.map(str::to_string))
        .to_vec(),
    )
    .unwrap();
    set
}

fn archive_data() -> RowSet {
    let mut set = RowSet::new(
        ["Ref1", "Container No.", "Release Number", "Piece", "Current_Status", "Outbound date"]
            .map(str::to_string)
            .to_vec(),
    );
    set.push_row(
        [
            Some("1999OLD1"),
            Some("OLD1"),
            Some("1999"),
            Some("10"),
            Some("Outbounded"),
            Some("2023-01-02"),
        ]
        .map(|value| value.map(str::to_string))
        .to_vec(),
    )
    .unwrap();
    set
}

fn config(root: &Path) -> AppConfig {
    let text = format!(
        r#"
        [paths]
        cdr_reports_dir = "{root}/reports/cdr"
        logistics_reports_dir = "{root}/reports/logistics"
        bmo_reports_dir = "{root}/reports/bmo"
        rno_reports_dir = "{root}/reports/rno"
        stock_reports_dir = "{root}/reports/stock"
        wms_compare_dir = "{root}/reports/wms-compare"
        wms_outbound_dir = "{root}/inputs/wms/outbound"
        wms_stock_dir = "{root}/inputs/wms/stock"
        europe_stock_file = "{root}/inputs/europe-stock.csv"

        [orchestration]
        stages = ["transfer", "consolidate", "rno", "logistics"]
        delay_secs = 0
        "#,
        root = root.display().to_string().replace('\\', "/")
    );
    parse_config(&text).unwrap()
}

#[test]
fn failed_stage_does_not_stop_the_sequence() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let ctx = ReportContext::new(&config, reference());
    let mut store = InMemoryTableStore::new()
        .with_table("daily_report", daily_report())
        .with_table("archive_data", archive_data());

    let outcome = run_sequence(
        &config.orchestration.stages,
        Duration::ZERO,
        &ctx,
        &mut store,
    );

    let stages: Vec<_> = outcome.stages.iter().map(|stage| stage.stage).collect();
    assert_eq!(
        stages,
        vec![Stage::Transfer, Stage::Consolidate, Stage::Rno, Stage::Logistics]
    );
    assert_eq!(outcome.failures(), 1);
    assert!(!outcome.stages[2].is_success());
    assert!(outcome.stages[2].error.is_some());
    assert!(outcome.stages[3].is_success());
    assert!(
        config
            .paths
            .logistics_reports_dir
            .join("logistics-report_2025-03-10.Outbound_logistics_report.csv")
            .exists()
    );
    assert_eq!(outcome.exit_code(), 1);
}

#[test]
fn empty_sequence_succeeds() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let ctx = ReportContext::new(&config, reference());
    let mut store = InMemoryTableStore::new();

    let outcome = run_sequence(&[], Duration::from_secs(5), &ctx, &mut store);

    assert!(outcome.stages.is_empty());
    assert_eq!(outcome.exit_code(), 0);
}

#[test]
fn missing_store_table_is_reported_per_stage() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let ctx = ReportContext::new(&config, reference());
    let mut store = InMemoryTableStore::new();

    let outcome = run_sequence(&[Stage::Transfer], Duration::ZERO, &ctx, &mut store);

    assert_eq!(outcome.failures(), 1);
    assert_eq!(outcome.exit_code(), 1);
}
