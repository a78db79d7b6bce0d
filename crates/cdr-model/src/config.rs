//! Run configuration.
//!
//! Loaded once from TOML at the CLI boundary and passed down by reference.
//! Every field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub rules: RulesConfig,
    pub bmo: BmoConfig,
    pub wms: WmsConfig,
    pub sales_rno: SalesRnoConfig,
    pub store: StoreConfig,
    pub orchestration: OrchestrationConfig,
}

impl AppConfig {
    /// Reject values that would make a report loop or divide by zero.
    pub fn validate(&self) -> Result<()> {
        if self.store.page_size == 0 {
            return Err(ModelError::InvalidConfig(
                "store.page_size must be greater than zero".to_string(),
            ));
        }
        if self.store.batch_size == 0 {
            return Err(ModelError::InvalidConfig(
                "store.batch_size must be greater than zero".to_string(),
            ));
        }
        if self.bmo.working_days_till_today > self.bmo.total_working_days {
            return Err(ModelError::InvalidConfig(format!(
                "bmo.working_days_till_today ({}) exceeds bmo.total_working_days ({})",
                self.bmo.working_days_till_today, self.bmo.total_working_days
            )));
        }
        if self.rules.release_prefixes.iter().any(String::is_empty) {
            return Err(ModelError::InvalidConfig(
                "rules.release_prefixes must not contain empty prefixes".to_string(),
            ));
        }
        Ok(())
    }
}

/// Input and output locations. Relative paths resolve against the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Where `CDR_<date>.csv` snapshots are written and later discovered.
    pub cdr_reports_dir: PathBuf,
    pub logistics_reports_dir: PathBuf,
    pub bmo_reports_dir: PathBuf,
    pub rno_reports_dir: PathBuf,
    /// `EU_Stock_Report_<YYYYMMDD>.csv`: stock rows with neither DN nor sold date.
    pub eu_stock_reports_dir: PathBuf,
    pub sales_rno_reports_dir: PathBuf,
    pub stock_reports_dir: PathBuf,
    pub wms_compare_dir: PathBuf,
    /// Raw WMS outbound exports; every file here is combined.
    pub wms_outbound_exports_dir: PathBuf,
    /// Raw WMS stock exports; only the newest is used.
    pub wms_stock_exports_dir: PathBuf,
    /// Combined outbound reports. The latest is read by `rno` and `wms-compare`.
    pub wms_outbound_dir: PathBuf,
    /// Processed stock reports. The latest is read by `wms-compare`.
    pub wms_stock_dir: PathBuf,
    /// Europe stock summary (CSV export of the `Summary-Europe` sheet).
    pub europe_stock_file: PathBuf,
    /// Optional list of `Ref1` values to drop from the RNO report.
    pub removal_file: Option<PathBuf>,
    /// RNO workbook carrying the sales team's status columns.
    /// Defaults to `RNO_Report.csv` in `rno_reports_dir`.
    pub annotated_rno_file: Option<PathBuf>,
}

impl PathsConfig {
    pub fn annotated_rno(&self) -> PathBuf {
        self.annotated_rno_file
            .clone()
            .unwrap_or_else(|| self.rno_reports_dir.join("RNO_Report.csv"))
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cdr_reports_dir: PathBuf::from("reports/cdr"),
            logistics_reports_dir: PathBuf::from("reports/logistics"),
            bmo_reports_dir: PathBuf::from("reports/bmo"),
            rno_reports_dir: PathBuf::from("reports/rno"),
            eu_stock_reports_dir: PathBuf::from("reports/eu-stock"),
            sales_rno_reports_dir: PathBuf::from("reports/sales-rno"),
            stock_reports_dir: PathBuf::from("reports/stock"),
            wms_compare_dir: PathBuf::from("reports/wms-compare"),
            wms_outbound_exports_dir: PathBuf::from("inputs/wms/outbound"),
            wms_stock_exports_dir: PathBuf::from("inputs/wms/stock"),
            wms_outbound_dir: PathBuf::from("reports/wms/outbound"),
            wms_stock_dir: PathBuf::from("reports/wms/stock"),
            europe_stock_file: PathBuf::from("inputs/europe-stock.csv"),
            removal_file: None,
            annotated_rno_file: None,
        }
    }
}

/// Business filters applied by the daily transfer and the logistics report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    /// Outbound years removed from the logistics sheets.
    pub excluded_outbound_years: Vec<i32>,
    /// Release numbers on the outbound sheet must start with one of these.
    pub release_prefixes: Vec<String>,
    /// Outbounded rows with an outbound year before this are not forwarded.
    pub archive_before_year: i32,
    /// Agreed delivery dates in these years are placeholders and get blanked.
    pub placeholder_agreed_years: Vec<i32>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            excluded_outbound_years: vec![2022, 2023, 2024],
            release_prefixes: vec!["2".to_string(), "5".to_string()],
            archive_before_year: 2025,
            placeholder_agreed_years: vec![2001, 2021, 2024],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BmoConfig {
    pub month_target_mw: f64,
    pub total_working_days: u32,
    pub working_days_till_today: u32,
}

impl Default for BmoConfig {
    fn default() -> Self {
        Self {
            month_target_mw: 820.0,
            total_working_days: 20,
            working_days_till_today: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WmsConfig {
    /// Title lines above the header row of every WMS export.
    pub preamble_rows: usize,
}

impl Default for WmsConfig {
    fn default() -> Self {
        Self { preamble_rows: 2 }
    }
}

/// Status codes the sales team writes into `Status Check`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SalesRnoConfig {
    /// Title lines above the header row of the annotated RNO workbook.
    pub preamble_rows: usize,
    /// Dropped from the Final RNO report, together with blank statuses.
    pub final_excluded_statuses: Vec<String>,
    /// `Escalation/Reminder` values dropped from the Final RNO report.
    pub excluded_escalations: Vec<String>,
    /// Dropped from the Sales RNO report.
    pub sales_excluded_statuses: Vec<String>,
    /// Rows waiting on sales; also the rows of the `Sales to Push(B_D)` pivot.
    pub sales_push_statuses: Vec<String>,
    /// Rows waiting on logistics.
    pub logistics_push_statuses: Vec<String>,
    /// Status whose MWp is summarised per `Outbound_Month`.
    pub monthly_status: String,
}

impl Default for SalesRnoConfig {
    fn default() -> Self {
        let codes = |codes: &[&str]| codes.iter().map(|code| (*code).to_string()).collect();
        Self {
            preamble_rows: 0,
            final_excluded_statuses: codes(&["F", "H", "J"]),
            excluded_escalations: codes(&["Check", "Status unknown"]),
            sales_excluded_statuses: codes(&["F", "H", "J", "G"]),
            sales_push_statuses: codes(&["B", "D"]),
            logistics_push_statuses: codes(&["A", "C"]),
            monthly_status: "E".to_string(),
        }
    }
}

/// What to do when one insert batch fails during a replace-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchFailurePolicy {
    /// Stop at the first failed batch and report the error.
    #[default]
    Abort,
    /// Log the failed batch and keep inserting the rest.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Root of the directory-backed table store.
    pub directory: PathBuf,
    pub page_size: usize,
    pub batch_size: usize,
    /// Policy for the daily transfer into `current_report`.
    pub transfer_failure: BatchFailurePolicy,
    /// Policy for the consolidated table.
    pub consolidate_failure: BatchFailurePolicy,
    pub daily_table: String,
    pub current_table: String,
    pub archive_table: String,
    pub consolidated_table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("store"),
            page_size: 1000,
            batch_size: 500,
            transfer_failure: BatchFailurePolicy::Abort,
            consolidate_failure: BatchFailurePolicy::Skip,
            daily_table: "daily_report".to_string(),
            current_table: "current_report".to_string(),
            archive_table: "archive_data".to_string(),
            consolidated_table: "consolidated_report".to_string(),
        }
    }
}

/// One step of the daily sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Transfer,
    Consolidate,
    Logistics,
    Bmo,
    WmsCombine,
    Rno,
    SalesRno,
    WmsCompare,
    Stock,
}

impl Stage {
    pub const ALL: [Stage; 9] = [
        Stage::Transfer,
        Stage::Consolidate,
        Stage::Logistics,
        Stage::Bmo,
        Stage::WmsCombine,
        Stage::Rno,
        Stage::SalesRno,
        Stage::WmsCompare,
        Stage::Stock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Transfer => "transfer",
            Stage::Consolidate => "consolidate",
            Stage::Logistics => "logistics",
            Stage::Bmo => "bmo",
            Stage::WmsCombine => "wms-combine",
            Stage::Rno => "rno",
            Stage::SalesRno => "sales-rno",
            Stage::WmsCompare => "wms-compare",
            Stage::Stock => "stock",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ModelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == wanted)
            .ok_or_else(|| ModelError::UnknownStage(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrchestrationConfig {
    pub stages: Vec<Stage>,
    /// Fixed pause between stages. There is no readiness check.
    pub delay_secs: u64,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            stages: Stage::ALL.to_vec(),
            delay_secs: 20,
        }
    }
}
