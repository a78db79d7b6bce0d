//! Report stages of the daily shipment pipeline.
//!
//! - **transfer**: `daily_report` → enriched `current_report`
//! - **consolidate**: `current_report` ∪ `archive_data` → `CDR_<date>.csv` and `consolidated_report`
//! - **logistics**: CDR and outbound sheets from the latest CDR
//! - **bmo**: month-to-date outbound rows and the target summary
//! - **wms-combine**: raw WMS exports → `Combined_Outbound_WMS_<date>` and `WMS_Stock_Report_<date>`
//! - **rno**: released-not-outbounded reconciliation of Europe stock against CDR and WMS,
//!   plus the `EU_Stock_Report_<date>` of stock that is neither delivered nor sold
//! - **sales-rno**: the annotated RNO workbook → `Final_RNO_Report` and `Sales_RNO_Report_<date>`
//! - **wms**: BMO pieces against WMS outbound and stock exports
//! - **stock**: in-stock rows of the current CDR
//!
//! Every stage is anchored on the reference date of its [`ReportContext`]
//! and returns a [`ReportSummary`] of what it read and wrote.

pub mod bmo;
pub mod consolidate;
pub mod context;
pub mod error;
pub mod inputs;
pub mod logistics;
pub mod rno;
pub mod sales_rno;
pub mod stock;
pub mod transfer;
pub mod wms;
pub mod wms_combine;
pub mod writer;

use anyhow::Result;
use cdr_model::Stage;
use cdr_store::TableStore;

pub use bmo::{BmoReport, BmoSummary, build_bmo, run_bmo};
pub use consolidate::{run_consolidate, union_sources};
pub use context::{ReportContext, ReportSummary};
pub use error::CdrError;
pub use logistics::{LogisticsReport, build_logistics, log_status_summary, run_logistics};
pub use rno::{RnoReport, RnoStats, build_rno, run_rno};
pub use sales_rno::{
    FinalRnoStats, PushFigures, SalesRnoReport, build_final_rno, build_sales_rno, push_figures,
    run_sales_rno,
};
pub use stock::{build_stock, run_stock};
pub use transfer::run_transfer;
pub use wms::{WmsComparison, build_wms_compare, run_wms_compare};
pub use wms_combine::{CombinedExports, combine_wms_exports, read_wms_export, run_wms_combine};
pub use writer::{ReportWriter, sheet_file_name, write_frame_csv};

/// Runs one stage. Only `transfer` and `consolidate` touch the store.
pub fn run_stage(
    stage: Stage,
    ctx: &ReportContext<'_>,
    store: &mut dyn TableStore,
) -> Result<ReportSummary> {
    match stage {
        Stage::Transfer => run_transfer(ctx, store),
        Stage::Consolidate => run_consolidate(ctx, store),
        Stage::Logistics => run_logistics(ctx),
        Stage::Bmo => run_bmo(ctx),
        Stage::WmsCombine => run_wms_combine(ctx),
        Stage::Rno => run_rno(ctx),
        Stage::SalesRno => run_sales_rno(ctx),
        Stage::WmsCompare => run_wms_compare(ctx),
        Stage::Stock => run_stock(ctx),
    }
}
