//! Canonical column names shared by every report.
//!
//! Source exports spell some headers inconsistently (`Outbound Date` vs
//! `Outbound date`); ingestion renames them to the names below once, so the
//! rest of the pipeline only ever sees these spellings.

/// Composite join key: release number ++ container number.
pub const REF1: &str = "Ref1";
/// `Ref1` ++ wattage text.
pub const REF2: &str = "Ref2";

pub const CURRENT_STATUS: &str = "Current_Status";
pub const OUTBOUND_STATUS: &str = "Outbound_status";
pub const RELEASE_STATUS: &str = "Release_Status";
pub const DELIVERY_STATUS: &str = "Delivery_Status";

pub const RELEASE_NUMBER: &str = "Release Number";
pub const CONTAINER_NO: &str = "Container No.";
pub const CONTAINER_NUMBER: &str = "Container Number";
pub const IMPORT_INVOICE: &str = "Import invoice";
pub const INVOICE_NUMBER: &str = "Invoice Number";

pub const PIECE: &str = "Piece";
pub const WATTAGE: &str = "Wattage";
pub const POWER: &str = "Power";
pub const MEGAWATTAGE: &str = "MegaWattage";
/// `MegaWattage` parsed as a number; carried on the outbound and BMO sheets.
pub const MEGAWATTAGE_NUMERIC: &str = "MegaWattage_numeric";

pub const INBOUND_DATE: &str = "Inbound date";
pub const OUTBOUND_DATE: &str = "Outbound date";
pub const AGREED_DELIVERY_DATE: &str = "Agreed Delivery date";
pub const DELIVERY_DATE: &str = "Delivery date";
pub const RELEASE_DATE: &str = "Release date";

/// Which store table a consolidated row came from (`current` / `archive`).
pub const DATA_SOURCE: &str = "data_source";

// Europe stock export.
pub const STOCK_CONTAINER: &str = "Container";
pub const STOCK_DN: &str = "DN";
pub const STOCK_INVOICE: &str = "Inv.";
pub const SOLD_DATE: &str = "Sold Date";
pub const QTY_PC: &str = "Qty(PC)";
pub const DESTINATION_WAREHOUSE: &str = "DestinationWarehouse";

// WMS exports.
pub const WMS_RELEASE_NUMBER: &str = "Release number";
pub const WMS_CONTAINER_NUMBER: &str = "Container number";
pub const WMS_QUANTITY: &str = "Quantity";
/// Export file a combined WMS row was read from.
pub const SOURCE_FILE: &str = "Source_File";

// Columns the sales team maintains on the RNO workbook.
pub const STATUS_CHECK: &str = "Status Check";
pub const ESCALATION_REMINDER: &str = "Escalation/Reminder";
pub const FINAL_PCS: &str = "Final_Pcs";
pub const FINAL_MWP: &str = "Final_MWp";
pub const SALESMAN: &str = "Salesman";
pub const REGION_INFO: &str = "Region info";
pub const STATUS_LOCATION: &str = "Status (Location)";
pub const STATUS_STANDARD_DUE: &str = "Status (Standard/Due)";
pub const OUTBOUND_MONTH: &str = "Outbound_Month";
pub const FINAL_OUTBOUND_PLAN: &str = "Final_Outbound_Plan";

// Reconciliation outputs.
pub const ON_SEA_PCS: &str = "On_Sea_Pcs";
pub const IN_STOCK_PCS: &str = "In_Stock_Pcs";
pub const OUTBOUNDED_PCS: &str = "Outbounded_Pcs";
pub const OUTBOUND_COMPARISON: &str = "Outbound_Comparison";
pub const CNT_TOTAL_PCS_CDR: &str = "cnt_Total_Pcs_cdr";
pub const CNT_OUTBOUND_PCS_CDR: &str = "cnt_Outbound_Pcs_cdr";
pub const PCS_FROM_WMS: &str = "Pcs_from_wms";
pub const OUTBOUND_PCS_WMS: &str = "Outbound_Pcs_wms";
pub const STOCK_PCS_WMS: &str = "Stock_Pcs_wms";
pub const CASE1: &str = "Case1";
pub const CASE2: &str = "Case2";
pub const CASE3: &str = "Case3";
pub const CASE4: &str = "Case4";
pub const CASE_1: &str = "Case_1";

/// Date columns rewritten to `YYYY-MM-DD` when rows cross the store boundary.
pub const STORE_DATE_COLUMNS: &[&str] = &[
    OUTBOUND_DATE,
    AGREED_DELIVERY_DATE,
    DELIVERY_DATE,
    "ETD date POL",
    "ATD date POL",
    "ETA date",
    "ATA date",
    "Import date",
    "Planned Inbound date",
    INBOUND_DATE,
    "Release date from port (ATA date)",
    "Container Returned date",
    RELEASE_DATE,
    "date CMR sent to JASolar",
];
