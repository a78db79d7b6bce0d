//! Declared input schemas and output projections.
//!
//! Each source export has one [`Schema`]. Ingestion matches the file's
//! headers against it once; reports then address columns only by the
//! canonical names in [`crate::columns`]. Each report's output shape is a
//! [`Projection`] instead of an ad hoc drop list.

use crate::columns::{
    AGREED_DELIVERY_DATE, CASE_1, CASE1, CASE2, CASE3, CASE4, CNT_OUTBOUND_PCS_CDR,
    CNT_TOTAL_PCS_CDR, CONTAINER_NO, CONTAINER_NUMBER, CURRENT_STATUS, DATA_SOURCE,
    DELIVERY_DATE, DELIVERY_STATUS, DESTINATION_WAREHOUSE, ESCALATION_REMINDER, FINAL_MWP,
    FINAL_OUTBOUND_PLAN, FINAL_PCS, IMPORT_INVOICE, IN_STOCK_PCS, INBOUND_DATE, MEGAWATTAGE,
    MEGAWATTAGE_NUMERIC, ON_SEA_PCS, OUTBOUND_COMPARISON, OUTBOUND_DATE, OUTBOUND_MONTH,
    OUTBOUND_PCS_WMS, OUTBOUND_STATUS, OUTBOUNDED_PCS, PCS_FROM_WMS, PIECE, POWER, QTY_PC,
    REF1, REF2, REGION_INFO, RELEASE_DATE, RELEASE_NUMBER, RELEASE_STATUS, SALESMAN, SOLD_DATE,
    SOURCE_FILE, STATUS_CHECK, STATUS_LOCATION, STATUS_STANDARD_DUE, STOCK_CONTAINER, STOCK_DN,
    STOCK_INVOICE, STOCK_PCS_WMS, WATTAGE, WMS_CONTAINER_NUMBER, WMS_QUANTITY,
    WMS_RELEASE_NUMBER,
};

/// One declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Canonical name used after ingestion.
    pub name: &'static str,
    /// Ingestion fails when a required column cannot be matched.
    pub required: bool,
    /// Other spellings seen in exports (matched after header normalization).
    pub aliases: &'static [&'static str],
}

impl ColumnSpec {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            aliases: &[],
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            aliases: &[],
        }
    }

    pub const fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    /// Canonical name followed by every alias.
    pub fn spellings(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }
}

/// The expected columns of one source export.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub name: &'static str,
    pub columns: &'static [ColumnSpec],
}

impl Schema {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|spec| spec.name == name)
    }

    pub fn required_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|spec| spec.required)
    }
}

const OUTBOUND_DATE_SPEC: ColumnSpec =
    ColumnSpec::optional(OUTBOUND_DATE).with_aliases(&["Outbound Dates"]);
const CONTAINER_NO_SPEC: ColumnSpec =
    ColumnSpec::required(CONTAINER_NO).with_aliases(&["Container No"]);

/// Raw rows of the `daily_report` table before enrichment.
pub const DAILY_REPORT_SCHEMA: Schema = Schema {
    name: "daily_report",
    columns: &[
        CONTAINER_NO_SPEC,
        ColumnSpec::required(RELEASE_NUMBER),
        ColumnSpec::optional(IMPORT_INVOICE),
        ColumnSpec::optional(PIECE),
        ColumnSpec::optional(WATTAGE),
        ColumnSpec::optional(INBOUND_DATE),
        OUTBOUND_DATE_SPEC,
        ColumnSpec::optional(AGREED_DELIVERY_DATE),
        ColumnSpec::optional(DELIVERY_DATE),
        ColumnSpec::optional(RELEASE_DATE),
    ],
};

/// The consolidated data report (CDR) snapshot.
pub const CDR_SCHEMA: Schema = Schema {
    name: "CDR",
    columns: &[
        CONTAINER_NO_SPEC,
        ColumnSpec::required(RELEASE_NUMBER),
        ColumnSpec::optional(REF1),
        ColumnSpec::optional(REF2),
        ColumnSpec::optional(PIECE),
        ColumnSpec::optional(WATTAGE),
        ColumnSpec::optional(POWER),
        ColumnSpec::optional(MEGAWATTAGE),
        ColumnSpec::optional(CURRENT_STATUS),
        ColumnSpec::optional(OUTBOUND_STATUS),
        ColumnSpec::optional(RELEASE_STATUS),
        ColumnSpec::optional(DELIVERY_STATUS),
        ColumnSpec::optional(DATA_SOURCE),
        ColumnSpec::optional(INBOUND_DATE),
        OUTBOUND_DATE_SPEC,
        ColumnSpec::optional(AGREED_DELIVERY_DATE),
        ColumnSpec::optional(DELIVERY_DATE),
        ColumnSpec::optional(RELEASE_DATE),
    ],
};

/// The `Outbound_logistics_report` sheet consumed by the BMO report.
pub const OUTBOUND_SHEET_SCHEMA: Schema = Schema {
    name: "Outbound_logistics_report",
    columns: &[
        OUTBOUND_DATE_SPEC,
        ColumnSpec::optional(RELEASE_NUMBER),
        ColumnSpec::optional(CONTAINER_NO).with_aliases(&["Container No"]),
        ColumnSpec::optional(PIECE),
        ColumnSpec::optional(MEGAWATTAGE),
        ColumnSpec::optional(MEGAWATTAGE_NUMERIC),
        ColumnSpec::optional(OUTBOUND_STATUS),
    ],
};

/// The BMO month-to-date sheet consumed by the WMS comparison.
pub const BMO_SHEET_SCHEMA: Schema = Schema {
    name: "BMO Report MTD",
    columns: &[
        ColumnSpec::required(RELEASE_NUMBER),
        CONTAINER_NO_SPEC,
        ColumnSpec::required(PIECE),
        ColumnSpec::optional(POWER),
        ColumnSpec::optional(MEGAWATTAGE_NUMERIC),
        OUTBOUND_DATE_SPEC,
    ],
};

/// The Europe stock summary export (primary side of the RNO reconciliation).
pub const EUROPE_STOCK_SCHEMA: Schema = Schema {
    name: "Summary-Europe",
    columns: &[
        ColumnSpec::required(STOCK_CONTAINER),
        ColumnSpec::required(STOCK_DN),
        ColumnSpec::optional(STOCK_INVOICE).with_aliases(&["Inv"]),
        ColumnSpec::required(SOLD_DATE),
        ColumnSpec::required(QTY_PC).with_aliases(&["Qty PC", "Qty (PC)"]),
    ],
};

/// WMS outbound and stock exports.
pub const WMS_SCHEMA: Schema = Schema {
    name: "WMS",
    columns: &[
        ColumnSpec::optional(REF1),
        ColumnSpec::optional(WMS_RELEASE_NUMBER),
        ColumnSpec::optional(WMS_CONTAINER_NUMBER),
        ColumnSpec::required(WMS_QUANTITY),
    ],
};

/// The RNO workbook after the sales team added their status columns.
pub const ANNOTATED_RNO_SCHEMA: Schema = Schema {
    name: "RNO Report",
    columns: &[
        ColumnSpec::optional(STATUS_CHECK),
        ColumnSpec::optional(ESCALATION_REMINDER),
    ],
};

/// The Final RNO report, and the `Main Data` sheet derived from it.
pub const SALES_RNO_SCHEMA: Schema = Schema {
    name: "Final RNO Report",
    columns: &[
        ColumnSpec::required(STATUS_CHECK),
        ColumnSpec::required(FINAL_MWP),
        ColumnSpec::required(FINAL_PCS),
        ColumnSpec::optional(SALESMAN),
        ColumnSpec::optional(REGION_INFO),
        ColumnSpec::optional(STATUS_LOCATION),
        ColumnSpec::optional(STATUS_STANDARD_DUE),
        ColumnSpec::optional(OUTBOUND_MONTH),
        ColumnSpec::optional(FINAL_OUTBOUND_PLAN),
    ],
};

/// A list of `Ref1` values to exclude from the RNO report.
pub const REMOVAL_LIST_SCHEMA: Schema = Schema {
    name: "Remove_data",
    columns: &[ColumnSpec::required(REF1)],
};

/// Output shape of one report.
#[derive(Debug, Clone, Copy, Default)]
pub struct Projection {
    /// Moved to the front, in this order, when present.
    pub leading: &'static [&'static str],
    /// Removed when present.
    pub drop: &'static [&'static str],
    /// Moved to the back, in this order, when present.
    pub trailing: &'static [&'static str],
}

/// Columns the daily transfer never forwards to `current_report`.
pub const DAILY_TRANSFER_PROJECTION: Projection = Projection {
    leading: &[],
    drop: &["Total Wattage", "MW"],
    trailing: &[],
};

pub const LOGISTICS_OUTBOUND_PROJECTION: Projection = Projection {
    leading: &[],
    drop: &[
        "House B/l",
        "Bill of Lading",
        "Shipping line",
        "Vessel",
        "ETD date POL",
        "ATD date POL",
        "ETA date",
        "ATA date",
        "Import MRN",
        "Import date",
        "Planned Inbound date",
        "Inbound duration days (Inbound date-ATA date+1)",
        "Inbound Status",
        "Dev. Planned to Real in days (Inbound date-Planned inbound date",
        "Release date from port (ATA date)",
        "Contractual freetime for D&D combined",
        "Free DM days",
        "Free DT days",
        "Free DM days remained",
        "Free DT days remained",
        "Container Returned date",
        "Factory JASolar",
        "Storage time after release",
        "Delivery Duration",
        "Dev. Between Agreed vs Real delivery date",
        "Sales Name",
        "date CMR sent to JASolar",
        "PTW / intermodel type",
        "Port fees (THC, ISPS, etc. )",
        "DM cost",
        "DT cost",
        "Port storage cost",
        "Drayage costs (Port to WH)",
        "Inbound costs",
        "Storage costs (fm IB to Today/OB)",
        "Outbound costs",
        "Transport costs",
        REF1,
        REF2,
        "created_at",
        "id",
        "Stock Status",
        "Stock age",
        "Internal Outbound ref",
        "Destination Address",
        "Destination Postal Code",
        "Status",
    ],
    trailing: &[],
};

pub const BMO_PROJECTION: Projection = Projection {
    leading: &[],
    drop: &[
        DATA_SOURCE,
        MEGAWATTAGE,
        CURRENT_STATUS,
        RELEASE_STATUS,
        DELIVERY_STATUS,
        OUTBOUND_STATUS,
    ],
    trailing: &[],
};

/// Europe stock columns that carry no reconciliation value.
pub const EUROPE_STOCK_PROJECTION: Projection = Projection {
    leading: &[],
    drop: &[
        "Factory",
        "Related transaction company",
        "Related transaction Term",
        "Currency",
        "Inv No.",
        "C2 --> C1 Date",
        "Handover Date",
        "Contractual Delivery Week",
        "Country Code",
        "Internal related price",
        "Battery type",
        "Border Color",
        "Junction box",
        "length",
        "Voltage",
        "Storage duration",
        "original WH",
        "Warehouse after transfer",
        "ETD month",
        "Sold month",
        "outbound quantity",
        "Rest quantity",
        "Released on the sea",
        "Booking No.",
        "EWX Week",
        "Type.2",
        "Auxiliary column",
        "Inv&type",
    ],
    trailing: &[],
};

pub const RNO_PROJECTION: Projection = Projection {
    leading: &[REF1, CONTAINER_NUMBER, RELEASE_NUMBER],
    drop: &[],
    trailing: &[],
};

/// Released-less stock rows (no DN and no sold date).
pub const NOT_RELEASED_PROJECTION: Projection = Projection {
    leading: &[REF1, CONTAINER_NUMBER, RELEASE_NUMBER, DESTINATION_WAREHOUSE],
    drop: &[],
    trailing: &[],
};

/// Reconciliation working columns removed from the Final RNO report.
pub const FINAL_RNO_PROJECTION: Projection = Projection {
    leading: &[],
    drop: &[
        QTY_PC,
        "Qty(plts)",
        "Power(W)",
        "Status",
        "SKU",
        OUTBOUND_DATE,
        AGREED_DELIVERY_DATE,
        DELIVERY_DATE,
        ON_SEA_PCS,
        IN_STOCK_PCS,
        OUTBOUNDED_PCS,
        OUTBOUND_COMPARISON,
        CASE1,
        CASE2,
        CASE3,
        CASE4,
        CNT_TOTAL_PCS_CDR,
        CNT_OUTBOUND_PCS_CDR,
        PCS_FROM_WMS,
        "New1",
        "3pls_Planned",
        "Email_Plan_Outbound",
    ],
    trailing: &[],
};

/// `Main Data` sheet of the Sales RNO report.
pub const SALES_RNO_PROJECTION: Projection = Projection {
    leading: &[],
    drop: &[
        OUTBOUND_DATE,
        AGREED_DELIVERY_DATE,
        DELIVERY_DATE,
        ON_SEA_PCS,
        IN_STOCK_PCS,
        OUTBOUNDED_PCS,
        OUTBOUND_COMPARISON,
        CASE1,
        CNT_TOTAL_PCS_CDR,
        CNT_OUTBOUND_PCS_CDR,
        CASE4,
        PCS_FROM_WMS,
        CASE2,
        CASE3,
        "Column1",
        CURRENT_STATUS,
        REF1,
        "3pls_Planned",
        "Email_Plan_Outbound",
    ],
    trailing: &[],
};

/// Combined WMS outbound exports, provenance last.
pub const WMS_COMBINED_PROJECTION: Projection = Projection {
    leading: &[],
    drop: &[],
    trailing: &[SOURCE_FILE, REF1],
};

/// Applied after mismatches are selected, so the flag column itself is dropped.
pub const WMS_COMPARE_PROJECTION: Projection = Projection {
    leading: &[REF1],
    drop: &[CASE_1],
    trailing: &[OUTBOUND_PCS_WMS, STOCK_PCS_WMS],
};
