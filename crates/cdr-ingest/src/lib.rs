//! Loading of CSV exports: reading, header reconciliation, report discovery
//! and date parsing.

pub mod csv;
pub mod dates;
pub mod discovery;
pub mod error;
pub mod polars_utils;
pub mod schema;

pub use csv::{CsvTable, header_key, read_csv_frame, read_csv_table, read_csv_table_skipping};
pub use dates::{DateValue, format_iso, parse_date, parse_date_text, serial_to_date, to_iso};
pub use discovery::{CDR_REPORT_PATTERNS, find_latest_report, list_matching};
pub use error::{IngestError, Result};
pub use polars_utils::{
    any_to_f64, any_to_string, any_to_string_non_empty, format_numeric, is_null_token, parse_f64,
};
pub use schema::{HeaderReport, read_with_schema, read_with_schema_skipping, reconcile_headers};
