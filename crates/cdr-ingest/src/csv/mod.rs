//! CSV reading utilities.

mod header;
mod reader;

pub use header::{header_key, parse_header_line, sniff_delimiter};
pub use reader::{
    CsvTable, read_csv_frame, read_csv_table, read_csv_table_skipping, validate_encoding,
};
