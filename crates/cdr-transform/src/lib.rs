//! Shipment frame transformations.
//!
//! - **normalize**: identifier cleanup and the `Ref1` / `Ref2` keys
//! - **classify**: lifecycle statuses derived from dates
//! - **records**: typed [`cdr_model::ShipmentRecord`] extraction
//! - **enrich**: the daily-transfer derivation pass
//! - **aggregate**: group-by-key sums, pivots and status summaries
//! - **reconcile**: order-preserving left joins and comparison flags
//! - **window** / **filter**: date windows, row predicates and projections

pub mod aggregate;
pub mod classify;
pub mod data_utils;
pub mod enrich;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod reconcile;
pub mod records;
pub mod window;

pub use aggregate::{
    GroupedSums, KeyTotals, PivotTable, StatusCount, StatusSummary, grouped_sums, pivot_sum,
    round2, status_summary, sum_by_key, sum_by_status, sum_column_by_key,
};
pub use classify::{classify, classify_outbound, classify_release, delivery_statuses};
pub use enrich::{EnrichStats, Enriched, enrich_daily};
pub use error::{Result, TransformError};
pub use filter::project;
pub use normalize::{build_ref1, build_ref2, normalize_identifier_columns, strip_special_chars};
pub use reconcile::{add_equal_flag, equal_flag, left_join_lookup, left_join_totals};
pub use records::records_from_frame;
pub use window::{Window, window_mask};
