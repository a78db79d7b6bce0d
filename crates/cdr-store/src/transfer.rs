//! Paged reads and wholesale replacement over a [`TableStore`].

use cdr_model::BatchFailurePolicy;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::rows::RowSet;
use crate::table::TableStore;

/// Reads every row of `table` page by page.
///
/// Stops at the first page shorter than `page_size`. Any failed page aborts
/// the whole fetch.
pub fn fetch_all<S: TableStore + ?Sized>(
    store: &S,
    table: &str,
    page_size: usize,
) -> Result<RowSet> {
    let page_size = page_size.max(1);
    let mut all = RowSet::default();
    let mut offset = 0;
    loop {
        let page = store.select(table, offset, page_size)?;
        let fetched = page.len();
        debug!(table, offset, fetched, "fetched page");
        if all.columns.is_empty() {
            all.columns = page.columns.clone();
        }
        all.append(&page);
        if fetched < page_size {
            break;
        }
        offset += fetched;
    }
    info!(table, rows = all.len(), "fetched table");
    Ok(all)
}

/// Like [`fetch_all`], but an empty table is an error.
pub fn fetch_non_empty<S: TableStore + ?Sized>(
    store: &S,
    table: &str,
    page_size: usize,
) -> Result<RowSet> {
    let rows = fetch_all(store, table, page_size)?;
    if rows.is_empty() {
        return Err(StoreError::EmptyTable {
            table: table.to_string(),
        });
    }
    Ok(rows)
}

/// Outcome of a [`replace_all`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaceReport {
    pub table: String,
    pub deleted: usize,
    pub inserted: usize,
    pub failed_batches: Vec<usize>,
}

impl ReplaceReport {
    pub fn is_complete(&self) -> bool {
        self.failed_batches.is_empty()
    }
}

/// Deletes every row of `table`, then inserts `rows` in batches.
///
/// With [`BatchFailurePolicy::Abort`] the first failed batch is returned as
/// an error and the table is left holding the batches written so far. With
/// [`BatchFailurePolicy::Skip`] the failure is logged and recorded in the
/// report.
pub fn replace_all<S: TableStore + ?Sized>(
    store: &mut S,
    table: &str,
    rows: &RowSet,
    batch_size: usize,
    policy: BatchFailurePolicy,
) -> Result<ReplaceReport> {
    rows.validate()?;
    let deleted = store.delete_all(table)?;
    info!(table, deleted, "cleared table");

    let mut report = ReplaceReport {
        table: table.to_string(),
        deleted,
        ..ReplaceReport::default()
    };
    for (batch, chunk) in rows.batches(batch_size).iter().enumerate() {
        match store.insert(table, chunk) {
            Ok(written) => {
                report.inserted += written;
                debug!(table, batch, written, "inserted batch");
            }
            Err(err) => match policy {
                BatchFailurePolicy::Abort => {
                    return Err(StoreError::BatchFailed {
                        table: table.to_string(),
                        batch,
                        source: Box::new(err),
                    });
                }
                BatchFailurePolicy::Skip => {
                    warn!(table, batch, error = %err, "skipping failed batch");
                    report.failed_batches.push(batch);
                }
            },
        }
    }
    info!(
        table,
        inserted = report.inserted,
        failed = report.failed_batches.len(),
        "replaced table"
    );
    Ok(report)
}
