//! Paging and replace-all behaviour across store implementations.

use std::cell::Cell;

use cdr_model::BatchFailurePolicy;
use cdr_store::{
    DirectoryTableStore, InMemoryTableStore, RowSet, StoreError, TableStore, fetch_all,
    fetch_non_empty, replace_all,
};
use tempfile::TempDir;

fn numbered(count: usize) -> RowSet {
    let mut rows = RowSet::new(vec!["Ref1".into(), "Piece".into()]);
    for idx in 0..count {
        rows.push_row(vec![Some(format!("K{idx}")), Some(idx.to_string())])
            .unwrap();
    }
    rows
}

/// Wraps an in-memory store and rejects chosen insert calls.
struct FlakyStore {
    inner: InMemoryTableStore,
    fail_inserts: Vec<usize>,
    fail_select_at: Option<usize>,
    insert_calls: Cell<usize>,
    select_calls: Cell<usize>,
}

impl FlakyStore {
    fn new(inner: InMemoryTableStore) -> Self {
        Self {
            inner,
            fail_inserts: Vec::new(),
            fail_select_at: None,
            insert_calls: Cell::new(0),
            select_calls: Cell::new(0),
        }
    }
}

impl TableStore for FlakyStore {
    fn select(&self, table: &str, offset: usize, limit: usize) -> cdr_store::Result<RowSet> {
        let call = self.select_calls.get();
        self.select_calls.set(call + 1);
        if self.fail_select_at == Some(call) {
            return Err(StoreError::Rejected {
                table: table.to_string(),
                reason: "timeout".into(),
            });
        }
        self.inner.select(table, offset, limit)
    }

    fn delete_all(&mut self, table: &str) -> cdr_store::Result<usize> {
        self.inner.delete_all(table)
    }

    fn insert(&mut self, table: &str, rows: &RowSet) -> cdr_store::Result<usize> {
        let call = self.insert_calls.get();
        self.insert_calls.set(call + 1);
        if self.fail_inserts.contains(&call) {
            return Err(StoreError::Rejected {
                table: table.to_string(),
                reason: "payload too large".into(),
            });
        }
        self.inner.insert(table, rows)
    }
}

#[test]
fn fetch_all_reads_every_page_in_order() {
    let store = InMemoryTableStore::new().with_table("current_report", numbered(7));
    let rows = fetch_all(&store, "current_report", 3).unwrap();
    assert_eq!(rows, numbered(7));
}

#[test]
fn fetch_all_stops_on_an_empty_page_at_an_exact_multiple() {
    let store = FlakyStore::new(InMemoryTableStore::new().with_table("t", numbered(6)));
    let rows = fetch_all(&store, "t", 3).unwrap();
    assert_eq!(rows.len(), 6);
    assert_eq!(store.select_calls.get(), 3);
}

#[test]
fn failed_page_aborts_the_fetch() {
    let mut store = FlakyStore::new(InMemoryTableStore::new().with_table("t", numbered(10)));
    store.fail_select_at = Some(1);
    assert!(matches!(
        fetch_all(&store, "t", 3),
        Err(StoreError::Rejected { .. })
    ));
}

#[test]
fn empty_table_is_an_error_when_rows_are_required() {
    let store = InMemoryTableStore::new().with_table("archive_data", RowSet::default());
    assert!(matches!(
        fetch_non_empty(&store, "archive_data", 10),
        Err(StoreError::EmptyTable { .. })
    ));
}

#[test]
fn replace_all_discards_previous_rows() {
    let mut store = InMemoryTableStore::new().with_table("t", numbered(4));
    let report = replace_all(&mut store, "t", &numbered(5), 2, BatchFailurePolicy::Abort).unwrap();
    assert_eq!(report.deleted, 4);
    assert_eq!(report.inserted, 5);
    assert!(report.is_complete());
    assert_eq!(store.table("t").unwrap(), &numbered(5));
}

#[test]
fn abort_policy_stops_at_the_first_failed_batch() {
    let mut store = FlakyStore::new(InMemoryTableStore::new());
    store.fail_inserts = vec![1];
    let err = replace_all(&mut store, "t", &numbered(6), 2, BatchFailurePolicy::Abort).unwrap_err();
    assert!(matches!(err, StoreError::BatchFailed { batch: 1, .. }));
    assert_eq!(store.inner.table("t").unwrap().len(), 2);
}

#[test]
fn skip_policy_records_failed_batches_and_continues() {
    let mut store = FlakyStore::new(InMemoryTableStore::new());
    store.fail_inserts = vec![0, 2];
    let report = replace_all(&mut store, "t", &numbered(6), 2, BatchFailurePolicy::Skip).unwrap();
    assert_eq!(report.inserted, 2);
    assert_eq!(report.failed_batches, vec![0, 2]);
    assert_eq!(
        store.inner.table("t").unwrap().get(0, "Ref1"),
        Some("K2")
    );
}

#[test]
fn directory_store_pages_like_memory() {
    let dir = TempDir::new().unwrap();
    let mut store = DirectoryTableStore::open(dir.path().join("store")).unwrap();
    replace_all(&mut store, "current_report", &numbered(5), 2, BatchFailurePolicy::Abort).unwrap();
    let rows = fetch_all(&store, "current_report", 2).unwrap();
    assert_eq!(rows, numbered(5));
}
