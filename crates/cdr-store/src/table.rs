//! The table store seam and its in-memory implementation.

use std::collections::BTreeMap;

use crate::error::{Result, StoreError};
use crate::rows::RowSet;

/// A named-table backend that pages rows out and replaces them wholesale.
pub trait TableStore {
    /// Returns up to `limit` rows starting at `offset`.
    fn select(&self, table: &str, offset: usize, limit: usize) -> Result<RowSet>;

    /// Removes every row of `table`, returning how many were removed.
    fn delete_all(&mut self, table: &str) -> Result<usize>;

    /// Appends `rows` to `table`, returning how many were written.
    fn insert(&mut self, table: &str, rows: &RowSet) -> Result<usize>;
}

/// Tables held in process memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTableStore {
    tables: BTreeMap<String, RowSet>,
}

impl InMemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: &str, rows: RowSet) -> Self {
        self.tables.insert(table.to_string(), rows);
        self
    }

    pub fn table(&self, table: &str) -> Option<&RowSet> {
        self.tables.get(table)
    }
}

impl TableStore for InMemoryTableStore {
    fn select(&self, table: &str, offset: usize, limit: usize) -> Result<RowSet> {
        self.tables
            .get(table)
            .map(|rows| rows.slice(offset, limit))
            .ok_or_else(|| StoreError::TableNotFound {
                table: table.to_string(),
            })
    }

    fn delete_all(&mut self, table: &str) -> Result<usize> {
        let entry = self.tables.entry(table.to_string()).or_default();
        let removed = entry.len();
        entry.rows.clear();
        Ok(removed)
    }

    fn insert(&mut self, table: &str, rows: &RowSet) -> Result<usize> {
        rows.validate()?;
        self.tables
            .entry(table.to_string())
            .or_default()
            .append(rows);
        Ok(rows.len())
    }
}
