//! A table store backed by one JSON document per table.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::rows::RowSet;
use crate::table::TableStore;

/// Persists each table as `<dir>/<table>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryTableStore {
    root: PathBuf,
}

impl DirectoryTableStore {
    /// Opens (and creates if needed) the store directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}.json"))
    }

    fn load(&self, table: &str) -> Result<Option<RowSet>> {
        let path = self.table_path(table);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let rows: RowSet =
            serde_json::from_str(&text).map_err(|source| StoreError::Format { path, source })?;
        rows.validate()?;
        Ok(Some(rows))
    }

    fn save(&self, table: &str, rows: &RowSet) -> Result<()> {
        let path = self.table_path(table);
        let text = serde_json::to_string_pretty(rows).map_err(|source| StoreError::Format {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, text).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), rows = rows.len(), "saved table");
        Ok(())
    }
}

impl TableStore for DirectoryTableStore {
    fn select(&self, table: &str, offset: usize, limit: usize) -> Result<RowSet> {
        self.load(table)?
            .map(|rows| rows.slice(offset, limit))
            .ok_or_else(|| StoreError::TableNotFound {
                table: table.to_string(),
            })
    }

    fn delete_all(&mut self, table: &str) -> Result<usize> {
        let existing = self.load(table)?.unwrap_or_default();
        let removed = existing.len();
        self.save(table, &RowSet::new(existing.columns))?;
        Ok(removed)
    }

    fn insert(&mut self, table: &str, rows: &RowSet) -> Result<usize> {
        rows.validate()?;
        let mut existing = self.load(table)?.unwrap_or_default();
        existing.append(rows);
        self.save(table, &existing)?;
        Ok(rows.len())
    }
}
