//! Paginated table storage for CDR snapshots.
//!
//! The [`TableStore`] trait stands in for the remote table service. Reports
//! read through [`fetch_all`] and write through [`replace_all`].

pub mod directory;
pub mod error;
pub mod rows;
pub mod table;
pub mod transfer;

pub use directory::DirectoryTableStore;
pub use error::{Result, StoreError};
pub use rows::RowSet;
pub use table::{InMemoryTableStore, TableStore};
pub use transfer::{ReplaceReport, fetch_all, fetch_non_empty, replace_all};
