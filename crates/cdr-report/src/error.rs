//! Report-level failures that callers may want to match on.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CdrError {
    /// Every source table was empty, so there is nothing to consolidate.
    #[error("no rows in {}; nothing to consolidate", tables.join(" or "))]
    NothingToConsolidate { tables: Vec<String> },

    /// A report input was found but carried no rows.
    #[error("input {} has no rows", path.display())]
    EmptyInput { path: PathBuf },

    /// A WMS export has neither `Ref1` nor the columns to build it.
    #[error("WMS export {} has no Ref1 column and no release/container columns to build it", path.display())]
    MissingWmsKey { path: PathBuf },

    /// The outbound export folder held no readable export.
    #[error("no readable WMS export in {}", dir.display())]
    NoWmsExports { dir: PathBuf },
}
