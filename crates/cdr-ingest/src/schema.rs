//! Header reconciliation against a declared schema.

use std::collections::BTreeSet;
use std::path::Path;

use cdr_model::Schema;
use polars::prelude::*;
use tracing::{debug, info};

use crate::csv::{header_key, read_csv_frame, read_csv_table_skipping};
use crate::error::{IngestError, Result};

/// What reconciliation did to a frame's headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderReport {
    /// `(source header, canonical name)` for every renamed column.
    pub renamed: Vec<(String, String)>,
    /// Source columns the schema does not declare. They are kept as-is.
    pub unmatched: Vec<String>,
    /// Declared optional columns that the source does not carry.
    pub missing_optional: Vec<String>,
}

/// Renames source headers to the schema's canonical names.
///
/// An exact header match wins over a normalized one. Missing required
/// columns are an error; everything else is reported, never dropped.
pub fn reconcile_headers(frame: &mut DataFrame, schema: &Schema) -> Result<HeaderReport> {
    let source: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let mut claimed: BTreeSet<usize> = BTreeSet::new();
    let mut report = HeaderReport::default();
    let mut missing_required = Vec::new();

    for spec in schema.columns {
        let exact = source
            .iter()
            .position(|name| name == spec.name)
            .filter(|idx| !claimed.contains(idx));
        let matched = exact.or_else(|| {
            let keys: Vec<String> = spec.spellings().map(header_key).collect();
            source.iter().enumerate().find_map(|(idx, name)| {
                (!claimed.contains(&idx) && keys.contains(&header_key(name))).then_some(idx)
            })
        });

        match matched {
            Some(idx) => {
                claimed.insert(idx);
                if source[idx] != spec.name {
                    report
                        .renamed
                        .push((source[idx].clone(), spec.name.to_string()));
                }
            }
            None if spec.required => missing_required.push(spec.name.to_string()),
            None => report.missing_optional.push(spec.name.to_string()),
        }
    }

    if !missing_required.is_empty() {
        return Err(IngestError::MissingColumns {
            schema: schema.name,
            columns: missing_required,
        });
    }

    for (from, to) in &report.renamed {
        frame.rename(from, to.as_str().into())?;
    }
    report.unmatched = source
        .iter()
        .enumerate()
        .filter(|(idx, _)| !claimed.contains(idx))
        .map(|(_, name)| name.clone())
        .collect();

    if !report.renamed.is_empty() {
        info!(
            schema = schema.name,
            renamed = ?report.renamed,
            "renamed source headers"
        );
    }
    debug!(
        schema = schema.name,
        unmatched = report.unmatched.len(),
        missing_optional = ?report.missing_optional,
        "header reconciliation"
    );

    Ok(report)
}

/// Reads a CSV export and reconciles its headers in one step.
pub fn read_with_schema(path: &Path, schema: &Schema) -> Result<DataFrame> {
    let mut frame = read_csv_frame(path)?;
    reconcile_headers(&mut frame, schema)?;
    Ok(frame)
}

/// [`read_with_schema`] for exports with title lines above the header.
pub fn read_with_schema_skipping(path: &Path, schema: &Schema, preamble_rows: usize) -> Result<DataFrame> {
    let mut frame = read_csv_table_skipping(path, preamble_rows)?.frame;
    reconcile_headers(&mut frame, schema)?;
    Ok(frame)
}
