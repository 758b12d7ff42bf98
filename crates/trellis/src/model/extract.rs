//! Value extraction.
//!
//! Resolves a single cell value out of a record given a column's accessor.
//! Extraction is strict: every segment of a dotted path must resolve, and a
//! segment that does not fails with [`BindingError::MissingPath`] rather
//! than silently yielding an empty cell - the source collection is assumed
//! well-formed, and a hole in it is a host-side contract violation worth
//! surfacing immediately. A field that is present but JSON `null` is a
//! legitimate empty value, not an error.
//!
//! There is no caching; extraction is O(path length) and runs once per
//! (row, column) pair.

use serde_json::Value;

use super::column::{FieldPath, PropertyAccessor};
use super::record::{CellValue, Record};
use crate::error::{BindingError, Result};

/// Extract a cell value from a record through an accessor.
pub fn extract<R: Record>(record: &R, accessor: &PropertyAccessor<R>) -> Result<CellValue> {
    match accessor {
        PropertyAccessor::Extractor(f) => Ok(f(record)),
        PropertyAccessor::Path(path) => {
            let (first, rest) = split_path(path);
            let root = record
                .field(first)
                .ok_or_else(|| missing(path, first))?;
            walk(root, rest, path)
        }
    }
}

/// Extract a cell value from an already-materialized JSON row.
///
/// Remote mode renders rows the server returned for the current page; the
/// extraction target is that row object, not an original record.
pub fn extract_path(row: &Value, path: &FieldPath) -> Result<CellValue> {
    let (first, rest) = split_path(path);
    let root = row
        .get(first)
        .cloned()
        .ok_or_else(|| missing(path, first))?;
    walk(root, rest, path)
}

fn split_path(path: &FieldPath) -> (&str, &[String]) {
    // FieldPath::parse on a non-empty string always yields at least one
    // segment; an empty path degenerates to one empty segment, which then
    // fails lookup like any other missing field.
    match path.segments() {
        [first, rest @ ..] => (first.as_str(), rest),
        [] => ("", &[]),
    }
}

fn walk(root: Value, rest: &[String], path: &FieldPath) -> Result<CellValue> {
    let mut current = root;
    for segment in rest {
        current = current
            .get(segment)
            .cloned()
            .ok_or_else(|| missing(path, segment))?;
    }
    Ok(CellValue::from(&current))
}

fn missing(path: &FieldPath, segment: &str) -> BindingError {
    BindingError::MissingPath {
        path: path.as_str().to_string(),
        segment: segment.to_string(),
    }
}
