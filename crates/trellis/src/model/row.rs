//! Row assembly and node identity tokens.
//!
//! A grid row is the ordered sequence of cell values for one record, one
//! per normalized column, tagged with a node identity token derived from
//! the record id. The token is what later removal and reorder operations
//! use to locate the row inside the widget.

use std::sync::Arc;

use super::column::{CellSource, ColumnSet};
use super::extract::extract;
use super::record::{CellValue, Record, RecordId};
use crate::error::Result;

/// Format the node identity token for a record id: `"{prefix}_{id}"`.
pub fn node_token(prefix: &str, id: &RecordId) -> String {
    format!("{prefix}_{id}")
}

/// Parse a node identity token back into a record id.
///
/// Returns `None` if the token does not carry the expected prefix. Numeric
/// token payloads parse as integer ids (the common case); anything else is
/// a string id.
pub fn parse_node_token(prefix: &str, token: &str) -> Option<RecordId> {
    let payload = token
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))?;
    match payload.parse::<i64>() {
        Ok(n) => Some(RecordId::Int(n)),
        Err(_) => Some(RecordId::Str(payload.to_string())),
    }
}

/// One assembled grid row.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    token: String,
    cells: Vec<CellValue>,
}

impl GridRow {
    /// The row's node identity token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The row's cell values, in column order (identity cell first).
    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }
}

/// Assembles grid rows from records and the normalized column model.
pub struct RowBuilder<R> {
    columns: Arc<ColumnSet<R>>,
    prefix: String,
}

impl<R: Record> RowBuilder<R> {
    /// Create a row builder over a resolved column set.
    pub fn new(columns: Arc<ColumnSet<R>>, prefix: impl Into<String>) -> Self {
        Self {
            columns,
            prefix: prefix.into(),
        }
    }

    /// The node token prefix in use.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Build the grid row for one record.
    ///
    /// The row always has exactly one cell per column. Renderer-backed and
    /// contentless columns yield empty placeholders; actual rendering of
    /// renderer cells is delegated to the widget-level cell-created hook,
    /// invoked lazily by the grid.
    pub fn build(&self, record: &R) -> Result<GridRow> {
        let id = record.record_id();
        let mut cells = Vec::with_capacity(self.columns.len());

        for column in self.columns.columns() {
            let cell = match column.source() {
                CellSource::Identity => CellValue::from(&id),
                CellSource::Accessor(accessor) => extract(record, accessor)?,
                CellSource::Renderer { .. } | CellSource::Empty => CellValue::None,
            };
            cells.push(cell);
        }

        Ok(GridRow {
            token: node_token(&self.prefix, &id),
            cells,
        })
    }
}
