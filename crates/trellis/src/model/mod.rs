//! The data model behind the binding.
//!
//! This module covers the synchronous core: record identity and cell
//! payloads, declarative column specs and their normalized form, value
//! extraction, row assembly, and collection reconciliation. Everything
//! here runs inside the host's update pass; the async pieces (remote
//! queries, reorder persistence) live in the crate root modules.
//!
//! # Data flow
//!
//! ```text
//! ColumnSpec[] ── resolve ──> ColumnSet ──┐
//!                                         ├──> RowBuilder ──> GridRow
//! Record collection ── diff ──> CollectionDiff ──┘
//! ```
//!
//! The host supplies a collection and a column spec; resolution runs once
//! per mount; the reconciler drives the row builder on every collection
//! change.

mod column;
mod extract;
mod reconcile;
mod record;
mod row;

pub use column::{
    CellContext, CellFactory, CellRecord, CellSource, ColumnSet, ColumnSpec, FieldPath,
    NormalizedColumn, PropertyAccessor, ValueExtractor,
};
pub use extract::{extract, extract_path};
pub use reconcile::{CollectionDiff, CollectionReconciler};
pub use record::{CellValue, Record, RecordId};
pub use row::{GridRow, RowBuilder, node_token, parse_node_token};
