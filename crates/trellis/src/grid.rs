//! The grid widget boundary.
//!
//! The grid itself (rendering, pagination UI, sorting engine, search box)
//! is an external collaborator. This module defines the contract the
//! binding consumes: a [`GridHost`] that initializes the widget from a
//! [`GridConfig`] and returns an explicitly owned [`GridHandle`], which all
//! subsequent operations go through - there is no ambient widget lookup.
//!
//! The handle is owned exclusively by the binding instance; no other
//! component may mutate the widget.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::model::{CellValue, GridRow};
use crate::remote::RemoteSettings;

/// Default page length carried to the widget.
pub const DEFAULT_PAGE_LENGTH: usize = 50;

/// Default page-length menu carried to the widget.
pub const DEFAULT_LENGTH_MENU: [usize; 4] = [10, 25, 50, 100];

/// Hook invoked by the grid when it creates a renderer-backed cell.
///
/// Arguments are the widget's opaque cell slot and the row's cell values
/// (identity cell first). The hook resolves the backing record and mounts
/// the host component; the binding wires one of these per renderer column.
pub type CellCreatedHook = Arc<dyn Fn(&mut dyn Any, &[CellValue]) + Send + Sync>;

/// Render callback for server-side rows.
///
/// Given the materialized row object the server returned for the current
/// page, produces the display value for one column.
pub type RemoteCellRender = Arc<dyn Fn(&Value) -> Result<CellValue> + Send + Sync>;

/// One column's configuration as handed to the grid widget.
pub struct ColumnDefinition {
    /// The column's position, identity column included.
    pub target_index: usize,
    /// Header title.
    pub title: String,
    /// Whether the column is displayed.
    pub visible: bool,
    /// Whether the column participates in sorting.
    pub orderable: bool,
    /// Whether the column participates in searching.
    pub searchable: bool,
    /// The name sent to the remote endpoint for this column (remote mode
    /// only).
    pub query_name: Option<String>,
    /// Cell-creation hook for renderer-backed columns.
    pub on_cell_created: Option<CellCreatedHook>,
    /// Server-side row render callback (remote mode, value columns only).
    pub render: Option<RemoteCellRender>,
}

impl fmt::Debug for ColumnDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDefinition")
            .field("target_index", &self.target_index)
            .field("title", &self.title)
            .field("visible", &self.visible)
            .field("orderable", &self.orderable)
            .field("searchable", &self.searchable)
            .field("query_name", &self.query_name)
            .field("on_cell_created", &self.on_cell_created.is_some())
            .field("render", &self.render.is_some())
            .finish()
    }
}

/// Widget configuration assembled by the binding at mount.
pub struct GridConfig {
    /// Per-column configuration, identity column first.
    pub column_definitions: Vec<ColumnDefinition>,
    /// Rows per page.
    pub page_length: usize,
    /// Page-length choices offered to the user.
    pub length_menu: Vec<usize>,
    /// Whether column sorting is enabled. Disabled while row reordering
    /// is active - a user-ordered table must not be resorted under them.
    pub ordering_enabled: bool,
    /// Server-side data settings; `None` means local mode.
    pub remote: Option<RemoteSettings>,
}

impl GridConfig {
    /// Create a config with the documented widget defaults.
    pub fn new(column_definitions: Vec<ColumnDefinition>) -> Self {
        Self {
            column_definitions,
            page_length: DEFAULT_PAGE_LENGTH,
            length_menu: DEFAULT_LENGTH_MENU.to_vec(),
            ordering_enabled: true,
            remote: None,
        }
    }
}

impl fmt::Debug for GridConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridConfig")
            .field("column_definitions", &self.column_definitions)
            .field("page_length", &self.page_length)
            .field("length_menu", &self.length_menu)
            .field("ordering_enabled", &self.ordering_enabled)
            .field("remote", &self.remote.is_some())
            .finish()
    }
}

/// The initialized widget, owned by the binding.
pub trait GridHandle: Send + Sync {
    /// Insert one row. The row's node identity token must be attached to
    /// the created row node. Does not redraw.
    fn add_row(&self, row: GridRow);

    /// Remove the row carrying the given node identity token and redraw.
    fn remove_row(&self, token: &str);

    /// Redraw the widget after a batch of insertions.
    fn redraw(&self);

    /// Re-fetch the current page from the remote endpoint (remote mode).
    fn reload_remote(&self);
}

/// The widget factory: consumes a [`GridConfig`], yields a handle.
pub trait GridHost {
    /// Initialize the widget. Fails with
    /// [`BindingError::GridInit`](crate::BindingError::GridInit) if the
    /// widget cannot be constructed.
    fn initialize(&self, config: GridConfig) -> Result<Box<dyn GridHandle>>;
}
