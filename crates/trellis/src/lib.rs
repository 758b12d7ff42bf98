//! Trellis - declarative data binding for tabular grid widgets.
//!
//! Trellis keeps a stateful grid widget synchronized with an
//! externally-owned record collection. The host supplies a collection and a
//! declarative column spec; the binding derives the normalized column
//! model, computes minimal row insertions/deletions as the collection
//! changes, mediates between local and server-paged data modes, and
//! persists user row reordering to a remote endpoint - guarded against an
//! in-flight search filter.
//!
//! The grid widget itself, the reactive host framework, and the HTTP
//! transport are external collaborators consumed through the [`GridHost`]
//! and [`RemoteTransport`] interface boundaries; `trellis-net` ships the
//! reqwest transport.
//!
//! # Example
//!
//! ```ignore
//! use serde_json::{Value, json};
//! use trellis::{ColumnSpec, TableBinding, TableBindingConfig};
//!
//! let config = TableBindingConfig::<Value>::new(vec![
//!     ColumnSpec::new("Name").with_path("name"),
//!     ColumnSpec::new("Email").with_path("email"),
//! ])
//! .with_items(vec![
//!     json!({"id": 1, "name": "Ada", "email": "ada@example.com"}),
//! ]);
//!
//! // `host` is whatever implements `GridHost` for your widget toolkit.
//! let mut binding = TableBinding::mount(config, &host, None)?;
//!
//! // Later: reconcile against a new collection snapshot.
//! binding.set_items(vec![
//!     json!({"id": 2, "name": "Grace", "email": "grace@example.com"}),
//! ])?;
//! ```

mod binding;
mod error;
mod grid;
pub mod model;
mod remote;
mod reorder;

pub use binding::{TableBinding, TableBindingConfig};
pub use error::{BindingError, Result};
pub use grid::{
    CellCreatedHook, ColumnDefinition, DEFAULT_LENGTH_MENU, DEFAULT_PAGE_LENGTH, GridConfig,
    GridHandle, GridHost, RemoteCellRender,
};
pub use model::{
    CellContext, CellFactory, CellRecord, CellValue, ColumnSet, ColumnSpec, CollectionDiff,
    CollectionReconciler, GridRow, Record, RecordId, RowBuilder,
};
pub use remote::{
    Filters, PageRequest, QueryBuilder, RESERVED_QUERY_KEYS, RemoteAdapter, RemoteConfig,
    RemoteQuery, RemoteSettings, RemoteTransport, TransportError, validate_filters,
};
pub use reorder::{
    DropNotification, ReorderCoordinator, ReorderDisposition, ReorderSignals, ReorderState,
    SearchProbe,
};

pub use trellis_core::{Flag, Property, Signal};
