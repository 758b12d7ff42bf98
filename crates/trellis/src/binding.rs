//! The binding facade.
//!
//! [`TableBinding`] is the mounted adapter instance: it owns the resolved
//! column model, the grid handle, the reconciler, and - when configured -
//! the remote adapter and reorder coordinator. Hosts construct a
//! [`TableBindingConfig`], mount it against a [`GridHost`], and afterwards
//! drive the binding through `set_items`, `set_filters`, and
//! `request_refresh`.
//!
//! `set_items` takes `&mut self`: reconciliation assumes strictly
//! serialized calls (the host framework's single update pass), and the
//! exclusive borrow makes that assumption explicit instead of relying on
//! notification ordering.

use std::any::Any;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use trellis_core::{Flag, Property};

use crate::error::{BindingError, Result};
use crate::grid::{
    CellCreatedHook, ColumnDefinition, GridConfig, GridHandle, GridHost, RemoteCellRender,
};
use crate::model::{
    CellContext, CellRecord, CellSource, CellValue, ColumnSet, ColumnSpec, CollectionReconciler,
    FieldPath, PropertyAccessor, Record, RecordId, RowBuilder, extract_path, node_token,
};
use crate::remote::{
    Filters, PageRequest, RemoteAdapter, RemoteConfig, RemoteQuery, RemoteSettings,
    RemoteTransport, TransportError, validate_filters,
};
use crate::reorder::{DropNotification, ReorderCoordinator, ReorderDisposition, SearchProbe};

/// The host-supplied configuration surface, validated at mount.
pub struct TableBindingConfig<R> {
    /// Declarative column specs, in display order.
    pub columns: Vec<ColumnSpec<R>>,
    /// Initial collection for local mode.
    pub items: Option<Vec<R>>,
    /// Prefix for row node identity tokens.
    pub prefix_node_id: String,
    /// Name under which cell factories receive the record prop.
    pub item_prop_name: String,
    /// Initial active filters.
    pub filters: Filters,
    /// Remote (server-paged) configuration; `None` means local mode.
    pub remote: Option<RemoteConfig>,
    /// Whether user row reordering is enabled.
    pub row_reorder: bool,
    /// Endpoint reorders are persisted to; required when `row_reorder`.
    pub reorder_url: Option<String>,
    /// Reports the widget's current search text to the reorder guard.
    pub search_probe: Option<SearchProbe>,
}

impl<R> TableBindingConfig<R> {
    /// Configuration with the documented defaults: node prefix `"item"`,
    /// item prop `"item"`, empty filters, local mode, no reordering.
    pub fn new(columns: Vec<ColumnSpec<R>>) -> Self {
        Self {
            columns,
            items: None,
            prefix_node_id: "item".to_string(),
            item_prop_name: "item".to_string(),
            filters: Filters::new(),
            remote: None,
            row_reorder: false,
            reorder_url: None,
            search_probe: None,
        }
    }

    /// Supply the initial collection.
    pub fn with_items(mut self, items: Vec<R>) -> Self {
        self.items = Some(items);
        self
    }

    /// Override the node identity token prefix.
    pub fn with_prefix_node_id(mut self, prefix: impl Into<String>) -> Self {
        self.prefix_node_id = prefix.into();
        self
    }

    /// Override the record prop name handed to cell factories.
    pub fn with_item_prop_name(mut self, name: impl Into<String>) -> Self {
        self.item_prop_name = name.into();
        self
    }

    /// Supply the initial filters.
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Enable remote (server-paged) mode.
    pub fn with_remote(mut self, remote: RemoteConfig) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Enable row reordering, persisting to the given endpoint.
    pub fn with_row_reorder(mut self, reorder_url: impl Into<String>) -> Self {
        self.row_reorder = true;
        self.reorder_url = Some(reorder_url.into());
        self
    }

    /// Supply the search probe for the reorder guard.
    pub fn with_search_probe(mut self, probe: SearchProbe) -> Self {
        self.search_probe = Some(probe);
        self
    }

    fn validate(&self, has_transport: bool) -> Result<()> {
        if self.row_reorder && self.reorder_url.is_none() {
            return Err(BindingError::Configuration(
                "row_reorder requires a reorder_url".to_string(),
            ));
        }
        if (self.remote.is_some() || self.row_reorder) && !has_transport {
            return Err(BindingError::Configuration(
                "remote mode and row reordering require a transport".to_string(),
            ));
        }
        if self.remote.is_some() {
            validate_filters(&self.filters)?;
        }
        Ok(())
    }
}

/// A mounted grid binding.
///
/// Owns the widget handle exclusively; no other component may mutate the
/// widget.
pub struct TableBinding<R: Record> {
    columns: Arc<ColumnSet<R>>,
    row_builder: RowBuilder<R>,
    reconciler: CollectionReconciler,
    items: Arc<RwLock<Vec<Arc<R>>>>,
    grid: Box<dyn GridHandle>,
    filters: Arc<Property<Filters>>,
    refresh: Flag,
    remote: Option<Arc<RemoteAdapter>>,
    reorder: Option<Arc<ReorderCoordinator>>,
    prefix: String,
}

impl<R: Record> TableBinding<R> {
    /// Validate the configuration, initialize the grid widget, and
    /// populate it with the initial collection.
    ///
    /// Initial population is a direct bulk add - the reconciler starts out
    /// seeded with the initial ids, so the diff path only runs for later
    /// snapshots. `transport` is required when remote mode or row
    /// reordering is configured.
    pub fn mount<H: GridHost>(
        config: TableBindingConfig<R>,
        host: &H,
        transport: Option<Arc<dyn RemoteTransport>>,
    ) -> Result<Self> {
        config.validate(transport.is_some())?;

        let columns = Arc::new(ColumnSet::resolve(config.columns));
        let filters = Arc::new(Property::new(config.filters));
        let items: Arc<RwLock<Vec<Arc<R>>>> = Arc::new(RwLock::new(Vec::new()));
        let remote_mode = config.remote.is_some();

        let column_definitions = build_column_definitions(
            &columns,
            &items,
            &config.item_prop_name,
            remote_mode,
        );

        let mut grid_config = GridConfig::new(column_definitions);
        // A user-ordered table must not be resorted under the user.
        grid_config.ordering_enabled = !config.row_reorder;
        if let Some(remote) = &config.remote {
            let query_filters = filters.clone();
            grid_config.remote = Some(RemoteSettings {
                url: remote.url.clone(),
                query_builder: Arc::new(move |request| {
                    RemoteQuery::build(request, &query_filters.get())
                }),
            });
        }

        let grid = host.initialize(grid_config)?;

        let initial = config.items.unwrap_or_default();
        let reconciler = CollectionReconciler::seeded(&initial);
        let row_builder = RowBuilder::new(columns.clone(), config.prefix_node_id.clone());

        if !initial.is_empty() {
            for record in &initial {
                grid.add_row(row_builder.build(record)?);
            }
            grid.redraw();
        }
        *items.write() = initial.into_iter().map(Arc::new).collect();

        // validate() already guaranteed the transport and reorder_url are
        // present where these arms need them.
        let remote = match (config.remote, transport.clone()) {
            (Some(remote_config), Some(transport)) => {
                Some(Arc::new(RemoteAdapter::new(remote_config, transport)))
            }
            _ => None,
        };

        let reorder = match (config.row_reorder, config.reorder_url, transport) {
            (true, Some(url), Some(transport)) => {
                let probe = config
                    .search_probe
                    .unwrap_or_else(|| Arc::new(|| String::new()));
                Some(Arc::new(ReorderCoordinator::new(
                    url,
                    config.prefix_node_id.clone(),
                    transport,
                    probe,
                )))
            }
            _ => None,
        };

        Ok(Self {
            columns,
            row_builder,
            reconciler,
            items,
            grid,
            filters,
            refresh: Flag::new(),
            remote,
            reorder,
            prefix: config.prefix_node_id,
        })
    }

    /// The resolved column model.
    pub fn columns(&self) -> &ColumnSet<R> {
        &self.columns
    }

    /// The ids currently believed present in the grid, in order.
    pub fn known_ids(&self) -> &[RecordId] {
        self.reconciler.known_ids()
    }

    /// The active filters.
    pub fn filters(&self) -> Filters {
        self.filters.get()
    }

    /// The reorder coordinator, when row reordering is configured.
    pub fn reorder(&self) -> Option<&Arc<ReorderCoordinator>> {
        self.reorder.as_ref()
    }

    /// Reconcile the grid against a new collection snapshot.
    ///
    /// Insertions are applied first (batched, one redraw), then removals
    /// (each removal redraws independently). Afterwards the identity set
    /// equals the snapshot's ids. Calls must be serialized; the exclusive
    /// borrow enforces that within one binding instance.
    pub fn set_items(&mut self, snapshot: Vec<R>) -> Result<()> {
        let diff = self.reconciler.diff(&snapshot);
        tracing::debug!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            "reconciling collection snapshot"
        );

        for &index in &diff.added {
            self.grid.add_row(self.row_builder.build(&snapshot[index])?);
        }
        if !diff.added.is_empty() {
            self.grid.redraw();
        }

        for id in &diff.removed {
            self.grid.remove_row(&node_token(&self.prefix, id));
        }

        self.reconciler.commit(&snapshot);
        *self.items.write() = snapshot.into_iter().map(Arc::new).collect();
        Ok(())
    }

    /// Replace the active filters.
    ///
    /// Change detection is a deep comparison; in remote mode a real change
    /// reloads the grid. In local mode no request is made.
    pub fn set_filters(&self, filters: Filters) -> Result<()> {
        if self.remote.is_some() {
            validate_filters(&filters)?;
        }
        if self.filters.set(filters) && self.remote.is_some() {
            self.grid.reload_remote();
        }
        Ok(())
    }

    /// Request an explicit remote reload.
    ///
    /// Edge-triggered: the refresh flag is raised, the reload fires once,
    /// and the flag resets so repeated reloads cannot fire from a single
    /// request. A no-op in local mode.
    pub fn request_refresh(&self) {
        if self.remote.is_none() {
            tracing::debug!("refresh requested without remote mode; ignoring");
            return;
        }
        if self.refresh.raise() {
            self.grid.reload_remote();
            self.refresh.consume();
        }
    }

    /// Fetch one page of remote rows for a paging request the widget
    /// received.
    ///
    /// Returns `Ok(None)` when the response was stale and discarded.
    pub async fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> std::result::Result<Option<Vec<Value>>, TransportError> {
        match &self.remote {
            Some(adapter) => adapter.fetch_page(request, &self.filters.get()).await,
            None => Err(TransportError::new("remote mode is not configured")),
        }
    }

    /// Forward a drop gesture to the reorder coordinator.
    ///
    /// Returns `None` when row reordering is not configured.
    pub fn handle_drop(&self, drop: &DropNotification) -> Option<ReorderDisposition> {
        self.reorder
            .as_ref()
            .map(|coordinator| coordinator.handle_drop(drop))
    }
}

/// Assemble the per-column widget configuration from the normalized model.
fn build_column_definitions<R: Record>(
    columns: &Arc<ColumnSet<R>>,
    items: &Arc<RwLock<Vec<Arc<R>>>>,
    item_prop_name: &str,
    remote_mode: bool,
) -> Vec<ColumnDefinition> {
    columns
        .columns()
        .iter()
        .map(|column| {
            let on_cell_created = match column.source() {
                CellSource::Renderer { factory, props } => Some(cell_created_hook(
                    factory.clone(),
                    props.clone(),
                    item_prop_name.to_string(),
                    items.clone(),
                )),
                _ => None,
            };

            let render = if remote_mode {
                match column.source() {
                    CellSource::Accessor(accessor) => Some(remote_render(accessor.clone())),
                    CellSource::Identity => Some(identity_render()),
                    _ => None,
                }
            } else {
                None
            };

            ColumnDefinition {
                target_index: column.target_index(),
                title: column.title().to_string(),
                visible: column.visible(),
                orderable: column.orderable(),
                searchable: column.searchable(),
                query_name: remote_mode.then(|| column.query_name().to_string()),
                on_cell_created,
                render,
            }
        })
        .collect()
}

/// Hook invoked by the grid when it creates a renderer-backed cell:
/// resolve the backing record by the identity cell and hand it to the
/// host's factory.
fn cell_created_hook<R: Record>(
    factory: crate::model::CellFactory<R>,
    props: serde_json::Map<String, Value>,
    item_prop: String,
    items: Arc<RwLock<Vec<Arc<R>>>>,
) -> CellCreatedHook {
    Arc::new(move |slot: &mut dyn Any, cells: &[CellValue]| {
        let record = resolve_cell_record(&items, cells);
        factory(
            slot,
            CellContext {
                record,
                props: props.clone(),
                item_prop: item_prop.clone(),
            },
        );
    })
}

/// Find the source record matching a row's identity cell; fall back to the
/// materialized row when there is none (remote mode, or a row the
/// collection no longer holds).
fn resolve_cell_record<R: Record>(
    items: &RwLock<Vec<Arc<R>>>,
    cells: &[CellValue],
) -> CellRecord<R> {
    let id = cells.first().and_then(|cell| match cell {
        CellValue::Int(n) => Some(RecordId::Int(*n)),
        CellValue::String(s) => Some(RecordId::Str(s.clone())),
        _ => None,
    });
    if let Some(id) = id {
        if let Some(record) = items.read().iter().find(|r| r.record_id() == id) {
            return CellRecord::Item(record.clone());
        }
    }
    CellRecord::Row(cells.to_vec())
}

/// Render callback for the identity column against a server-returned row.
fn identity_render() -> RemoteCellRender {
    let path = FieldPath::parse("id");
    Arc::new(move |row: &Value| extract_path(row, &path))
}

/// Render callback applying a column accessor to a server-returned row.
fn remote_render<R: Record>(accessor: PropertyAccessor<R>) -> RemoteCellRender {
    Arc::new(move |row: &Value| match &accessor {
        PropertyAccessor::Path(path) => extract_path(row, path),
        PropertyAccessor::Extractor(extract) => match R::from_remote_row(row) {
            Some(record) => Ok(extract(&record)),
            None => Err(BindingError::Configuration(
                "extractor-backed column cannot view remote rows for this record type"
                    .to_string(),
            )),
        },
    })
}
