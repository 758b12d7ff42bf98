//! End-to-end binding tests against a recording grid double.

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use trellis::{
    CellContext, CellRecord, CellValue, ColumnSpec, DropNotification, Filters, GridConfig, GridHandle,
    GridHost, GridRow, RecordId, RemoteConfig, RemoteQuery, RemoteTransport, ReorderDisposition,
    TableBinding, TableBindingConfig, TransportError,
};

/// What the widget was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
enum GridOp {
    Add(String, Vec<CellValue>),
    Redraw,
    Remove(String),
    Reload,
}

#[derive(Default)]
struct GridLog {
    ops: Mutex<Vec<GridOp>>,
}

impl GridLog {
    fn ops(&self) -> Vec<GridOp> {
        self.ops.lock().unwrap().clone()
    }

    fn clear(&self) {
        self.ops.lock().unwrap().clear();
    }

    fn count(&self, matches: impl Fn(&GridOp) -> bool) -> usize {
        self.ops.lock().unwrap().iter().filter(|op| matches(op)).count()
    }
}

struct FakeHandle {
    log: Arc<GridLog>,
}

impl GridHandle for FakeHandle {
    fn add_row(&self, row: GridRow) {
        self.log.ops.lock().unwrap().push(GridOp::Add(
            row.token().to_string(),
            row.cells().to_vec(),
        ));
    }

    fn remove_row(&self, token: &str) {
        self.log
            .ops
            .lock()
            .unwrap()
            .push(GridOp::Remove(token.to_string()));
    }

    fn redraw(&self) {
        self.log.ops.lock().unwrap().push(GridOp::Redraw);
    }

    fn reload_remote(&self) {
        self.log.ops.lock().unwrap().push(GridOp::Reload);
    }
}

#[derive(Default)]
struct FakeGrid {
    log: Arc<GridLog>,
    config: Mutex<Option<GridConfig>>,
}

impl GridHost for FakeGrid {
    fn initialize(&self, config: GridConfig) -> trellis::Result<Box<dyn GridHandle>> {
        *self.config.lock().unwrap() = Some(config);
        Ok(Box::new(FakeHandle {
            log: self.log.clone(),
        }))
    }
}

/// Transport double that answers immediately.
#[derive(Default)]
struct StubTransport {
    orders: Mutex<Vec<Vec<RecordId>>>,
}

impl RemoteTransport for StubTransport {
    fn fetch_rows(
        &self,
        _url: &str,
        _query: &RemoteQuery,
    ) -> futures_util::future::BoxFuture<'static, Result<Vec<Value>, TransportError>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn submit_order(
        &self,
        _url: &str,
        ids: &[RecordId],
    ) -> futures_util::future::BoxFuture<'static, Result<(), TransportError>> {
        self.orders.lock().unwrap().push(ids.to_vec());
        Box::pin(async { Ok(()) })
    }
}

fn name_column() -> Vec<ColumnSpec<Value>> {
    vec![ColumnSpec::new("Name").with_path("name")]
}

fn people() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "A"}),
        json!({"id": 2, "name": "B"}),
    ]
}

#[test]
fn mount_populates_grid_with_initial_items() {
    let grid = FakeGrid::default();
    let config = TableBindingConfig::new(name_column()).with_items(people());
    let binding = TableBinding::mount(config, &grid, None).unwrap();

    assert_eq!(
        grid.log.ops(),
        vec![
            GridOp::Add(
                "item_1".into(),
                vec![CellValue::Int(1), CellValue::String("A".into())]
            ),
            GridOp::Add(
                "item_2".into(),
                vec![CellValue::Int(2), CellValue::String("B".into())]
            ),
            GridOp::Redraw,
        ]
    );
    assert_eq!(binding.known_ids(), &[RecordId::Int(1), RecordId::Int(2)]);

    // The identity column is present but hidden.
    let stored = grid.config.lock().unwrap();
    let config = stored.as_ref().unwrap();
    assert_eq!(config.column_definitions.len(), 2);
    assert_eq!(config.column_definitions[0].title, "ID");
    assert!(!config.column_definitions[0].visible);
    assert!(config.column_definitions[1].visible);
}

#[test]
fn removing_an_item_issues_one_removal() {
    let grid = FakeGrid::default();
    let config = TableBindingConfig::new(name_column()).with_items(people());
    let mut binding = TableBinding::mount(config, &grid, None).unwrap();
    grid.log.clear();

    binding
        .set_items(vec![json!({"id": 2, "name": "B"})])
        .unwrap();

    assert_eq!(grid.log.ops(), vec![GridOp::Remove("item_1".into())]);
    assert_eq!(binding.known_ids(), &[RecordId::Int(2)]);
}

#[test]
fn additions_are_batched_with_one_redraw() {
    let grid = FakeGrid::default();
    let config = TableBindingConfig::new(name_column()).with_items(people());
    let mut binding = TableBinding::mount(config, &grid, None).unwrap();
    grid.log.clear();

    let mut snapshot = people();
    snapshot.push(json!({"id": 3, "name": "C"}));
    snapshot.push(json!({"id": 4, "name": "D"}));
    binding.set_items(snapshot).unwrap();

    assert_eq!(
        grid.log.ops(),
        vec![
            GridOp::Add(
                "item_3".into(),
                vec![CellValue::Int(3), CellValue::String("C".into())]
            ),
            GridOp::Add(
                "item_4".into(),
                vec![CellValue::Int(4), CellValue::String("D".into())]
            ),
            GridOp::Redraw,
        ]
    );
}

#[test]
fn unchanged_snapshot_issues_no_operations() {
    let grid = FakeGrid::default();
    let config = TableBindingConfig::new(name_column()).with_items(people());
    let mut binding = TableBinding::mount(config, &grid, None).unwrap();
    grid.log.clear();

    binding.set_items(people()).unwrap();
    assert!(grid.log.ops().is_empty());
}

#[test]
fn emptying_the_collection_removes_all_rows() {
    let grid = FakeGrid::default();
    let config = TableBindingConfig::new(name_column()).with_items(people());
    let mut binding = TableBinding::mount(config, &grid, None).unwrap();
    grid.log.clear();

    binding.set_items(Vec::new()).unwrap();

    assert_eq!(
        grid.log.ops(),
        vec![
            GridOp::Remove("item_1".into()),
            GridOp::Remove("item_2".into()),
        ]
    );
    assert!(binding.known_ids().is_empty());
}

#[test]
fn custom_prefix_shapes_tokens() {
    let grid = FakeGrid::default();
    let config = TableBindingConfig::new(name_column())
        .with_items(vec![json!({"id": 9, "name": "Z"})])
        .with_prefix_node_id("contact");
    TableBinding::mount(config, &grid, None).unwrap();

    assert!(matches!(
        &grid.log.ops()[0],
        GridOp::Add(token, _) if token == "contact_9"
    ));
}

#[test]
fn malformed_record_fails_the_pass() {
    let grid = FakeGrid::default();
    let config = TableBindingConfig::new(name_column()).with_items(people());
    let mut binding = TableBinding::mount(config, &grid, None).unwrap();

    // "name" is missing: the extraction error propagates.
    let result = binding.set_items(vec![json!({"id": 3})]);
    assert!(result.is_err());
}

#[test]
fn filter_changes_reload_only_in_remote_mode() {
    let grid = FakeGrid::default();
    let config = TableBindingConfig::new(name_column())
        .with_remote(RemoteConfig::new("https://example.test/rows"));
    let binding =
        TableBinding::mount(config, &grid, Some(Arc::new(StubTransport::default()))).unwrap();
    grid.log.clear();

    let mut filters = Filters::new();
    filters.insert("status".into(), json!("x"));
    binding.set_filters(filters.clone()).unwrap();
    assert_eq!(grid.log.count(|op| *op == GridOp::Reload), 1);

    // Deep-equal filters: no change, no reload.
    binding.set_filters(filters).unwrap();
    assert_eq!(grid.log.count(|op| *op == GridOp::Reload), 1);
}

#[test]
fn filter_changes_in_local_mode_do_not_reload() {
    let grid = FakeGrid::default();
    let config = TableBindingConfig::new(name_column()).with_items(people());
    let binding = TableBinding::mount(config, &grid, None).unwrap();
    grid.log.clear();

    let mut filters = Filters::new();
    filters.insert("status".into(), json!("x"));
    binding.set_filters(filters).unwrap();
    assert!(grid.log.ops().is_empty());
}

#[test]
fn reserved_filter_key_is_rejected_on_update() {
    let grid = FakeGrid::default();
    let config = TableBindingConfig::new(name_column())
        .with_remote(RemoteConfig::new("https://example.test/rows"));
    let binding =
        TableBinding::mount(config, &grid, Some(Arc::new(StubTransport::default()))).unwrap();

    let mut filters = Filters::new();
    filters.insert("page".into(), json!(4));
    assert!(binding.set_filters(filters).is_err());
}

#[test]
fn refresh_requests_reload_once_per_request() {
    let grid = FakeGrid::default();
    let config = TableBindingConfig::new(name_column())
        .with_remote(RemoteConfig::new("https://example.test/rows"));
    let binding =
        TableBinding::mount(config, &grid, Some(Arc::new(StubTransport::default()))).unwrap();
    grid.log.clear();

    binding.request_refresh();
    binding.request_refresh();
    assert_eq!(grid.log.count(|op| *op == GridOp::Reload), 2);
}

#[test]
fn refresh_is_a_noop_in_local_mode() {
    let grid = FakeGrid::default();
    let config = TableBindingConfig::new(name_column()).with_items(people());
    let binding = TableBinding::mount(config, &grid, None).unwrap();
    grid.log.clear();

    binding.request_refresh();
    assert!(grid.log.ops().is_empty());
}

#[test]
fn remote_config_carries_query_builder_and_names() {
    let grid = FakeGrid::default();
    let mut filters = Filters::new();
    filters.insert("status".into(), json!("open"));
    let config = TableBindingConfig::new(vec![
        ColumnSpec::<Value>::new("Full Name").with_path("name"),
        ColumnSpec::new("Email").with_path("email").with_name("mail"),
    ])
    .with_filters(filters)
    .with_remote(RemoteConfig::new("https://example.test/rows"));
    TableBinding::mount(config, &grid, Some(Arc::new(StubTransport::default()))).unwrap();

    let stored = grid.config.lock().unwrap();
    let grid_config = stored.as_ref().unwrap();

    let names: Vec<_> = grid_config
        .column_definitions
        .iter()
        .map(|c| c.query_name.clone().unwrap())
        .collect();
    assert_eq!(names, vec!["id", "full_name", "mail"]);

    let remote = grid_config.remote.as_ref().unwrap();
    assert_eq!(remote.url, "https://example.test/rows");
    let query = (remote.query_builder)(&trellis::PageRequest {
        start: 100,
        length: 50,
    });
    assert_eq!(query.page, 3);
    assert_eq!(query.length, 50);
    assert_eq!(query.filters.get("status"), Some(&json!("open")));
}

#[test]
fn remote_rows_render_through_the_extraction_contract() {
    let grid = FakeGrid::default();
    let config = TableBindingConfig::new(vec![
        ColumnSpec::new("Name").with_path("name"),
        ColumnSpec::new("Phone").with_extractor(|row: &Value| CellValue::from(&row["phone"]["number"])),
    ])
    .with_remote(RemoteConfig::new("https://example.test/rows"));
    TableBinding::mount(config, &grid, Some(Arc::new(StubTransport::default()))).unwrap();

    let stored = grid.config.lock().unwrap();
    let grid_config = stored.as_ref().unwrap();
    let server_row = json!({"id": 1, "name": "Ada", "phone": {"number": "+1111"}});

    let by_path = grid_config.column_definitions[1].render.as_ref().unwrap();
    assert_eq!(
        by_path(&server_row).unwrap(),
        CellValue::String("Ada".into())
    );

    let by_extractor = grid_config.column_definitions[2].render.as_ref().unwrap();
    assert_eq!(
        by_extractor(&server_row).unwrap(),
        CellValue::String("+1111".into())
    );
}

#[test]
fn cell_hook_resolves_the_backing_record() {
    let grid = FakeGrid::default();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let mut props = serde_json::Map::new();
    props.insert("compact".into(), json!(true));

    let config = TableBindingConfig::new(vec![
        ColumnSpec::new("Name").with_path("name"),
        ColumnSpec::new("Actions")
            .with_renderer(move |_slot, ctx: CellContext<Value>| {
                let id = match &ctx.record {
                    CellRecord::Item(record) => record["id"].clone(),
                    CellRecord::Row(_) => json!(null),
                };
                sink.lock().unwrap().push((id, ctx.item_prop.clone(), ctx.props.clone()));
            })
            .with_renderer_props(props),
    ])
    .with_items(people());
    TableBinding::mount(config, &grid, None).unwrap();

    let stored = grid.config.lock().unwrap();
    let grid_config = stored.as_ref().unwrap();
    let hook = grid_config.column_definitions[2]
        .on_cell_created
        .as_ref()
        .unwrap();

    // Simulate the widget creating the renderer cell for row id=2.
    let mut slot = ();
    hook(
        &mut slot,
        &[CellValue::Int(2), CellValue::String("B".into()), CellValue::None],
    );

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, json!(2));
    assert_eq!(seen[0].1, "item");
    assert_eq!(seen[0].2.get("compact"), Some(&json!(true)));
}

#[test]
fn row_reorder_disables_column_sorting() {
    let grid = FakeGrid::default();
    let config = TableBindingConfig::new(name_column())
        .with_items(people())
        .with_row_reorder("https://example.test/reorder");
    TableBinding::mount(config, &grid, Some(Arc::new(StubTransport::default()))).unwrap();

    let stored = grid.config.lock().unwrap();
    assert!(!stored.as_ref().unwrap().ordering_enabled);

    let plain = FakeGrid::default();
    TableBinding::mount(
        TableBindingConfig::new(name_column()).with_items(people()),
        &plain,
        None,
    )
    .unwrap();
    assert!(plain.config.lock().unwrap().as_ref().unwrap().ordering_enabled);
}

#[tokio::test]
async fn drop_gesture_persists_order_through_the_binding() {
    let grid = FakeGrid::default();
    let transport = Arc::new(StubTransport::default());
    let config = TableBindingConfig::new(name_column())
        .with_items(people())
        .with_row_reorder("https://example.test/reorder");
    let binding = TableBinding::mount(config, &grid, Some(transport.clone())).unwrap();

    let disposition = binding
        .handle_drop(&DropNotification {
            row_tokens: vec!["item_2".into(), "item_1".into()],
        })
        .unwrap();
    match disposition {
        ReorderDisposition::Submitted(handle) => handle.await.unwrap(),
        ReorderDisposition::Prevented => panic!("no search filter is active"),
    }

    assert_eq!(
        transport.orders.lock().unwrap()[0],
        vec![RecordId::Int(2), RecordId::Int(1)]
    );
}

#[test]
fn drop_without_reorder_configured_is_ignored() {
    let grid = FakeGrid::default();
    let config = TableBindingConfig::new(name_column()).with_items(people());
    let binding = TableBinding::mount(config, &grid, None).unwrap();

    assert!(
        binding
            .handle_drop(&DropNotification {
                row_tokens: vec!["item_1".into()],
            })
            .is_none()
    );
}
