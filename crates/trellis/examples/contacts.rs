//! Local-mode demo: a contact table bound to a console "grid".
//!
//! Run with `cargo run --example contacts -p trellis`.

use serde_json::{Value, json};

use trellis::{
    CellValue, ColumnSpec, GridConfig, GridHandle, GridHost, GridRow, TableBinding,
    TableBindingConfig,
};

/// A grid "widget" that prints every operation it receives.
struct ConsoleGrid;

struct ConsoleHandle;

impl GridHandle for ConsoleHandle {
    fn add_row(&self, row: GridRow) {
        let cells: Vec<String> = row.cells().iter().map(CellValue::to_string).collect();
        println!("add    {:<10} {:?}", row.token(), cells);
    }

    fn remove_row(&self, token: &str) {
        println!("remove {token}");
    }

    fn redraw(&self) {
        println!("redraw");
    }

    fn reload_remote(&self) {
        println!("reload");
    }
}

impl GridHost for ConsoleGrid {
    fn initialize(&self, config: GridConfig) -> trellis::Result<Box<dyn GridHandle>> {
        println!(
            "initialize: {} columns, page length {}",
            config.column_definitions.len(),
            config.page_length
        );
        Ok(Box::new(ConsoleHandle))
    }
}

fn dummy_contacts(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "id": i as i64 + 1,
                "name": format!("name{i}"),
                "email": format!("email@example{i}.com"),
                "phone": { "number": format!("+1111{i}") },
            })
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let columns = vec![
        ColumnSpec::new("Name").with_path("name"),
        ColumnSpec::new("Email")
            .with_path("email")
            .with_orderable(false)
            .with_searchable(false),
        ColumnSpec::new("Phone").with_extractor(|contact: &Value| {
            CellValue::from(&contact["phone"]["number"])
        }),
    ];

    let config = TableBindingConfig::new(columns).with_items(dummy_contacts(10));
    let mut binding = TableBinding::mount(config, &ConsoleGrid, None)?;

    // Drop the first contact and welcome a new one.
    let mut contacts = dummy_contacts(10).split_off(1);
    contacts.push(json!({
        "id": 11,
        "name": "name11",
        "email": "email@example11.com",
        "phone": { "number": "+111111" },
    }));
    binding.set_items(contacts)?;

    println!("rows now: {:?}", binding.known_ids());
    Ok(())
}
