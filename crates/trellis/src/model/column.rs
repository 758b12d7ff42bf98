//! Declarative column specs and their normalized form.
//!
//! Hosts describe columns declaratively: a title, a value source (dotted
//! path or extractor closure), or a custom cell renderer. Resolution turns
//! that list into the normalized model the grid and the row builder
//! consume, prepending a synthetic hidden identity column so every row
//! always carries its record id as cell 0.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::record::CellValue;

/// A parsed dotted field path (e.g. `"phone.number"`).
///
/// Parsing happens once, at column normalization time; extraction walks
/// the pre-split segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path string.
    pub fn parse(path: impl Into<String>) -> Self {
        let raw = path.into();
        let segments = raw.split('.').map(str::to_string).collect();
        Self { raw, segments }
    }

    /// The path segments, in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The original dotted string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// Type alias for a value extractor closure.
pub type ValueExtractor<R> = Arc<dyn Fn(&R) -> CellValue + Send + Sync>;

/// How a column obtains its value from a record.
///
/// The string-or-function duality of the declarative spec is resolved into
/// a tagged variant once, at normalization time, not per row.
pub enum PropertyAccessor<R> {
    /// Walk a dotted field path through the record.
    Path(FieldPath),
    /// Call a pure extractor closure with the record.
    Extractor(ValueExtractor<R>),
}

impl<R> PropertyAccessor<R> {
    /// Accessor for a dotted field path.
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(FieldPath::parse(path))
    }

    /// Accessor backed by an extractor closure.
    pub fn extractor<F>(f: F) -> Self
    where
        F: Fn(&R) -> CellValue + Send + Sync + 'static,
    {
        Self::Extractor(Arc::new(f))
    }
}

impl<R> Clone for PropertyAccessor<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Path(p) => Self::Path(p.clone()),
            Self::Extractor(f) => Self::Extractor(f.clone()),
        }
    }
}

impl<R> fmt::Debug for PropertyAccessor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => f.debug_tuple("Path").field(&p.as_str()).finish(),
            Self::Extractor(_) => f.write_str("Extractor(..)"),
        }
    }
}

/// The record handed to a cell factory.
pub enum CellRecord<R> {
    /// Local mode: the matched source record.
    Item(Arc<R>),
    /// Remote mode: the already-materialized row cells for this page.
    Row(Vec<CellValue>),
}

/// Context passed to a host cell factory at cell-creation time.
pub struct CellContext<R> {
    /// The record (or materialized row) backing the cell.
    pub record: CellRecord<R>,
    /// Extra props declared on the column.
    pub props: Map<String, Value>,
    /// The configured name under which the host expects the record prop.
    pub item_prop: String,
}

/// A host-supplied factory that mounts a custom-rendered cell.
///
/// The first argument is the grid widget's opaque cell slot; the mounted
/// unit's lifecycle is the host's responsibility.
pub type CellFactory<R> = Arc<dyn Fn(&mut dyn std::any::Any, CellContext<R>) + Send + Sync>;

/// A declarative column description.
///
/// Exactly one of the value accessor or the cell renderer is expected to
/// define cell content; a column with neither renders empty.
///
/// # Example
///
/// ```
/// use trellis::model::{CellValue, ColumnSpec};
/// use serde_json::Value;
///
/// let columns: Vec<ColumnSpec<Value>> = vec![
///     ColumnSpec::new("Name").with_path("name"),
///     ColumnSpec::new("Email").with_path("email").with_orderable(false),
///     ColumnSpec::new("Phone").with_extractor(|record: &Value| {
///         CellValue::from(&record["phone"]["number"])
///     }),
/// ];
/// ```
pub struct ColumnSpec<R> {
    title: String,
    accessor: Option<PropertyAccessor<R>>,
    renderer: Option<CellFactory<R>>,
    renderer_props: Map<String, Value>,
    name: Option<String>,
    visible: bool,
    orderable: bool,
    searchable: bool,
}

impl<R> ColumnSpec<R> {
    /// Create a column spec with the given title and documented defaults
    /// (visible, orderable, searchable).
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            accessor: None,
            renderer: None,
            renderer_props: Map::new(),
            name: None,
            visible: true,
            orderable: true,
            searchable: true,
        }
    }

    /// Source cell values from a dotted field path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.accessor = Some(PropertyAccessor::path(path));
        self
    }

    /// Source cell values from an extractor closure.
    pub fn with_extractor<F>(mut self, f: F) -> Self
    where
        F: Fn(&R) -> CellValue + Send + Sync + 'static,
    {
        self.accessor = Some(PropertyAccessor::extractor(f));
        self
    }

    /// Render cells through a host-mounted component factory.
    pub fn with_renderer<F>(mut self, factory: F) -> Self
    where
        F: Fn(&mut dyn std::any::Any, CellContext<R>) + Send + Sync + 'static,
    {
        self.renderer = Some(Arc::new(factory));
        self
    }

    /// Extra props forwarded to the cell factory.
    pub fn with_renderer_props(mut self, props: Map<String, Value>) -> Self {
        self.renderer_props = props;
        self
    }

    /// Explicit query name for remote mode (otherwise the title is
    /// slugified).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets column visibility.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets whether the column participates in sorting.
    pub fn with_orderable(mut self, orderable: bool) -> Self {
        self.orderable = orderable;
        self
    }

    /// Sets whether the column participates in searching.
    pub fn with_searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }
}

/// The resolved content source of a normalized column.
pub enum CellSource<R> {
    /// The synthetic identity column: always yields the record id.
    Identity,
    /// Value extraction through a [`PropertyAccessor`].
    Accessor(PropertyAccessor<R>),
    /// Host-rendered cell; the row carries an empty placeholder.
    Renderer {
        /// The host's cell factory.
        factory: CellFactory<R>,
        /// Extra props forwarded at creation time.
        props: Map<String, Value>,
    },
    /// Neither accessor nor renderer: the cell is empty.
    Empty,
}

impl<R> Clone for CellSource<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Identity => Self::Identity,
            Self::Accessor(a) => Self::Accessor(a.clone()),
            Self::Renderer { factory, props } => Self::Renderer {
                factory: factory.clone(),
                props: props.clone(),
            },
            Self::Empty => Self::Empty,
        }
    }
}

impl<R> fmt::Debug for CellSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("Identity"),
            Self::Accessor(a) => f.debug_tuple("Accessor").field(a).finish(),
            Self::Renderer { .. } => f.write_str("Renderer(..)"),
            Self::Empty => f.write_str("Empty"),
        }
    }
}

/// A column spec resolved against its position and query name.
pub struct NormalizedColumn<R> {
    title: String,
    target_index: usize,
    query_name: String,
    visible: bool,
    orderable: bool,
    searchable: bool,
    source: CellSource<R>,
}

impl<R> NormalizedColumn<R> {
    /// The column title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The column's position, identity column included.
    pub fn target_index(&self) -> usize {
        self.target_index
    }

    /// The name used for this column in remote queries.
    pub fn query_name(&self) -> &str {
        &self.query_name
    }

    /// Whether the column is displayed.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Whether the column participates in sorting.
    pub fn orderable(&self) -> bool {
        self.orderable
    }

    /// Whether the column participates in searching.
    pub fn searchable(&self) -> bool {
        self.searchable
    }

    /// How this column's cell values are produced.
    pub fn source(&self) -> &CellSource<R> {
        &self.source
    }
}

impl<R> fmt::Debug for NormalizedColumn<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizedColumn")
            .field("title", &self.title)
            .field("target_index", &self.target_index)
            .field("query_name", &self.query_name)
            .field("visible", &self.visible)
            .field("source", &self.source)
            .finish()
    }
}

/// The normalized column model: host columns with the synthetic identity
/// column prepended at index 0.
pub struct ColumnSet<R> {
    columns: Vec<NormalizedColumn<R>>,
}

impl<R> ColumnSet<R> {
    /// Resolve host column specs into the normalized model.
    ///
    /// Resolution is pure and total: it never fails, and missing optional
    /// fields have already received their defaults in [`ColumnSpec::new`].
    /// It runs once per mount; specs are treated as immutable for the
    /// binding's lifetime.
    pub fn resolve(specs: Vec<ColumnSpec<R>>) -> Self {
        let mut columns = Vec::with_capacity(specs.len() + 1);

        // Hidden identity column so every row carries its id as cell 0.
        columns.push(NormalizedColumn {
            title: "ID".to_string(),
            target_index: 0,
            query_name: "id".to_string(),
            visible: false,
            orderable: true,
            searchable: true,
            source: CellSource::Identity,
        });

        for (i, spec) in specs.into_iter().enumerate() {
            let query_name = spec
                .name
                .clone()
                .unwrap_or_else(|| slugify(&spec.title));
            let source = match (spec.accessor, spec.renderer) {
                (Some(accessor), _) => CellSource::Accessor(accessor),
                (None, Some(factory)) => CellSource::Renderer {
                    factory,
                    props: spec.renderer_props,
                },
                (None, None) => CellSource::Empty,
            };
            columns.push(NormalizedColumn {
                title: spec.title,
                target_index: i + 1,
                query_name,
                visible: spec.visible,
                orderable: spec.orderable,
                searchable: spec.searchable,
                source,
            });
        }

        Self { columns }
    }

    /// All normalized columns, identity column first.
    pub fn columns(&self) -> &[NormalizedColumn<R>] {
        &self.columns
    }

    /// The number of columns, identity column included.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if there are no columns (never the case after
    /// `resolve`, which always adds the identity column).
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The column at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&NormalizedColumn<R>> {
        self.columns.get(index)
    }
}

/// Derive a query name from a column title: lowercased, whitespace runs
/// collapsed to `_`.
fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}
