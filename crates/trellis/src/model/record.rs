//! Record identity and cell payloads.
//!
//! A record is any host-owned item with a stable unique identity. The
//! binding never mutates records; it only reads their identity (for
//! reconciliation and node tokens) and their fields (for cell values).

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// A stable unique record identity.
///
/// Identities are integers or strings, matching the two shapes hosts use
/// in practice. Both orderings and hashing are supported so identity sets
/// can be diffed and looked up; serialization is untagged (a bare number
/// or string) to match the reorder wire format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordId {
    /// Integer identity.
    Int(i64),
    /// String identity.
    Str(String),
}

impl RecordId {
    /// Extract an identity from a JSON value, if it is a scalar.
    ///
    /// Integer and string scalars are accepted; everything else (null,
    /// floats, booleans, containers) is rejected - record identities must
    /// be stable and exact.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(RecordId::Int),
            Value::String(s) => Some(RecordId::Str(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for RecordId {
    fn from(n: i32) -> Self {
        Self::Int(n as i64)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

/// The trait records implement to participate in the binding.
///
/// Only two things are required: a stable unique identity, and
/// single-segment field lookup for dotted-path columns. Hosts with typed
/// records that do not want to expose JSON fields can rely exclusively on
/// extractor-closure columns and return `None` from [`field`](Record::field).
pub trait Record: Send + Sync + 'static {
    /// The record's stable unique identity.
    fn record_id(&self) -> RecordId;

    /// Resolve one top-level field by name, for path-based columns.
    ///
    /// Nested segments of a dotted path are walked through the returned
    /// JSON value.
    fn field(&self, name: &str) -> Option<Value>;

    /// Reconstruct a record view from a materialized remote row, if the
    /// type supports it.
    ///
    /// In remote mode, extraction targets the row object the server
    /// returned for the current page rather than an original record; this
    /// hook lets extractor-closure columns participate. The default
    /// returns `None`, which surfaces as an error if such a column is
    /// rendered remotely.
    fn from_remote_row(row: &Value) -> Option<Self>
    where
        Self: Sized,
    {
        let _ = row;
        None
    }
}

/// JSON objects are records: identity comes from the `"id"` key.
///
/// # Panics
///
/// `record_id` panics if the value has no scalar `id` field. A stable
/// unique id is the one structural requirement placed on records; a record
/// without one is a host contract violation and fails the pass loudly.
impl Record for Value {
    fn record_id(&self) -> RecordId {
        match self.get("id").and_then(RecordId::from_json) {
            Some(id) => id,
            None => panic!("record has no scalar `id` field: {self}"),
        }
    }

    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn from_remote_row(row: &Value) -> Option<Self> {
        Some(row.clone())
    }
}

/// A typed cell payload.
///
/// Cells carry the scalar shapes a grid can display directly, plus `Json`
/// for nested structures surfaced verbatim (the widget or a cell renderer
/// decides what to do with those).
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    /// No value (empty cell, renderer placeholder).
    #[default]
    None,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
    /// Nested JSON value (object or array).
    Json(Value),
}

impl CellValue {
    /// Returns `true` if this is `CellValue::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Attempts to get the value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the value as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Attempts to get the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

impl From<&Value> for CellValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::None,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::String(s.clone()),
            other => Self::Json(other.clone()),
        }
    }
}

impl From<&RecordId> for CellValue {
    fn from(id: &RecordId) -> Self {
        match id {
            RecordId::Int(n) => Self::Int(*n),
            RecordId::Str(s) => Self::String(s.clone()),
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        Self::Int(n as i64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
