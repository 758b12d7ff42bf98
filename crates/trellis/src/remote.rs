//! Remote (server-paged) data mode.
//!
//! In remote mode the widget fetches row data page-by-page instead of
//! holding the collection locally. This module owns the outgoing query
//! shape (page, length, active filters), the validation of filter keys
//! against the reserved query keys, the transport boundary, and the
//! stale-response guard for rapid successive reloads.
//!
//! Transport errors are not retried here; surfacing them is the transport
//! collaborator's responsibility.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::future::BoxFuture;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{BindingError, Result};
use crate::model::RecordId;

/// Active filters: a JSON map merged verbatim into outgoing queries.
///
/// Equality on this type is a deep comparison, which is what filter change
/// detection relies on.
pub type Filters = Map<String, Value>;

/// Query keys the grid owns; filter keys must not collide with these.
pub const RESERVED_QUERY_KEYS: [&str; 2] = ["page", "length"];

/// Reject filter keys that would collide with reserved query keys.
///
/// The merge in [`RemoteQuery::build`] is flat, so a filter named `page`
/// or `length` would silently overwrite paging state. That is a
/// configuration error, caught at construction and on every filter
/// update.
pub fn validate_filters(filters: &Filters) -> Result<()> {
    for key in RESERVED_QUERY_KEYS {
        if filters.contains_key(key) {
            return Err(BindingError::Configuration(format!(
                "filter key `{key}` collides with a reserved query key"
            )));
        }
    }
    Ok(())
}

/// The grid's raw paging request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based offset of the first requested row.
    pub start: u64,
    /// Number of rows requested; always positive.
    pub length: u64,
}

/// An outgoing remote query: 1-based page, page length, and the active
/// filters merged flat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteQuery {
    /// 1-based page number.
    pub page: u64,
    /// Page length.
    pub length: u64,
    /// Active filter key/value pairs, merged at the top level.
    #[serde(flatten)]
    pub filters: Filters,
}

impl RemoteQuery {
    /// Derive the query for a paging request: `page = start/length + 1`.
    pub fn build(request: &PageRequest, filters: &Filters) -> Self {
        let length = request.length.max(1);
        Self {
            page: request.start / length + 1,
            length,
            filters: filters.clone(),
        }
    }
}

/// Host-supplied remote configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// The endpoint row data is fetched from.
    pub url: String,
}

impl RemoteConfig {
    /// Remote configuration for the given endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Builds the outgoing query for a paging request the widget received.
pub type QueryBuilder = Arc<dyn Fn(&PageRequest) -> RemoteQuery + Send + Sync>;

/// Remote settings handed to the grid widget.
pub struct RemoteSettings {
    /// The endpoint the widget fetches pages from.
    pub url: String,
    /// Callback the widget invokes to turn its raw paging request into
    /// the outgoing query.
    pub query_builder: QueryBuilder,
}

impl fmt::Debug for RemoteSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSettings")
            .field("url", &self.url)
            .finish()
    }
}

/// A transport failure, surfaced as an event or `Err` - never thrown into
/// the synchronous update pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    /// Human-readable failure detail.
    pub message: String,
}

impl TransportError {
    /// A transport error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportError {}

/// The remote transport boundary.
///
/// Implementations perform the actual I/O (an HTTP client in production, a
/// scripted double in tests). Futures are boxed so the binding stays
/// object-safe over any transport.
pub trait RemoteTransport: Send + Sync + 'static {
    /// Fetch the rows for one page.
    fn fetch_rows(
        &self,
        url: &str,
        query: &RemoteQuery,
    ) -> BoxFuture<'static, std::result::Result<Vec<Value>, TransportError>>;

    /// Persist a new row order.
    fn submit_order(
        &self,
        url: &str,
        ids: &[RecordId],
    ) -> BoxFuture<'static, std::result::Result<(), TransportError>>;
}

/// Mediates between the grid's paging requests and the remote transport.
///
/// Each fetch is stamped with a monotonically increasing token; a response
/// that completes after a newer response has already been applied is
/// discarded. In-flight fetches are never cancelled.
pub struct RemoteAdapter {
    url: String,
    transport: Arc<dyn RemoteTransport>,
    issued: AtomicU64,
    applied: AtomicU64,
}

impl RemoteAdapter {
    /// Create an adapter for the configured endpoint.
    pub fn new(config: RemoteConfig, transport: Arc<dyn RemoteTransport>) -> Self {
        Self {
            url: config.url,
            transport,
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
        }
    }

    /// The remote endpoint in use.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch one page of rows.
    ///
    /// Returns `Ok(None)` when the response arrived stale (a fetch issued
    /// later has already been applied) and was discarded.
    pub async fn fetch_page(
        &self,
        request: &PageRequest,
        filters: &Filters,
    ) -> std::result::Result<Option<Vec<Value>>, TransportError> {
        let token = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        let query = RemoteQuery::build(request, filters);

        let rows = self.transport.fetch_rows(&self.url, &query).await?;

        let newest_applied = self.applied.fetch_max(token, Ordering::AcqRel);
        if newest_applied > token {
            tracing::debug!(token, newest_applied, "discarding stale page response");
            return Ok(None);
        }
        Ok(Some(rows))
    }
}

impl fmt::Debug for RemoteAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteAdapter")
            .field("url", &self.url)
            .field("issued", &self.issued.load(Ordering::Relaxed))
            .finish()
    }
}
