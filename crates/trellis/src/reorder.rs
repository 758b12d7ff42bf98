//! Persisted row reordering.
//!
//! A drop gesture hands the coordinator the grid's current row order as
//! node identity tokens. The coordinator guards against an active search
//! filter (reordering under a filter would reorder only the filtered
//! subset, which is surfaced as unsafe rather than silently allowed),
//! serializes the order to the remote endpoint, and reports the outcome
//! through its signals.
//!
//! State machine: `Idle -> Guarding -> {Prevented | Submitting} -> Idle`.
//! Both terminal outcomes return to `Idle`; there is no retry transition.
//! On transport failure the grid's visual order keeps the user's drop while
//! the backing store does not - recovery is the host's responsibility,
//! e.g. by refetching.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use trellis_core::Signal;

use crate::model::{RecordId, parse_node_token};
use crate::remote::RemoteTransport;

/// Reports the widget's current search text to the reorder guard.
///
/// The search box belongs to the widget, so the probe is supplied at
/// construction rather than carried on the drop notification.
pub type SearchProbe = Arc<dyn Fn() -> String + Send + Sync>;

/// A drop-gesture notification carrying the grid's current row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropNotification {
    /// Node identity tokens in display order.
    pub row_tokens: Vec<String>,
}

/// Events emitted by the coordinator.
pub struct ReorderSignals {
    /// The reorder was blocked by an active search filter.
    pub ordering_change_prevented: Signal<()>,
    /// The new order was persisted.
    pub ordering_changed: Signal<()>,
    /// Persisting failed; carries the transport error detail.
    pub ordering_change_error: Signal<String>,
}

impl ReorderSignals {
    fn new() -> Self {
        Self {
            ordering_change_prevented: Signal::new(),
            ordering_changed: Signal::new(),
            ordering_change_error: Signal::new(),
        }
    }
}

/// Observable coordinator state.
///
/// `Guarding` and `Prevented` resolve synchronously inside
/// [`ReorderCoordinator::handle_drop`]; they are observable from within
/// the emitted signals' slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReorderState {
    /// Waiting for a drop gesture.
    #[default]
    Idle,
    /// Evaluating the search guard for a drop gesture.
    Guarding,
    /// The guard blocked the reorder; returns to `Idle` once the
    /// prevention signal has been emitted.
    Prevented,
    /// A persist request is in flight.
    Submitting,
}

/// The outcome of handling one drop gesture.
pub enum ReorderDisposition {
    /// An active search filter blocked the reorder; no remote call was
    /// made.
    Prevented,
    /// The order was submitted; the handle resolves when the remote call
    /// completes and the outcome signal has been emitted.
    Submitted(JoinHandle<()>),
}

/// Captures drop gestures and persists the resulting row order.
pub struct ReorderCoordinator {
    url: String,
    prefix: String,
    transport: Arc<dyn RemoteTransport>,
    search_probe: SearchProbe,
    state: Mutex<ReorderState>,
    signals: ReorderSignals,
}

impl ReorderCoordinator {
    /// Create a coordinator persisting to `url`, parsing tokens with the
    /// given node-id prefix.
    pub fn new(
        url: impl Into<String>,
        prefix: impl Into<String>,
        transport: Arc<dyn RemoteTransport>,
        search_probe: SearchProbe,
    ) -> Self {
        Self {
            url: url.into(),
            prefix: prefix.into(),
            transport,
            search_probe,
            state: Mutex::new(ReorderState::Idle),
            signals: ReorderSignals::new(),
        }
    }

    /// The coordinator's event signals.
    pub fn signals(&self) -> &ReorderSignals {
        &self.signals
    }

    /// The current state.
    pub fn state(&self) -> ReorderState {
        *self.state.lock()
    }

    /// Handle a drop gesture.
    ///
    /// Must be called within a tokio runtime: a permitted reorder is
    /// submitted on a spawned task and the outcome signal is emitted from
    /// there.
    pub fn handle_drop(self: &Arc<Self>, drop: &DropNotification) -> ReorderDisposition {
        *self.state.lock() = ReorderState::Guarding;

        // Guard: an in-flight search filter means the visible rows are a
        // subset; reordering them is surfaced as prevented.
        let search = (self.search_probe)();
        if !search.trim().is_empty() {
            tracing::warn!(search = %search.trim(), "reorder prevented by active search");
            *self.state.lock() = ReorderState::Prevented;
            self.signals.ordering_change_prevented.emit(());
            *self.state.lock() = ReorderState::Idle;
            return ReorderDisposition::Prevented;
        }

        let ids = self.parse_order(&drop.row_tokens);
        *self.state.lock() = ReorderState::Submitting;

        let coordinator = self.clone();
        let handle = tokio::spawn(async move {
            let result = coordinator
                .transport
                .submit_order(&coordinator.url, &ids)
                .await;
            *coordinator.state.lock() = ReorderState::Idle;
            match result {
                Ok(()) => {
                    tracing::debug!(count = ids.len(), "row order persisted");
                    coordinator.signals.ordering_changed.emit(());
                }
                Err(err) => {
                    tracing::error!(error = %err, "persisting row order failed");
                    coordinator.signals.ordering_change_error.emit(err.message);
                }
            }
        });
        ReorderDisposition::Submitted(handle)
    }

    /// Extract record ids from node tokens in display order. Tokens that
    /// do not carry the configured prefix are skipped.
    fn parse_order(&self, tokens: &[String]) -> Vec<RecordId> {
        tokens
            .iter()
            .filter_map(|token| {
                let id = parse_node_token(&self.prefix, token);
                if id.is_none() {
                    tracing::warn!(token = %token, "ignoring row token without expected prefix");
                }
                id
            })
            .collect()
    }
}

impl fmt::Debug for ReorderCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReorderCoordinator")
            .field("url", &self.url)
            .field("prefix", &self.prefix)
            .field("state", &self.state())
            .finish()
    }
}
