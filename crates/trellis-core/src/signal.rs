//! Signal/slot system for Trellis.
//!
//! Signals are emitted when state changes and connected slots (closures)
//! are invoked in response. Dispatch is always direct: slots run
//! synchronously in the emitting thread, in connection order. This matches
//! the single-threaded cooperative model the binding operates under - the
//! host serializes change notifications, and async completions emit from
//! their worker task.
//!
//! # Example
//!
//! ```
//! use trellis_core::Signal;
//!
//! let text_changed = Signal::<String>::new();
//!
//! let conn_id = text_changed.connect(|text| {
//!     println!("Text changed to: {}", text);
//! });
//!
//! text_changed.emit("Hello, World!".to_string());
//!
//! text_changed.disconnect(conn_id);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via
    /// [`Signal::disconnect`]. The ID remains valid until the connection is
    /// explicitly disconnected or the signal is dropped.
    pub struct ConnectionId;
}

/// A type-safe signal that can have multiple connected slots.
///
/// When a signal is emitted, all connected slots are invoked with a
/// reference to the provided arguments, in connection order.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for
///   signals with no arguments, or a tuple for multiple arguments.
///
/// # Thread Safety
///
/// `Signal<Args>` is `Send + Sync` and can be shared between threads; slots
/// run in whichever thread emits.
pub struct Signal<Args> {
    /// All active connections.
    connections: Mutex<SlotMap<ConnectionId, Arc<dyn Fn(&Args) + Send + Sync>>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a [`ConnectionId`] that can be used to disconnect the slot
    /// later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Disconnect a previously connected slot.
    ///
    /// Returns `true` if the connection existed and was removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Emit the signal, invoking every connected slot with `args`.
    ///
    /// Emission while blocked is a no-op. Slots connected during emission
    /// are not invoked until the next emit.
    pub fn emit(&self, args: Args) {
        if self.blocked.load(Ordering::Acquire) {
            return;
        }

        // Snapshot the slots so a slot may connect/disconnect without
        // deadlocking on the connection map.
        let slots: Vec<Arc<dyn Fn(&Args) + Send + Sync>> =
            self.connections.lock().values().cloned().collect();

        for slot in slots {
            slot(&args);
        }
    }

    /// Block or unblock emission.
    ///
    /// Returns the previous blocked state. While blocked, `emit` does
    /// nothing and the arguments are dropped.
    pub fn set_blocked(&self, blocked: bool) -> bool {
        self.blocked.swap(blocked, Ordering::AcqRel)
    }

    /// Returns `true` if emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::Acquire)
    }

    /// Returns the number of active connections.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connection_count())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

/// RAII guard that disconnects a slot when dropped.
///
/// Useful for scoping a connection to the lifetime of an observer:
///
/// ```
/// use trellis_core::{ConnectionGuard, Signal};
///
/// let signal = Signal::<i32>::new();
/// {
///     let _guard = ConnectionGuard::new(&signal, signal.connect(|_| {}));
///     assert_eq!(signal.connection_count(), 1);
/// }
/// assert_eq!(signal.connection_count(), 0);
/// ```
pub struct ConnectionGuard<'a, Args> {
    signal: &'a Signal<Args>,
    id: ConnectionId,
}

impl<'a, Args> ConnectionGuard<'a, Args> {
    /// Wrap an existing connection so it is disconnected on drop.
    pub fn new(signal: &'a Signal<Args>, id: ConnectionId) -> Self {
        Self { signal, id }
    }

    /// The guarded connection's ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args> Drop for ConnectionGuard<'_, Args> {
    fn drop(&mut self) {
        self.signal.disconnect(self.id);
    }
}
