//! Core reactive primitives for Trellis.
//!
//! This crate provides the small reactive toolkit the grid binding is built
//! on:
//!
//! - [`Signal<Args>`] - a type-safe signal with multiple connected slots,
//!   used for change notifications and async completion events
//! - [`Property<T>`] - a value wrapper with change detection, used for
//!   host-supplied state such as filter maps
//! - [`Flag`] - an edge-triggered one-shot boolean, used for explicit
//!   refresh requests
//!
//! Slots are invoked synchronously in the emitting thread. The binding runs
//! inside its host's single update pass, so there is no event-loop queueing
//! here; slots are still required to be `Send + Sync` so that completion
//! signals may be emitted from async worker tasks.

mod property;
mod signal;

pub use property::{Flag, Property};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
