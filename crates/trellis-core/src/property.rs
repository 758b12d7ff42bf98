//! Reactive values with change detection.
//!
//! [`Property<T>`] wraps a value and reports whether a `set` actually
//! changed it, so callers only notify observers on real changes. For deep
//! structures (e.g. a JSON filter map) the comparison is whatever
//! `PartialEq` does for the type, which for map types is a deep comparison.
//!
//! [`Flag`] is the edge-triggered cousin: a one-shot boolean that is raised
//! by the host and consumed by whoever reacts to it, so one raise produces
//! exactly one reaction.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

/// A value wrapper that tracks changes.
///
/// When `set()` is called, the new value is compared with the current one
/// and the return value tells the caller whether anything changed. The
/// caller is responsible for emitting the associated notification signal
/// when `set` returns `true`.
///
/// # Example
///
/// ```
/// use trellis_core::Property;
///
/// let prop = Property::new(42);
/// assert_eq!(prop.get(), 42);
///
/// // Setting the same value reports no change
/// assert!(!prop.set(42));
///
/// // Setting a different value reports a change
/// assert!(prop.set(100));
/// assert_eq!(prop.get(), 100);
/// ```
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get the current value.
    ///
    /// This clones the value. For large types, consider `with()` instead.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Set the value without change detection.
    ///
    /// Useful during initialization or batch updates where notifications
    /// are deferred.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Set the value, returning `true` if the value changed.
    ///
    /// Compares via `PartialEq`; if equal, the stored value is left
    /// untouched and `false` is returned.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    }

    /// Set the value, returning the old value if it changed.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut current = self.value.write();
        if *current != value {
            Some(std::mem::replace(&mut *current, value))
        } else {
            None
        }
    }
}

impl<T: Clone> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property").field("value", &self.get()).finish()
    }
}

/// An edge-triggered one-shot flag.
///
/// The producer calls [`raise`](Flag::raise); the consumer calls
/// [`consume`](Flag::consume) and reacts only when it returns `true`.
/// Raising an already-raised flag reports no edge, so a single raise maps
/// to a single reaction even if the producer is eager.
///
/// # Example
///
/// ```
/// use trellis_core::Flag;
///
/// let refresh = Flag::new();
/// assert!(refresh.raise());
/// assert!(!refresh.raise()); // already raised, no new edge
///
/// assert!(refresh.consume());
/// assert!(!refresh.consume()); // reset by the first consume
/// ```
#[derive(Debug, Default)]
pub struct Flag {
    raised: AtomicBool,
}

impl Flag {
    /// Create a new, lowered flag.
    pub fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    /// Raise the flag. Returns `true` if this call produced the edge
    /// (i.e. the flag was previously lowered).
    pub fn raise(&self) -> bool {
        !self.raised.swap(true, Ordering::AcqRel)
    }

    /// Consume the flag, lowering it. Returns `true` if it was raised.
    pub fn consume(&self) -> bool {
        self.raised.swap(false, Ordering::AcqRel)
    }

    /// Returns `true` if the flag is currently raised, without consuming.
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_change_detection() {
        let prop = Property::new("a".to_string());
        assert!(!prop.set("a".to_string()));
        assert!(prop.set("b".to_string()));
        assert_eq!(prop.get(), "b");
    }

    #[test]
    fn test_property_replace_returns_old() {
        let prop = Property::new(1);
        assert_eq!(prop.replace(1), None);
        assert_eq!(prop.replace(2), Some(1));
        assert_eq!(prop.get(), 2);
    }

    #[test]
    fn test_property_with_borrows() {
        let prop = Property::new(vec![1, 2, 3]);
        let len = prop.with(|v| v.len());
        assert_eq!(len, 3);
    }

    #[test]
    fn test_property_set_silent() {
        let prop = Property::new(5);
        prop.set_silent(7);
        assert_eq!(prop.get(), 7);
    }

    #[test]
    fn test_flag_edges() {
        let flag = Flag::new();
        assert!(!flag.is_raised());

        assert!(flag.raise());
        assert!(!flag.raise());
        assert!(flag.is_raised());

        assert!(flag.consume());
        assert!(!flag.consume());
        assert!(!flag.is_raised());
    }
}
