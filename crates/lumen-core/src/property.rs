//! Observable values.
//!
//! A [`Property<T>`] stores a value and tells the writer whether a write
//! changed it, so the owner emits its change signal only on real changes.
//!
//! # Example
//!
//! ```
//! use lumen_core::{Property, Signal};
//!
//! struct Badge {
//!     count: Property<u32>,
//!     count_changed: Signal<u32>,
//! }
//!
//! impl Badge {
//!     fn set_count(&self, count: u32) {
//!         if self.count.set(count) {
//!             self.count_changed.emit(count);
//!         }
//!     }
//! }
//!
//! let badge = Badge { count: Property::new(0), count_changed: Signal::new() };
//! badge.set_count(3);
//! assert_eq!(badge.count.get(), 3);
//! ```

use std::fmt;

use parking_lot::RwLock;

/// A value with change detection on write.
///
/// Reads and writes go through a `parking_lot::RwLock`; the property is
/// `Send + Sync` whenever `T` is.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// A clone of the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Store `value`. Returns `true` if it differs from the previous value.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current == value {
            return false;
        }
        *current = value;
        true
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&self.get()).finish()
    }
}

/// Borrowed view of a [`Property`] that cannot write.
///
/// Lets an owner expose a property without exposing `set`.
pub struct ReadOnlyProperty<'a, T> {
    inner: &'a Property<T>,
}

impl<'a, T: Clone> ReadOnlyProperty<'a, T> {
    pub fn new(property: &'a Property<T>) -> Self {
        Self { inner: property }
    }

    pub fn get(&self) -> T {
        self.inner.get()
    }
}

static_assertions::assert_impl_all!(Property<Option<String>>: Send, Sync);
