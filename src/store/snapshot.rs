//! Atomically replaceable snapshot holder.
//!
//! # Design Decisions
//! - `ArcSwap` gives lock-free loads; a reader keeps whatever `Arc` it loaded
//! - `replace` is the only way to change the published value
//! - The store always holds a snapshot: it starts from `T::default()`

use arc_swap::{ArcSwap, Guard};
use std::sync::Arc;

/// Holds the current immutable snapshot of a dataset.
pub struct SnapshotStore<T> {
    current: ArcSwap<T>,
}

impl<T: Default> SnapshotStore<T> {
    /// Create a store holding an empty snapshot.
    pub fn new() -> Self {
        Self::with_snapshot(T::default())
    }

    /// Publish an empty snapshot.
    pub fn clear(&self) {
        self.replace(T::default());
    }
}

impl<T> SnapshotStore<T> {
    /// Create a store holding `initial`.
    pub fn with_snapshot(initial: T) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// Borrow the current snapshot.
    ///
    /// Lock-free; the guard keeps the loaded snapshot alive even if a
    /// `replace` happens meanwhile.
    pub fn read(&self) -> Guard<Arc<T>> {
        self.current.load()
    }

    /// Get an owned handle to the current snapshot.
    ///
    /// Prefer `read` on hot paths; this bumps the reference count.
    pub fn read_full(&self) -> Arc<T> {
        self.current.load_full()
    }

    /// Publish `next`, returning the snapshot it superseded.
    pub fn replace(&self, next: T) -> Arc<T> {
        self.current.swap(Arc::new(next))
    }
}

impl<T: Default> Default for SnapshotStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for SnapshotStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("current", &**self.current.load())
            .finish()
    }
}
