//! Single-writer sharing for the data structures.
//!
//! The structures themselves are plain owned values with `&mut self`
//! mutators. Callers that hand one instance to several threads wrap it in a
//! [`Shared`]: any number of readers, or exactly one writer.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A reference-counted, read-write-locked handle.
#[derive(Debug, Default)]
pub struct Shared<T> {
    inner: Arc<RwLock<T>>,
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Shared<T> {
    /// Wraps `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// Acquires shared read access.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read()
    }

    /// Acquires exclusive write access.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.inner.write()
    }

    /// Runs `f` under the write lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Clones the current state into an immutable snapshot.
    pub fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.inner.read().clone()
    }
}
