//! Shared, mutable proxy defaults.
//!
//! A [`DefaultCell`] is handed out as a public field of every proxy. The
//! holder may mutate it at any time; an in-flight invocation reads whatever
//! the cell contains when its background task runs, not what it contained at
//! call time. The lock only guarantees memory safety, no ordering is implied
//! between holder writes and pending invocations.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub struct DefaultCell<T>(Arc<RwLock<T>>);

impl<T> DefaultCell<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the contents.
    pub fn set(&self, value: T) {
        *self.write() = value;
    }

    /// `true` when both cells share the same storage.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl<T: Clone> DefaultCell<T> {
    /// Copy of the current contents.
    pub fn snapshot(&self) -> T {
        self.read().clone()
    }
}

impl<T> Clone for DefaultCell<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Default> Default for DefaultCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for DefaultCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DefaultCell").field(&*self.read()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_observe_each_others_writes() {
        let cell = DefaultCell::new(vec!["a".to_string()]);
        let alias = cell.clone();

        alias.write().push("b".to_string());
        assert_eq!(cell.snapshot(), vec!["a", "b"]);
        assert!(DefaultCell::ptr_eq(&cell, &alias));
    }

    #[test]
    fn snapshot_is_detached() {
        let cell = DefaultCell::new(vec![1, 2]);
        let mut copy = cell.snapshot();
        copy.push(3);

        assert_eq!(*cell.read(), vec![1, 2]);
        cell.set(vec![9]);
        assert_eq!(copy, vec![1, 2, 3]);
        assert_eq!(cell.snapshot(), vec![9]);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let cell = DefaultCell::new(0u32);
        let alias = cell.clone();
        let _ = std::thread::spawn(move || {
            let _guard = alias.write();
            panic!("poison the lock");
        })
        .join();

        *cell.write() += 1;
        assert_eq!(cell.snapshot(), 1);
    }
}
