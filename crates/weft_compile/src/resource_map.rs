//! Type-erased resource storage.
//!
//! A string-keyed map that can hold values of any `Send + Sync` type and
//! hand back typed shared handles. Backs both the local environments of
//! namespaces and the shared per-file storage for imported FSTs and
//! function nodes. Thread-safe for concurrent read/insert; entries are
//! freed when the last handle drops.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type Entry = Arc<dyn Any + Send + Sync>;

/// A thread-safe map from names to values of arbitrary type.
#[derive(Default)]
pub struct ResourceMap {
    map: RwLock<HashMap<String, Entry>>,
}

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `thing` under `name`, replacing any existing entry.
    /// Returns `true` for a fresh insertion, `false` if it clobbered.
    pub fn insert<T: Any + Send + Sync>(&self, name: &str, thing: T) -> bool {
        let mut map = self.lock_write();
        map.insert(name.to_string(), Arc::new(thing)).is_none()
    }

    /// Typed lookup.
    ///
    /// # Panics
    ///
    /// Panics if the entry exists with a different type; keys are
    /// partitioned by kind upstream, so a mismatch is a compiler bug.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        let map = self.lock_read();
        let entry = map.get(name)?.clone();
        match entry.downcast::<T>() {
            Ok(typed) => Some(typed),
            Err(_) => panic!("resource {} exists with a different type", name),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock_read().contains_key(name)
    }

    /// Removes an entry. Returns `true` if it existed.
    pub fn erase(&self, name: &str) -> bool {
        self.lock_write().remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock_read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_read().is_empty()
    }

    fn lock_read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Entry>> {
        self.map.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Entry>> {
        self.map.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ResourceMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ResourceMap({} entries)", self.len())
    }
}
