//! LockedHashMap: serializes every table operation through one mutex.
//!
//! The wrapper owns its `ChainedHashMap` outright, so no caller can reach
//! the table without holding the lock. Results and errors pass through
//! unchanged; the lock guard is dropped on every exit path.

use crate::chained_hash_map::{ChainedHashMap, MapError};
use crate::key_hash::KeyHash;
use core::borrow::Borrow;
use std::sync::{Mutex, MutexGuard};
use tracing::warn;

#[derive(Debug)]
pub struct LockedHashMap<K, V> {
    table: Mutex<ChainedHashMap<K, V>>,
}

impl<K, V> Default for LockedHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> From<ChainedHashMap<K, V>> for LockedHashMap<K, V> {
    fn from(table: ChainedHashMap<K, V>) -> Self {
        Self {
            table: Mutex::new(table),
        }
    }
}

impl<K, V> LockedHashMap<K, V> {
    pub fn new() -> Self {
        Self::from(ChainedHashMap::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::from(ChainedHashMap::with_capacity(capacity))
    }

    // The table never calls user code while its links are mid-update, so a
    // panic in a key's Eq/KeyHash leaves it consistent and the poison flag
    // can be cleared.
    fn lock(&self) -> MutexGuard<'_, ChainedHashMap<K, V>> {
        self.table.lock().unwrap_or_else(|poisoned| {
            warn!("table lock poisoned by a panicking caller; recovering");
            self.table.clear_poison();
            poisoned.into_inner()
        })
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    /// Give up the lock and return the table.
    pub fn into_inner(self) -> ChainedHashMap<K, V> {
        self.table
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<K, V> LockedHashMap<K, V>
where
    K: KeyHash + Eq,
{
    pub fn put(&self, key: K, value: V) -> Result<(), MapError> {
        self.lock().put(key, value)
    }

    /// Clone of the stored value; a reference cannot outlive the lock.
    pub fn get<Q>(&self, key: &Q) -> Result<V, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyHash + Eq,
        V: Clone,
    {
        self.lock().get(key).cloned()
    }

    /// Run `f` on the stored value while the lock is held.
    pub fn with_value<Q, R, F>(&self, key: &Q, f: F) -> Result<R, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyHash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.lock().get(key).map(f)
    }

    /// Run `f` on the stored value mutably while the lock is held.
    pub fn update<Q, R, F>(&self, key: &Q, f: F) -> Result<R, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyHash + Eq,
        F: FnOnce(&mut V) -> R,
    {
        self.lock().get_mut(key).map(f)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyHash + Eq,
    {
        self.lock().contains_key(key)
    }

    pub fn remove<Q>(&self, key: &Q) -> Result<bool, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyHash + Eq,
    {
        self.lock().remove(key)
    }
}
