//! ChainedHashMap: separate-chaining bucket table with load-factor growth.
//!
//! Each bucket slot holds the head of a singly-linked chain. Chain nodes
//! live in a `SlotMap` arena and link to each other by arena key, so the
//! table owns every entry in one place and chains stay acyclic through
//! relinking.

use crate::key_hash::KeyHash;
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt;
use slotmap::{DefaultKey, SlotMap};
use tracing::{debug, trace};

/// Bucket count of a freshly created table.
pub const DEFAULT_CAPACITY: usize = 16;

/// Growth threshold: a put first doubles the table once `len >= capacity * LOAD_FACTOR`.
pub const LOAD_FACTOR: f64 = 0.75;

// Below this a single insert could overshoot the load bound.
const MIN_CAPACITY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    /// The key is the absent sentinel (for example `None`).
    InvalidKey,
    /// `get` found no entry for the key.
    NotFound,
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::InvalidKey => f.write_str("key cannot be absent"),
            MapError::NotFound => f.write_str("key not found"),
        }
    }
}

impl std::error::Error for MapError {}

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    // Cached at insert; resize never calls back into `KeyHash`.
    hash: i32,
    next: Option<DefaultKey>,
}

type Link = Option<DefaultKey>;

#[inline]
fn bucket_index(hash: i32, capacity: usize) -> usize {
    (hash & 0x7FFF_FFFF) as usize % capacity
}

#[derive(Debug)]
pub struct ChainedHashMap<K, V> {
    buckets: Vec<Link>,
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    reentrancy: DebugReentrancy,
}

impl<K, V> Default for ChainedHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ChainedHashMap<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a table with at least `capacity` buckets, rounded up to a
    /// power of two.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_CAPACITY).next_power_of_two();
        Self {
            buckets: vec![None; capacity],
            slots: SlotMap::with_key(),
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of bucket slots. Only ever grows.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    fn at_threshold(&self) -> bool {
        self.slots.len() as f64 >= self.buckets.len() as f64 * LOAD_FACTOR
    }

    /// Double the bucket array and rehome every entry onto the head of its
    /// new chain. Entries keep their arena slots; only links change.
    fn resize(buckets: &mut Vec<Link>, slots: &mut SlotMap<DefaultKey, Entry<K, V>>) {
        let old_capacity = buckets.len();
        let new_capacity = old_capacity * 2;
        let old = core::mem::replace(buckets, vec![None; new_capacity]);
        for head in old {
            let mut cursor = head;
            while let Some(k) = cursor {
                let entry = &mut slots[k];
                cursor = entry.next;
                let index = bucket_index(entry.hash, new_capacity);
                entry.next = buckets[index];
                buckets[index] = Some(k);
            }
        }
        debug!(
            old_capacity,
            new_capacity,
            entries = slots.len(),
            "resized bucket array"
        );
    }
}

impl<K, V> ChainedHashMap<K, V>
where
    K: KeyHash + Eq,
{
    /// Insert `key -> value`, or overwrite the value if the key is present.
    ///
    /// The growth check runs before the lookup, so an overwrite at the
    /// threshold still doubles the table.
    pub fn put(&mut self, key: K, value: V) -> Result<(), MapError> {
        let g = self.reentrancy.enter();
        if key.is_absent() {
            return Err(MapError::InvalidKey);
        }
        if self.at_threshold() {
            Self::resize(&mut self.buckets, &mut self.slots);
        }

        let hash = key.key_hash();
        let index = bucket_index(hash, self.buckets.len());
        let mut tail: Link = None;
        let mut cursor = self.buckets[index];
        while let Some(k) = cursor {
            let entry = &mut self.slots[k];
            if entry.hash == hash && entry.key == key {
                let old = core::mem::replace(&mut entry.value, value);
                trace!(bucket = index, "put replaced value");
                // Old value and rejected key may run user Drop code.
                drop(g);
                drop(old);
                return Ok(());
            }
            tail = Some(k);
            cursor = entry.next;
        }

        let new = self.slots.insert(Entry {
            key,
            value,
            hash,
            next: None,
        });
        match tail {
            None => self.buckets[index] = Some(new),
            Some(t) => self.slots[t].next = Some(new),
        }
        trace!(bucket = index, len = self.slots.len(), "put inserted entry");
        Ok(())
    }

    /// Walk the key's chain. Callers must already hold the reentrancy guard.
    fn locate<Q>(&self, key: &Q) -> Result<DefaultKey, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyHash + Eq,
    {
        if key.is_absent() {
            return Err(MapError::InvalidKey);
        }
        let hash = key.key_hash();
        let mut cursor = self.buckets[bucket_index(hash, self.buckets.len())];
        while let Some(k) = cursor {
            let entry = &self.slots[k];
            if entry.hash == hash && entry.key.borrow() == key {
                return Ok(k);
            }
            cursor = entry.next;
        }
        Err(MapError::NotFound)
    }

    pub fn get<Q>(&self, key: &Q) -> Result<&V, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyHash + Eq,
    {
        let _g = self.reentrancy.enter();
        let k = self.locate(key)?;
        Ok(&self.slots[k].value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyHash + Eq,
    {
        let g = self.reentrancy.enter();
        let k = self.locate(key)?;
        drop(g);
        Ok(&mut self.slots[k].value)
    }

    /// True when `get` would succeed. Absent keys are never contained.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyHash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.locate(key).is_ok()
    }

    /// Unlink and drop the entry for `key`. A missing key is `Ok(false)`,
    /// not an error.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<bool, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyHash + Eq,
    {
        let g = self.reentrancy.enter();
        if key.is_absent() {
            return Err(MapError::InvalidKey);
        }
        let hash = key.key_hash();
        let index = bucket_index(hash, self.buckets.len());
        let mut prev: Link = None;
        let mut cursor = self.buckets[index];
        while let Some(k) = cursor {
            let entry = &self.slots[k];
            if entry.hash == hash && entry.key.borrow() == key {
                let next = entry.next;
                match prev {
                    None => self.buckets[index] = next,
                    Some(p) => self.slots[p].next = next,
                }
                let removed = self.slots.remove(k);
                trace!(bucket = index, len = self.slots.len(), "removed entry");
                // Unlinked first: Drop of K/V may safely reenter.
                drop(g);
                drop(removed);
                return Ok(true);
            }
            prev = Some(k);
            cursor = entry.next;
        }
        Ok(false)
    }
}

#[cfg(test)]
impl<K, V> ChainedHashMap<K, V>
where
    K: KeyHash + Eq,
{
    /// Number of entries chained from bucket `index`.
    pub(crate) fn chain_len(&self, index: usize) -> usize {
        let mut n = 0;
        let mut cursor = self.buckets[index];
        while let Some(k) = cursor {
            n += 1;
            cursor = self.slots[k].next;
        }
        n
    }

    /// Panics unless the structural invariants hold: every arena entry is
    /// reachable exactly once, sits in the bucket its hash selects, and no
    /// chain holds two equal keys.
    pub(crate) fn assert_invariants(&self) {
        let capacity = self.buckets.len();
        assert!(capacity.is_power_of_two());
        let mut reachable = 0;
        for (index, head) in self.buckets.iter().enumerate() {
            let mut chain: Vec<DefaultKey> = Vec::new();
            let mut cursor = *head;
            while let Some(k) = cursor {
                assert!(
                    reachable < self.slots.len(),
                    "more chain nodes than arena entries (cycle?)"
                );
                let entry = &self.slots[k];
                assert_eq!(bucket_index(entry.hash, capacity), index);
                assert_eq!(entry.hash, entry.key.key_hash());
                for &other in &chain {
                    assert!(self.slots[other].key != entry.key, "duplicate key in chain");
                }
                chain.push(k);
                reachable += 1;
                cursor = entry.next;
            }
        }
        assert_eq!(reachable, self.slots.len());
    }
}
