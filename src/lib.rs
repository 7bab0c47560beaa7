//! chain-hashmap: a separate-chaining hash map with load-factor growth and
//! a mutex-guarded wrapper for sharing it across threads.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a mutable key -> value map whose bucket layout, collision
//!   chains and growth policy are all explicit and testable, plus a thin
//!   serialization layer for concurrent callers.
//! - Layers:
//!   - KeyHash: deterministic signed 32-bit hash per key, and an
//!     "absent key" predicate (`Option::None` is the stock sentinel).
//!   - ChainedHashMap<K, V>: bucket array of chain heads. Chain nodes live
//!     in a `SlotMap` arena and link by arena key.
//!   - LockedHashMap<K, V>: owns one ChainedHashMap behind a single
//!     `Mutex`; same put/get/remove surface.
//!
//! Constraints
//! - Bucket for a key: `(hash & 0x7FFF_FFFF) % capacity`.
//! - Capacity starts at 16 and doubles; it never shrinks.
//! - A put first grows the table when `len >= capacity * 0.75`, then looks
//!   the key up. Overwrites leave `len` unchanged.
//! - Unique keys per chain; `len` equals the number of chained entries.
//!
//! Error contract
//! - `get` on a missing key is `Err(MapError::NotFound)`.
//! - `remove` on a missing key is `Ok(false)`.
//! - Every operation rejects an absent key with `Err(MapError::InvalidKey)`
//!   before touching the table.
//!
//! Hash caching
//! - Each entry stores its hash at insert. Resize relinks entries using the
//!   stored hash and never calls `KeyHash` again, so no user code runs while
//!   chains are being rewired.
//!
//! Reentrancy and locking
//! - ChainedHashMap carries a debug-only reentrancy guard: a key whose
//!   `Eq`/`KeyHash` calls back into the same table panics in debug builds.
//! - The table is `Send` but `!Sync`; LockedHashMap is `Send + Sync` and is
//!   the only way to share one table. A caller panicking inside user code
//!   poisons the mutex; the table is still consistent, so the wrapper
//!   recovers the lock rather than failing every later caller.
//!
//! Notes and non-goals
//! - No iteration, no shrinking, no per-bucket locking.
//! - No ordering among entries; resize may reorder a chain.

mod chained_hash_map;
#[cfg(test)]
mod chained_hash_map_proptest;
mod key_hash;
mod locked_hash_map;
mod reentrancy;

// Public surface
pub use chained_hash_map::{ChainedHashMap, MapError, DEFAULT_CAPACITY, LOAD_FACTOR};
pub use key_hash::KeyHash;
pub use locked_hash_map::LockedHashMap;
