//! chain-hashmap: a single-threaded separate-chaining HashMap with
//! pluggable key hashing and a live entry handle.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: an associative container with amortized O(1) insert, lookup and
//!   removal whose notion of key equality is supplied by the caller.
//! - Layers:
//!   - KeyHasher<K>: a `(hash, equals)` pair. Three strategies ship:
//!     `ValueHasher` for primitives and strings, `IdentityHasher` for
//!     `Rc<T>` keys compared by allocation, and `HybridHasher` which tags
//!     opted-in objects in place and falls back to the identity table.
//!   - BucketStore: a power-of-two array of chains. Each slot keeps the
//!     hash computed on insert; bucket selection is `hash & (buckets - 1)`.
//!   - ChainedHashMap<K, V, H>: owns the store, the entry count, the load
//!     threshold and the hasher. Grows by doubling after an insert pushes
//!     `len / buckets` over the threshold; shrinks only when asked.
//!   - Entry: a `(map, key)` pair whose methods re-run the map's own
//!     primitives on every call.
//!
//! Constraints
//! - Single-threaded: the map is `!Send` and `!Sync`.
//! - Absence is `None`, never an error.
//! - The hasher contract (`equals(a, b)` implies `hash(a) == hash(b)`, and
//!   `hash` is deterministic) is a precondition. Violations are not
//!   detected; they surface as missed lookups or duplicate keys.
//! - Reentrancy: debug builds panic if user code (hasher or closures) calls
//!   back into the map that invoked it.
//!
//! Hash width
//! - Digests are `i32` with wrapping arithmetic everywhere, so
//!   `ValueHasher` output is identical on every platform.
//!
//! Notes and non-goals
//! - No open addressing and no SIMD probing.
//! - No incremental rehash: every resize moves all pairs before returning.

mod buckets;
mod chained_hash_map;
mod chained_hash_map_proptest;
mod config;
mod entry;
mod hybrid;
mod identity;
pub mod iter;
mod key_hasher;
mod reentrancy;

// Public surface
pub use chained_hash_map::ChainedHashMap;
pub use config::{
    ConfigError, MapConfig, TryReserveError, DEFAULT_BUCKETS, DEFAULT_LOAD_THRESHOLD,
    MIN_LOAD_THRESHOLD,
};
pub use entry::Entry;
pub use hybrid::{HybridHasher, IdentityTag, TagSlot, Tagged};
pub use identity::IdentityHasher;
pub use key_hasher::{
    string_hash, BuildHasherAdapter, CanonicalKey, KeyHasher, StringHash, ValueHasher,
};
