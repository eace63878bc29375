//! Entry: a live handle on one key of a `ChainedHashMap`.
//!
//! The handle holds only the map borrow and the key. Every method looks the
//! key up again through the map's own `get`/`insert`/`remove`, so nothing
//! about presence or value is cached between calls.

use crate::chained_hash_map::ChainedHashMap;
use crate::key_hasher::{KeyHasher, ValueHasher};
use core::fmt;

pub struct Entry<'a, K, V, H = ValueHasher> {
    map: &'a mut ChainedHashMap<K, V, H>,
    key: K,
}

impl<'a, K, V, H> Entry<'a, K, V, H>
where
    H: KeyHasher<K>,
{
    pub(crate) fn new(map: &'a mut ChainedHashMap<K, V, H>, key: K) -> Self {
        Self { map, key }
    }

    /// The bound key; performs no lookup.
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn into_key(self) -> K {
        self.key
    }

    pub fn is_occupied(&self) -> bool {
        self.map.contains_key(&self.key)
    }

    pub fn get(&self) -> Option<&V> {
        self.map.get(&self.key)
    }

    pub fn get_mut(&mut self) -> Option<&mut V> {
        self.map.get_mut(&self.key)
    }

    /// Consumes the handle, returning a reference that outlives it.
    pub fn into_mut(self) -> Option<&'a mut V> {
        let Entry { map, key } = self;
        map.get_mut(&key)
    }

    /// Updates the value in place when the key is present; no-op otherwise.
    pub fn and_modify<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        if let Some(v) = self.map.get_mut(&self.key) {
            f(v);
        }
        self
    }

    /// Removes the key, returning its value. The map is untouched when the
    /// key is absent.
    pub fn remove(self) -> Option<V> {
        self.map.remove(&self.key)
    }

    pub fn remove_entry(self) -> Option<(K, V)> {
        self.map.remove_entry(&self.key)
    }
}

/// Inserting stores a clone of the bound key; the handle keeps its own.
impl<'a, K, V, H> Entry<'a, K, V, H>
where
    K: Clone,
    H: KeyHasher<K>,
{
    /// Sets `value` unconditionally and returns the value it replaced.
    pub fn insert(&mut self, value: V) -> Option<V> {
        self.map.insert(self.key.clone(), value)
    }

    /// Like [`insert`](Self::insert), but returns the handle for chaining.
    pub fn insert_entry(mut self, value: V) -> Self {
        self.insert(value);
        self
    }

    pub fn or_insert(mut self, value: V) -> Self {
        if !self.is_occupied() {
            self.insert(value);
        }
        self
    }

    /// Calls `f` exactly once, and only when the key is absent.
    pub fn or_insert_with<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&K) -> V,
    {
        if !self.is_occupied() {
            let value = f(&self.key);
            self.insert(value);
        }
        self
    }

    pub fn or_default(self) -> Self
    where
        V: Default,
    {
        self.or_insert_with(|_| V::default())
    }
}

impl<K, V, H> fmt::Debug for Entry<'_, K, V, H>
where
    K: fmt::Debug,
    V: fmt::Debug,
    H: KeyHasher<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("value", &self.get())
            .finish()
    }
}
