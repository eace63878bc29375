//! ChainedHashMap: separate-chaining map core.

use crate::buckets::{buckets_for, capacity_of, round_up_buckets, BucketStore, Slot};
use crate::config::{
    ConfigError, MapConfig, TryReserveError, DEFAULT_BUCKETS, DEFAULT_LOAD_THRESHOLD,
};
use crate::entry::Entry;
use crate::iter::{Drain, IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use crate::key_hasher::{KeyHasher, ValueHasher};
use crate::reentrancy::DebugReentrancy;
use core::fmt;
use core::marker::PhantomData;
use core::mem;
use core::ops::Index;

/// A hash map storing each bucket as a chain of pairs.
///
/// The bucket count is always a power of two. After an insert that adds a
/// key, the map doubles whenever `len / buckets` exceeds its load
/// threshold; it never shrinks on its own. Keys are hashed once, on insert,
/// with the map's [`KeyHasher`].
#[derive(Clone)]
pub struct ChainedHashMap<K, V, H = ValueHasher> {
    hasher: H,
    store: BucketStore<K, V>,
    len: usize,
    load_threshold: f64,
    reentrancy: DebugReentrancy,
}

#[cold]
#[inline(never)]
fn capacity_overflow() -> ! {
    panic!("capacity overflow")
}

impl<K, V> ChainedHashMap<K, V> {
    pub fn new() -> Self {
        Self::with_hasher(ValueHasher)
    }

    /// Map able to hold `capacity` entries before its first resize.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, ValueHasher)
    }
}

impl<K, V, H> ChainedHashMap<K, V, H> {
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            hasher,
            store: BucketStore::new(DEFAULT_BUCKETS),
            len: 0,
            load_threshold: DEFAULT_LOAD_THRESHOLD,
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: H) -> Self {
        let buckets = buckets_for(capacity, DEFAULT_LOAD_THRESHOLD)
            .unwrap_or_else(|| capacity_overflow());
        Self {
            hasher,
            store: BucketStore::new(buckets),
            len: 0,
            load_threshold: DEFAULT_LOAD_THRESHOLD,
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn with_config(config: MapConfig, hasher: H) -> Result<Self, ConfigError> {
        let buckets = config.validate()?;
        Ok(Self {
            hasher,
            store: BucketStore::new(buckets),
            len: 0,
            load_threshold: config.load_threshold,
            reentrancy: DebugReentrancy::new(),
        })
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entries the map holds before the next automatic resize:
    /// `floor(buckets * load_threshold)`.
    pub fn capacity(&self) -> usize {
        capacity_of(self.store.len(), self.load_threshold)
    }

    /// Literal length of the bucket array.
    pub fn buckets(&self) -> usize {
        self.store.len()
    }

    pub fn load_threshold(&self) -> f64 {
        self.load_threshold
    }

    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.store.len() as f64
    }

    /// Rehashes every pair into `target` buckets, rounded up to a power of
    /// two (minimum 1). Contents are unchanged; iteration order may change.
    ///
    /// An explicit resize may leave the map above its load threshold; the
    /// next insert that adds a key grows it back.
    pub fn resize(&mut self, target: usize) {
        let buckets = round_up_buckets(target).unwrap_or_else(|| capacity_overflow());
        self.rehash_to(buckets);
    }

    /// Shrinks to the fewest buckets that hold the current entries at the
    /// load threshold.
    pub fn shrink_to_fit(&mut self) {
        let fit = buckets_for(self.len, self.load_threshold)
            .unwrap_or_else(|| capacity_overflow());
        if fit != self.store.len() {
            self.rehash_to(fit);
        }
    }

    /// Shrinks so that `capacity()` stays at least `max(min_capacity, len())`.
    ///
    /// When that target is not below the current bucket count (or does not
    /// fit in `usize`), behaves like [`shrink_to_fit`](Self::shrink_to_fit).
    pub fn shrink_to(&mut self, min_capacity: usize) {
        match buckets_for(min_capacity.max(self.len), self.load_threshold) {
            Some(target) if target < self.store.len() => self.rehash_to(target),
            _ => self.shrink_to_fit(),
        }
    }

    /// Grows so that `additional` more entries fit without a resize.
    ///
    /// # Panics
    ///
    /// Panics if the required bucket count overflows `usize`.
    pub fn reserve(&mut self, additional: usize) {
        if let Err(TryReserveError::CapacityOverflow) = self.try_reserve(additional) {
            capacity_overflow()
        }
    }

    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let wanted = self
            .len
            .checked_add(additional)
            .ok_or(TryReserveError::CapacityOverflow)?;
        let buckets =
            buckets_for(wanted, self.load_threshold).ok_or(TryReserveError::CapacityOverflow)?;
        if buckets > self.store.len() {
            self.rehash_to(buckets);
        }
        Ok(())
    }

    /// Removes every pair, keeping the bucket count.
    pub fn clear(&mut self) {
        let buckets = self.store.len();
        let old = mem::replace(&mut self.store, BucketStore::new(buckets));
        self.len = 0;
        // Pairs drop only once the map is consistent again.
        drop(old);
    }

    /// Empties the map and yields every pair it held, exactly once.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        let buckets = self.store.len();
        let old = mem::replace(&mut self.store, BucketStore::new(buckets));
        let len = mem::replace(&mut self.len, 0);
        Drain {
            inner: IntoIter::new(old.into_buckets(), len),
            _pd: PhantomData,
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.store.as_slice(), self.len)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(self.store.as_mut_slice(), self.len)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Keeps only the pairs for which `f` returns true. Chains keep their
    /// relative order.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let _g = self.reentrancy.enter("retain");
        let mut removed = 0;
        for bucket in self.store.as_mut_slice() {
            bucket.retain_mut(|s| {
                let keep = f(&s.key, &mut s.value);
                if !keep {
                    removed += 1;
                }
                keep
            });
        }
        self.len -= removed;
    }

    /// Replaces every value with `f(key, value)` in place. Keys, and
    /// therefore bucket placement, are untouched.
    pub fn map_values<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &V) -> V,
    {
        let _g = self.reentrancy.enter("map_values");
        for bucket in self.store.as_mut_slice() {
            for s in bucket.iter_mut() {
                s.value = f(&s.key, &s.value);
            }
        }
    }

    pub(crate) fn bucket_store(&self) -> &BucketStore<K, V> {
        &self.store
    }

    fn rehash_to(&mut self, buckets: usize) {
        let old = mem::replace(&mut self.store, BucketStore::new(1));
        self.store = old.rehash(buckets);
    }

    fn grow_if_needed(&mut self) {
        let buckets = self.store.len();
        if self.len as f64 <= buckets as f64 * self.load_threshold {
            return;
        }
        // Doubling is enough unless an explicit resize left the map far
        // below what it holds.
        let doubled = buckets.checked_mul(2);
        let needed = buckets_for(self.len, self.load_threshold);
        match (doubled, needed) {
            (Some(d), Some(n)) => self.rehash_to(d.max(n)),
            _ => capacity_overflow(),
        }
    }
}

impl<K, V, H> ChainedHashMap<K, V, H>
where
    H: KeyHasher<K>,
{
    /// Inserts or overwrites. Returns the previous value when `key` was
    /// already present; in that case the stored key is kept and neither
    /// `len()` nor the bucket count changes.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        {
            let _g = self.reentrancy.enter("insert");
            let hash = self.hasher.hash(&key);
            let hasher = &self.hasher;
            if let Some(slot) = self.store.find_mut(hash, |k| hasher.equals(k, &key)) {
                return Some(mem::replace(&mut slot.value, value));
            }
            self.store.bucket_mut(hash).push(Slot { key, value, hash });
            self.len += 1;
        }
        self.grow_if_needed();
        None
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let _g = self.reentrancy.enter("get");
        let hash = self.hasher.hash(key);
        self.store
            .find(hash, |k| self.hasher.equals(k, key))
            .map(|s| (&s.key, &s.value))
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let _g = self.reentrancy.enter("get_mut");
        let hash = self.hasher.hash(key);
        let hasher = &self.hasher;
        self.store
            .find_mut(hash, |k| hasher.equals(k, key))
            .map(|s| &mut s.value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get_key_value(key).is_some()
    }

    /// Removes `key`, returning its value. Never resizes.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let _g = self.reentrancy.enter("remove");
        let hash = self.hasher.hash(key);
        let hasher = &self.hasher;
        let slot = self.store.take(hash, |k| hasher.equals(k, key))?;
        self.len -= 1;
        Some((slot.key, slot.value))
    }

    /// Handle on `key` for conditional updates. Performs no lookup itself.
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, H> {
        Entry::new(self, key)
    }
}

impl<K, V, H: Default> Default for ChainedHashMap<K, V, H> {
    fn default() -> Self {
        Self::with_hasher(H::default())
    }
}

impl<K, V, H> fmt::Debug for ChainedHashMap<K, V, H>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Two maps are equal when they hold the same keys, as judged by `self`'s
/// hasher, with equal values.
impl<K, V, H> PartialEq for ChainedHashMap<K, V, H>
where
    V: PartialEq,
    H: KeyHasher<K>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && other
                .iter()
                .all(|(k, v)| self.get(k).map_or(false, |mine| mine == v))
    }
}

impl<K, V, H> Index<&K> for ChainedHashMap<K, V, H>
where
    H: KeyHasher<K>,
{
    type Output = V;

    fn index(&self, key: &K) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => panic!("key not present in ChainedHashMap"),
        }
    }
}

/// Pre-sizes from the iterator's lower size bound, then inserts in order;
/// later duplicates overwrite earlier ones.
impl<K, V, H> FromIterator<(K, V)> for ChainedHashMap<K, V, H>
where
    H: KeyHasher<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = Self::with_capacity_and_hasher(iter.size_hint().0, H::default());
        map.extend(iter);
        map
    }
}

impl<K, V, H> Extend<(K, V)> for ChainedHashMap<K, V, H>
where
    H: KeyHasher<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, H, const N: usize> From<[(K, V); N]> for ChainedHashMap<K, V, H>
where
    H: KeyHasher<K> + Default,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V, H> From<Vec<(K, V)>> for ChainedHashMap<K, V, H>
where
    H: KeyHasher<K> + Default,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V, H> IntoIterator for ChainedHashMap<K, V, H> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter::new(self.store.into_buckets(), self.len)
    }
}

impl<'a, K, V, H> IntoIterator for &'a ChainedHashMap<K, V, H> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, H> IntoIterator for &'a mut ChainedHashMap<K, V, H> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}
