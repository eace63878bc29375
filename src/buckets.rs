//! Bucket store: a power-of-two sequence of chains.
//!
//! Each slot keeps the 32-bit hash computed on insertion. Locating a bucket
//! and rehashing always use the stored hash, so the key hasher is consulted
//! once per insert and never again while the pair lives in the map.

#[derive(Debug, Clone)]
pub(crate) struct Slot<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: i32,
}

pub(crate) type Bucket<K, V> = Vec<Slot<K, V>>;

#[derive(Debug, Clone)]
pub(crate) struct BucketStore<K, V> {
    buckets: Vec<Bucket<K, V>>,
}

/// Rounds up to the next power of two, treating 0 as 1.
pub(crate) fn round_up_buckets(n: usize) -> Option<usize> {
    n.max(1).checked_next_power_of_two()
}

/// Number of entries a store of `buckets` holds before the next growth.
pub(crate) fn capacity_of(buckets: usize, threshold: f64) -> usize {
    (buckets as f64 * threshold).floor() as usize
}

/// Smallest power-of-two bucket count whose capacity covers `entries`.
pub(crate) fn buckets_for(entries: usize, threshold: f64) -> Option<usize> {
    let raw = (entries as f64 / threshold).ceil();
    if raw >= usize::MAX as f64 {
        return None;
    }
    let mut buckets = round_up_buckets(raw as usize)?;
    // Float rounding can leave the product one short.
    while capacity_of(buckets, threshold) < entries {
        buckets = buckets.checked_mul(2)?;
    }
    Some(buckets)
}

impl<K, V> BucketStore<K, V> {
    /// `len` must be a power of two.
    pub(crate) fn new(len: usize) -> Self {
        debug_assert!(len.is_power_of_two());
        let mut buckets = Vec::with_capacity(len);
        buckets.resize_with(len, Vec::new);
        Self { buckets }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub(crate) fn index_of(&self, hash: i32) -> usize {
        (hash as u32 as usize) & (self.buckets.len() - 1)
    }

    #[inline]
    pub(crate) fn bucket(&self, hash: i32) -> &Bucket<K, V> {
        &self.buckets[self.index_of(hash)]
    }

    #[inline]
    pub(crate) fn bucket_mut(&mut self, hash: i32) -> &mut Bucket<K, V> {
        let i = self.index_of(hash);
        &mut self.buckets[i]
    }

    /// Position of the first slot in the hash's chain that matches `eq`.
    pub(crate) fn position(&self, hash: i32, mut eq: impl FnMut(&K) -> bool) -> Option<usize> {
        self.bucket(hash)
            .iter()
            .position(|s| s.hash == hash && eq(&s.key))
    }

    pub(crate) fn find(&self, hash: i32, eq: impl FnMut(&K) -> bool) -> Option<&Slot<K, V>> {
        let pos = self.position(hash, eq)?;
        Some(&self.bucket(hash)[pos])
    }

    pub(crate) fn find_mut(
        &mut self,
        hash: i32,
        eq: impl FnMut(&K) -> bool,
    ) -> Option<&mut Slot<K, V>> {
        let pos = self.position(hash, eq)?;
        Some(&mut self.bucket_mut(hash)[pos])
    }

    /// Removes the matching slot, keeping the order of the rest of the chain.
    pub(crate) fn take(&mut self, hash: i32, eq: impl FnMut(&K) -> bool) -> Option<Slot<K, V>> {
        let pos = self.position(hash, eq)?;
        Some(self.bucket_mut(hash).remove(pos))
    }

    /// Moves every slot into a fresh store of `new_len` buckets, walking the
    /// old store bucket by bucket.
    pub(crate) fn rehash(self, new_len: usize) -> Self {
        let mut next = Self::new(new_len);
        for bucket in self.buckets {
            for slot in bucket {
                next.bucket_mut(slot.hash).push(slot);
            }
        }
        next
    }

    pub(crate) fn as_slice(&self) -> &[Bucket<K, V>] {
        &self.buckets
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Bucket<K, V>] {
        &mut self.buckets
    }

    pub(crate) fn into_buckets(self) -> Vec<Bucket<K, V>> {
        self.buckets
    }
}
