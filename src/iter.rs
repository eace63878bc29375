//! Iterators over a `ChainedHashMap`.
//!
//! All of them walk the bucket store in bucket order, then chain order
//! within each bucket. Borrowing iterators start from the map's current
//! state on every call; the borrow checker rules out mutating the map
//! while one is alive.

use crate::buckets::{Bucket, Slot};
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::slice;
use std::vec;

pub struct Iter<'a, K, V> {
    buckets: slice::Iter<'a, Bucket<K, V>>,
    chain: slice::Iter<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(buckets: &'a [Bucket<K, V>], len: usize) -> Self {
        Self {
            buckets: buckets.iter(),
            chain: <&[Slot<K, V>]>::default().iter(),
            remaining: len,
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            chain: self.chain.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(s) = self.chain.next() {
                self.remaining -= 1;
                return Some((&s.key, &s.value));
            }
            self.chain = self.buckets.next()?.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

pub struct IterMut<'a, K, V> {
    buckets: slice::IterMut<'a, Bucket<K, V>>,
    chain: slice::IterMut<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(buckets: &'a mut [Bucket<K, V>], len: usize) -> Self {
        Self {
            buckets: buckets.iter_mut(),
            chain: <&mut [Slot<K, V>]>::default().iter_mut(),
            remaining: len,
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(s) = self.chain.next() {
                self.remaining -= 1;
                return Some((&s.key, &mut s.value));
            }
            self.chain = self.buckets.next()?.iter_mut();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

pub struct Keys<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

pub struct Values<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

pub struct ValuesMut<'a, K, V> {
    pub(crate) inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// Owning iterator; also backs `Drain`.
pub struct IntoIter<K, V> {
    buckets: vec::IntoIter<Bucket<K, V>>,
    chain: vec::IntoIter<Slot<K, V>>,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(buckets: Vec<Bucket<K, V>>, len: usize) -> Self {
        Self {
            buckets: buckets.into_iter(),
            chain: Vec::new().into_iter(),
            remaining: len,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<(K, V)> {
        loop {
            if let Some(s) = self.chain.next() {
                self.remaining -= 1;
                return Some((s.key, s.value));
            }
            self.chain = self.buckets.next()?.into_iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

/// Single-pass walk over pairs taken out of a map by `drain`.
///
/// The map is already empty when this is created. Pairs not consumed are
/// dropped with the iterator.
pub struct Drain<'a, K, V> {
    pub(crate) inner: IntoIter<K, V>,
    pub(crate) _pd: PhantomData<&'a mut (K, V)>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}
impl<K, V> FusedIterator for Drain<'_, K, V> {}
