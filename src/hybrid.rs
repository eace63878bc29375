//! Tag-or-table identity strategy.
//!
//! Key types opt in by exposing a write-once [`TagSlot`]. A key whose slot
//! is available is tagged in place; a key that reports no slot (sealed) is
//! tracked through the weak side-table of [`IdentityHasher`] instead.

use crate::identity::{fold_id, IdentityHasher};
use crate::key_hasher::KeyHasher;
use core::cell::OnceCell;
use core::fmt;
use core::hash::BuildHasher;
use core::ops::Deref;
use core::sync::atomic::{AtomicU64, Ordering};
use std::collections::hash_map::RandomState;
use std::rc::Rc;

// Tags live on the objects, not in a hasher, so they must be unique across
// every hasher that could see the same object.
static NEXT_TAG: AtomicU64 = AtomicU64::new(0);

/// Write-once identity tag carried inside a key object.
#[derive(Debug, Default)]
pub struct TagSlot(OnceCell<u64>);

impl TagSlot {
    pub const fn new() -> Self {
        Self(OnceCell::new())
    }

    pub fn get(&self) -> Option<u64> {
        self.0.get().copied()
    }

    fn get_or_assign(&self) -> u64 {
        *self
            .0
            .get_or_init(|| NEXT_TAG.fetch_add(1, Ordering::Relaxed))
    }
}

/// Implemented by key types that may carry an identity tag.
pub trait IdentityTag {
    /// `None` marks the object as sealed: it cannot be tagged.
    fn tag_slot(&self) -> Option<&TagSlot>;
}

/// Convenience wrapper that makes any value taggable.
#[derive(Debug, Default)]
pub struct Tagged<T> {
    tag: TagSlot,
    value: T,
}

impl<T> Tagged<T> {
    pub fn new(value: T) -> Self {
        Self {
            tag: TagSlot::new(),
            value,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for Tagged<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> IdentityTag for Tagged<T> {
    fn tag_slot(&self) -> Option<&TagSlot> {
        Some(&self.tag)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Identity {
    Tagged(u64),
    Tracked(u64),
}

pub struct HybridHasher<T: ?Sized, S = RandomState> {
    fallback: IdentityHasher<T, S>,
}

impl<T: ?Sized> HybridHasher<T> {
    pub fn new() -> Self {
        Self {
            fallback: IdentityHasher::new(),
        }
    }
}

impl<T: ?Sized> Default for HybridHasher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized, S> fmt::Debug for HybridHasher<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HybridHasher")
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl<T, S> HybridHasher<T, S>
where
    T: IdentityTag + ?Sized,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            fallback: IdentityHasher::with_hasher(hasher),
        }
    }

    /// Side-table used for sealed keys.
    pub fn fallback(&self) -> &IdentityHasher<T, S> {
        &self.fallback
    }

    fn identity(&self, key: &Rc<T>) -> Option<Identity> {
        match key.tag_slot() {
            Some(slot) => slot.get().map(Identity::Tagged),
            None => self.fallback.id_of(key).map(Identity::Tracked),
        }
    }
}

impl<T, S> KeyHasher<Rc<T>> for HybridHasher<T, S>
where
    T: IdentityTag + ?Sized,
    S: BuildHasher,
{
    fn hash(&self, key: &Rc<T>) -> i32 {
        match key.tag_slot() {
            Some(slot) => fold_id(slot.get_or_assign()),
            None => fold_id(self.fallback.id_or_assign(key)),
        }
    }

    /// A tagged key never equals a tracked one, whatever their numbers.
    fn equals(&self, a: &Rc<T>, b: &Rc<T>) -> bool {
        match (self.identity(a), self.identity(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }
}
