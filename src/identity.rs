//! Identity strategy for `Rc<T>` keys.
//!
//! Keys are told apart by allocation, not by value. Each allocation seen by
//! `hash` gets an id from a per-hasher counter; the side-table holding the
//! association stores only a `Weak<T>`, so it never keeps a key's value
//! alive. Entries whose key has died are swept lazily.
//!
//! Holding the `Weak` does keep the allocation itself reserved until the
//! sweep, which guarantees a live key never shares an address with a dead
//! table entry. Ids are never handed out twice by the same hasher.

use crate::key_hasher::KeyHasher;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::hash::BuildHasher;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;
use std::rc::{Rc, Weak};

const MIN_SWEEP_AT: usize = 64;

struct Tracked<T: ?Sized> {
    addr: usize,
    hash: u64,
    weak: Weak<T>,
    id: u64,
}

struct Table<T: ?Sized> {
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Tracked<T>>,
    sweep_at: usize,
}

/// Hashes `Rc<T>` keys by identity through a weak side-table.
pub struct IdentityHasher<T: ?Sized, S = RandomState> {
    hasher: S,
    table: RefCell<Table<T>>,
    next_id: Cell<u64>,
}

pub(crate) fn fold_id(id: u64) -> i32 {
    (id ^ (id >> 32)) as u32 as i32
}

#[inline]
fn addr_of<T: ?Sized>(key: &Rc<T>) -> usize {
    Rc::as_ptr(key) as *const () as usize
}

impl<T: ?Sized> IdentityHasher<T> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }
}

impl<T: ?Sized> Default for IdentityHasher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized, S> fmt::Debug for IdentityHasher<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityHasher")
            .field("tracked", &self.table.borrow().slots.len())
            .field("next_id", &self.next_id.get())
            .finish()
    }
}

impl<T: ?Sized, S: BuildHasher> IdentityHasher<T, S> {
    /// `hasher` only spreads addresses inside the side-table; it does not
    /// influence the ids.
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            table: RefCell::new(Table {
                index: HashTable::new(),
                slots: SlotMap::with_key(),
                sweep_at: MIN_SWEEP_AT,
            }),
            next_id: Cell::new(0),
        }
    }

    /// Number of side-table entries, including dead ones not yet swept.
    pub fn tracked(&self) -> usize {
        self.table.borrow().slots.len()
    }

    /// Id previously assigned to `key`, without assigning one.
    pub fn id_of(&self, key: &Rc<T>) -> Option<u64> {
        let addr = addr_of(key);
        let hash = self.hasher.hash_one(addr);
        let t = self.table.borrow();
        let &k = t.index.find(hash, |&k| {
            t.slots.get(k).map(|e| e.addr == addr).unwrap_or(false)
        })?;
        t.slots.get(k).map(|e| e.id)
    }

    /// Id for `key`, assigning the next one on first sight.
    pub fn id_or_assign(&self, key: &Rc<T>) -> u64 {
        if let Some(id) = self.id_of(key) {
            return id;
        }
        if self.tracked() >= self.table.borrow().sweep_at {
            self.sweep();
            let mut t = self.table.borrow_mut();
            t.sweep_at = MIN_SWEEP_AT.max(t.slots.len() * 2);
        }

        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let addr = addr_of(key);
        let hash = self.hasher.hash_one(addr);
        let mut guard = self.table.borrow_mut();
        let t = &mut *guard;
        let k = t.slots.insert(Tracked {
            addr,
            hash,
            weak: Rc::downgrade(key),
            id,
        });
        let slots = &t.slots;
        t.index
            .insert_unique(hash, k, |&kk| slots.get(kk).map(|e| e.hash).unwrap_or(0));
        id
    }

    /// Drops side-table entries whose key has no strong references left.
    /// Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let mut guard = self.table.borrow_mut();
        let t = &mut *guard;
        let before = t.slots.len();
        t.slots.retain(|_, e| e.weak.strong_count() > 0);
        let slots = &t.slots;
        t.index.retain(|k| slots.contains_key(*k));
        before - t.slots.len()
    }
}

impl<T: ?Sized, S: BuildHasher> KeyHasher<Rc<T>> for IdentityHasher<T, S> {
    fn hash(&self, key: &Rc<T>) -> i32 {
        fold_id(self.id_or_assign(key))
    }

    /// Keys never passed to `hash` are unequal to everything.
    fn equals(&self, a: &Rc<T>, b: &Rc<T>) -> bool {
        match (self.id_of(a), self.id_of(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }
}
