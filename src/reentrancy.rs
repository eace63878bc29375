//! Debug-only reentrancy guard.
//!
//! A map operation may call user code (the key hasher, `retain` and
//! `map_values` closures) while a chain is half-scanned. Calling back into
//! the same map from there is a bug; in debug builds the guard panics and
//! names both operations. In release builds it compiles away.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

/// Per-map tracker. Operations start with `let _g = self.reentrancy.enter("op");`.
#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    // !Send + !Sync, like the map that owns it.
    _nosend: PhantomData<*mut ()>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _nosend: PhantomData,
        }
    }

    /// Enter operation `op`. In debug builds, panics if another operation
    /// on the same map has not returned yet.
    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.get() {
                panic!("reentrancy detected: `{op}` called while `{outer}` is running on the same map");
            }
            self.active.set(Some(op));
            return ReentrancyGuard { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            return ReentrancyGuard { _z: PhantomData };
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

/// Each map owns a fresh tracker; a clone never shares state.
impl Clone for DebugReentrancy {
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// RAII guard returned by `DebugReentrancy::enter`.
pub(crate) struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl<'a> Drop for ReentrancyGuard<'a> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.active.get().is_some());
            self.owner.active.set(None);
        }
    }
}
