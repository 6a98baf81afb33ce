//! Debug-only guard against user callbacks re-entering a structure.
//!
//! Hashing, equality and ordering strategies are user code that runs while
//! a dictionary or tree is mid-operation (a chain half searched, a subtree
//! half rotated). A strategy that reaches back into the same structure
//! through a raw pointer would observe that transient state. In debug
//! builds every public entry point takes a guard and a nested entry panics;
//! release builds compile the guard away.

use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    active: Cell<bool>,
    // Send but !Sync in every build profile.
    _unsync: PhantomData<Cell<()>>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(false),
            _unsync: PhantomData,
        }
    }

    /// Mark the owning structure busy until the returned guard drops.
    #[inline]
    pub(crate) fn enter(&self) -> EntryGuard<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.active.replace(true),
                "reentrancy detected: key strategy called back into the structure"
            );
            return EntryGuard { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return EntryGuard { _owner: PhantomData };
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DebugReentrancy {
    // A clone is a fresh, idle structure.
    fn clone(&self) -> Self {
        Self::new()
    }
}

pub(crate) struct EntryGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _owner: PhantomData<&'a ()>,
}

impl Drop for EntryGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.active.set(false);
    }
}
