//! Key strategies: hashing/equality for the dictionary, ordering for the tree.
//!
//! Both strategies may report a key as *absent* (the null sentinel of
//! reference-based APIs). Absent keys are rejected by the throwing API and
//! treated as "not found" by the lookup API. The default strategies never
//! report absence.

use core::cmp::Ordering;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Equality and 32-bit hashing for dictionary keys.
///
/// `hash` is fallible: returning `None` means the key cannot be hashed, and
/// the dictionary then places it in bucket 0 (see
/// [`normalize_hash`](crate::normalize_hash)). Keys that compare equal must
/// produce the same hash.
pub trait KeyEquality<K: ?Sized> {
    fn hash(&self, key: &K) -> Option<i32>;
    fn equals(&self, a: &K, b: &K) -> bool;

    fn is_absent(&self, _key: &K) -> bool {
        false
    }
}

/// Total order for tree keys.
pub trait KeyOrder<K: ?Sized> {
    fn compare(&self, a: &K, b: &K) -> Ordering;

    fn is_absent(&self, _key: &K) -> bool {
        false
    }
}

/// Default dictionary strategy: `K: Hash + Eq` through a `BuildHasher`,
/// folded to 32 bits.
#[derive(Clone, Debug, Default)]
pub struct HasherEquality<S = RandomState> {
    hasher: S,
}

impl<S> HasherEquality<S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self { hasher }
    }
}

#[inline]
fn fold_hash(h: u64) -> i32 {
    (h ^ (h >> 32)) as u32 as i32
}

impl<K, S> KeyEquality<K> for HasherEquality<S>
where
    K: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    #[inline]
    fn hash(&self, key: &K) -> Option<i32> {
        Some(fold_hash(self.hasher.hash_one(key)))
    }

    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Default tree strategy: `K: Ord`.
#[derive(Copy, Clone, Debug, Default)]
pub struct NaturalOrder;

impl<K: ?Sized + Ord> KeyOrder<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Tree strategy from a comparison closure.
#[derive(Copy, Clone)]
pub struct OrderBy<F>(pub F);

impl<K, F> KeyOrder<K> for OrderBy<F>
where
    K: ?Sized,
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.0)(a, b)
    }
}

/// Strategy for `Option<T>` keys where `None` plays the absent key.
#[derive(Clone, Debug, Default)]
pub struct OptionKeys<S = RandomState> {
    inner: HasherEquality<S>,
}

impl<S> OptionKeys<S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            inner: HasherEquality::with_hasher(hasher),
        }
    }
}

impl<T, S> KeyEquality<Option<T>> for OptionKeys<S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn hash(&self, key: &Option<T>) -> Option<i32> {
        key.as_ref().and_then(|k| self.inner.hash(k))
    }

    fn equals(&self, a: &Option<T>, b: &Option<T>) -> bool {
        a == b
    }

    fn is_absent(&self, key: &Option<T>) -> bool {
        key.is_none()
    }
}

impl<T: Ord, S> KeyOrder<Option<T>> for OptionKeys<S> {
    fn compare(&self, a: &Option<T>, b: &Option<T>) -> Ordering {
        a.cmp(b)
    }

    fn is_absent(&self, key: &Option<T>) -> bool {
        key.is_none()
    }
}
