//! Dictionary: chained hash map over a prime-sized bucket array.
//!
//! Each key's 32-bit hash is captured once at insertion and reused when the
//! bucket array grows, so key strategies never run during a rehash. The
//! array grows whenever an insert brings the entry count up to the bucket
//! count, keeping the load factor at or below 1.

use crate::chain::{self, Chain, Entry};
use crate::compare::{HasherEquality, KeyEquality};
use crate::error::MapError;
use crate::hashing::{
    bucket_count_for_capacity, next_bucket_count, normalize_hash, MIN_BUCKET_COUNT,
};
use crate::reentrancy::DebugReentrancy;
use core::hash::Hash;

#[derive(Debug, Clone)]
struct Table<K, V> {
    buckets: Vec<Chain<K, V>>,
    len: usize,
}

impl<K, V> Table<K, V> {
    fn with_bucket_count(n: usize) -> Self {
        Self {
            buckets: (0..n).map(|_| Chain::new()).collect(),
            len: 0,
        }
    }

    #[inline]
    fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    fn index_of(&self, hash: Option<i32>) -> usize {
        if hash.is_none() {
            tracing::trace!("dictionary: key hash unavailable, using bucket 0");
        }
        normalize_hash(hash, self.bucket_count())
    }

    /// Add an entry known not to be present, growing if the table filled up.
    fn push_new(&mut self, index: usize, entry: Entry<K, V>) {
        self.buckets[index].push(entry);
        self.len += 1;
        if self.len == self.bucket_count() {
            let next = next_bucket_count(self.len);
            if next > self.bucket_count() {
                self.rehash(next);
            }
        }
    }

    fn rehash(&mut self, bucket_count: usize) {
        tracing::debug!(
            from = self.bucket_count(),
            to = bucket_count,
            len = self.len,
            "dictionary: rehashing"
        );
        let mut buckets: Vec<Chain<K, V>> = (0..bucket_count).map(|_| Chain::new()).collect();
        for entry in core::mem::take(&mut self.buckets).into_iter().flatten() {
            buckets[normalize_hash(entry.hash, bucket_count)].push(entry);
        }
        self.buckets = buckets;
        debug_assert_eq!(self.buckets.iter().map(Chain::len).sum::<usize>(), self.len);
    }
}

pub struct Dictionary<K, V, E = HasherEquality> {
    table: Table<K, V>,
    equality: E,
    reentrancy: DebugReentrancy,
}

impl<K, V> Dictionary<K, V>
where
    K: Hash + Eq,
{
    pub fn new() -> Self {
        Self::with_equality(HasherEquality::default())
    }

    /// Start with at least `capacity` buckets (rounded up to a prime, never
    /// fewer than 3).
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_equality(capacity, HasherEquality::default())
    }
}

impl<K, V> Default for Dictionary<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, E> Dictionary<K, V, E>
where
    E: KeyEquality<K>,
{
    pub fn with_equality(equality: E) -> Self {
        Self::with_capacity_and_equality(MIN_BUCKET_COUNT, equality)
    }

    pub fn with_capacity_and_equality(capacity: usize, equality: E) -> Self {
        Self {
            table: Table::with_bucket_count(bucket_count_for_capacity(capacity)),
            equality,
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len
    }

    pub fn is_empty(&self) -> bool {
        self.table.len == 0
    }

    pub fn is_read_only(&self) -> bool {
        false
    }

    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    pub fn load_factor(&self) -> f64 {
        self.table.len as f64 / self.table.bucket_count() as f64
    }

    fn bucket_of(&self, key: &K) -> usize {
        self.table.index_of(self.equality.hash(key))
    }

    fn lookup(&self, key: &K) -> Option<&Entry<K, V>> {
        if self.equality.is_absent(key) {
            return None;
        }
        self.table.buckets[self.bucket_of(key)].get(key, &self.equality)
    }

    /// Value for `key`; `KeyNotFound` when missing, `InvalidArgument` when
    /// the key is absent.
    pub fn get(&self, key: &K) -> Result<&V, MapError> {
        let _g = self.reentrancy.enter();
        if self.equality.is_absent(key) {
            return Err(MapError::InvalidArgument("key"));
        }
        self.lookup(key)
            .map(|e| &e.value)
            .ok_or(MapError::KeyNotFound)
    }

    /// Value for `key`, or `None` when missing. Absent keys are simply not
    /// found.
    pub fn try_get(&self, key: &K) -> Option<&V> {
        let _g = self.reentrancy.enter();
        self.lookup(key).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let _g = self.reentrancy.enter();
        if self.equality.is_absent(key) {
            return None;
        }
        let index = self.bucket_of(key);
        self.table.buckets[index]
            .get_mut(key, &self.equality)
            .map(|e| &mut e.value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        let _g = self.reentrancy.enter();
        self.lookup(key).is_some()
    }

    /// Key present and mapped to exactly `value`.
    pub fn contains_entry(&self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        let _g = self.reentrancy.enter();
        self.lookup(key).is_some_and(|e| e.value == *value)
    }

    /// Replace the value of an existing key and return the old one.
    ///
    /// This is an update, not an upsert: a missing key is `KeyNotFound`
    /// and nothing is inserted.
    pub fn set_value(&mut self, key: &K, value: V) -> Result<V, MapError> {
        let _g = self.reentrancy.enter();
        if self.equality.is_absent(key) {
            return Err(MapError::InvalidArgument("key"));
        }
        let index = self.bucket_of(key);
        self.table.buckets[index]
            .set(key, value, &self.equality)
            .map_err(|_| MapError::KeyNotFound)
    }

    /// Insert a new key. An existing key is `DuplicateKey` and leaves the
    /// dictionary unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), MapError> {
        let _g = self.reentrancy.enter();
        if self.equality.is_absent(&key) {
            return Err(MapError::InvalidArgument("key"));
        }
        let hash = self.equality.hash(&key);
        let index = self.table.index_of(hash);
        if self.table.buckets[index].contains(&key, &self.equality) {
            return Err(MapError::DuplicateKey);
        }
        self.table.push_new(index, Entry { key, value, hash });
        Ok(())
    }

    /// Insert a pair unless its key is already present (or absent), in
    /// which case the pair is silently dropped. Unlike [`insert`], no error
    /// is reported.
    ///
    /// [`insert`]: Dictionary::insert
    pub fn insert_pair(&mut self, (key, value): (K, V)) {
        let _g = self.reentrancy.enter();
        if self.equality.is_absent(&key) {
            return;
        }
        let hash = self.equality.hash(&key);
        let index = self.table.index_of(hash);
        if self.table.buckets[index].contains(&key, &self.equality) {
            return;
        }
        self.table.push_new(index, Entry { key, value, hash });
    }

    pub fn remove(&mut self, key: &K) -> bool {
        self.take(key).is_some()
    }

    /// Remove `key` and return the owned pair.
    pub fn take(&mut self, key: &K) -> Option<(K, V)> {
        let _g = self.reentrancy.enter();
        if self.equality.is_absent(key) {
            return None;
        }
        let index = self.bucket_of(key);
        let entry = self.table.buckets[index].remove(key, &self.equality)?;
        self.table.len -= 1;
        Some((entry.key, entry.value))
    }

    /// Remove `key` only if it maps to exactly `value`.
    pub fn remove_pair(&mut self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        let _g = self.reentrancy.enter();
        if self.equality.is_absent(key) {
            return false;
        }
        let index = self.bucket_of(key);
        match self.table.buckets[index].remove_entry(key, value, &self.equality) {
            Some(_) => {
                self.table.len -= 1;
                true
            }
            None => false,
        }
    }

    /// Drop every entry and shrink back to the minimum bucket count.
    pub fn clear(&mut self) {
        tracing::debug!(
            len = self.table.len,
            buckets = self.table.bucket_count(),
            "dictionary: clear"
        );
        self.table = Table::with_bucket_count(MIN_BUCKET_COUNT);
    }

    /// Snapshot of the keys.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Snapshot of the values.
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.table.buckets.iter(),
            current: None,
            remaining: self.table.len,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            buckets: self.table.buckets.iter_mut(),
            current: None,
            remaining: self.table.len,
        }
    }

    /// Every entry sits in the bucket its stored hash maps to.
    #[cfg(test)]
    pub(crate) fn bucket_layout_is_consistent(&self) -> bool {
        let n = self.table.bucket_count();
        self.table
            .buckets
            .iter()
            .enumerate()
            .all(|(i, chain)| chain.iter().all(|e| normalize_hash(e.hash, n) == i))
    }

    /// Clone every entry into `dest[offset..]`, in iteration order.
    pub fn copy_to(&self, dest: &mut [(K, V)], offset: usize) -> Result<(), MapError>
    where
        K: Clone,
        V: Clone,
    {
        let available = dest.len().saturating_sub(offset);
        if offset > dest.len() || available < self.len() {
            return Err(MapError::DestinationTooSmall {
                required: self.len(),
                available,
            });
        }
        for (slot, (k, v)) in dest[offset..].iter_mut().zip(self.iter()) {
            *slot = (k.clone(), v.clone());
        }
        Ok(())
    }
}

/// Iterator over `(&K, &V)`; each live entry exactly once, in no
/// particular order.
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Chain<K, V>>,
    current: Option<chain::Iter<'a, K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.current.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some((&e.key, &e.value));
            }
            self.current = Some(self.buckets.next()?.iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over `(&K, &mut V)`.
pub struct IterMut<'a, K, V> {
    buckets: core::slice::IterMut<'a, Chain<K, V>>,
    current: Option<chain::IterMut<'a, K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.current.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some((&e.key, &mut e.value));
            }
            self.current = Some(self.buckets.next()?.iter_mut());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// Owning iterator over `(K, V)`.
pub struct IntoIter<K, V> {
    buckets: std::vec::IntoIter<Chain<K, V>>,
    current: Option<<Chain<K, V> as IntoIterator>::IntoIter>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.current.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some((e.key, e.value));
            }
            self.current = Some(self.buckets.next()?.into_iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, E> IntoIterator for Dictionary<K, V, E> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.table.len,
            buckets: self.table.buckets.into_iter(),
            current: None,
        }
    }
}

impl<'a, K, V, E> IntoIterator for &'a Dictionary<K, V, E>
where
    E: KeyEquality<K>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, E> IntoIterator for &'a mut Dictionary<K, V, E>
where
    E: KeyEquality<K>,
{
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, E> core::ops::Index<&K> for Dictionary<K, V, E>
where
    E: KeyEquality<K>,
{
    type Output = V;

    /// Panics when the key is missing or absent; see [`Dictionary::get`].
    fn index(&self, key: &K) -> &V {
        match self.get(key) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<K, V, E> Extend<(K, V)> for Dictionary<K, V, E>
where
    E: KeyEquality<K>,
{
    /// Follows [`Dictionary::insert_pair`]: duplicates keep the first value.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for pair in iter {
            self.insert_pair(pair);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Dictionary<K, V>
where
    K: Hash + Eq,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut d = Self::new();
        d.extend(iter);
        d
    }
}

impl<K, V, E: Clone> Clone for Dictionary<K, V, E>
where
    K: Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            equality: self.equality.clone(),
            reentrancy: DebugReentrancy::new(),
        }
    }
}

impl<K, V, E> core::fmt::Debug for Dictionary<K, V, E>
where
    K: core::fmt::Debug,
    V: core::fmt::Debug,
    E: KeyEquality<K>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::OptionKeys;
    use crate::error::ErrorKind;
    use std::collections::BTreeSet;

    /// Strategy with caller-chosen hashes, to force collisions and failures.
    #[derive(Clone, Default)]
    struct FixedHash(Option<i32>);

    impl KeyEquality<String> for FixedHash {
        fn hash(&self, _key: &String) -> Option<i32> {
            self.0
        }
        fn equals(&self, a: &String, b: &String) -> bool {
            a == b
        }
    }

    /// Invariant: a fresh dictionary is empty with the minimum bucket count.
    #[test]
    fn starts_empty() {
        let d: Dictionary<String, i32> = Dictionary::new();
        assert!(d.is_empty());
        assert_eq!(d.len(), 0);
        assert_eq!(d.bucket_count(), MIN_BUCKET_COUNT);
        assert!(!d.is_read_only());
        assert_eq!(d.iter().count(), 0);
    }

    #[test]
    fn capacity_hint_rounds_to_prime() {
        let d: Dictionary<u32, u32> = Dictionary::with_capacity(100);
        assert_eq!(d.bucket_count(), 101);
        let d: Dictionary<u32, u32> = Dictionary::with_capacity(0);
        assert_eq!(d.bucket_count(), 3);
    }

    #[test]
    fn insert_then_get() {
        let mut d = Dictionary::new();
        d.insert("a".to_string(), 1).unwrap();
        d.insert("b".to_string(), 2).unwrap();
        assert_eq!(d.get(&"a".to_string()), Ok(&1));
        assert_eq!(d.try_get(&"b".to_string()), Some(&2));
        assert_eq!(d.len(), 2);
        assert_eq!(d[&"a".to_string()], 1);
    }

    /// Invariant: a strict duplicate insert fails and leaves the value alone.
    #[test]
    fn duplicate_insert_rejected() {
        let mut d = Dictionary::new();
        d.insert("dup".to_string(), 1).unwrap();
        let err = d.insert("dup".to_string(), 2).unwrap_err();
        assert_eq!(err, MapError::DuplicateKey);
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
        assert_eq!(d.get(&"dup".to_string()), Ok(&1));
        assert_eq!(d.len(), 1);
    }

    /// Invariant: `insert_pair` ignores duplicates without reporting them.
    #[test]
    fn insert_pair_ignores_duplicates() {
        let mut d = Dictionary::new();
        d.insert_pair(("k".to_string(), 1));
        d.insert_pair(("k".to_string(), 2));
        assert_eq!(d.len(), 1);
        assert_eq!(d.try_get(&"k".to_string()), Some(&1));
    }

    /// Invariant: `set_value` only updates; missing keys are an error and nothing is added.
    #[test]
    fn set_value_is_not_upsert() {
        let mut d = Dictionary::new();
        d.insert(1u32, "one").unwrap();
        assert_eq!(d.set_value(&1, "uno"), Ok("one"));
        assert_eq!(d.try_get(&1), Some(&"uno"));
        assert_eq!(d.set_value(&2, "dos"), Err(MapError::KeyNotFound));
        assert!(!d.contains_key(&2));
        assert_eq!(d.len(), 1);
    }

    /// Invariant: the throwing getter reports a missing key; the lookup API reports absence.
    #[test]
    fn missing_key_split() {
        let d: Dictionary<u32, u32> = Dictionary::new();
        assert_eq!(d.get(&7), Err(MapError::KeyNotFound));
        assert_eq!(d.get(&7).unwrap_err().kind(), ErrorKind::KeyNotFound);
        assert_eq!(d.try_get(&7), None);
        assert!(!d.contains_key(&7));
    }

    #[test]
    #[should_panic(expected = "the given key was not present")]
    fn index_panics_on_missing_key() {
        let d: Dictionary<u32, u32> = Dictionary::new();
        let _ = d[&1];
    }

    #[test]
    fn remove_and_take() {
        let mut d = Dictionary::new();
        d.insert(1, 10).unwrap();
        d.insert(2, 20).unwrap();
        assert!(d.remove(&1));
        assert!(!d.remove(&1));
        assert_eq!(d.len(), 1);
        assert_eq!(d.try_get(&1), None);
        assert_eq!(d.take(&2), Some((2, 20)));
        assert!(d.is_empty());
    }

    /// Invariant: pair removal and containment require the value to match.
    #[test]
    fn pair_operations_match_value() {
        let mut d = Dictionary::new();
        d.insert("k".to_string(), 5).unwrap();
        assert!(d.contains_entry(&"k".to_string(), &5));
        assert!(!d.contains_entry(&"k".to_string(), &6));
        assert!(!d.remove_pair(&"k".to_string(), &6));
        assert_eq!(d.len(), 1);
        assert!(d.remove_pair(&"k".to_string(), &5));
        assert!(d.is_empty());
    }

    /// Invariant: growth follows the prime sequence 3, 7, 17, 37 and keeps every entry.
    #[test]
    fn rehash_grows_and_preserves_entries() {
        let mut d = Dictionary::new();
        let mut seen = vec![d.bucket_count()];
        for i in 0..40u32 {
            d.insert(i, i * 2).unwrap();
            if *seen.last().unwrap() != d.bucket_count() {
                seen.push(d.bucket_count());
            }
            assert!(d.load_factor() < 1.0);
        }
        assert_eq!(seen, vec![3, 7, 17, 37, 79]);
        assert_eq!(d.len(), 40);
        for i in 0..40u32 {
            assert_eq!(d.try_get(&i), Some(&(i * 2)));
        }
    }

    /// Invariant: keys whose hash is unavailable all share bucket 0 and stay distinct.
    #[test]
    fn unhashable_keys_use_bucket_zero() {
        let mut d = Dictionary::with_equality(FixedHash(None));
        for k in ["a", "b", "c", "d", "e"] {
            d.insert(k.to_string(), k.len()).unwrap();
        }
        assert_eq!(d.len(), 5);
        assert_eq!(d.table.buckets[0].len(), 5);
        assert!(d.contains_key(&"c".to_string()));
        assert!(d.remove(&"a".to_string()));
        assert!(!d.contains_key(&"a".to_string()));
        assert_eq!(d.len(), 4);
    }

    #[test]
    fn colliding_keys_resolve_by_equality() {
        let mut d = Dictionary::with_equality(FixedHash(Some(-42)));
        d.insert("x".to_string(), 1).unwrap();
        d.insert("y".to_string(), 2).unwrap();
        assert_eq!(d.try_get(&"x".to_string()), Some(&1));
        assert_eq!(d.try_get(&"y".to_string()), Some(&2));
        assert_eq!(d.insert("y".to_string(), 3), Err(MapError::DuplicateKey));
    }

    /// Invariant: absent keys are rejected by the throwing API and not found by lookups.
    #[test]
    fn absent_keys() {
        let mut d: Dictionary<Option<u32>, u32, OptionKeys> =
            Dictionary::with_equality(OptionKeys::default());
        assert_eq!(d.insert(None, 1), Err(MapError::InvalidArgument("key")));
        assert_eq!(d.get(&None), Err(MapError::InvalidArgument("key")));
        assert_eq!(d.set_value(&None, 1), Err(MapError::InvalidArgument("key")));
        assert_eq!(
            d.get(&None).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(d.try_get(&None), None);
        assert!(!d.contains_key(&None));
        assert!(!d.remove(&None));
        d.insert_pair((None, 1));
        assert!(d.is_empty());
        d.insert(Some(1), 1).unwrap();
        assert_eq!(d.get(&Some(1)), Ok(&1));
    }

    /// Invariant: clear drops everything and returns to the minimum bucket count.
    #[test]
    fn clear_resets_capacity() {
        let mut d = Dictionary::with_capacity(50);
        for i in 0..100 {
            d.insert(i, i).unwrap();
        }
        d.clear();
        assert!(d.is_empty());
        assert_eq!(d.bucket_count(), MIN_BUCKET_COUNT);
        assert!(!d.contains_key(&1));
        d.insert(1, 1).unwrap();
        assert_eq!(d.len(), 1);
    }

    /// Invariant: iteration visits each entry once and restarts from scratch.
    #[test]
    fn iteration_visits_each_entry_once() {
        let d: Dictionary<u32, u32> = (0..25).map(|i| (i, i + 100)).collect();
        let first: BTreeSet<_> = d.iter().map(|(k, v)| (*k, *v)).collect();
        let second: BTreeSet<_> = (&d).into_iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(first.len(), 25);
        assert_eq!(first, second);
        assert_eq!(d.iter().len(), 25);
    }

    #[test]
    fn iter_mut_updates_values() {
        let mut d: Dictionary<u32, u32> = (0..10).map(|i| (i, i)).collect();
        for (_, v) in d.iter_mut() {
            *v += 1;
        }
        for (k, v) in &mut d {
            *v += *k;
        }
        for i in 0..10 {
            assert_eq!(d.try_get(&i), Some(&(2 * i + 1)));
        }
        *d.get_mut(&3).unwrap() = 0;
        assert_eq!(d.try_get(&3), Some(&0));
    }

    #[test]
    fn into_iter_yields_owned_pairs() {
        let d: Dictionary<String, u32> = [("a".to_string(), 1), ("b".to_string(), 2)]
            .into_iter()
            .collect();
        let mut owned: Vec<_> = d.into_iter().collect();
        owned.sort();
        assert_eq!(owned, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
    }

    /// Invariant: key and value snapshots are detached from later mutation.
    #[test]
    fn snapshots_are_detached() {
        let mut d = Dictionary::new();
        d.insert(1, "a").unwrap();
        d.insert(2, "b").unwrap();
        let mut keys = d.keys();
        let mut values = d.values();
        d.clear();
        keys.sort();
        values.sort();
        assert_eq!(keys, vec![1, 2]);
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn copy_to_checks_room() {
        let mut d = Dictionary::new();
        d.insert(1, 1).unwrap();
        d.insert(2, 2).unwrap();
        let mut dest = vec![(0, 0); 3];
        let err = d.copy_to(&mut dest, 2).unwrap_err();
        assert_eq!(
            err,
            MapError::DestinationTooSmall {
                required: 2,
                available: 1
            }
        );
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
        assert!(d.copy_to(&mut dest, 9).is_err());
        d.copy_to(&mut dest, 1).unwrap();
        assert_eq!(dest[0], (0, 0));
        let mut copied = dest[1..].to_vec();
        copied.sort();
        assert_eq!(copied, vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn clone_and_debug() {
        let mut d = Dictionary::new();
        d.insert(1, "x").unwrap();
        let c = d.clone();
        d.clear();
        assert_eq!(c.try_get(&1), Some(&"x"));
        assert_eq!(format!("{:?}", c), r#"{1: "x"}"#);
    }

    /// Invariant (debug-only): an equality strategy that calls back into the
    /// dictionary panics.
    #[cfg(debug_assertions)]
    #[test]
    fn reentrancy_panics_from_equality() {
        use std::cell::Cell;

        struct Reentrant {
            dict: Cell<*const Dictionary<u32, (), Reentrant>>,
        }
        impl KeyEquality<u32> for Reentrant {
            fn hash(&self, key: &u32) -> Option<i32> {
                Some(*key as i32)
            }
            fn equals(&self, a: &u32, b: &u32) -> bool {
                let d = self.dict.get();
                if !d.is_null() {
                    unsafe {
                        let _ = (*d).contains_key(a);
                    }
                }
                a == b
            }
        }

        let mut d = Dictionary::with_equality(Reentrant {
            dict: Cell::new(core::ptr::null()),
        });
        d.insert(1, ()).unwrap();
        d.equality.dict.set(&d as *const _);
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = d.contains_key(&1);
        }));
        assert!(res.is_err(), "expected reentrancy to panic in debug builds");
    }
}
