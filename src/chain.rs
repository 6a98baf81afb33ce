//! Collision chain: the entries sharing one bucket.
//!
//! The first entry lives inline; only a second colliding entry allocates
//! the overflow vector. Removal does not preserve order: the last overflow
//! entry is moved into the vacated position.

use crate::compare::KeyEquality;

#[derive(Debug, Clone)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    // Raw hash captured at insertion; rehashing reuses it.
    pub(crate) hash: Option<i32>,
}

#[derive(Debug, Clone)]
pub(crate) struct Chain<K, V> {
    first: Option<Entry<K, V>>,
    rest: Vec<Entry<K, V>>,
}

impl<K, V> Chain<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            first: None,
            rest: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self.first {
            None => 0,
            Some(_) => 1 + self.rest.len(),
        }
    }

    /// Append without checking for an existing key.
    pub(crate) fn push(&mut self, entry: Entry<K, V>) {
        if self.first.is_none() {
            self.first = Some(entry);
        } else {
            self.rest.push(entry);
        }
    }

    fn position<E>(&self, key: &K, eq: &E) -> Option<Slot>
    where
        E: KeyEquality<K> + ?Sized,
    {
        let first = self.first.as_ref()?;
        if eq.equals(&first.key, key) {
            return Some(Slot::First);
        }
        self.rest
            .iter()
            .position(|e| eq.equals(&e.key, key))
            .map(Slot::Rest)
    }

    pub(crate) fn get<E>(&self, key: &K, eq: &E) -> Option<&Entry<K, V>>
    where
        E: KeyEquality<K> + ?Sized,
    {
        match self.position(key, eq)? {
            Slot::First => self.first.as_ref(),
            Slot::Rest(i) => self.rest.get(i),
        }
    }

    pub(crate) fn get_mut<E>(&mut self, key: &K, eq: &E) -> Option<&mut Entry<K, V>>
    where
        E: KeyEquality<K> + ?Sized,
    {
        match self.position(key, eq)? {
            Slot::First => self.first.as_mut(),
            Slot::Rest(i) => self.rest.get_mut(i),
        }
    }

    /// Replace the value stored under `key`. Returns the previous value, or
    /// hands `value` back when the key is not in this chain.
    pub(crate) fn set<E>(&mut self, key: &K, value: V, eq: &E) -> Result<V, V>
    where
        E: KeyEquality<K> + ?Sized,
    {
        match self.get_mut(key, eq) {
            Some(e) => Ok(core::mem::replace(&mut e.value, value)),
            None => Err(value),
        }
    }

    pub(crate) fn contains<E>(&self, key: &K, eq: &E) -> bool
    where
        E: KeyEquality<K> + ?Sized,
    {
        self.position(key, eq).is_some()
    }

    /// Key match plus exact value match.
    pub(crate) fn contains_entry<E>(&self, key: &K, value: &V, eq: &E) -> bool
    where
        V: PartialEq,
        E: KeyEquality<K> + ?Sized,
    {
        self.get(key, eq).is_some_and(|e| e.value == *value)
    }

    pub(crate) fn remove<E>(&mut self, key: &K, eq: &E) -> Option<Entry<K, V>>
    where
        E: KeyEquality<K> + ?Sized,
    {
        let slot = self.position(key, eq)?;
        self.take_slot(slot)
    }

    /// Remove only if both key and value match.
    pub(crate) fn remove_entry<E>(&mut self, key: &K, value: &V, eq: &E) -> Option<Entry<K, V>>
    where
        V: PartialEq,
        E: KeyEquality<K> + ?Sized,
    {
        if !self.contains_entry(key, value, eq) {
            return None;
        }
        self.remove(key, eq)
    }

    fn take_slot(&mut self, slot: Slot) -> Option<Entry<K, V>> {
        match slot {
            Slot::First => {
                let taken = self.first.take();
                self.first = self.rest.pop();
                taken
            }
            Slot::Rest(i) => Some(self.rest.swap_remove(i)),
        }
    }

    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            first: self.first.as_ref(),
            rest: self.rest.iter(),
        }
    }

    pub(crate) fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            first: self.first.as_mut(),
            rest: self.rest.iter_mut(),
        }
    }
}

#[derive(Copy, Clone)]
enum Slot {
    First,
    Rest(usize),
}

pub(crate) struct Iter<'a, K, V> {
    first: Option<&'a Entry<K, V>>,
    rest: core::slice::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a Entry<K, V>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match self.first.take() {
            Some(e) => Some(e),
            None => self.rest.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::from(self.first.is_some()) + self.rest.len();
        (n, Some(n))
    }
}

pub(crate) struct IterMut<'a, K, V> {
    first: Option<&'a mut Entry<K, V>>,
    rest: core::slice::IterMut<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = &'a mut Entry<K, V>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match self.first.take() {
            Some(e) => Some(e),
            None => self.rest.next(),
        }
    }
}

impl<K, V> IntoIterator for Chain<K, V> {
    type Item = Entry<K, V>;
    type IntoIter = core::iter::Chain<
        core::option::IntoIter<Entry<K, V>>,
        std::vec::IntoIter<Entry<K, V>>,
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.first.into_iter().chain(self.rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::HasherEquality;
    use std::collections::hash_map::RandomState;

    type Strategy = HasherEquality<RandomState>;

    fn entry(k: &str, v: i32) -> Entry<String, i32> {
        Entry {
            key: k.to_string(),
            value: v,
            hash: None,
        }
    }

    fn chain_of(keys: &[(&str, i32)]) -> Chain<String, i32> {
        let mut c = Chain::new();
        for (k, v) in keys {
            c.push(entry(k, *v));
        }
        c
    }

    /// Invariant: a chain with at most one entry never allocates overflow storage.
    #[test]
    fn single_entry_stays_inline() {
        let mut c: Chain<String, i32> = Chain::new();
        assert_eq!(c.len(), 0);
        c.push(entry("a", 1));
        assert_eq!(c.len(), 1);
        assert_eq!(c.rest.capacity(), 0);
        c.push(entry("b", 2));
        assert_eq!(c.len(), 2);
        assert!(c.rest.capacity() >= 1);
    }

    #[test]
    fn get_finds_head_and_overflow() {
        let eq = Strategy::default();
        let c = chain_of(&[("a", 1), ("b", 2), ("c", 3)]);
        assert_eq!(c.get(&"a".to_string(), &eq).map(|e| e.value), Some(1));
        assert_eq!(c.get(&"c".to_string(), &eq).map(|e| e.value), Some(3));
        assert!(c.get(&"z".to_string(), &eq).is_none());
        assert!(c.contains(&"b".to_string(), &eq));
        assert!(!c.contains(&"z".to_string(), &eq));
    }

    /// Invariant: removing the head promotes the last overflow entry and keeps the rest.
    #[test]
    fn remove_head_promotes_last() {
        let eq = Strategy::default();
        let mut c = chain_of(&[("a", 1), ("b", 2), ("c", 3)]);
        let removed = c.remove(&"a".to_string(), &eq).unwrap();
        assert_eq!(removed.key, "a");
        assert_eq!(c.len(), 2);
        assert_eq!(c.first.as_ref().map(|e| e.key.as_str()), Some("c"));
        assert!(c.contains(&"b".to_string(), &eq));
        assert!(c.remove(&"a".to_string(), &eq).is_none());
    }

    #[test]
    fn remove_until_empty() {
        let eq = Strategy::default();
        let mut c = chain_of(&[("a", 1), ("b", 2)]);
        assert!(c.remove(&"b".to_string(), &eq).is_some());
        assert!(c.remove(&"a".to_string(), &eq).is_some());
        assert_eq!(c.len(), 0);
        assert_eq!(c.iter().count(), 0);
    }

    #[test]
    fn set_replaces_in_place_or_returns_value() {
        let eq = Strategy::default();
        let mut c = chain_of(&[("a", 1), ("b", 2)]);
        assert_eq!(c.set(&"b".to_string(), 20, &eq), Ok(2));
        assert_eq!(c.get(&"b".to_string(), &eq).map(|e| e.value), Some(20));
        assert_eq!(c.set(&"z".to_string(), 9, &eq), Err(9));
        assert_eq!(c.len(), 2);
    }

    /// Invariant: entry-level operations require the value to match too.
    #[test]
    fn entry_match_requires_value() {
        let eq = Strategy::default();
        let mut c = chain_of(&[("a", 1), ("b", 2)]);
        assert!(c.contains_entry(&"a".to_string(), &1, &eq));
        assert!(!c.contains_entry(&"a".to_string(), &2, &eq));
        assert!(c.remove_entry(&"b".to_string(), &3, &eq).is_none());
        assert_eq!(c.len(), 2);
        assert!(c.remove_entry(&"b".to_string(), &2, &eq).is_some());
        assert_eq!(c.len(), 1);
    }

    /// Invariant: every iteration restarts from the head and visits each entry once.
    #[test]
    fn iteration_is_restartable() {
        let c = chain_of(&[("a", 1), ("b", 2), ("c", 3)]);
        let first: Vec<_> = c.iter().map(|e| e.value).collect();
        let second: Vec<_> = c.iter().map(|e| e.value).collect();
        assert_eq!(first, vec![1, 2, 3]);
        assert_eq!(first, second);
        assert_eq!(c.iter().size_hint(), (3, Some(3)));
    }

    #[test]
    fn iter_mut_and_into_iter() {
        let mut c = chain_of(&[("a", 1), ("b", 2)]);
        for e in c.iter_mut() {
            e.value *= 10;
        }
        let owned: Vec<_> = c.into_iter().map(|e| (e.key, e.value)).collect();
        assert_eq!(owned, vec![("a".to_string(), 10), ("b".to_string(), 20)]);
    }
}
