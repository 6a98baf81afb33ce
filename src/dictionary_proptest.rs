#![cfg(test)]

// Property tests for Dictionary kept inside the crate so they can inspect
// bucket layout without widening the public API.

use crate::compare::{HasherEquality, KeyEquality};
use crate::dictionary::Dictionary;
use crate::error::MapError;
use crate::hashing::{next_bucket_count, MIN_BUCKET_COUNT};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations: indices shrink toward earlier keys, and the pool
// and op list both shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    InsertPair(usize, i32),
    SetValue(usize, i32),
    Remove(usize),
    RemovePair(usize, i32),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::InsertPair(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::SetValue(i, v)),
            3 => idx.clone().prop_map(OpI::Remove),
            1 => (idx.clone(), -2i32..2).prop_map(|(i, v)| OpI::RemovePair(i, v)),
            2 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Drives one scenario against std::collections::HashMap. After every op:
// - `len`/`is_empty` match the model.
// - The load factor stays strictly below 1 and the bucket count is one of
//   the sizes the growth sequence can reach.
// - Each chain holds only keys whose stored hash maps to that bucket.
fn run_state_machine<E>(
    mut sut: Dictionary<String, i32, E>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    E: KeyEquality<String>,
{
    let mut model: HashMap<String, i32> = HashMap::new();
    let mut reachable = vec![MIN_BUCKET_COUNT];
    while reachable.len() < 16 {
        let last = reachable[reachable.len() - 1];
        reachable.push(next_bucket_count(last));
    }

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = pool[i].clone();
                let already = model.contains_key(&k);
                match sut.insert(k.clone(), v) {
                    Ok(()) => {
                        prop_assert!(!already, "insert must fail on duplicate");
                        model.insert(k, v);
                    }
                    Err(e) => {
                        prop_assert!(already, "duplicate error only when key exists");
                        prop_assert_eq!(e, MapError::DuplicateKey);
                    }
                }
            }
            OpI::InsertPair(i, v) => {
                let k = pool[i].clone();
                sut.insert_pair((k.clone(), v));
                model.entry(k).or_insert(v);
            }
            OpI::SetValue(i, v) => {
                let k = &pool[i];
                match (sut.set_value(k, v), model.get_mut(k)) {
                    (Ok(old), Some(mv)) => {
                        prop_assert_eq!(old, *mv);
                        *mv = v;
                    }
                    (Err(e), None) => prop_assert_eq!(e, MapError::KeyNotFound),
                    (res, mv) => {
                        prop_assert!(false, "set_value {:?} vs model {:?}", res, mv);
                    }
                }
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                let taken = sut.take(k);
                let expected = model.remove_entry(k);
                prop_assert_eq!(taken, expected);
            }
            OpI::RemovePair(i, v) => {
                let k = &pool[i];
                let matches = model.get(k) == Some(&v);
                prop_assert_eq!(sut.remove_pair(k, &v), matches);
                if matches {
                    model.remove(k);
                }
            }
            OpI::Get(i) => {
                let k = &pool[i];
                match model.get(k) {
                    Some(v) => {
                        prop_assert_eq!(sut.get(k), Ok(v));
                        prop_assert!(sut.contains_entry(k, v));
                    }
                    None => prop_assert_eq!(sut.get(k), Err(MapError::KeyNotFound)),
                }
                prop_assert_eq!(sut.try_get(k), model.get(k));
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                if let Some(vr) = sut.get_mut(k) {
                    *vr = vr.saturating_add(d);
                    let mv = model.get_mut(k);
                    prop_assert!(mv.is_some(), "get_mut resolved a missing key");
                    if let Some(mv) = mv {
                        *mv = mv.saturating_add(d);
                    }
                } else {
                    prop_assert!(!model.contains_key(k));
                }
            }
            OpI::Iterate => {
                let pairs: Vec<_> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let s_set: BTreeSet<_> = pairs.iter().cloned().collect();
                let m_set: BTreeSet<_> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(pairs.len(), s_set.len(), "iteration repeated an entry");
                prop_assert_eq!(s_set, m_set);
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.bucket_count(), MIN_BUCKET_COUNT);
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.load_factor() < 1.0);
        prop_assert!(reachable.contains(&sut.bucket_count()));
        prop_assert!(sut.bucket_layout_is_consistent());
    }
    Ok(())
}

// Property: state-machine equivalence with the default hashing strategy.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let sut: Dictionary<String, i32> = Dictionary::new();
        run_state_machine(sut, &pool, ops)?;
    }
}

// Every key hashes to the same value, so each op resolves purely through
// equality within one chain.
#[derive(Clone, Default)]
struct ConstHash;

impl KeyEquality<String> for ConstHash {
    fn hash(&self, _key: &String) -> Option<i32> {
        Some(0)
    }
    fn equals(&self, a: &String, b: &String) -> bool {
        a == b
    }
}

// Hashing is unavailable for every key; all entries fall back to bucket 0.
#[derive(Clone, Default)]
struct NoHash;

impl KeyEquality<String> for NoHash {
    fn hash(&self, _key: &String) -> Option<i32> {
        None
    }
    fn equals(&self, a: &String, b: &String) -> bool {
        a == b
    }
}

// Property: same invariants under worst-case collisions.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = Dictionary::with_equality(ConstHash);
        run_state_machine(sut, &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_without_hashes((pool, ops) in arb_scenario()) {
        let sut = Dictionary::with_equality(NoHash);
        run_state_machine(sut, &pool, ops)?;
    }

    #[test]
    fn prop_capacity_hint_is_transparent(
        cap in 0usize..200,
        (pool, ops) in arb_scenario(),
    ) {
        let sut: Dictionary<String, i32> =
            Dictionary::with_capacity_and_equality(cap, HasherEquality::default());
        prop_assert!(sut.bucket_count() >= cap.max(MIN_BUCKET_COUNT));
        // A hinted table may start off the growth sequence; only model parity
        // and chain placement are checked for it.
        let mut sut = sut;
        let mut model: HashMap<String, i32> = HashMap::new();
        for op in ops {
            if let OpI::Insert(i, v) = op {
                let k = pool[i].clone();
                prop_assert_eq!(sut.insert(k.clone(), v).is_ok(), !model.contains_key(&k));
                model.entry(k).or_insert(v);
            } else if let OpI::Remove(i) = op {
                prop_assert_eq!(sut.remove(&pool[i]), model.remove(&pool[i]).is_some());
            }
            prop_assert_eq!(sut.len(), model.len());
            prop_assert!(sut.load_factor() < 1.0);
            prop_assert!(sut.bucket_layout_is_consistent());
        }
    }
}
