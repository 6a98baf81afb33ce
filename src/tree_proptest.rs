#![cfg(test)]

// Property tests for RedBlackTree: model equivalence against BTreeMap with
// the full invariant check after every operation.

use crate::compare::OrderBy;
use crate::node::NodeHandle;
use crate::red_black_tree::RedBlackTree;
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug)]
enum Op {
    Insert(i16, u32),
    Remove(i16),
    Take(i16),
    Get(i16),
    Mutate(i16, u32),
    Clear,
}

// `keys` bounds the key range: narrow ranges make removals and duplicates
// hit often, wide ones grow deep trees. `clear_weight` is out of 17_000
// for the other ops combined.
fn arb_ops(
    keys: core::ops::Range<i16>,
    clear_weight: u32,
    len: core::ops::Range<usize>,
) -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        8000 => (keys.clone(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        4000 => keys.clone().prop_map(Op::Remove),
        2000 => keys.clone().prop_map(Op::Take),
        2000 => keys.clone().prop_map(Op::Get),
        1000 => (keys.clone(), any::<u32>()).prop_map(|(k, v)| Op::Mutate(k, v)),
        clear_weight => Just(Op::Clear),
    ];
    proptest::collection::vec(op, len)
}

// Upper bound on red-black height for n nodes: 2 * log2(n + 1).
fn height_bound(n: usize) -> usize {
    2 * (usize::BITS - (n + 1).leading_zeros()) as usize
}

// Drives one op sequence against BTreeMap. After every op:
// - `check_invariants` passes (black root, no red-red edge, equal black
//   heights, consistent parent links, strictly ascending order, count).
// - Height stays within 2 * log2(n + 1).
// - Handles of surviving keys keep resolving to the same key, including
//   across rotations and predecessor swaps triggered by other removals.
// At the end, in-order iteration equals the model's ordered pairs.
fn run_state_machine(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut sut: RedBlackTree<i16, u32> = RedBlackTree::new();
    let mut model: BTreeMap<i16, u32> = BTreeMap::new();
    let mut handles: HashMap<i16, NodeHandle> = HashMap::new();

    for op in ops {
        match op {
            Op::Insert(k, v) => {
                let fresh = !model.contains_key(&k);
                prop_assert_eq!(sut.insert(k, v), fresh);
                if fresh {
                    model.insert(k, v);
                    let h = sut.get_node(&k).map(|n| n.handle());
                    prop_assert!(h.is_some());
                    if let Some(h) = h {
                        handles.insert(k, h);
                    }
                }
            }
            Op::Remove(k) => {
                prop_assert_eq!(sut.remove(&k), model.remove(&k).is_some());
                if let Some(h) = handles.remove(&k) {
                    prop_assert!(sut.node(h).is_none(), "removed key's handle still resolves");
                }
            }
            Op::Take(k) => {
                prop_assert_eq!(sut.take(&k), model.remove_entry(&k));
                handles.remove(&k);
            }
            Op::Get(k) => {
                prop_assert_eq!(sut.get(&k), model.get(&k));
                prop_assert_eq!(sut.contains(&k), model.contains_key(&k));
            }
            Op::Mutate(k, v) => {
                if let Some(slot) = sut.get_mut(&k) {
                    *slot = v;
                }
                if let Some(slot) = model.get_mut(&k) {
                    *slot = v;
                }
            }
            Op::Clear => {
                sut.clear();
                model.clear();
                handles.clear();
                prop_assert!(sut.root().is_none());
            }
        }

        let checked = sut.check_invariants();
        prop_assert!(checked.is_ok(), "invariant broken: {:?}", checked);
        prop_assert_eq!(sut.len(), model.len());
        prop_assert!(sut.height() <= height_bound(sut.len()));
        for (k, h) in &handles {
            let n = sut.node(*h);
            prop_assert_eq!(n.map(|n| *n.key()), Some(*k));
        }
    }

    let got: Vec<_> = sut.iter().map(|(k, v)| (*k, *v)).collect();
    let want: Vec<_> = model.iter().map(|(k, v)| (*k, *v)).collect();
    prop_assert_eq!(got, want);
    Ok(())
}

// Property: State-machine equivalence against BTreeMap over a narrow key
// range, with frequent clears.
proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(ops in arb_ops(-64..64, 1000, 1..600)) {
        run_state_machine(ops)?;
    }
}

// Property: the same state machine over thousands of ops and a key range
// wide enough for trees of a thousand-plus nodes, so double-black repairs
// propagate several levels. Clears are rare so the tree stays large; the
// second case forces a clear and rebuild between rounds.
proptest! {
    #![proptest_config(ProptestConfig { cases: 6, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_large(ops in arb_ops(-2048..2048, 1, 3000..5000)) {
        run_state_machine(ops)?;
    }

    #[test]
    fn prop_clear_and_rebuild_cycles(
        rounds in proptest::collection::vec(arb_ops(-2048..2048, 1, 800..1500), 3..5),
    ) {
        let ops: Vec<Op> = rounds
            .into_iter()
            .flat_map(|round| round.into_iter().chain(core::iter::once(Op::Clear)))
            .collect();
        run_state_machine(ops)?;
    }
}

// Property: same structure under a caller-supplied reverse order; iteration
// follows the comparator, not `Ord`.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_custom_order(keys in proptest::collection::vec(any::<i32>(), 0..300)) {
        let mut sut = RedBlackTree::with_order(OrderBy(|a: &i32, b: &i32| b.cmp(a)));
        let mut model = BTreeMap::new();
        for k in keys {
            prop_assert_eq!(sut.insert(k, ()), model.insert(k, ()).is_none());
        }
        prop_assert!(sut.check_invariants().is_ok());
        let got: Vec<i32> = sut.iter().map(|(k, _)| *k).collect();
        let want: Vec<i32> = model.keys().rev().copied().collect();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn prop_navigation_matches_iteration(
        keys in proptest::collection::btree_set(any::<u16>(), 1..200),
    ) {
        let sut: RedBlackTree<u16, ()> = keys.iter().map(|k| (*k, ())).collect();
        let Some(root) = sut.root() else {
            return Err(TestCaseError::fail("non-empty tree has no root"));
        };
        // Walk to the minimum, then follow successor links.
        let mut first = root;
        while let Some(l) = first.left() {
            first = l;
        }
        let mut walked = vec![*first.key()];
        let mut cur = first;
        while let Some(next) = cur.successor() {
            prop_assert_eq!(next.predecessor().map(|p| p.handle()), Some(cur.handle()));
            walked.push(*next.key());
            cur = next;
        }
        let want: Vec<u16> = keys.into_iter().collect();
        prop_assert_eq!(walked, want);
    }
}
