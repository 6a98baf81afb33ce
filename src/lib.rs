//! altdict: a chained hash dictionary over prime-sized bucket arrays and
//! an arena-backed red-black tree, both driven by pluggable key strategies.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: two independent associative containers whose behavior is fully
//!   determined by a caller-supplied key strategy, with the structural
//!   invariants checkable at any point.
//! - Pieces:
//!   - `hashing`: stateless bucket indexing (`normalize_hash`) and the
//!     prime growth sequence (`next_bucket_count`).
//!   - `Chain<K, V>`: the entries sharing one bucket; the first entry is
//!     inline, collisions spill into a vector.
//!   - `Dictionary<K, V, E>`: bucket array of chains, grown to the next
//!     prime above twice the entry count whenever it fills.
//!   - `RedBlackTree<K, V, C>`: ordered map whose nodes live in a
//!     `SlotMap`; links are generational keys, exposed read-only as
//!     `NodeRef` and as stable `NodeHandle`s.
//!
//! Key strategies
//! - `KeyEquality` supplies a fallible 32-bit hash plus equality;
//!   `HasherEquality` adapts any `K: Hash + Eq`.
//! - `KeyOrder` supplies a total order; `NaturalOrder` uses `K: Ord` and
//!   `OrderBy` wraps a closure.
//! - Either strategy may flag a key as absent (`OptionKeys` treats `None`
//!   that way). Absent keys are an `InvalidArgument` error for `get`,
//!   `insert` and `set_value`, and simply "not found" everywhere else.
//!
//! Duplicate keys
//! - `Dictionary::insert` fails with `DuplicateKey`.
//! - `Dictionary::insert_pair` (and `Extend`) keeps the existing entry.
//! - `Dictionary::set_value` only updates; it never inserts.
//! - `RedBlackTree::insert` returns `false` and keeps the existing entry.
//!
//! Hash and rehashing invariants
//! - Each entry stores the raw hash computed at insertion. Rehashing
//!   redistributes by the stored hash, so no user code runs while the
//!   bucket array is being rebuilt.
//! - A missing hash (`None`) always maps to bucket 0.
//! - After every insert the load factor is strictly below 1.
//! - `clear` shrinks the bucket array back to `MIN_BUCKET_COUNT`.
//!
//! Red-black invariants
//! - The root is black, no red node has a red child, and every path from a
//!   node to a missing child passes the same number of black nodes.
//! - In-order traversal is strictly ascending under the tree's order.
//! - `check_invariants` verifies all of the above plus parent links and
//!   node count; the property tests run it after every operation.
//!
//! Reentrancy policy
//! - Strategies run while a structure is mid-operation. Each public
//!   method takes a debug-only guard, and a strategy that reaches back
//!   into the same structure panics in debug builds.
//!
//! Notes and non-goals
//! - Not thread-safe: both containers are `Send` but `!Sync`.
//! - Iteration borrows the container, so mutation during iteration is
//!   rejected at compile time.
//! - Dictionary iteration order is unspecified.

mod chain;
pub mod compare;
pub mod dictionary;
mod dictionary_proptest;
pub mod error;
pub mod hashing;
mod node;
pub mod red_black_tree;
mod reentrancy;
mod tree_proptest;

// Public surface
pub use compare::{HasherEquality, KeyEquality, KeyOrder, NaturalOrder, OptionKeys, OrderBy};
pub use dictionary::Dictionary;
pub use error::{ErrorKind, MapError, TreeViolation};
pub use hashing::{
    bucket_count_for_capacity, is_prime, next_bucket_count, normalize_hash, MIN_BUCKET_COUNT,
};
pub use node::{Color, NodeHandle, NodeRef};
pub use red_black_tree::RedBlackTree;
