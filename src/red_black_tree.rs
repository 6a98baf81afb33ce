//! RedBlackTree: ordered map over an arena of colored nodes.
//!
//! Insertion attaches a red node at the search position and repairs
//! red-red edges bottom-up. Removal first reduces a two-child node to its
//! in-order predecessor's position (moving the node, not its payload),
//! then either splices the single child in, drops a red leaf, or repairs
//! the black-height deficit left by a black leaf.

use crate::compare::{KeyOrder, NaturalOrder};
use crate::error::{MapError, TreeViolation};
use crate::node::{Arena, Color, Node, NodeHandle, NodeRef, Side};
use crate::reentrancy::DebugReentrancy;
use core::cmp::Ordering;
use slotmap::DefaultKey;

#[derive(Clone)]
pub struct RedBlackTree<K, V, C = NaturalOrder> {
    arena: Arena<K, V>,
    order: C,
    reentrancy: DebugReentrancy,
}

impl<K: Ord, V> RedBlackTree<K, V> {
    pub fn new() -> Self {
        Self::with_order(NaturalOrder)
    }
}

impl<K: Ord, V> Default for RedBlackTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> RedBlackTree<K, V, C>
where
    C: KeyOrder<K>,
{
    pub fn with_order(order: C) -> Self {
        Self {
            arena: Arena::new(),
            order,
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.arena.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.nodes.is_empty()
    }

    pub fn is_read_only(&self) -> bool {
        false
    }

    pub fn root(&self) -> Option<NodeRef<'_, K, V>> {
        self.arena.root.map(|id| NodeRef::new(&self.arena, id))
    }

    /// Resolve a handle taken earlier; `None` once that node was removed.
    pub fn node(&self, handle: NodeHandle) -> Option<NodeRef<'_, K, V>> {
        let id = handle.raw_handle();
        self.arena
            .nodes
            .contains_key(id)
            .then(|| NodeRef::new(&self.arena, id))
    }

    fn find(&self, key: &K) -> Option<DefaultKey> {
        if self.order.is_absent(key) {
            return None;
        }
        let mut cur = self.arena.root;
        while let Some(id) = cur {
            let node = &self.arena.nodes[id];
            cur = match self.order.compare(key, &node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    pub fn get_node(&self, key: &K) -> Option<NodeRef<'_, K, V>> {
        let _g = self.reentrancy.enter();
        self.find(key).map(|id| NodeRef::new(&self.arena, id))
    }

    pub fn contains(&self, key: &K) -> bool {
        let _g = self.reentrancy.enter();
        self.find(key).is_some()
    }

    /// Key present and mapped to exactly `value`.
    pub fn contains_entry(&self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        let _g = self.reentrancy.enter();
        self.find(key)
            .is_some_and(|id| self.arena.nodes[id].value == *value)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let _g = self.reentrancy.enter();
        self.find(key).map(|id| &self.arena.nodes[id].value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let _g = self.reentrancy.enter();
        let id = self.find(key)?;
        self.arena.nodes.get_mut(id).map(|n| &mut n.value)
    }

    /// Insert a new key. Returns `false`, leaving the tree untouched, when
    /// an equal key is already present or the key is absent; callers
    /// wanting an error for duplicates check `contains` first.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let _g = self.reentrancy.enter();
        if self.order.is_absent(&key) {
            return false;
        }
        let mut link = None;
        let mut cur = self.arena.root;
        while let Some(id) = cur {
            let node = &self.arena.nodes[id];
            let side = match self.order.compare(&key, &node.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return false,
            };
            link = Some((id, side));
            cur = node.child(side);
        }
        let id = self
            .arena
            .nodes
            .insert(Node::new_red(key, value, link.map(|(p, _)| p)));
        self.arena.replace_in_parent(link, Some(id));
        self.arena.insert_fixup(id);
        true
    }

    pub fn remove(&mut self, key: &K) -> bool {
        self.take(key).is_some()
    }

    /// Remove `key` and return the owned pair.
    pub fn take(&mut self, key: &K) -> Option<(K, V)> {
        let _g = self.reentrancy.enter();
        let id = self.find(key)?;
        let node = self.arena.unlink(id)?;
        Some((node.key, node.value))
    }

    pub fn clear(&mut self) {
        tracing::debug!(len = self.len(), "red-black tree: clear");
        self.arena.clear();
    }

    /// Number of nodes on the longest root-to-leaf path; 0 when empty.
    pub fn height(&self) -> usize {
        self.arena.height(self.arena.root)
    }

    /// Whether subtree heights differ by at most one at every node.
    ///
    /// This is stricter than what red-black balancing guarantees, so a
    /// valid tree may report `false`.
    pub fn is_balanced(&self) -> bool {
        self.arena.balanced_height(self.arena.root).is_some()
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: self.nodes(),
        }
    }

    /// Nodes in ascending key order.
    pub fn nodes(&self) -> Nodes<'_, K, V> {
        Nodes {
            arena: &self.arena,
            next: self.arena.root.map(|r| self.arena.min_in(r)),
            remaining: self.len(),
        }
    }

    /// Clone every entry into `dest[offset..]` in key order.
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

    /// Verify every red-black property plus parent links, key order and
    /// count. Returns the black height of the root (absent leaves not
    /// counted).
    pub fn check_invariants(&self) -> Result<usize, TreeViolation> {
        let _g = self.reentrancy.enter();
        let Some(root) = self.arena.root else {
            return match self.len() {
                0 => Ok(0),
                count => Err(TreeViolation::CountMismatch {
                    reachable: 0,
                    count,
                }),
            };
        };
        if self.arena.color(Some(root)) == Color::Red {
            return Err(TreeViolation::RedRoot);
        }
        if self.arena.nodes[root].parent.is_some() {
            return Err(TreeViolation::BrokenParentLink);
        }
        let mut reachable = 0;
        let black_height = self.check_subtree(root, &mut reachable)?;
        if reachable != self.len() {
            return Err(TreeViolation::CountMismatch {
                reachable,
                count: self.len(),
            });
        }
        let mut prev: Option<&K> = None;
        for (k, _) in self.iter() {
            if let Some(p) = prev {
                if self.order.compare(p, k) != Ordering::Less {
                    return Err(TreeViolation::OrderViolation);
                }
            }
            prev = Some(k);
        }
        Ok(black_height)
    }

    fn check_subtree(&self, id: DefaultKey, reachable: &mut usize) -> Result<usize, TreeViolation> {
        *reachable += 1;
        let node = &self.arena.nodes[id];
        let mut heights = [0usize; 2];
        for (h, child) in heights.iter_mut().zip([node.left, node.right]) {
            let Some(c) = child else { continue };
            let child_node = &self.arena.nodes[c];
            if child_node.parent != Some(id) {
                return Err(TreeViolation::BrokenParentLink);
            }
            if node.color == Color::Red && child_node.color == Color::Red {
                return Err(TreeViolation::RedRedEdge);
            }
            *h = self.check_subtree(c, reachable)?;
        }
        if heights[0] != heights[1] {
            return Err(TreeViolation::BlackHeightMismatch {
                left: heights[0],
                right: heights[1],
            });
        }
        Ok(heights[0] + usize::from(node.color == Color::Black))
    }
}

impl<K, V> Arena<K, V> {
    /// Rotate the subtree rooted at `p` towards `side`: the child on the
    /// opposite side takes `p`'s place and its `side` subtree moves under
    /// `p`.
    fn rotate(&mut self, p: DefaultKey, side: Side) {
        let Some(s) = self.nodes[p].child(side.opposite()) else {
            return;
        };
        let link = self.parent_link(p);
        let middle = self.nodes[s].child(side);
        self.set_child(p, side.opposite(), middle);
        self.set_child(s, side, Some(p));
        self.replace_in_parent(link, Some(s));
    }

    fn insert_fixup(&mut self, mut n: DefaultKey) {
        while let Some((p, _)) = self.parent_link(n) {
            if self.nodes[p].color == Color::Black {
                return;
            }
            let Some((g, p_side)) = self.parent_link(p) else {
                // Red root.
                self.nodes[p].color = Color::Black;
                return;
            };
            if let Some(u) = self.red(self.nodes[g].child(p_side.opposite())) {
                self.nodes[p].color = Color::Black;
                self.nodes[u].color = Color::Black;
                self.nodes[g].color = Color::Red;
                n = g;
                continue;
            }
            let mut p = p;
            if self.parent_link(n).map(|(_, s)| s) != Some(p_side) {
                // Inner grandchild: turn it into an outer one first.
                self.rotate(p, p_side);
                p = n;
            }
            self.rotate(g, p_side.opposite());
            self.nodes[p].color = Color::Black;
            self.nodes[g].color = Color::Red;
            return;
        }
        if let Some(r) = self.root {
            self.nodes[r].color = Color::Black;
        }
    }

    /// Detach `id` from the tree, rebalance, and hand back the node.
    fn unlink(&mut self, id: DefaultKey) -> Option<Node<K, V>> {
        if let (Some(left), Some(_)) = (self.nodes[id].left, self.nodes[id].right) {
            let pred = self.max_in(left);
            self.swap_positions(id, pred);
        }
        let link = self.parent_link(id);
        let (child, color) = {
            let node = &self.nodes[id];
            (node.left.or(node.right), node.color)
        };
        match child {
            Some(child) => {
                self.replace_in_parent(link, Some(child));
                self.nodes[child].color = Color::Black;
            }
            None => {
                self.replace_in_parent(link, None);
                if let (Color::Black, Some((p, side))) = (color, link) {
                    self.fix_double_black(p, side);
                }
            }
        }
        self.nodes.remove(id)
    }

    /// Exchange the tree positions and colors of `a` and `b`, where `b` is
    /// the maximum of `a`'s left subtree.
    fn swap_positions(&mut self, a: DefaultKey, b: DefaultKey) {
        let a_link = self.parent_link(a);
        let b_link = self.parent_link(b);
        let (a_left, a_right) = (self.nodes[a].left, self.nodes[a].right);
        let (b_left, b_right) = (self.nodes[b].left, self.nodes[b].right);

        self.replace_in_parent(a_link, Some(b));
        if a_left == Some(b) {
            self.set_child(b, Side::Left, Some(a));
        } else {
            self.set_child(b, Side::Left, a_left);
            if let Some((bp, side)) = b_link {
                self.set_child(bp, side, Some(a));
            }
        }
        self.set_child(b, Side::Right, a_right);
        self.set_child(a, Side::Left, b_left);
        self.set_child(a, Side::Right, b_right);

        let a_color = self.nodes[a].color;
        self.nodes[a].color = self.nodes[b].color;
        self.nodes[b].color = a_color;
    }

    /// Restore black height after a black leaf was removed from `p`'s
    /// `side`.
    fn fix_double_black(&mut self, mut p: DefaultKey, mut side: Side) {
        loop {
            // The side opposite a black-height deficit is never empty.
            let Some(mut s) = self.nodes[p].child(side.opposite()) else {
                return;
            };
            if self.nodes[s].color == Color::Red {
                self.rotate(p, side);
                self.nodes[p].color = Color::Red;
                self.nodes[s].color = Color::Black;
                let Some(next) = self.nodes[p].child(side.opposite()) else {
                    return;
                };
                s = next;
            }
            if let Some(far) = self.red(self.nodes[s].child(side.opposite())) {
                self.rotate(p, side);
                self.nodes[s].color = self.nodes[p].color;
                self.nodes[p].color = Color::Black;
                self.nodes[far].color = Color::Black;
                return;
            }
            if let Some(near) = self.red(self.nodes[s].child(side)) {
                self.rotate(s, side.opposite());
                self.rotate(p, side);
                self.nodes[near].color = self.nodes[p].color;
                self.nodes[p].color = Color::Black;
                self.nodes[s].color = Color::Black;
                return;
            }
            self.nodes[s].color = Color::Red;
            if self.nodes[p].color == Color::Red {
                self.nodes[p].color = Color::Black;
                return;
            }
            match self.parent_link(p) {
                Some((gp, gp_side)) => {
                    p = gp;
                    side = gp_side;
                }
                None => return,
            }
        }
    }
}

/// In-order node iterator.
pub struct Nodes<'a, K, V> {
    arena: &'a Arena<K, V>,
    next: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Nodes<'a, K, V> {
    type Item = NodeRef<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.next?;
        self.next = self.arena.successor(id);
        self.remaining -= 1;
        Some(NodeRef::new(self.arena, id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Nodes<'_, K, V> {}

/// In-order entry iterator.
pub struct Iter<'a, K, V> {
    nodes: Nodes<'a, K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.nodes.next().map(|n| (n.key(), n.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.nodes.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V, C> IntoIterator for &'a RedBlackTree<K, V, C>
where
    C: KeyOrder<K>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, C> Extend<(K, V)> for RedBlackTree<K, V, C>
where
    C: KeyOrder<K>,
{
    /// Duplicate keys keep their first value.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for RedBlackTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut t = Self::new();
        t.extend(iter);
        t
    }
}

impl<K, V, C> core::fmt::Debug for RedBlackTree<K, V, C>
where
    K: core::fmt::Debug,
    V: core::fmt::Debug,
    C: KeyOrder<K>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
