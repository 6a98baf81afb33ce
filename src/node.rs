//! Tree nodes and the arena that owns them.
//!
//! Nodes live in a `SlotMap`; parent and child links are generational
//! keys into it. A parent link is purely navigational: the arena owns
//! every node, so unlinking never frees through a back-reference.

use slotmap::{DefaultKey, SlotMap};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Color {
    Red,
    Black,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Stable identity of a tree node.
///
/// Survives rotations and the predecessor swap performed by removal of a
/// different key; stops resolving once its own key is removed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeHandle(DefaultKey);

impl NodeHandle {
    pub(crate) fn new(k: DefaultKey) -> Self {
        NodeHandle(k)
    }
    pub(crate) fn raw_handle(&self) -> DefaultKey {
        self.0
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) color: Color,
    pub(crate) parent: Option<DefaultKey>,
    pub(crate) left: Option<DefaultKey>,
    pub(crate) right: Option<DefaultKey>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new_red(key: K, value: V, parent: Option<DefaultKey>) -> Self {
        Self {
            key,
            value,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Option<DefaultKey> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn child_mut(&mut self, side: Side) -> &mut Option<DefaultKey> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// Node storage plus the root link.
#[derive(Debug, Clone)]
pub(crate) struct Arena<K, V> {
    pub(crate) nodes: SlotMap<DefaultKey, Node<K, V>>,
    pub(crate) root: Option<DefaultKey>,
}

impl<K, V> Arena<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    #[inline]
    pub(crate) fn color(&self, id: Option<DefaultKey>) -> Color {
        // Missing children count as black.
        id.map_or(Color::Black, |id| self.nodes[id].color)
    }

    #[inline]
    pub(crate) fn red(&self, id: Option<DefaultKey>) -> Option<DefaultKey> {
        id.filter(|&id| self.nodes[id].color == Color::Red)
    }

    /// Parent of `id` and the side `id` hangs on; `None` for the root.
    pub(crate) fn parent_link(&self, id: DefaultKey) -> Option<(DefaultKey, Side)> {
        let p = self.nodes[id].parent?;
        let side = if self.nodes[p].left == Some(id) {
            Side::Left
        } else {
            Side::Right
        };
        Some((p, side))
    }

    /// Point `parent`'s `side` link at `child` and fix the child's back-link.
    pub(crate) fn set_child(&mut self, parent: DefaultKey, side: Side, child: Option<DefaultKey>) {
        *self.nodes[parent].child_mut(side) = child;
        if let Some(c) = child {
            self.nodes[c].parent = Some(parent);
        }
    }

    /// Put `child` where a node hanging on `link` used to be (the root when
    /// `link` is `None`).
    pub(crate) fn replace_in_parent(
        &mut self,
        link: Option<(DefaultKey, Side)>,
        child: Option<DefaultKey>,
    ) {
        match link {
            Some((p, side)) => self.set_child(p, side, child),
            None => {
                self.root = child;
                if let Some(c) = child {
                    self.nodes[c].parent = None;
                }
            }
        }
    }

    pub(crate) fn min_in(&self, mut id: DefaultKey) -> DefaultKey {
        while let Some(l) = self.nodes[id].left {
            id = l;
        }
        id
    }

    pub(crate) fn max_in(&self, mut id: DefaultKey) -> DefaultKey {
        while let Some(r) = self.nodes[id].right {
            id = r;
        }
        id
    }

    pub(crate) fn successor(&self, id: DefaultKey) -> Option<DefaultKey> {
        if let Some(r) = self.nodes[id].right {
            return Some(self.min_in(r));
        }
        let mut cur = id;
        while let Some((p, side)) = self.parent_link(cur) {
            if side == Side::Left {
                return Some(p);
            }
            cur = p;
        }
        None
    }

    pub(crate) fn predecessor(&self, id: DefaultKey) -> Option<DefaultKey> {
        if let Some(l) = self.nodes[id].left {
            return Some(self.max_in(l));
        }
        let mut cur = id;
        while let Some((p, side)) = self.parent_link(cur) {
            if side == Side::Right {
                return Some(p);
            }
            cur = p;
        }
        None
    }

    pub(crate) fn height(&self, id: Option<DefaultKey>) -> usize {
        match id {
            None => 0,
            Some(id) => {
                let n = &self.nodes[id];
                1 + self.height(n.left).max(self.height(n.right))
            }
        }
    }

    /// Height of a subtree whose every node has child heights within one
    /// of each other; `None` as soon as one node does not.
    pub(crate) fn balanced_height(&self, id: Option<DefaultKey>) -> Option<usize> {
        let Some(id) = id else {
            return Some(0);
        };
        let n = &self.nodes[id];
        let l = self.balanced_height(n.left)?;
        let r = self.balanced_height(n.right)?;
        if l.abs_diff(r) > 1 {
            return None;
        }
        Some(1 + l.max(r))
    }
}

/// Borrowed view of one node.
pub struct NodeRef<'a, K, V> {
    arena: &'a Arena<K, V>,
    id: DefaultKey,
}

impl<K, V> Clone for NodeRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<'_, K, V> {}

impl<'a, K, V> NodeRef<'a, K, V> {
    pub(crate) fn new(arena: &'a Arena<K, V>, id: DefaultKey) -> Self {
        Self { arena, id }
    }

    fn node(&self) -> &'a Node<K, V> {
        &self.arena.nodes[self.id]
    }

    fn at(&self, id: Option<DefaultKey>) -> Option<Self> {
        id.map(|id| NodeRef::new(self.arena, id))
    }

    pub fn key(&self) -> &'a K {
        &self.node().key
    }

    pub fn value(&self) -> &'a V {
        &self.node().value
    }

    pub fn color(&self) -> Color {
        self.node().color
    }

    pub fn handle(&self) -> NodeHandle {
        NodeHandle::new(self.id)
    }

    pub fn parent(&self) -> Option<Self> {
        self.at(self.node().parent)
    }

    pub fn left(&self) -> Option<Self> {
        self.at(self.node().left)
    }

    pub fn right(&self) -> Option<Self> {
        self.at(self.node().right)
    }

    pub fn is_root(&self) -> bool {
        self.node().parent.is_none()
    }

    /// Previous node in key order.
    pub fn predecessor(&self) -> Option<Self> {
        self.at(self.arena.predecessor(self.id))
    }

    /// Next node in key order.
    pub fn successor(&self) -> Option<Self> {
        self.at(self.arena.successor(self.id))
    }
}

impl<K: core::fmt::Debug, V: core::fmt::Debug> core::fmt::Debug for NodeRef<'_, K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", self.key())
            .field("value", self.value())
            .field("color", &self.color())
            .finish()
    }
}
