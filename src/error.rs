//! Error types shared by the dictionary and the tree.

/// Coarse classification of a [`MapError`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// An argument was unusable (absent key).
    InvalidArgument,
    /// An argument conflicts with the current contents (duplicate key,
    /// destination too small).
    ArgumentConflict,
    /// The key is not present.
    KeyNotFound,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("invalid argument: {0} is absent")]
    InvalidArgument(&'static str),
    #[error("an entry with the same key already exists")]
    DuplicateKey,
    #[error("destination holds {available} entries past the offset, {required} required")]
    DestinationTooSmall { required: usize, available: usize },
    #[error("the given key was not present")]
    KeyNotFound,
}

impl MapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MapError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            MapError::DuplicateKey | MapError::DestinationTooSmall { .. } => {
                ErrorKind::ArgumentConflict
            }
            MapError::KeyNotFound => ErrorKind::KeyNotFound,
        }
    }
}

/// A red-black or structural property found broken by
/// [`RedBlackTree::check_invariants`](crate::RedBlackTree::check_invariants).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeViolation {
    #[error("root node is red")]
    RedRoot,
    #[error("red node has a red child")]
    RedRedEdge,
    #[error("black height differs between sibling subtrees ({left} vs {right})")]
    BlackHeightMismatch { left: usize, right: usize },
    #[error("child does not point back to its parent")]
    BrokenParentLink,
    #[error("in-order traversal is not strictly ascending")]
    OrderViolation,
    #[error("reachable nodes ({reachable}) differ from count ({count})")]
    CountMismatch { reachable: usize, count: usize },
}
