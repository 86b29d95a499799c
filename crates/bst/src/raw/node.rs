use super::handle::Handle;

/// Which child slot of a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Side {
    Left = 0,
    Right = 1,
}

impl Side {
    #[inline]
    pub const fn flip(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// A tree node: a value, how many times it was inserted, the cached subtree
/// aggregates and whatever metadata the balancing strategy keeps.
#[derive(Clone, Debug)]
pub struct Node<T, M> {
    pub(crate) value: T,
    pub(crate) count: usize,
    pub(crate) nodes: usize,
    pub(crate) size: usize,
    pub(crate) parent: Option<Handle>,
    pub(crate) children: [Option<Handle>; 2],
    pub meta: M,
}

impl<T, M> Node<T, M> {
    pub(crate) fn new(value: T, meta: M) -> Self {
        Self {
            value,
            count: 1,
            nodes: 1,
            size: 1,
            parent: None,
            children: [None, None],
            meta,
        }
    }

    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Number of logical copies of `value` held by this node.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Distinct nodes in the subtree rooted here, this one included.
    #[inline]
    pub fn nodes(&self) -> usize {
        self.nodes
    }

    /// Sum of `count` over the subtree rooted here.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn parent(&self) -> Option<Handle> {
        self.parent
    }

    #[inline]
    pub fn child(&self, side: Side) -> Option<Handle> {
        self.children[side.index()]
    }

    #[inline]
    pub fn left(&self) -> Option<Handle> {
        self.children[0]
    }

    #[inline]
    pub fn right(&self) -> Option<Handle> {
        self.children[1]
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children == [None, None]
    }
}
