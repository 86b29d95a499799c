//! Lazy, one-shot walks over node handles. Each walk keeps its own explicit
//! stack, so depth never touches the call stack.

use std::iter::FusedIterator;

use super::handle::Handle;
use super::node::Side;
use super::tree::RawTree;

pub struct Preorder<'a, T, M> {
    tree: &'a RawTree<T, M>,
    stack: Vec<Handle>,
}

impl<'a, T, M> Preorder<'a, T, M> {
    pub(crate) fn new(tree: &'a RawTree<T, M>, from: Option<Handle>) -> Self {
        Self {
            tree,
            stack: from.into_iter().collect(),
        }
    }
}

impl<T, M> Iterator for Preorder<'_, T, M> {
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        let h = self.stack.pop()?;
        let node = self.tree.node(h);
        self.stack.extend(node.right());
        self.stack.extend(node.left());
        Some(h)
    }
}

impl<T, M> FusedIterator for Preorder<'_, T, M> {}

/// In-order walk. Starting toward `Side::Left` yields ascending order,
/// toward `Side::Right` descending.
pub struct Inorder<'a, T, M> {
    tree: &'a RawTree<T, M>,
    stack: Vec<Handle>,
    cursor: Option<Handle>,
    toward: Side,
}

impl<'a, T, M> Inorder<'a, T, M> {
    pub(crate) fn new(tree: &'a RawTree<T, M>, from: Option<Handle>, toward: Side) -> Self {
        Self {
            tree,
            stack: Vec::new(),
            cursor: from,
            toward,
        }
    }
}

impl<T, M> Iterator for Inorder<'_, T, M> {
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        while let Some(h) = self.cursor {
            self.stack.push(h);
            self.cursor = self.tree.child(h, self.toward);
        }
        let h = self.stack.pop()?;
        self.cursor = self.tree.child(h, self.toward.flip());
        Some(h)
    }
}

impl<T, M> FusedIterator for Inorder<'_, T, M> {}

pub struct Postorder<'a, T, M> {
    tree: &'a RawTree<T, M>,
    stack: Vec<Handle>,
    cursor: Option<Handle>,
    last: Option<Handle>,
}

impl<'a, T, M> Postorder<'a, T, M> {
    pub(crate) fn new(tree: &'a RawTree<T, M>, from: Option<Handle>) -> Self {
        Self {
            tree,
            stack: Vec::new(),
            cursor: from,
            last: None,
        }
    }
}

impl<T, M> Iterator for Postorder<'_, T, M> {
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        loop {
            while let Some(h) = self.cursor {
                self.stack.push(h);
                self.cursor = self.tree.left(h);
            }
            let &top = self.stack.last()?;
            match self.tree.right(top) {
                Some(right) if self.last != Some(right) => self.cursor = Some(right),
                _ => {
                    self.stack.pop();
                    self.last = Some(top);
                    return Some(top);
                }
            }
        }
    }
}

impl<T, M> FusedIterator for Postorder<'_, T, M> {}

#[cfg(test)]
mod tests {
    use crate::compare::Natural;
    use crate::raw::RawTree;

    fn walk<I: Iterator<Item = crate::raw::Handle>>(tree: &RawTree<u8, ()>, it: I) -> Vec<u8> {
        it.map(|h| *tree.value(h)).collect()
    }

    //        4
    //      2   6
    //     1 3 5 7
    fn sample() -> RawTree<u8, ()> {
        let mut tree = RawTree::new();
        for v in [4, 2, 6, 1, 3, 5, 7] {
            tree.insert_leaf(&Natural, v, || ());
        }
        tree
    }

    #[test]
    fn three_orders() {
        let tree = sample();
        assert_eq!(walk(&tree, tree.preorder()), [4, 2, 1, 3, 6, 5, 7]);
        assert_eq!(walk(&tree, tree.inorder()), [1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(walk(&tree, tree.inorder_rev()), [7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(walk(&tree, tree.postorder()), [1, 3, 2, 5, 7, 6, 4]);
    }

    #[test]
    fn walks_are_lazy_and_restartable() {
        let tree = sample();
        let mut it = tree.inorder();
        assert_eq!(walk(&tree, it.by_ref().take(2)), [1, 2]);
        assert_eq!(walk(&tree, it), [3, 4, 5, 6, 7]);
        assert_eq!(walk(&tree, tree.inorder()).len(), 7);
    }

    #[test]
    fn empty_tree_walks_nothing() {
        let tree: RawTree<u8, ()> = RawTree::new();
        assert_eq!(tree.preorder().count(), 0);
        assert_eq!(tree.inorder().count(), 0);
        assert_eq!(tree.postorder().count(), 0);
    }
}
