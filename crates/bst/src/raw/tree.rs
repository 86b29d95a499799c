use std::cmp::Ordering;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, Side};
use super::traverse::{Inorder, Postorder, Preorder};
use crate::compare::Compare;
use crate::error::InvariantError;

/// Where a value lives, or where it would be attached.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Search {
    Found(Handle),
    Vacant { parent: Option<Handle>, side: Side },
}

/// Outcome of [`RawTree::insert_leaf`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Placement {
    /// The value was already present; its multiplicity was bumped.
    Existing(Handle),
    /// A fresh leaf was attached.
    Created(Handle),
}

/// Arena-backed binary search tree with parent links and subtree aggregates.
///
/// This is the shared engine every balancing strategy drives. It knows how to
/// link, rotate, search and splice nodes; it has no opinion on shape. Every
/// method that changes a child slot leaves the parent link of the moved node
/// consistent, but aggregate refresh above the touched nodes is the caller's
/// job unless the method says otherwise.
#[derive(Clone, Debug)]
pub struct RawTree<T, M> {
    arena: Arena<Node<T, M>>,
    root: Option<Handle>,
}

impl<T, M> Default for RawTree<T, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, M> RawTree<T, M> {
    pub const fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    #[inline]
    pub fn root(&self) -> Option<Handle> {
        self.root
    }

    /// Installs `root` as the whole tree. The previous root, if different, must
    /// already hang somewhere below `root` or have been released.
    pub fn set_root(&mut self, root: Option<Handle>) {
        if let Some(h) = root {
            self.node_mut(h).parent = None;
        }
        self.root = root;
    }

    #[inline]
    pub fn node(&self, handle: Handle) -> &Node<T, M> {
        self.arena.get(handle)
    }

    #[inline]
    fn node_mut(&mut self, handle: Handle) -> &mut Node<T, M> {
        self.arena.get_mut(handle)
    }

    #[inline]
    pub fn value(&self, handle: Handle) -> &T {
        &self.node(handle).value
    }

    #[inline]
    pub fn meta(&self, handle: Handle) -> &M {
        &self.node(handle).meta
    }

    #[inline]
    pub fn meta_mut(&mut self, handle: Handle) -> &mut M {
        &mut self.node_mut(handle).meta
    }

    #[inline]
    pub fn parent(&self, handle: Handle) -> Option<Handle> {
        self.node(handle).parent
    }

    #[inline]
    pub fn child(&self, handle: Handle, side: Side) -> Option<Handle> {
        self.node(handle).child(side)
    }

    #[inline]
    pub fn left(&self, handle: Handle) -> Option<Handle> {
        self.node(handle).left()
    }

    #[inline]
    pub fn right(&self, handle: Handle) -> Option<Handle> {
        self.node(handle).right()
    }

    /// Distinct nodes under `link`; zero for an empty link.
    #[inline]
    pub fn nodes(&self, link: Option<Handle>) -> usize {
        link.map_or(0, |h| self.node(h).nodes)
    }

    /// Multiplicity-weighted size under `link`; zero for an empty link.
    #[inline]
    pub fn size(&self, link: Option<Handle>) -> usize {
        link.map_or(0, |h| self.node(h).size)
    }

    pub fn len(&self) -> usize {
        self.size(self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn node_count(&self) -> usize {
        self.nodes(self.root)
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    // --- navigation -------------------------------------------------------

    #[inline]
    pub fn is_root(&self, handle: Handle) -> bool {
        self.parent(handle).is_none()
    }

    /// The slot `handle` occupies in its parent, or `None` for the root.
    pub fn side_of(&self, handle: Handle) -> Option<Side> {
        let parent = self.parent(handle)?;
        if self.left(parent) == Some(handle) {
            Some(Side::Left)
        } else {
            debug_assert_eq!(self.right(parent), Some(handle), "parent link is stale");
            Some(Side::Right)
        }
    }

    pub fn is_left_child(&self, handle: Handle) -> bool {
        self.side_of(handle) == Some(Side::Left)
    }

    pub fn is_right_child(&self, handle: Handle) -> bool {
        self.side_of(handle) == Some(Side::Right)
    }

    pub fn is_leaf(&self, handle: Handle) -> bool {
        self.node(handle).is_leaf()
    }

    pub fn grandparent(&self, handle: Handle) -> Option<Handle> {
        self.parent(self.parent(handle)?)
    }

    pub fn sibling(&self, handle: Handle) -> Option<Handle> {
        let side = self.side_of(handle)?;
        self.child(self.parent(handle)?, side.flip())
    }

    pub fn uncle(&self, handle: Handle) -> Option<Handle> {
        self.sibling(self.parent(handle)?)
    }

    /// Edges between `handle` and the root.
    pub fn depth(&self, handle: Handle) -> usize {
        let mut depth = 0;
        let mut cur = handle;
        while let Some(parent) = self.parent(cur) {
            cur = parent;
            depth += 1;
        }
        depth
    }

    /// Levels in the subtree under `link`: 0 when empty, 1 for a lone node.
    pub fn subtree_height(&self, link: Option<Handle>) -> usize {
        let mut height = 0;
        let mut level: Vec<Handle> = link.into_iter().collect();
        while !level.is_empty() {
            height += 1;
            level = level
                .iter()
                .flat_map(|&h| self.node(h).children.into_iter().flatten())
                .collect();
        }
        height
    }

    pub fn height(&self) -> usize {
        self.subtree_height(self.root)
    }

    /// Furthest node reachable from `handle` by following `side` children.
    pub fn extreme(&self, handle: Handle, side: Side) -> Handle {
        let mut cur = handle;
        while let Some(next) = self.child(cur, side) {
            cur = next;
        }
        cur
    }

    /// In-order neighbour of `handle`: its successor for `Side::Right`, its
    /// predecessor for `Side::Left`.
    pub fn step(&self, handle: Handle, side: Side) -> Option<Handle> {
        if let Some(child) = self.child(handle, side) {
            return Some(self.extreme(child, side.flip()));
        }
        let mut cur = handle;
        while self.side_of(cur) == Some(side) {
            cur = self.parent(cur)?;
        }
        self.parent(cur)
    }

    pub fn successor(&self, handle: Handle) -> Option<Handle> {
        self.step(handle, Side::Right)
    }

    pub fn predecessor(&self, handle: Handle) -> Option<Handle> {
        self.step(handle, Side::Left)
    }

    pub fn first(&self) -> Option<Handle> {
        self.root.map(|r| self.extreme(r, Side::Left))
    }

    pub fn last(&self) -> Option<Handle> {
        self.root.map(|r| self.extreme(r, Side::Right))
    }

    pub fn preorder(&self) -> Preorder<'_, T, M> {
        Preorder::new(self, self.root)
    }

    pub fn inorder(&self) -> Inorder<'_, T, M> {
        Inorder::new(self, self.root, Side::Left)
    }

    /// Descending in-order walk.
    pub fn inorder_rev(&self) -> Inorder<'_, T, M> {
        Inorder::new(self, self.root, Side::Right)
    }

    pub fn postorder(&self) -> Postorder<'_, T, M> {
        Postorder::new(self, self.root)
    }

    /// Ascending walk of the subtree rooted at `handle`.
    pub fn subtree_inorder(&self, handle: Handle) -> Inorder<'_, T, M> {
        Inorder::new(self, Some(handle), Side::Left)
    }

    // --- structural edits -------------------------------------------------

    /// Allocates a detached node holding one copy of `value`.
    pub fn alloc(&mut self, value: T, meta: M) -> Handle {
        self.arena.alloc(Node::new(value, meta))
    }

    /// Frees a node that nothing links to any more.
    pub fn release(&mut self, handle: Handle) -> Node<T, M> {
        self.arena.take(handle)
    }

    /// Puts `child` into `parent`'s `side` slot and points it back at `parent`.
    pub fn link(&mut self, parent: Handle, side: Side, child: Option<Handle>) {
        self.node_mut(parent).children[side.index()] = child;
        if let Some(c) = child {
            self.node_mut(c).parent = Some(parent);
        }
    }

    /// Detaches and returns `parent`'s `side` child as a standalone subtree.
    pub fn cut(&mut self, parent: Handle, side: Side) -> Option<Handle> {
        let child = self.node_mut(parent).children[side.index()].take()?;
        self.node_mut(child).parent = None;
        Some(child)
    }

    /// Hangs `new` wherever `old` currently hangs (possibly the root slot).
    /// `old` keeps its stale parent link; the caller relinks or releases it.
    pub fn replace(&mut self, old: Handle, new: Option<Handle>) {
        let parent = self.parent(old);
        match parent {
            None => self.root = new,
            Some(p) => {
                let side = self.side_of(old).expect("non-root has a side");
                self.node_mut(p).children[side.index()] = new;
            }
        }
        if let Some(n) = new {
            self.node_mut(n).parent = parent;
        }
    }

    /// Recomputes the aggregates of `handle` from its children. Not recursive.
    #[inline]
    pub fn update(&mut self, handle: Handle) {
        let [left, right] = self.node(handle).children;
        let nodes = 1 + self.nodes(left) + self.nodes(right);
        let size = self.size(left) + self.size(right);
        let node = self.node_mut(handle);
        node.nodes = nodes;
        node.size = size + node.count;
    }

    /// Refreshes aggregates from `from` up to the root.
    pub fn update_upward(&mut self, from: Option<Handle>) {
        let mut cur = from;
        while let Some(h) = cur {
            self.update(h);
            cur = self.parent(h);
        }
    }

    /// Single rotation of `node` toward `side`: its child on the other side
    /// takes its place and `node` becomes that child's `side` child. Returns
    /// the node now occupying `node`'s former position.
    ///
    /// # Panics
    /// If `node` has no child opposite `side`.
    pub fn rotate(&mut self, node: Handle, side: Side) -> Handle {
        let pivot = self
            .child(node, side.flip())
            .expect("`RawTree::rotate()` - no child to rotate into place");
        let inner = self.child(pivot, side);
        self.replace(node, Some(pivot));
        self.link(node, side.flip(), inner);
        self.link(pivot, side, Some(node));
        self.update(node);
        self.update(pivot);
        pivot
    }

    pub fn rotate_left(&mut self, node: Handle) -> Handle {
        self.rotate(node, Side::Left)
    }

    pub fn rotate_right(&mut self, node: Handle) -> Handle {
        self.rotate(node, Side::Right)
    }

    /// Rotates `node` above its parent.
    ///
    /// # Panics
    /// If `node` is the root.
    pub fn rotate_up(&mut self, node: Handle) {
        let side = self
            .side_of(node)
            .expect("`RawTree::rotate_up()` - the root has no parent");
        let parent = self.parent(node).expect("non-root has a parent");
        self.rotate(parent, side.flip());
    }

    /// Adds one copy of the value at `handle`, refreshing aggregates upward.
    pub fn increment(&mut self, handle: Handle) {
        self.node_mut(handle).count += 1;
        self.update_upward(Some(handle));
    }

    /// Drops one copy of the value at `handle` if it holds more than one.
    /// Returns `false`, changing nothing, when the node must be unlinked.
    pub fn decrement(&mut self, handle: Handle) -> bool {
        let node = self.node_mut(handle);
        if node.count <= 1 {
            return false;
        }
        node.count -= 1;
        self.update_upward(Some(handle));
        true
    }

    /// The node that physically leaves the tree when `handle` is spliced out:
    /// `handle` itself if it has at most one child, otherwise its successor.
    pub fn splice_target(&self, handle: Handle) -> Handle {
        match self.node(handle).children {
            [Some(_), Some(right)] => self.extreme(right, Side::Left),
            _ => handle,
        }
    }

    /// Removes `target`, which has at most one child, promoting that child
    /// into its place. Aggregates are left for the caller.
    pub fn unlink_single(&mut self, target: Handle) -> Node<T, M> {
        let [left, right] = self.node(target).children;
        assert!(
            left.is_none() || right.is_none(),
            "`RawTree::unlink_single()` - target has two children"
        );
        self.replace(target, left.or(right));
        self.arena.take(target)
    }

    /// Moves the payload of a removed node into `handle`.
    pub fn adopt(&mut self, handle: Handle, removed: Node<T, M>) {
        let node = self.node_mut(handle);
        node.value = removed.value;
        node.count = removed.count;
    }

    /// Unbalanced removal of the node at `handle` regardless of its count:
    /// zero or one child promote in place, two children take the successor's
    /// payload and lose the successor node instead. Aggregates are refreshed to
    /// the root. Returns the parent of the node that physically left the tree.
    pub fn splice(&mut self, handle: Handle) -> Option<Handle> {
        let target = self.splice_target(handle);
        let parent = self.parent(target);
        let removed = self.unlink_single(target);
        if target != handle {
            self.adopt(handle, removed);
        }
        self.update_upward(parent);
        parent
    }

    // --- ordered queries --------------------------------------------------

    pub fn search<C: Compare<T>>(&self, cmp: &C, value: &T) -> Search {
        let mut parent = None;
        let mut side = Side::Left;
        let mut cur = self.root;
        while let Some(h) = cur {
            side = match cmp.compare(value, self.value(h)) {
                Ordering::Equal => return Search::Found(h),
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };
            parent = Some(h);
            cur = self.child(h, side);
        }
        Search::Vacant { parent, side }
    }

    pub fn find<C: Compare<T>>(&self, cmp: &C, value: &T) -> Option<Handle> {
        match self.search(cmp, value) {
            Search::Found(h) => Some(h),
            Search::Vacant { .. } => None,
        }
    }

    /// Plain BST insertion: bumps the multiplicity of an equal value or
    /// attaches a new leaf built with `meta`. Aggregates are refreshed to the
    /// root either way.
    pub fn insert_leaf<C, F>(&mut self, cmp: &C, value: T, meta: F) -> Placement
    where
        C: Compare<T>,
        F: FnOnce() -> M,
    {
        match self.search(cmp, &value) {
            Search::Found(h) => {
                self.increment(h);
                Placement::Existing(h)
            }
            Search::Vacant { parent, side } => {
                let h = self.alloc(value, meta());
                match parent {
                    None => self.root = Some(h),
                    Some(p) => self.link(p, side, Some(h)),
                }
                self.update_upward(parent);
                Placement::Created(h)
            }
        }
    }

    /// Elements (with multiplicity) comparing less than or equal to `value`.
    pub fn rank<C: Compare<T>>(&self, cmp: &C, value: &T) -> usize {
        self.locate_rank(cmp, value).0
    }

    /// [`rank`](Self::rank) together with the node holding `value`, if any.
    pub fn locate_rank<C: Compare<T>>(&self, cmp: &C, value: &T) -> (usize, Option<Handle>) {
        let mut rank = 0;
        let mut cur = self.root;
        while let Some(h) = cur {
            let node = self.node(h);
            match cmp.compare(value, &node.value) {
                Ordering::Less => cur = node.left(),
                Ordering::Equal => return (rank + self.size(node.left()) + node.count, Some(h)),
                Ordering::Greater => {
                    rank += self.size(node.left()) + node.count;
                    cur = node.right();
                }
            }
        }
        (rank, None)
    }

    /// Node holding the `k`-th smallest element, 1-based, counting duplicates.
    pub fn select(&self, mut k: usize) -> Option<Handle> {
        if k == 0 || k > self.len() {
            return None;
        }
        let mut cur = self.root;
        while let Some(h) = cur {
            let node = self.node(h);
            let left = self.size(node.left());
            if k <= left {
                cur = node.left();
            } else if k <= left + node.count {
                return Some(h);
            } else {
                k -= left + node.count;
                cur = node.right();
            }
        }
        None
    }

    /// Largest node `<= value` for `Side::Left`, smallest `>= value` for
    /// `Side::Right`.
    pub fn bound<C: Compare<T>>(&self, cmp: &C, value: &T, side: Side) -> Option<Handle> {
        let toward = match side {
            Side::Left => Ordering::Greater,
            Side::Right => Ordering::Less,
        };
        let mut best = None;
        let mut cur = self.root;
        while let Some(h) = cur {
            match cmp.compare(value, self.value(h)) {
                Ordering::Equal => return Some(h),
                ord if ord == toward => {
                    best = Some(h);
                    cur = self.child(h, side.flip());
                }
                _ => cur = self.child(h, side),
            }
        }
        best
    }

    pub fn floor<C: Compare<T>>(&self, cmp: &C, value: &T) -> Option<Handle> {
        self.bound(cmp, value, Side::Left)
    }

    pub fn ceil<C: Compare<T>>(&self, cmp: &C, value: &T) -> Option<Handle> {
        self.bound(cmp, value, Side::Right)
    }

    // --- validation -------------------------------------------------------

    /// Checks parent links, cached aggregates, in-order sortedness and that
    /// every allocated node is reachable.
    pub fn check_structure<C: Compare<T>>(&self, cmp: &C) -> Result<(), InvariantError> {
        if let Some(root) = self.root
            && self.parent(root).is_some()
        {
            return Err(InvariantError::ParentLink { position: 0 });
        }

        let mut reachable = 0;
        let mut prev: Option<Handle> = None;
        for (position, h) in self.inorder().enumerate() {
            reachable += 1;
            let node = self.node(h);
            for child in node.children.into_iter().flatten() {
                if self.parent(child) != Some(h) {
                    return Err(InvariantError::ParentLink { position });
                }
            }
            let nodes = 1 + self.nodes(node.left()) + self.nodes(node.right());
            let size = node.count + self.size(node.left()) + self.size(node.right());
            if node.count == 0 || node.nodes != nodes || node.size != size {
                return Err(InvariantError::Aggregate { position });
            }
            if let Some(p) = prev
                && cmp.compare(self.value(p), &node.value) != Ordering::Less
            {
                return Err(InvariantError::Order { position });
            }
            prev = Some(h);
        }

        if reachable != self.arena.len() {
            return Err(InvariantError::Unreachable {
                reachable,
                allocated: self.arena.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::Natural;
    use pretty_assertions::assert_eq;

    fn build(values: &[i32]) -> RawTree<i32, ()> {
        let mut tree = RawTree::new();
        for &v in values {
            tree.insert_leaf(&Natural, v, || ());
        }
        tree
    }

    fn values(tree: &RawTree<i32, ()>) -> Vec<i32> {
        tree.inorder().map(|h| *tree.value(h)).collect()
    }

    #[test]
    fn duplicates_share_a_node() {
        let tree = build(&[5, 3, 8, 3, 1]);
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.len(), 5);
        let three = tree.find(&Natural, &3).unwrap();
        assert_eq!(tree.node(three).count(), 2);
        tree.check_structure(&Natural).unwrap();
    }

    #[test]
    fn family_lookups() {
        //        5
        //      3   8
        //     1 4 7
        let tree = build(&[5, 3, 8, 1, 4, 7]);
        let h = |v| tree.find(&Natural, &v).unwrap();
        assert!(tree.is_root(h(5)));
        assert_eq!(tree.side_of(h(5)), None);
        assert!(tree.is_left_child(h(3)));
        assert!(tree.is_right_child(h(4)));
        assert_eq!(tree.grandparent(h(4)), Some(h(5)));
        assert_eq!(tree.sibling(h(1)), Some(h(4)));
        assert_eq!(tree.uncle(h(1)), Some(h(8)));
        assert_eq!(tree.uncle(h(7)), Some(h(3)));
        assert_eq!(tree.sibling(h(7)), None);
        assert_eq!(tree.depth(h(7)), 2);
        assert_eq!(tree.height(), 3);
        assert!(tree.is_leaf(h(4)));
    }

    #[test]
    fn successor_and_predecessor_walk_sorted_order() {
        let tree = build(&[50, 30, 70, 20, 40, 60, 80, 35, 45, 65]);
        let mut forward = vec![];
        let mut cur = tree.first();
        while let Some(h) = cur {
            forward.push(*tree.value(h));
            cur = tree.successor(h);
        }
        assert_eq!(forward, values(&tree));

        let mut backward = vec![];
        let mut cur = tree.last();
        while let Some(h) = cur {
            backward.push(*tree.value(h));
            cur = tree.predecessor(h);
        }
        backward.reverse();
        assert_eq!(backward, forward);
    }

    #[test]
    fn rotation_preserves_order_and_aggregates() {
        let mut tree = build(&[4, 2, 6, 1, 3, 5, 7, 3]);
        let root = tree.root().unwrap();
        let before = values(&tree);

        let new_root = tree.rotate_left(root);
        assert_eq!(tree.root(), Some(new_root));
        assert_eq!(*tree.value(new_root), 6);
        assert_eq!(tree.parent(root), Some(new_root));
        tree.check_structure(&Natural).unwrap();
        assert_eq!(values(&tree), before);

        tree.rotate_up(root);
        assert_eq!(tree.root(), Some(root));
        tree.check_structure(&Natural).unwrap();
        assert_eq!(tree.node(root).size(), 8);
    }

    #[test]
    #[should_panic(expected = "no child to rotate into place")]
    fn rotating_without_a_child_panics() {
        let mut tree = build(&[1]);
        let root = tree.root().unwrap();
        tree.rotate_right(root);
    }

    #[test]
    fn splice_handles_every_child_shape() {
        let mut tree = build(&[50, 30, 70, 20, 40, 60, 80, 65]);
        for v in [20, 60, 50, 30, 70] {
            let h = tree.find(&Natural, &v).unwrap();
            tree.splice(h);
            tree.check_structure(&Natural).unwrap();
            assert_eq!(tree.find(&Natural, &v), None);
        }
        assert_eq!(values(&tree), vec![40, 65, 80]);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn decrement_keeps_the_node_until_last_copy() {
        let mut tree = build(&[2, 2, 1]);
        let two = tree.find(&Natural, &2).unwrap();
        assert!(tree.decrement(two));
        assert_eq!(tree.len(), 2);
        assert!(!tree.decrement(two));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn order_statistics_count_duplicates() {
        let tree = build(&[5, 3, 8, 3, 1]);
        assert_eq!(tree.rank(&Natural, &0), 0);
        assert_eq!(tree.rank(&Natural, &3), 3);
        assert_eq!(tree.rank(&Natural, &4), 3);
        assert_eq!(tree.rank(&Natural, &9), 5);
        assert_eq!(tree.locate_rank(&Natural, &3), (3, tree.find(&Natural, &3)));
        assert_eq!(tree.locate_rank(&Natural, &4), (3, None));
        let at = |k| tree.select(k).map(|h| *tree.value(h));
        assert_eq!(at(0), None);
        assert_eq!(at(1), Some(1));
        assert_eq!(at(2), Some(3));
        assert_eq!(at(3), Some(3));
        assert_eq!(at(5), Some(8));
        assert_eq!(at(6), None);
    }

    #[test]
    fn floor_and_ceil() {
        let tree = build(&[10, 20, 30]);
        let v = |h: Option<Handle>| h.map(|h| *tree.value(h));
        assert_eq!(v(tree.floor(&Natural, &5)), None);
        assert_eq!(v(tree.floor(&Natural, &25)), Some(20));
        assert_eq!(v(tree.floor(&Natural, &30)), Some(30));
        assert_eq!(v(tree.ceil(&Natural, &25)), Some(30));
        assert_eq!(v(tree.ceil(&Natural, &10)), Some(10));
        assert_eq!(v(tree.ceil(&Natural, &31)), None);
    }

    #[test]
    fn detects_stale_aggregates() {
        let mut tree = build(&[2, 1, 3]);
        let one = tree.find(&Natural, &1).unwrap();
        tree.node_mut(one).count = 4;
        assert!(matches!(
            tree.check_structure(&Natural),
            Err(InvariantError::Aggregate { .. })
        ));
    }
}
