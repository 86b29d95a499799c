use std::fmt;

use crate::compare::Compare;
use crate::error::InvariantError;
use crate::raw::{Handle, Placement, RawTree, Search};

/// A balancing strategy plugged into [`Tree`](crate::Tree).
///
/// The defaults implement the unbalanced BST: walk down, bump or attach,
/// splice out with the successor. Strategies that repair shape locally only
/// override the hooks (`after_insert`, `unlink`, `touch`); strategies built on
/// a different mechanism altogether override `insert`/`remove` as well.
///
/// Every hook receives the tree with aggregates already correct along the
/// touched path and must leave them correct. [`RawTree::rotate`] does so on
/// its own.
pub trait Balance<T> {
    /// Per-node bookkeeping: a level, a height, a color, a priority...
    type Meta: Clone + fmt::Debug;

    const NAME: &'static str;

    /// Metadata for a node about to be created.
    fn fresh(&mut self) -> Self::Meta;

    fn insert<C: Compare<T>>(&mut self, tree: &mut RawTree<T, Self::Meta>, cmp: &C, value: T) {
        match tree.insert_leaf(cmp, value, || self.fresh()) {
            Placement::Created(node) => self.after_insert(tree, node),
            Placement::Existing(node) => self.touch(tree, node),
        }
    }

    /// Removes one occurrence of `value`. Returns whether it was present.
    fn remove<C: Compare<T>>(&mut self, tree: &mut RawTree<T, Self::Meta>, cmp: &C, value: &T) -> bool {
        match tree.search(cmp, value) {
            Search::Found(node) => {
                self.remove_one(tree, node);
                true
            }
            Search::Vacant { parent, .. } => {
                if let Some(parent) = parent {
                    self.touch(tree, parent);
                }
                false
            }
        }
    }

    /// Removes one occurrence of the `k`-th smallest element (1-based).
    /// Returns `false` when `k` is out of range.
    fn remove_nth(&mut self, tree: &mut RawTree<T, Self::Meta>, k: usize) -> bool {
        match tree.select(k) {
            Some(node) => {
                self.remove_one(tree, node);
                true
            }
            None => false,
        }
    }

    /// Drops one copy held by `node`, unlinking it when it held the last one.
    fn remove_one(&mut self, tree: &mut RawTree<T, Self::Meta>, node: Handle) {
        if tree.decrement(node) {
            self.touch(tree, node);
        } else {
            self.unlink(tree, node);
        }
    }

    /// `node` was just attached as a leaf.
    fn after_insert(&mut self, _tree: &mut RawTree<T, Self::Meta>, _node: Handle) {}

    /// Takes `node`, whose multiplicity is one, out of the tree.
    fn unlink(&mut self, tree: &mut RawTree<T, Self::Meta>, node: Handle) {
        tree.splice(node);
    }

    /// `node` was looked up, bumped or decremented without changing shape.
    fn touch(&mut self, _tree: &mut RawTree<T, Self::Meta>, _node: Handle) {}

    /// The tree was emptied.
    fn reset(&mut self) {}

    /// Checks the strategy's shape invariant.
    fn validate(&self, _tree: &RawTree<T, Self::Meta>) -> Result<(), InvariantError> {
        Ok(())
    }
}
