use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::treap::{DEFAULT_SEED, check_heap};
use crate::balance::Balance;
use crate::compare::Compare;
use crate::error::InvariantError;
use crate::raw::{Handle, RawTree, Side};

/// Rotation-free treap: every update splits the tree around the target,
/// edits the middle piece and merges the pieces back.
#[derive(Clone, Debug)]
pub struct ImplicitTreap {
    rng: StdRng,
}

impl Default for ImplicitTreap {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl ImplicitTreap {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

/// A subtree cut into the values before the target, the target node itself
/// (if present) and the values after it. All three are detached roots.
type Parts = (Option<Handle>, Option<Handle>, Option<Handle>);

/// Joins two detached subtrees where every value of `a` precedes every value
/// of `b`. The root with the smaller priority ends up on top.
pub(crate) fn merge<T>(tree: &mut RawTree<T, u32>, a: Option<Handle>, b: Option<Handle>) -> Option<Handle> {
    let (a, b) = match (a, b) {
        (None, b) => return b,
        (a, None) => return a,
        (Some(a), Some(b)) => (a, b),
    };
    if tree.meta(a) <= tree.meta(b) {
        let right = tree.cut(a, Side::Right);
        let merged = merge(tree, right, Some(b));
        tree.link(a, Side::Right, merged);
        tree.update(a);
        Some(a)
    } else {
        let left = tree.cut(b, Side::Left);
        let merged = merge(tree, Some(a), left);
        tree.link(b, Side::Left, merged);
        tree.update(b);
        Some(b)
    }
}

/// Splits the detached subtree at `link` around `value`.
pub(crate) fn split_by_value<T, C: Compare<T>>(
    tree: &mut RawTree<T, u32>,
    cmp: &C,
    link: Option<Handle>,
    value: &T,
) -> Parts {
    let Some(node) = link else {
        return (None, None, None);
    };
    match cmp.compare(value, tree.value(node)) {
        std::cmp::Ordering::Equal => {
            let left = tree.cut(node, Side::Left);
            let right = tree.cut(node, Side::Right);
            tree.update(node);
            (left, Some(node), right)
        }
        std::cmp::Ordering::Less => {
            let left = tree.cut(node, Side::Left);
            let (lt, eq, gt) = split_by_value(tree, cmp, left, value);
            tree.link(node, Side::Left, gt);
            tree.update(node);
            (lt, eq, Some(node))
        }
        std::cmp::Ordering::Greater => {
            let right = tree.cut(node, Side::Right);
            let (lt, eq, gt) = split_by_value(tree, cmp, right, value);
            tree.link(node, Side::Right, lt);
            tree.update(node);
            (Some(node), eq, gt)
        }
    }
}

/// Splits the detached subtree at `link` around the node holding its `k`-th
/// smallest element (1-based, duplicates counted). The middle part is `None`
/// when `k` is out of range.
pub(crate) fn split_by_rank<T>(tree: &mut RawTree<T, u32>, link: Option<Handle>, k: usize) -> Parts {
    let Some(node) = link else {
        return (None, None, None);
    };
    let before = tree.size(tree.left(node));
    let count = tree.node(node).count();
    if k <= before {
        let left = tree.cut(node, Side::Left);
        let (lt, at, gt) = split_by_rank(tree, left, k);
        tree.link(node, Side::Left, gt);
        tree.update(node);
        (lt, at, Some(node))
    } else if k <= before + count {
        let left = tree.cut(node, Side::Left);
        let right = tree.cut(node, Side::Right);
        tree.update(node);
        (left, Some(node), right)
    } else {
        let right = tree.cut(node, Side::Right);
        let (lt, at, gt) = split_by_rank(tree, right, k - before - count);
        tree.link(node, Side::Right, lt);
        tree.update(node);
        (Some(node), at, gt)
    }
}

/// Drops one copy from the detached middle node, releasing it on the last one.
fn shrink<T>(tree: &mut RawTree<T, u32>, middle: Option<Handle>) -> Option<Handle> {
    let node = middle?;
    if tree.decrement(node) {
        Some(node)
    } else {
        tree.release(node);
        None
    }
}

fn reassemble<T>(tree: &mut RawTree<T, u32>, (lt, mid, gt): Parts) {
    let left = merge(tree, lt, mid);
    let root = merge(tree, left, gt);
    tree.set_root(root);
}

impl<T> Balance<T> for ImplicitTreap {
    type Meta = u32;

    const NAME: &'static str = "implicit treap";

    fn fresh(&mut self) -> u32 {
        self.rng.random()
    }

    fn insert<C: Compare<T>>(&mut self, tree: &mut RawTree<T, u32>, cmp: &C, value: T) {
        let root = tree.root();
        let (lt, eq, gt) = split_by_value(tree, cmp, root, &value);
        let middle = match eq {
            Some(node) => {
                tree.increment(node);
                node
            }
            None => {
                let priority = <Self as Balance<T>>::fresh(self);
                tree.alloc(value, priority)
            }
        };
        reassemble(tree, (lt, Some(middle), gt));
    }

    fn remove<C: Compare<T>>(&mut self, tree: &mut RawTree<T, u32>, cmp: &C, value: &T) -> bool {
        if tree.find(cmp, value).is_none() {
            return false;
        }
        let root = tree.root();
        let (lt, eq, gt) = split_by_value(tree, cmp, root, value);
        let middle = shrink(tree, eq);
        reassemble(tree, (lt, middle, gt));
        true
    }

    fn remove_nth(&mut self, tree: &mut RawTree<T, u32>, k: usize) -> bool {
        if k == 0 || k > tree.len() {
            return false;
        }
        let root = tree.root();
        let (lt, at, gt) = split_by_rank(tree, root, k);
        let middle = shrink(tree, at);
        reassemble(tree, (lt, middle, gt));
        true
    }

    fn validate(&self, tree: &RawTree<T, u32>) -> Result<(), InvariantError> {
        check_heap(tree, <Self as Balance<T>>::NAME)
    }
}
