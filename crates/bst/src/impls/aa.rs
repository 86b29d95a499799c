use crate::balance::Balance;
use crate::error::InvariantError;
use crate::raw::{Handle, RawTree};

/// Andersson tree: a red-black tree where only right links may be
/// horizontal, kept in shape by `skew` and `split`.
///
/// Node metadata is the level; leaves sit at level 1.
#[derive(Clone, Copy, Debug, Default)]
pub struct Aa;

fn level<T>(tree: &RawTree<T, u32>, link: Option<Handle>) -> u32 {
    link.map_or(0, |h| *tree.meta(h))
}

/// Removes a horizontal left link. Returns the node now at `node`'s position.
fn skew<T>(tree: &mut RawTree<T, u32>, node: Handle) -> Handle {
    match tree.left(node) {
        Some(left) if tree.meta(left) == tree.meta(node) => tree.rotate_right(node),
        _ => node,
    }
}

/// Breaks a run of two horizontal right links by promoting the middle node.
fn split<T>(tree: &mut RawTree<T, u32>, node: Handle) -> Handle {
    let right_right = tree.right(node).and_then(|r| tree.right(r));
    match right_right {
        Some(rr) if tree.meta(rr) == tree.meta(node) => {
            let top = tree.rotate_left(node);
            *tree.meta_mut(top) += 1;
            top
        }
        _ => node,
    }
}

fn decrease_level<T>(tree: &mut RawTree<T, u32>, node: Handle) {
    let (left, right) = (tree.left(node), tree.right(node));
    let should_be = level(tree, left).min(level(tree, right)) + 1;
    if should_be < *tree.meta(node) {
        *tree.meta_mut(node) = should_be;
        if let Some(right) = right
            && *tree.meta(right) > should_be
        {
            *tree.meta_mut(right) = should_be;
        }
    }
}

fn rebalance_after_delete<T>(tree: &mut RawTree<T, u32>, node: Handle) -> Handle {
    decrease_level(tree, node);
    let node = skew(tree, node);
    if let Some(right) = tree.right(node) {
        skew(tree, right);
    }
    if let Some(right_right) = tree.right(node).and_then(|r| tree.right(r)) {
        skew(tree, right_right);
    }
    let node = split(tree, node);
    if let Some(right) = tree.right(node) {
        split(tree, right);
    }
    node
}

impl<T> Balance<T> for Aa {
    type Meta = u32;

    const NAME: &'static str = "aa";

    fn fresh(&mut self) -> u32 {
        1
    }

    fn after_insert(&mut self, tree: &mut RawTree<T, u32>, node: Handle) {
        let mut cur = tree.parent(node);
        while let Some(h) = cur {
            let h = skew(tree, h);
            let h = split(tree, h);
            cur = tree.parent(h);
        }
    }

    fn unlink(&mut self, tree: &mut RawTree<T, u32>, node: Handle) {
        let mut cur = tree.splice(node);
        while let Some(h) = cur {
            let h = rebalance_after_delete(tree, h);
            cur = tree.parent(h);
        }
    }

    fn validate(&self, tree: &RawTree<T, u32>) -> Result<(), InvariantError> {
        let fail = |detail: String| Err(InvariantError::balance(<Self as Balance<T>>::NAME, detail));
        for h in tree.preorder() {
            let lvl = *tree.meta(h);
            let (left, right) = (tree.left(h), tree.right(h));
            if left.is_none() && right.is_none() && lvl != 1 {
                return fail(format!("leaf at level {lvl}"));
            }
            if lvl > 1 && (left.is_none() || right.is_none()) {
                return fail(format!("level {lvl} node is missing a child"));
            }
            if left.is_some() && level(tree, left) + 1 != lvl {
                return fail(format!("left child at level {} under level {lvl}", level(tree, left)));
            }
            if right.is_some() && !(lvl - 1..=lvl).contains(&level(tree, right)) {
                return fail(format!("right child at level {} under level {lvl}", level(tree, right)));
            }
            let right_right = right.and_then(|r| tree.right(r));
            if right_right.is_some() && level(tree, right_right) >= lvl {
                return fail(format!("two horizontal right links at level {lvl}"));
            }
        }
        Ok(())
    }
}
