use std::collections::HashMap;

use tracing::trace;

use crate::balance::Balance;
use crate::error::InvariantError;
use crate::raw::{Handle, RawTree, Side};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Color {
    Red,
    Black,
}

/// Classic red-black tree with parent-link driven insert and delete fix-ups.
#[derive(Clone, Copy, Debug, Default)]
pub struct RedBlack;

fn is_red<T>(tree: &RawTree<T, Color>, link: Option<Handle>) -> bool {
    link.is_some_and(|h| *tree.meta(h) == Color::Red)
}

fn paint<T>(tree: &mut RawTree<T, Color>, node: Handle, color: Color) {
    *tree.meta_mut(node) = color;
}

fn fix_insert<T>(tree: &mut RawTree<T, Color>, mut node: Handle) {
    while let Some(mut parent) = tree.parent(node) {
        if !is_red(tree, Some(parent)) {
            break;
        }
        let Some(grand) = tree.parent(parent) else {
            paint(tree, parent, Color::Black);
            break;
        };
        let uncle = tree.sibling(parent);
        if let Some(uncle) = uncle.filter(|&u| is_red(tree, Some(u))) {
            paint(tree, parent, Color::Black);
            paint(tree, uncle, Color::Black);
            paint(tree, grand, Color::Red);
            node = grand;
            continue;
        }

        let parent_side = tree.side_of(parent).expect("parent has a grandparent");
        if tree.side_of(node) != Some(parent_side) {
            // Zig-zag: straighten first so node and parent lean the same way.
            tree.rotate(parent, parent_side);
            std::mem::swap(&mut node, &mut parent);
        }
        tree.rotate(grand, parent_side.flip());
        paint(tree, parent, Color::Black);
        paint(tree, grand, Color::Red);
        break;
    }
    if let Some(root) = tree.root() {
        paint(tree, root, Color::Black);
    }
}

/// Resolves an extra black on `node` (possibly an empty link) whose parent is
/// `parent`; `side` says which slot of `parent` it occupies.
fn fix_double_black<T>(
    tree: &mut RawTree<T, Color>,
    mut node: Option<Handle>,
    mut parent: Option<Handle>,
    mut side: Side,
) {
    trace!("red-black delete fix-up");
    while let Some(p) = parent {
        if is_red(tree, node) {
            break;
        }
        let mut sibling = tree
            .child(p, side.flip())
            .expect("a doubly black node always has a sibling");

        if is_red(tree, Some(sibling)) {
            paint(tree, sibling, Color::Black);
            paint(tree, p, Color::Red);
            tree.rotate(p, side);
            sibling = tree.child(p, side.flip()).expect("rotation left a sibling");
        }

        let near = tree.child(sibling, side);
        let far = tree.child(sibling, side.flip());
        if !is_red(tree, near) && !is_red(tree, far) {
            paint(tree, sibling, Color::Red);
            node = Some(p);
            parent = tree.parent(p);
            if let Some(side_of_p) = tree.side_of(p) {
                side = side_of_p;
            }
            continue;
        }

        if !is_red(tree, far) {
            let near = near.expect("near nephew is red");
            paint(tree, near, Color::Black);
            paint(tree, sibling, Color::Red);
            tree.rotate(sibling, side.flip());
            sibling = tree.child(p, side.flip()).expect("rotation left a sibling");
        }

        let far = tree.child(sibling, side.flip()).expect("far nephew is red");
        let parent_color = *tree.meta(p);
        paint(tree, sibling, parent_color);
        paint(tree, p, Color::Black);
        paint(tree, far, Color::Black);
        tree.rotate(p, side);
        node = tree.root();
        break;
    }
    if let Some(node) = node {
        paint(tree, node, Color::Black);
    }
}

impl<T> Balance<T> for RedBlack {
    type Meta = Color;

    const NAME: &'static str = "red-black";

    fn fresh(&mut self) -> Color {
        Color::Red
    }

    fn after_insert(&mut self, tree: &mut RawTree<T, Color>, node: Handle) {
        fix_insert(tree, node);
    }

    fn unlink(&mut self, tree: &mut RawTree<T, Color>, node: Handle) {
        let target = tree.splice_target(node);
        let removed_color = *tree.meta(target);
        let parent = tree.parent(target);
        let side = tree.side_of(target).unwrap_or(Side::Left);
        let orphan = tree.left(target).or(tree.right(target));

        let removed = tree.unlink_single(target);
        if target != node {
            tree.adopt(node, removed);
        }
        tree.update_upward(parent);

        if removed_color == Color::Black {
            fix_double_black(tree, orphan, parent, side);
        }
    }

    fn validate(&self, tree: &RawTree<T, Color>) -> Result<(), InvariantError> {
        let name = <Self as Balance<T>>::NAME;
        if is_red(tree, tree.root()) {
            return Err(InvariantError::balance(name, "red root"));
        }
        let mut black_height: HashMap<Handle, usize> = HashMap::new();
        for h in tree.postorder() {
            let red = is_red(tree, Some(h));
            let [left, right] = [tree.left(h), tree.right(h)];
            if red && (is_red(tree, left) || is_red(tree, right)) {
                return Err(InvariantError::balance(name, "red node with a red child"));
            }
            let below = |link: Option<Handle>| link.map_or(0, |c| black_height[&c]);
            let (lh, rh) = (below(left), below(right));
            if lh != rh {
                return Err(InvariantError::balance(
                    name,
                    format!("black heights {lh} and {rh} below one node"),
                ));
            }
            black_height.insert(h, lh + usize::from(!red));
        }
        Ok(())
    }
}
