use crate::balance::Balance;
use crate::raw::{Handle, RawTree, Side};

/// Self-adjusting tree: whatever was touched last is rotated to the root.
#[derive(Clone, Copy, Debug, Default)]
pub struct Splay;

/// Rotates `node` up to the root of the tree.
fn splay<T>(tree: &mut RawTree<T, ()>, node: Handle) {
    while let Some(parent) = tree.parent(node) {
        if tree.is_root(parent) {
            tree.rotate_up(node);
        } else if tree.side_of(node) == tree.side_of(parent) {
            tree.rotate_up(parent);
            tree.rotate_up(node);
        } else {
            tree.rotate_up(node);
            tree.rotate_up(node);
        }
    }
}

impl<T> Balance<T> for Splay {
    type Meta = ();

    const NAME: &'static str = "splay";

    fn fresh(&mut self) {}

    fn after_insert(&mut self, tree: &mut RawTree<T, ()>, node: Handle) {
        splay(tree, node);
    }

    fn touch(&mut self, tree: &mut RawTree<T, ()>, node: Handle) {
        splay(tree, node);
    }

    fn unlink(&mut self, tree: &mut RawTree<T, ()>, node: Handle) {
        splay(tree, node);
        let left = tree.cut(node, Side::Left);
        let right = tree.cut(node, Side::Right);
        tree.release(node);

        match left {
            None => tree.set_root(right),
            Some(left) => {
                tree.set_root(Some(left));
                let max = tree.extreme(left, Side::Right);
                splay(tree, max);
                tree.link(max, Side::Right, right);
                tree.update(max);
            }
        }
    }
}
