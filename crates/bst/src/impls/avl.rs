use crate::balance::Balance;
use crate::error::InvariantError;
use crate::raw::{Handle, RawTree, Side};

/// Height-balanced tree: sibling subtrees never differ in height by more
/// than one. Node metadata is the subtree height.
#[derive(Clone, Copy, Debug, Default)]
pub struct Avl;

fn height<T>(tree: &RawTree<T, u32>, link: Option<Handle>) -> u32 {
    link.map_or(0, |h| *tree.meta(h))
}

fn refresh<T>(tree: &mut RawTree<T, u32>, node: Handle) {
    let h = 1 + height(tree, tree.left(node)).max(height(tree, tree.right(node)));
    *tree.meta_mut(node) = h;
}

/// `height(right) - height(left)`.
fn balance_factor<T>(tree: &RawTree<T, u32>, node: Handle) -> i64 {
    i64::from(height(tree, tree.right(node))) - i64::from(height(tree, tree.left(node)))
}

fn rotate<T>(tree: &mut RawTree<T, u32>, node: Handle, side: Side) -> Handle {
    let top = tree.rotate(node, side);
    refresh(tree, node);
    refresh(tree, top);
    top
}

fn rebalance<T>(tree: &mut RawTree<T, u32>, node: Handle) -> Handle {
    refresh(tree, node);
    let bf = balance_factor(tree, node);
    if bf < -1 {
        let left = tree.left(node).expect("left-heavy node has a left child");
        if balance_factor(tree, left) > 0 {
            rotate(tree, left, Side::Left);
        }
        return rotate(tree, node, Side::Right);
    }
    if bf > 1 {
        let right = tree.right(node).expect("right-heavy node has a right child");
        if balance_factor(tree, right) < 0 {
            rotate(tree, right, Side::Right);
        }
        return rotate(tree, node, Side::Left);
    }
    node
}

fn retrace<T>(tree: &mut RawTree<T, u32>, from: Option<Handle>) {
    let mut cur = from;
    while let Some(h) = cur {
        let top = rebalance(tree, h);
        cur = tree.parent(top);
    }
}

impl<T> Balance<T> for Avl {
    type Meta = u32;

    const NAME: &'static str = "avl";

    fn fresh(&mut self) -> u32 {
        1
    }

    fn after_insert(&mut self, tree: &mut RawTree<T, u32>, node: Handle) {
        retrace(tree, tree.parent(node));
    }

    fn unlink(&mut self, tree: &mut RawTree<T, u32>, node: Handle) {
        let parent = tree.splice(node);
        retrace(tree, parent);
    }

    fn validate(&self, tree: &RawTree<T, u32>) -> Result<(), InvariantError> {
        let name = <Self as Balance<T>>::NAME;
        for h in tree.postorder() {
            let expected = 1 + height(tree, tree.left(h)).max(height(tree, tree.right(h)));
            if *tree.meta(h) != expected {
                return Err(InvariantError::balance(
                    name,
                    format!("cached height {} but subtree is {expected} tall", tree.meta(h)),
                ));
            }
            let bf = balance_factor(tree, h);
            if bf.abs() > 1 {
                return Err(InvariantError::balance(name, format!("balance factor {bf}")));
            }
        }
        Ok(())
    }
}
