use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::balance::Balance;
use crate::error::InvariantError;
use crate::raw::{Handle, RawTree};

pub(crate) const DEFAULT_SEED: u64 = 0x5EED_0ADE_2026;

/// Randomized tree kept in min-heap order on a per-node priority by
/// rotations: new leaves bubble up, doomed nodes sink to a leaf.
#[derive(Clone, Debug)]
pub struct Treap {
    rng: StdRng,
}

impl Default for Treap {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl Treap {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

/// Every child's priority is at least its parent's.
pub(crate) fn check_heap<T>(tree: &RawTree<T, u32>, strategy: &'static str) -> Result<(), InvariantError> {
    for h in tree.preorder() {
        if let Some(p) = tree.parent(h)
            && tree.meta(h) < tree.meta(p)
        {
            return Err(InvariantError::balance(
                strategy,
                format!("priority {} below parent priority {}", tree.meta(h), tree.meta(p)),
            ));
        }
    }
    Ok(())
}

impl<T> Balance<T> for Treap {
    type Meta = u32;

    const NAME: &'static str = "treap";

    fn fresh(&mut self) -> u32 {
        self.rng.random()
    }

    fn after_insert(&mut self, tree: &mut RawTree<T, u32>, node: Handle) {
        while let Some(parent) = tree.parent(node) {
            if tree.meta(node) >= tree.meta(parent) {
                break;
            }
            tree.rotate_up(node);
        }
    }

    fn unlink(&mut self, tree: &mut RawTree<T, u32>, node: Handle) {
        while let (Some(left), Some(right)) = (tree.left(node), tree.right(node)) {
            let up = if tree.meta(left) < tree.meta(right) { left } else { right };
            tree.rotate_up(up);
        }
        tree.splice(node);
    }

    fn validate(&self, tree: &RawTree<T, u32>) -> Result<(), InvariantError> {
        check_heap(tree, <Self as Balance<T>>::NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::Treap;
    use crate::Tree;

    #[test]
    fn same_seed_same_shape() {
        let shape = |seed| {
            let mut tree = Tree::with_balance(Treap::with_seed(seed));
            for v in 0..200_u32 {
                tree.insert(v);
            }
            tree.preorder().map(|(v, _)| *v).collect::<Vec<_>>()
        };
        assert_eq!(shape(7), shape(7));
        assert_ne!(shape(7), shape(8));
    }

    #[test]
    fn sorted_input_still_gets_a_shallow_tree() {
        let mut tree = Tree::with_balance(Treap::with_seed(42));
        for v in 0..4_096_u32 {
            tree.insert(v);
        }
        tree.check_invariants().unwrap();
        // Expected height is ~3 ln n ~ 25; a path would be 4096.
        assert!(tree.height() < 60, "height {}", tree.height());
    }

    #[test]
    fn deleted_nodes_sink_before_leaving() {
        let mut tree = Tree::with_balance(Treap::with_seed(3));
        for v in 0..300_u32 {
            tree.insert(v % 150);
        }
        for v in 0..150_u32 {
            assert!(tree.remove(&v));
            tree.check_invariants().unwrap();
        }
        assert_eq!(tree.len(), 150);
        assert_eq!(tree.node_count(), 150);
        for v in (0..150_u32).rev() {
            assert!(tree.remove(&v));
            tree.check_invariants().unwrap();
        }
        assert!(tree.is_empty());
    }
}
