use tracing::{debug, trace};

use crate::balance::Balance;
use crate::error::{InvariantError, TreeError};
use crate::raw::{Handle, RawTree, Side};

const DEFAULT_ALPHA: f64 = 0.75;

/// Weight-balanced tree without per-node metadata. Whenever an update leaves
/// some subtree with a child heavier than `alpha` of it, the shallowest such
/// subtree is flattened and rebuilt perfectly balanced.
#[derive(Clone, Debug)]
pub struct Scapegoat {
    alpha: f64,
    /// Most nodes held since the last whole-tree rebuild.
    max_nodes: usize,
}

impl Default for Scapegoat {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            max_nodes: 0,
        }
    }
}

impl Scapegoat {
    /// `alpha` must lie strictly between 0.5 and 1.0; lower is stricter.
    pub fn with_alpha(alpha: f64) -> Result<Self, TreeError> {
        if !(alpha > 0.5 && alpha < 1.0) {
            return Err(TreeError::InvalidAlpha(alpha));
        }
        Ok(Self {
            alpha,
            max_nodes: 0,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    fn is_unbalanced<T>(&self, tree: &RawTree<T, ()>, node: Handle) -> bool {
        let heavy = tree.nodes(tree.left(node)).max(tree.nodes(tree.right(node)));
        heavy as f64 > self.alpha * tree.nodes(Some(node)) as f64
    }

    /// Topmost violating node on the path from `from` to the root.
    fn scapegoat<T>(&self, tree: &RawTree<T, ()>, from: Option<Handle>) -> Option<Handle> {
        let mut goat = None;
        let mut cur = from;
        while let Some(h) = cur {
            if self.is_unbalanced(tree, h) {
                goat = Some(h);
            }
            cur = tree.parent(h);
        }
        goat
    }

    fn repair<T>(&mut self, tree: &mut RawTree<T, ()>, from: Option<Handle>) {
        if let Some(goat) = self.scapegoat(tree, from) {
            trace!(nodes = tree.nodes(Some(goat)), "rebuilding scapegoat subtree");
            rebuild(tree, goat);
        }
    }
}

/// Rebuilds the subtree at `node` into a perfectly balanced shape in place.
fn rebuild<T>(tree: &mut RawTree<T, ()>, node: Handle) -> Handle {
    let parent = tree.parent(node);
    let side = tree.side_of(node);
    let order: Vec<Handle> = tree.subtree_inorder(node).collect();
    let top = build(tree, &order).expect("subtree is non-empty");
    match (parent, side) {
        (Some(p), Some(side)) => tree.link(p, side, Some(top)),
        _ => tree.set_root(Some(top)),
    }
    top
}

fn build<T>(tree: &mut RawTree<T, ()>, order: &[Handle]) -> Option<Handle> {
    if order.is_empty() {
        return None;
    }
    let mid = order.len() / 2;
    let node = order[mid];
    let left = build(tree, &order[..mid]);
    let right = build(tree, &order[mid + 1..]);
    tree.link(node, Side::Left, left);
    tree.link(node, Side::Right, right);
    tree.update(node);
    Some(node)
}

impl<T> Balance<T> for Scapegoat {
    type Meta = ();

    const NAME: &'static str = "scapegoat";

    fn fresh(&mut self) {}

    fn after_insert(&mut self, tree: &mut RawTree<T, ()>, node: Handle) {
        self.max_nodes = self.max_nodes.max(tree.node_count());
        self.repair(tree, Some(node));
    }

    fn unlink(&mut self, tree: &mut RawTree<T, ()>, node: Handle) {
        let parent = tree.splice(node);
        self.repair(tree, parent);

        let nodes = tree.node_count();
        if (nodes as f64) < self.alpha * self.max_nodes as f64 {
            if let Some(root) = tree.root() {
                debug!(nodes, high_water = self.max_nodes, "rebuilding shrunken tree");
                rebuild(tree, root);
            }
            self.max_nodes = nodes;
        }
    }

    fn reset(&mut self) {
        self.max_nodes = 0;
    }

    fn validate(&self, tree: &RawTree<T, ()>) -> Result<(), InvariantError> {
        match tree.preorder().find(|&h| self.is_unbalanced(tree, h)) {
            Some(h) => Err(InvariantError::balance(
                <Self as Balance<T>>::NAME,
                format!(
                    "subtree of {} nodes has a child of {} (alpha {})",
                    tree.nodes(Some(h)),
                    tree.nodes(tree.left(h)).max(tree.nodes(tree.right(h))),
                    self.alpha
                ),
            )),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Scapegoat;
    use crate::error::TreeError;
    use crate::{ScapegoatTree, Tree};

    #[test]
    fn alpha_is_checked() {
        assert_eq!(Scapegoat::with_alpha(0.5).unwrap_err(), TreeError::InvalidAlpha(0.5));
        assert!(Scapegoat::with_alpha(0.51).is_ok());
        assert!(Scapegoat::with_alpha(0.99).is_ok());
        assert_eq!(Scapegoat::with_alpha(1.0).unwrap_err(), TreeError::InvalidAlpha(1.0));
        assert!(Scapegoat::with_alpha(0.2).is_err());
        assert!(Scapegoat::with_alpha(f64::NAN).is_err());
        assert_eq!(Scapegoat::default().alpha(), 0.75);
    }

    #[test]
    fn sorted_input_is_rebuilt_as_it_grows() {
        let mut tree = ScapegoatTree::new();
        for v in 0..2_000 {
            tree.insert(v);
            tree.check_invariants().unwrap();
        }
        // log_{4/3}(2000) ~ 26.4
        assert!(tree.height() <= 27, "height {}", tree.height());
    }

    #[test]
    fn stricter_alpha_gives_shorter_trees() {
        let mut strict = Tree::with_balance(Scapegoat::with_alpha(0.55).unwrap());
        let mut loose = Tree::with_balance(Scapegoat::with_alpha(0.95).unwrap());
        for v in 0..1_000_u32 {
            strict.insert(v);
            loose.insert(v);
        }
        strict.check_invariants().unwrap();
        loose.check_invariants().unwrap();
        assert!(strict.height() < loose.height());
    }

    #[test]
    fn removals_rebalance_and_shrink() {
        let mut tree: ScapegoatTree<u32> = (0..512).collect();
        for v in 0..448 {
            assert!(tree.remove(&v));
            tree.check_invariants().unwrap();
        }
        assert_eq!(tree.len(), 64);
        assert!(tree.height() <= 8, "height {}", tree.height());
    }
}
