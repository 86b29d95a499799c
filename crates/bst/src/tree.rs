use std::fmt;
use std::iter::FusedIterator;

use tracing::debug;

use crate::balance::Balance;
use crate::compare::{Compare, Natural};
use crate::error::{InvariantError, TreeError};
use crate::raw::{Handle, RawTree, Search};

/// Ordered multiset kept in shape by the balancing strategy `B` and sorted by
/// the comparator `C`.
///
/// Equal values share one node that counts its copies, so [`len`](Self::len)
/// and the order statistics ([`rank`](Self::rank), [`select`](Self::select))
/// count duplicates while [`node_count`](Self::node_count) does not.
#[derive(Clone)]
pub struct Tree<T, B: Balance<T>, C = Natural> {
    raw: RawTree<T, B::Meta>,
    balance: B,
    cmp: C,
}

impl<T: Ord, B: Balance<T>> Tree<T, B> {
    pub fn new() -> Self
    where
        B: Default,
    {
        Self::with_balance(B::default())
    }

    pub fn with_balance(balance: B) -> Self {
        Self::with_balance_and_comparator(balance, Natural)
    }
}

impl<T: Ord, B: Balance<T> + Default> Default for Tree<T, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, B: Balance<T>, C: Compare<T>> Tree<T, B, C> {
    pub fn with_comparator(cmp: C) -> Self
    where
        B: Default,
    {
        Self::with_balance_and_comparator(B::default(), cmp)
    }

    pub fn with_balance_and_comparator(balance: B, cmp: C) -> Self {
        Self {
            raw: RawTree::new(),
            balance,
            cmp,
        }
    }

    /// Adds one copy of `value`.
    pub fn insert(&mut self, value: T) {
        self.balance.insert(&mut self.raw, &self.cmp, value);
    }

    /// Removes one copy of `value`. Returns `false` if there was none.
    pub fn remove(&mut self, value: &T) -> bool {
        self.balance.remove(&mut self.raw, &self.cmp, value)
    }

    /// Removes one copy of the `k`-th smallest element (1-based).
    pub fn remove_nth(&mut self, k: usize) -> Result<(), TreeError> {
        if self.balance.remove_nth(&mut self.raw, k) {
            Ok(())
        } else {
            Err(self.out_of_range(k))
        }
    }

    /// Takes `&mut self` because self-adjusting strategies restructure on
    /// every lookup, hits and misses alike. So do [`rank`](Self::rank) and
    /// [`select`](Self::select).
    pub fn contains(&mut self, value: &T) -> bool {
        match self.raw.search(&self.cmp, value) {
            Search::Found(node) => {
                self.balance.touch(&mut self.raw, node);
                true
            }
            Search::Vacant { parent, .. } => {
                if let Some(parent) = parent {
                    self.balance.touch(&mut self.raw, parent);
                }
                false
            }
        }
    }

    /// Copies of `value` held; zero when absent.
    pub fn count(&self, value: &T) -> usize {
        self.raw
            .find(&self.cmp, value)
            .map_or(0, |h| self.raw.node(h).count())
    }

    /// Elements less than or equal to `value`, duplicates included. A hit
    /// counts as an access of that value.
    pub fn rank(&mut self, value: &T) -> usize {
        let (rank, hit) = self.raw.locate_rank(&self.cmp, value);
        if let Some(node) = hit {
            self.balance.touch(&mut self.raw, node);
        }
        rank
    }

    /// The `k`-th smallest element, 1-based, duplicates included. Counts as
    /// an access of the returned value.
    pub fn select(&mut self, k: usize) -> Result<&T, TreeError> {
        let Some(node) = self.raw.select(k) else {
            return Err(self.out_of_range(k));
        };
        self.balance.touch(&mut self.raw, node);
        Ok(self.raw.value(node))
    }

    pub fn min(&self) -> Result<&T, TreeError> {
        self.value_at(self.raw.first())
    }

    pub fn max(&self) -> Result<&T, TreeError> {
        self.value_at(self.raw.last())
    }

    /// Largest element not greater than `value`.
    pub fn floor(&self, value: &T) -> Option<&T> {
        self.raw.floor(&self.cmp, value).map(|h| self.raw.value(h))
    }

    /// Smallest element not less than `value`.
    pub fn ceil(&self, value: &T) -> Option<&T> {
        self.raw.ceil(&self.cmp, value).map(|h| self.raw.value(h))
    }

    /// Up to `n` smallest elements in ascending order, repeating duplicates.
    pub fn nsmallest(&self, n: usize) -> Vec<&T> {
        self.iter().take(n).collect()
    }

    /// Up to `n` largest elements in descending order, repeating duplicates.
    pub fn nlargest(&self, n: usize) -> Vec<&T> {
        self.iter().rev().take(n).collect()
    }

    /// Elements held, duplicates included.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Distinct values held.
    pub fn node_count(&self) -> usize {
        self.raw.node_count()
    }

    /// Levels in the tree: 0 when empty, 1 for a lone node.
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    pub fn clear(&mut self) {
        debug!(len = self.len(), nodes = self.node_count(), strategy = B::NAME, "clearing tree");
        self.raw.clear();
        self.balance.reset();
    }

    /// Ascending walk repeating each value as many times as it was inserted.
    pub fn iter(&self) -> Iter<'_, T, B::Meta> {
        Iter {
            raw: &self.raw,
            front: self.raw.first().map(|h| (h, 0)),
            back: self.raw.last().map(|h| (h, 0)),
            remaining: self.raw.len(),
        }
    }

    /// Distinct values with their multiplicity, parents before children.
    pub fn preorder(&self) -> impl Iterator<Item = (&T, usize)> + '_ {
        self.raw.preorder().map(|h| self.entry(h))
    }

    /// Distinct values with their multiplicity, ascending.
    pub fn inorder(&self) -> impl Iterator<Item = (&T, usize)> + '_ {
        self.raw.inorder().map(|h| self.entry(h))
    }

    /// Distinct values with their multiplicity, children before parents.
    pub fn postorder(&self) -> impl Iterator<Item = (&T, usize)> + '_ {
        self.raw.postorder().map(|h| self.entry(h))
    }

    /// Verifies ordering, parent links, cached aggregates and the strategy's
    /// own shape rules, reporting the first violation found.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.raw.check_structure(&self.cmp)?;
        self.balance.validate(&self.raw)
    }

    pub fn raw(&self) -> &RawTree<T, B::Meta> {
        &self.raw
    }

    pub fn balance(&self) -> &B {
        &self.balance
    }

    fn entry(&self, h: Handle) -> (&T, usize) {
        let node = self.raw.node(h);
        (node.value(), node.count())
    }

    fn value_at(&self, link: Option<Handle>) -> Result<&T, TreeError> {
        link.map(|h| self.raw.value(h)).ok_or(TreeError::Empty)
    }

    fn out_of_range(&self, rank: usize) -> TreeError {
        TreeError::RankOutOfRange {
            rank,
            len: self.len(),
        }
    }
}

impl<T: fmt::Debug, B: Balance<T>, C: Compare<T>> fmt::Debug for Tree<T, B, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, B: Balance<T>, C: Compare<T>> Extend<T> for Tree<T, B, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T, B, C> FromIterator<T> for Tree<T, B, C>
where
    B: Balance<T> + Default,
    C: Compare<T> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::with_balance_and_comparator(B::default(), C::default());
        tree.extend(iter);
        tree
    }
}

impl<'a, T, B: Balance<T>, C: Compare<T>> IntoIterator for &'a Tree<T, B, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, B::Meta>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`Tree::iter`].
pub struct Iter<'a, T, M> {
    raw: &'a RawTree<T, M>,
    /// Next node from the front and how many of its copies were yielded.
    front: Option<(Handle, usize)>,
    back: Option<(Handle, usize)>,
    remaining: usize,
}

impl<'a, T, M> Iter<'a, T, M> {
    fn advance(&mut self, forward: bool) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let cursor = if forward { &mut self.front } else { &mut self.back };
        let (h, used) = (*cursor)?;
        let raw = self.raw;
        *cursor = if used + 1 < raw.node(h).count() {
            Some((h, used + 1))
        } else if forward {
            raw.successor(h).map(|n| (n, 0))
        } else {
            raw.predecessor(h).map(|n| (n, 0))
        };
        self.remaining -= 1;
        Some(raw.value(h))
    }
}

impl<'a, T, M> Iterator for Iter<'a, T, M> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.advance(true)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, M> DoubleEndedIterator for Iter<'_, T, M> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.advance(false)
    }
}

impl<T, M> ExactSizeIterator for Iter<'_, T, M> {}

impl<T, M> FusedIterator for Iter<'_, T, M> {}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::error::TreeError;
    use crate::{AvlTree, PlainTree, Scapegoat, ScapegoatTree, Tree};

    #[test]
    fn iter_meets_in_the_middle_of_duplicates() {
        let tree: AvlTree<i32> = [2, 1, 2, 2, 3].into_iter().collect();
        let mut it = tree.iter();
        assert_eq!(it.len(), 5);
        assert_eq!(it.next(), Some(&1));
        assert_eq!(it.next_back(), Some(&3));
        assert_eq!(it.next(), Some(&2));
        assert_eq!(it.next_back(), Some(&2));
        assert_eq!(it.len(), 1);
        assert_eq!(it.next(), Some(&2));
        assert_eq!(it.next_back(), None);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn nsmallest_and_nlargest_repeat_duplicates() {
        let tree: PlainTree<i32> = [4, 1, 4, 7, 1, 9].into_iter().collect();
        assert_eq!(tree.nsmallest(3), [&1, &1, &4]);
        assert_eq!(tree.nlargest(2), [&9, &7]);
        assert_eq!(tree.nlargest(100).len(), 6);
        assert!(tree.nsmallest(0).is_empty());
    }

    #[test]
    fn custom_comparator_reverses_everything() {
        let mut tree: Tree<i32, crate::Avl, _> = Tree::with_comparator(|a: &i32, b: &i32| b.cmp(a));
        tree.extend([1, 5, 3]);
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [5, 3, 1]);
        assert_eq!(tree.min(), Ok(&5));
        assert_eq!(tree.rank(&3), 2);
        assert_eq!(tree.floor(&4), Some(&5));
        tree.check_invariants().unwrap();

        let by_len = |a: &&str, b: &&str| a.len().cmp(&b.len());
        let mut words: Tree<&str, crate::Splay, _> = Tree::with_comparator(by_len);
        words.extend(["ccc", "a", "bb", "dd"]);
        assert_eq!(words.count(&"xx"), 2);
        assert_eq!(words.node_count(), 3);
    }

    #[test]
    fn failed_queries_are_reported() {
        let mut tree = PlainTree::<u8>::new();
        assert_eq!(tree.min(), Err(TreeError::Empty));
        assert_eq!(tree.max(), Err(TreeError::Empty));
        assert_eq!(tree.select(1), Err(TreeError::RankOutOfRange { rank: 1, len: 0 }));
        assert_eq!(tree.floor(&3), None);
        assert_eq!(tree.remove_nth(1), Err(TreeError::RankOutOfRange { rank: 1, len: 0 }));
        assert!(!tree.remove(&3));
        tree.insert(3);
        assert_eq!(tree.select(0), Err(TreeError::RankOutOfRange { rank: 0, len: 1 }));
        assert_eq!(tree.select(2).unwrap_err().to_string(), "rank 2 is outside 1..=1");
    }

    #[test]
    fn remove_nth_counts_duplicates() {
        let mut tree: ScapegoatTree<char> = "abbc".chars().collect();
        tree.remove_nth(3).unwrap();
        assert_eq!(tree.iter().collect::<String>(), "abc");
        tree.remove_nth(1).unwrap();
        assert_eq!(tree.iter().collect::<String>(), "bc");
        tree.check_invariants().unwrap();
    }

    #[test]
    fn traversals_report_multiplicity() {
        let tree: PlainTree<i32> = [2, 1, 3, 3].into_iter().collect();
        assert_eq!(tree.preorder().collect::<Vec<_>>(), [(&2, 1), (&1, 1), (&3, 2)]);
        assert_eq!(tree.inorder().collect::<Vec<_>>(), [(&1, 1), (&2, 1), (&3, 2)]);
        assert_eq!(tree.postorder().collect::<Vec<_>>(), [(&1, 1), (&3, 2), (&2, 1)]);
    }

    #[test]
    fn clear_starts_over() {
        let mut tree = Tree::with_balance(Scapegoat::with_alpha(0.6).unwrap());
        tree.extend(0..100_u32);
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.balance().alpha(), 0.6);
        tree.extend([7, 7]);
        assert_eq!(format!("{tree:?}"), "[7, 7]");
        tree.check_invariants().unwrap();
    }

    #[test]
    fn for_loop_over_a_reference() {
        let tree: AvlTree<u32> = (1..=4).collect();
        let mut sum = 0;
        for v in &tree {
            sum += v;
        }
        assert_eq!(sum, 10);
    }
}
