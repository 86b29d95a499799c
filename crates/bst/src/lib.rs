//! Ordered multisets on binary search trees with pluggable balancing.
//!
//! Every tree is a [`Tree`] over one shared arena engine ([`raw::RawTree`]):
//! nodes carry parent links, a multiplicity, and subtree aggregates that make
//! [`rank`](Tree::rank) and [`select`](Tree::select) logarithmic. How the
//! shape is kept is decided by a [`Balance`] strategy:
//!
//! | alias | strategy | node metadata |
//! |---|---|---|
//! | [`PlainTree`] | [`Plain`], none | - |
//! | [`AaTree`] | [`Aa`], skew/split | level |
//! | [`AvlTree`] | [`Avl`], height balance | height |
//! | [`RbTree`] | [`RedBlack`], color fix-ups | [`Color`] |
//! | [`ScapegoatTree`] | [`Scapegoat`], partial rebuilds | - |
//! | [`SplayTree`] | [`Splay`], move to root | - |
//! | [`TreapTree`] | [`Treap`], heap order by rotation | priority |
//! | [`ImplicitTreapTree`] | [`ImplicitTreap`], merge/split | priority |
//!
//! ```
//! use bst::AvlTree;
//!
//! let mut tree: AvlTree<i32> = [5, 3, 8, 3, 1].into_iter().collect();
//! assert_eq!(tree.len(), 5);
//! assert_eq!(tree.rank(&3), 3);
//! assert_eq!(tree.select(5), Ok(&8));
//! assert!(tree.remove(&3));
//! assert_eq!(tree.count(&3), 1);
//! ```

mod balance;
mod compare;
mod error;
mod impls;
pub mod raw;
mod tree;

pub use balance::Balance;
pub use compare::{Compare, Natural};
pub use error::{InvariantError, TreeError};
pub use impls::{Aa, Avl, Color, ImplicitTreap, Plain, RedBlack, Scapegoat, Splay, Treap};
pub use tree::{Iter, Tree};

pub type PlainTree<T> = Tree<T, Plain>;
pub type AaTree<T> = Tree<T, Aa>;
pub type AvlTree<T> = Tree<T, Avl>;
pub type RbTree<T> = Tree<T, RedBlack>;
pub type ScapegoatTree<T> = Tree<T, Scapegoat>;
pub type SplayTree<T> = Tree<T, Splay>;
pub type TreapTree<T> = Tree<T, Treap>;
pub type ImplicitTreapTree<T> = Tree<T, ImplicitTreap>;
