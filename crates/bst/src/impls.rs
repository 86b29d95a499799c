mod aa;
mod avl;
mod implicit_treap;
mod plain;
mod rb;
mod scapegoat;
mod splay;
mod treap;

pub use aa::Aa;
pub use avl::Avl;
pub use implicit_treap::ImplicitTreap;
pub use plain::Plain;
pub use rb::{Color, RedBlack};
pub use scapegoat::Scapegoat;
pub use splay::Splay;
pub use treap::Treap;
