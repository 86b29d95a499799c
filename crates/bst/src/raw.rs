//! The strategy-agnostic engine: node storage, navigation, rotation and the
//! unbalanced BST mechanics every [`Balance`](crate::Balance) builds on.

mod arena;
mod handle;
mod node;
mod traverse;
mod tree;

pub use handle::Handle;
pub use node::{Node, Side};
pub use traverse::{Inorder, Postorder, Preorder};
pub use tree::{Placement, RawTree, Search};
