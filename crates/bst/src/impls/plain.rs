use crate::balance::Balance;

/// No rebalancing at all: the base BST every other strategy refines.
#[derive(Clone, Copy, Debug, Default)]
pub struct Plain;

impl<T> Balance<T> for Plain {
    type Meta = ();

    const NAME: &'static str = "plain";

    fn fresh(&mut self) -> Self::Meta {}
}
