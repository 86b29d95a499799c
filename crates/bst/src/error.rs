use thiserror::Error;

/// Failures a caller can trigger through the public API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    #[error("tree is empty")]
    Empty,
    #[error("rank {rank} is outside 1..={len}")]
    RankOutOfRange { rank: usize, len: usize },
    #[error("scapegoat balance factor must lie in (0.5, 1.0), got {0}")]
    InvalidAlpha(f64),
}

/// The first broken invariant found by [`Tree::check_invariants`](crate::Tree::check_invariants).
///
/// `position` is the in-order index of the offending node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    #[error("value at in-order position {position} is not greater than its predecessor")]
    Order { position: usize },
    #[error("parent link disagrees with the owning node at in-order position {position}")]
    ParentLink { position: usize },
    #[error("cached subtree aggregates are stale at in-order position {position}")]
    Aggregate { position: usize },
    #[error("{reachable} nodes reachable from the root, {allocated} allocated")]
    Unreachable { reachable: usize, allocated: usize },
    #[error("{strategy} invariant violated: {detail}")]
    Balance {
        strategy: &'static str,
        detail: String,
    },
}

impl InvariantError {
    pub(crate) fn balance(strategy: &'static str, detail: impl Into<String>) -> Self {
        Self::Balance {
            strategy,
            detail: detail.into(),
        }
    }
}
