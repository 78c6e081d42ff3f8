//! Node identifiers

use std::sync::atomic::{AtomicU64, Ordering};

slotmap::new_key_type! {
    /// Arena key of a node inside its [`World`](super::World)
    ///
    /// Keys are only meaningful for the world that produced them.
    pub struct NodeKey;
}

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique node identifier
///
/// Ids are handed out monotonically and never reused, even across worlds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(super) fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
