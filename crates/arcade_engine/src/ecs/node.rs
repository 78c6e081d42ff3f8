//! Scene node data

use super::{ComponentSet, NodeId, NodeKey};
use crate::events::Topic;
use std::collections::BTreeSet;

/// Published when a node's `enabled` flag goes from true to false
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDisabled {
    /// Node that was disabled
    pub node: NodeKey,
    /// Its process-wide id
    pub id: NodeId,
}

/// Element of the scene tree
///
/// A node owns its components and (through the world arena) its children.
/// Structural edits are queued on the parent and committed during the
/// parent's own update.
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) enabled: bool,
    pub(crate) name: Option<String>,
    pub(crate) tags: BTreeSet<String>,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
    pub(crate) pending_add: Vec<NodeKey>,
    pub(crate) pending_remove: Vec<NodeKey>,
    pub(crate) components: ComponentSet,
    pub(crate) on_disabled: Topic<NodeDisabled>,
}

impl Node {
    pub(crate) fn new(name: Option<String>) -> Self {
        Self {
            id: NodeId::next(),
            enabled: true,
            name,
            tags: BTreeSet::new(),
            parent: None,
            children: Vec::new(),
            pending_add: Vec::new(),
            pending_remove: Vec::new(),
            components: ComponentSet::default(),
            on_disabled: Topic::new(),
        }
    }

    /// Process-wide unique id
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Own enabled flag (ancestors are not consulted)
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Name, unique among siblings when set
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Committed parent
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Committed children in update order
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Tags attached to this node
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Whether the node carries `tag`
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Components in registration order
    pub fn components(&self) -> &ComponentSet {
        &self.components
    }

    /// Topic fired on every true→false `enabled` transition
    pub fn on_disabled(&self) -> &Topic<NodeDisabled> {
        &self.on_disabled
    }

    /// Whether structural edits are waiting for this node's next update
    pub fn has_pending_changes(&self) -> bool {
        !self.pending_add.is_empty() || !self.pending_remove.is_empty()
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("components", &self.components.type_names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
