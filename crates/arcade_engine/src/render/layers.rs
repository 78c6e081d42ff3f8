//! Per-frame layer collection
//!
//! Rebuilt before every frame by walking the already-updated tree in
//! pre-order. Disabled subtrees are skipped; within a node, renderables are
//! visited in component registration order. Only initialized, non-hidden
//! renderables are collected.

use crate::ecs::{NodeKey, World};
use std::collections::BTreeMap;

/// A renderable component located by owner and slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderEntry {
    /// Owning node
    pub node: NodeKey,
    pub(crate) slot: usize,
}

/// Renderables grouped by layer index, lowest layer first
#[derive(Debug, Default)]
pub struct LayerMap {
    layers: BTreeMap<i32, Vec<RenderEntry>>,
}

impl LayerMap {
    /// Collect every eligible renderable under `root`
    pub fn collect(world: &World, root: NodeKey) -> Self {
        let mut map = Self::default();
        map.visit(world, root);
        map
    }

    fn visit(&mut self, world: &World, key: NodeKey) {
        let Some(node) = world.node(key) else {
            return;
        };
        if !node.enabled() {
            return;
        }
        for (slot, entry) in node.components().slots().iter().enumerate() {
            if !entry.initialized {
                continue;
            }
            let Some(renderable) = entry.component.as_deref().and_then(|c| c.as_renderable()) else {
                continue;
            };
            if renderable.hidden() {
                continue;
            }
            self.layers
                .entry(renderable.layer())
                .or_default()
                .push(RenderEntry { node: key, slot });
        }
        for &child in node.children() {
            self.visit(world, child);
        }
    }

    /// Layer indices in ascending order
    pub fn layer_indices(&self) -> Vec<i32> {
        self.layers.keys().copied().collect()
    }

    /// Entries of one layer in traversal order
    pub fn entries(&self, layer: i32) -> &[RenderEntry] {
        self.layers.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any entry of `node` was collected
    pub fn contains_node(&self, node: NodeKey) -> bool {
        self.layers.values().flatten().any(|entry| entry.node == node)
    }

    /// Number of non-empty layers
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    /// Whether nothing was collected
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
