//! Scene tree arena
//!
//! The world owns every node in a slotmap arena and the broad-phase
//! collision index. Tree links are stored as [`NodeKey`]s, so components and
//! nodes never hold references to each other.
//!
//! Structural edits follow a deferred model:
//! - `add_child`/`remove_child` are validated immediately but committed the
//!   next time the *parent's* own update runs (adds first, then removes).
//! - `destroy` is committed by [`World::commit_destroyed`], which the scene
//!   calls once the tick's tree update has finished.

use super::component::{ComponentContext, Lookup};
use super::{Component, ComponentRegistry, Node, NodeDisabled, NodeId, NodeKey, SceneError};
use crate::events::Topic;
use crate::foundation::math::Vec2;
use crate::foundation::time::FrameTime;
use crate::render::Renderable;
use crate::spatial::{BoxHandle, CollisionIndex};
use slotmap::SlotMap;
use std::any::{type_name, TypeId};
use std::collections::HashSet;
use std::rc::Rc;

/// Default edge length of a broad-phase bucket
pub const DEFAULT_BUCKET_SIZE: f32 = 64.0;

/// Arena of scene nodes plus the services they share
pub struct World {
    nodes: SlotMap<NodeKey, Node>,
    registry: Rc<ComponentRegistry>,
    collision: CollisionIndex,
    pending_destroy: Vec<NodeKey>,
}

impl World {
    /// Create an empty world
    pub fn new(registry: Rc<ComponentRegistry>, bucket_size: Vec2) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            registry,
            collision: CollisionIndex::new(bucket_size),
            pending_destroy: Vec::new(),
        }
    }

    // ---- nodes -------------------------------------------------------------

    /// Create a detached, enabled, unnamed node
    pub fn spawn(&mut self) -> NodeKey {
        self.nodes.insert(Node::new(None))
    }

    /// Create a detached node with a name
    pub fn spawn_named(&mut self, name: impl Into<String>) -> NodeKey {
        self.nodes.insert(Node::new(Some(name.into())))
    }

    /// Whether the key refers to a live node
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Borrow a node
    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the world has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Process-wide id of a node
    pub fn id(&self, key: NodeKey) -> Option<NodeId> {
        self.nodes.get(key).map(|node| node.id)
    }

    /// Committed parent of a node
    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|node| node.parent)
    }

    /// Committed children of a node, empty for unknown keys
    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.nodes.get(key).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    /// Whether `ancestor` is strictly above `key` in the committed tree
    pub fn is_ancestor(&self, ancestor: NodeKey, key: NodeKey) -> bool {
        let mut current = self.parent(key);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// Committed subtree of `start` in pre-order, `start` first
    pub fn descendants(&self, start: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        if !self.contains(start) {
            return out;
        }
        let mut stack = vec![start];
        while let Some(key) = stack.pop() {
            out.push(key);
            // Reverse so the first child is visited first
            stack.extend(self.children(key).iter().rev().copied());
        }
        out
    }

    // ---- structure ---------------------------------------------------------

    /// Queue `child` to be attached under `parent`
    ///
    /// Committed during `parent`'s next update, which also detaches the child
    /// from any previous parent. Repeated calls before the commit, or calls
    /// for a child that is already attached here, do nothing. A name clash
    /// with a current sibling is reported now, not at commit time.
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), SceneError> {
        self.require(parent)?;
        let child_node = self.require(child)?;
        if child_node.parent == Some(parent) {
            return Ok(());
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(SceneError::HierarchyCycle { parent, child });
        }
        if let Some(name) = &child_node.name {
            if self.child_by_name(parent, name).is_some_and(|existing| existing != child) {
                return Err(SceneError::NameConflict {
                    name: name.clone(),
                    parent,
                });
            }
        }

        let pending = &mut self.nodes[parent].pending_add;
        if !pending.contains(&child) {
            pending.push(child);
        }
        Ok(())
    }

    /// Queue `child` to be detached from `parent`
    ///
    /// The child stays alive and may be attached elsewhere later.
    pub fn remove_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), SceneError> {
        self.require(child)?;
        let pending = &mut self
            .nodes
            .get_mut(parent)
            .ok_or(SceneError::NodeNotFound(parent))?
            .pending_remove;
        if !pending.contains(&child) {
            pending.push(child);
        }
        Ok(())
    }

    fn flush_pending(&mut self, parent: NodeKey) {
        let node = &mut self.nodes[parent];
        if !node.has_pending_changes() {
            return;
        }
        let adds = std::mem::take(&mut node.pending_add);
        let removes = std::mem::take(&mut node.pending_remove);

        for child in adds {
            self.commit_add(parent, child);
        }
        for child in removes {
            self.commit_remove(parent, child);
        }
    }

    fn commit_add(&mut self, parent: NodeKey, child: NodeKey) {
        let Some(child_node) = self.nodes.get(child) else {
            return;
        };
        let previous = child_node.parent;
        if previous == Some(parent) {
            return;
        }
        // The tree may have changed since the call was validated
        if self.is_ancestor(child, parent) {
            log::warn!("Dropped queued add of {child:?} under {parent:?}: it became an ancestor");
            return;
        }
        if let Some(old) = previous {
            if let Some(old_node) = self.nodes.get_mut(old) {
                old_node.children.retain(|&k| k != child);
            }
        }
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        log::debug!("Attached {child:?} under {parent:?} (previous parent {previous:?})");
    }

    fn commit_remove(&mut self, parent: NodeKey, child: NodeKey) {
        let children = &mut self.nodes[parent].children;
        let before = children.len();
        children.retain(|&k| k != child);
        if children.len() != before {
            if let Some(child_node) = self.nodes.get_mut(child) {
                child_node.parent = None;
            }
            log::debug!("Detached {child:?} from {parent:?}");
        }
    }

    /// Queue a node and its committed subtree for destruction
    pub fn destroy(&mut self, key: NodeKey) -> Result<(), SceneError> {
        self.require(key)?;
        if !self.pending_destroy.contains(&key) {
            self.pending_destroy.push(key);
        }
        Ok(())
    }

    /// Destroy every queued node; returns how many nodes were removed
    ///
    /// Each destroyed node is detached from its parent and every component
    /// receives [`Component::on_destroy`]. Detached nodes still waiting in a
    /// destroyed node's add queue are destroyed with it; queued adds of nodes
    /// attached elsewhere are dropped.
    pub fn commit_destroyed(&mut self) -> usize {
        let queued = std::mem::take(&mut self.pending_destroy);
        let mut removed = 0;
        for key in queued {
            if let Some(parent) = self.parent(key) {
                self.nodes[parent].children.retain(|&k| k != key);
            }
            for node_key in self.doomed_subtree(key) {
                let Some(mut node) = self.nodes.remove(node_key) else {
                    continue;
                };
                for mut slot in node.components.drain() {
                    if let Some(component) = slot.component.as_deref_mut() {
                        component.on_destroy(self, node_key);
                    }
                }
                removed += 1;
            }
        }
        if removed > 0 {
            log::debug!("Destroyed {removed} nodes");
        }
        removed
    }

    /// Committed subtree of `start` plus detached nodes queued under it
    fn doomed_subtree(&self, start: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![start];
        while let Some(key) = stack.pop() {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            if !seen.insert(key) {
                continue;
            }
            out.push(key);
            let queued = node
                .pending_add
                .iter()
                .copied()
                .filter(|&child| self.parent(child).is_none());
            stack.extend(queued.rev());
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    // ---- enabled -----------------------------------------------------------

    /// Set a node's own enabled flag
    ///
    /// A true→false edge publishes [`NodeDisabled`]; other transitions are
    /// silent. A disabled node freezes its whole subtree.
    pub fn set_enabled(&mut self, key: NodeKey, enabled: bool) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(key).ok_or(SceneError::NodeNotFound(key))?;
        let was_enabled = std::mem::replace(&mut node.enabled, enabled);
        if was_enabled && !enabled {
            let event = NodeDisabled { node: key, id: node.id };
            let topic = node.on_disabled.clone();
            topic.publish(&event);
        }
        Ok(())
    }

    /// Own enabled flag; false for unknown keys
    pub fn is_enabled(&self, key: NodeKey) -> bool {
        self.nodes.get(key).is_some_and(|node| node.enabled)
    }

    /// Whether the node and every committed ancestor are enabled
    pub fn is_enabled_in_hierarchy(&self, key: NodeKey) -> bool {
        let mut current = Some(key);
        while let Some(k) = current {
            match self.nodes.get(k) {
                Some(node) if node.enabled => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Handle to a node's disabled topic
    pub fn on_disabled(&self, key: NodeKey) -> Option<Topic<NodeDisabled>> {
        self.nodes.get(key).map(|node| node.on_disabled.clone())
    }

    // ---- names, paths, tags -------------------------------------------------

    /// Name a node; fails if a current sibling already uses the name
    pub fn set_name(&mut self, key: NodeKey, name: impl Into<String>) -> Result<(), SceneError> {
        let name = name.into();
        let node = self.require(key)?;
        if let Some(parent) = node.parent {
            if self.child_by_name(parent, &name).is_some_and(|existing| existing != key) {
                return Err(SceneError::NameConflict { name, parent });
            }
        }
        self.nodes[key].name = Some(name);
        Ok(())
    }

    /// Remove a node's name
    pub fn clear_name(&mut self, key: NodeKey) -> Result<(), SceneError> {
        self.nodes.get_mut(key).ok_or(SceneError::NodeNotFound(key))?.name = None;
        Ok(())
    }

    /// Name of a node
    pub fn name(&self, key: NodeKey) -> Option<&str> {
        self.nodes.get(key).and_then(Node::name)
    }

    /// Committed child of `parent` with the given name
    pub fn child_by_name(&self, parent: NodeKey, name: &str) -> Option<NodeKey> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&child| self.name(child) == Some(name))
    }

    /// Slash-separated names from the root down to `key`
    ///
    /// `None` if the node or any ancestor is unnamed.
    pub fn path(&self, key: NodeKey) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = Some(key);
        while let Some(k) = current {
            let node = self.nodes.get(k)?;
            segments.push(node.name.as_deref()?);
            current = node.parent;
        }
        segments.reverse();
        Some(segments.join("/"))
    }

    /// Follow named children from `start` one `/`-separated segment at a time
    ///
    /// An empty path resolves to `start`; any missing segment yields `None`.
    pub fn resolve_path(&self, start: NodeKey, path: &str) -> Option<NodeKey> {
        if !self.contains(start) {
            return None;
        }
        if path.is_empty() {
            return Some(start);
        }
        path.split('/')
            .try_fold(start, |current, segment| self.child_by_name(current, segment))
    }

    /// Attach a tag; returns false if it was already present
    pub fn add_tag(&mut self, key: NodeKey, tag: impl Into<String>) -> Result<bool, SceneError> {
        let node = self.nodes.get_mut(key).ok_or(SceneError::NodeNotFound(key))?;
        Ok(node.tags.insert(tag.into()))
    }

    /// Remove a tag; returns false if it was absent
    pub fn remove_tag(&mut self, key: NodeKey, tag: &str) -> Result<bool, SceneError> {
        let node = self.nodes.get_mut(key).ok_or(SceneError::NodeNotFound(key))?;
        Ok(node.tags.remove(tag))
    }

    /// Whether the node carries `tag`
    pub fn has_tag(&self, key: NodeKey, tag: &str) -> bool {
        self.nodes.get(key).is_some_and(|node| node.has_tag(tag))
    }

    /// Nodes in the committed subtree of `start` carrying `tag`, in pre-order
    pub fn find_tagged(&self, start: NodeKey, tag: &str) -> Vec<NodeKey> {
        self.descendants(start)
            .into_iter()
            .filter(|&key| self.has_tag(key, tag))
            .collect()
    }

    // ---- components ----------------------------------------------------------

    /// Attach a `T` built by its registered factory, or return the existing one
    pub fn add<T: Component>(&mut self, key: NodeKey) -> Result<&mut T, SceneError> {
        if !self.require(key)?.components.contains::<T>() {
            let component = self
                .registry
                .build::<T>(key)
                .ok_or(SceneError::FactoryNotRegistered(type_name::<T>()))?;
            self.nodes[key]
                .components
                .push(TypeId::of::<T>(), type_name::<T>(), component);
            log::trace!("Added {} to {key:?}", type_name::<T>());
        }
        self.get_mut::<T>(key)
    }

    /// Attach a caller-built `T`, or return the existing one unchanged
    pub fn insert<T: Component>(&mut self, key: NodeKey, component: T) -> Result<&mut T, SceneError> {
        if !self.require(key)?.components.contains::<T>() {
            self.nodes[key]
                .components
                .push(TypeId::of::<T>(), type_name::<T>(), Box::new(component));
            log::trace!("Inserted {} on {key:?}", type_name::<T>());
        }
        self.get_mut::<T>(key)
    }

    /// Component of type `T`; a missing component is an error
    pub fn get<T: Component>(&self, key: NodeKey) -> Result<&T, SceneError> {
        match self.require(key)?.components.get::<T>() {
            Lookup::Found(component) => Ok(component),
            Lookup::Missing => Err(SceneError::ComponentNotFound {
                component: type_name::<T>(),
                node: key,
            }),
            Lookup::InUse => Err(SceneError::ComponentInUse {
                component: type_name::<T>(),
                node: key,
            }),
        }
    }

    /// Mutable component of type `T`; a missing component is an error
    pub fn get_mut<T: Component>(&mut self, key: NodeKey) -> Result<&mut T, SceneError> {
        let node = self.nodes.get_mut(key).ok_or(SceneError::NodeNotFound(key))?;
        match node.components.get_mut::<T>() {
            Lookup::Found(component) => Ok(component),
            Lookup::Missing => Err(SceneError::ComponentNotFound {
                component: type_name::<T>(),
                node: key,
            }),
            Lookup::InUse => Err(SceneError::ComponentInUse {
                component: type_name::<T>(),
                node: key,
            }),
        }
    }

    /// Component of type `T`, if present and not being updated
    pub fn try_get<T: Component>(&self, key: NodeKey) -> Option<&T> {
        self.get::<T>(key).ok()
    }

    /// Mutable component of type `T`, if present and not being updated
    pub fn try_get_mut<T: Component>(&mut self, key: NodeKey) -> Option<&mut T> {
        self.get_mut::<T>(key).ok()
    }

    /// Whether the node has a `T`
    pub fn has<T: Component>(&self, key: NodeKey) -> bool {
        self.nodes
            .get(key)
            .is_some_and(|node| node.components.contains::<T>())
    }

    pub(crate) fn renderable(&self, key: NodeKey, slot: usize) -> Option<&dyn Renderable> {
        self.nodes
            .get(key)?
            .components
            .slot(slot)?
            .component
            .as_deref()?
            .as_renderable()
    }

    // ---- update ----------------------------------------------------------------

    /// Run one tick for `key` and its subtree
    ///
    /// A disabled node returns immediately: no queue flush, no component
    /// updates and no descent. Otherwise the node (1) commits its pending
    /// structural edits, (2) updates its components in registration order and
    /// (3) updates each committed child in order. Because of (2) before (3) a
    /// parent's transform is always refreshed before its children read it.
    pub fn update(&mut self, key: NodeKey, time: FrameTime) -> Result<(), SceneError> {
        if !self.is_enabled(key) {
            return Ok(());
        }
        self.flush_pending(key);

        let mut index = 0;
        // Components added during the loop are picked up this tick
        while index < self.nodes.get(key).map_or(0, |node| node.components.len()) {
            self.update_component(key, index, time)?;
            index += 1;
        }

        let children = self.children(key).to_vec();
        for child in children {
            self.update(child, time)?;
        }
        Ok(())
    }

    fn update_component(&mut self, key: NodeKey, index: usize, time: FrameTime) -> Result<(), SceneError> {
        let Some(node) = self.nodes.get_mut(key) else {
            return Ok(());
        };
        // A sibling may have disabled the owner earlier in this tick
        if !node.enabled {
            return Ok(());
        }
        let Some(slot) = node.components.slot_mut(index) else {
            return Ok(());
        };
        let Some(mut component) = slot.component.take() else {
            return Ok(());
        };
        let needs_init = !slot.initialized;
        slot.initialized = true;
        let type_name = slot.type_name;

        let mut ctx = ComponentContext::new(self, key, time);
        let mut result = Ok(());
        if needs_init {
            log::trace!("Initializing {type_name} on {key:?}");
            result = component.init(&mut ctx);
        }
        if result.is_ok() {
            result = component.update(&mut ctx);
        }

        if let Some(slot) = self.nodes.get_mut(key).and_then(|n| n.components.slot_mut(index)) {
            slot.component = Some(component);
        }
        result
    }

    // ---- collision ---------------------------------------------------------------

    /// Broad-phase collision index shared by every bounding box in this world
    pub fn collision(&self) -> &CollisionIndex {
        &self.collision
    }

    /// Mutable access to the collision index
    pub fn collision_mut(&mut self) -> &mut CollisionIndex {
        &mut self.collision
    }

    /// Move a registered box and dispatch any overlaps it now has
    ///
    /// Boxes whose owner is disabled are ignored as candidates. Returns the
    /// number of collisions dispatched.
    pub fn move_box(&mut self, handle: BoxHandle, center: Vec2) -> usize {
        let nodes = &self.nodes;
        self.collision
            .move_to(handle, center, |owner| nodes.get(owner).is_some_and(|node| node.enabled))
    }

    fn require(&self, key: NodeKey) -> Result<&Node, SceneError> {
        self.nodes.get(key).ok_or(SceneError::NodeNotFound(key))
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(
            Rc::new(ComponentRegistry::new()),
            Vec2::new(DEFAULT_BUCKET_SIZE, DEFAULT_BUCKET_SIZE),
        )
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("nodes", &self.nodes.len())
            .field("boxes", &self.collision.len())
            .field("pending_destroy", &self.pending_destroy)
            .finish_non_exhaustive()
    }
}
