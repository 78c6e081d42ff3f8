//! Component trait and per-node component storage
//!
//! Every node owns a [`ComponentSet`] holding at most one instance of each
//! concrete component type, kept in registration order. Components start
//! uninitialized; the first update that is not skipped because the owner is
//! disabled runs [`Component::init`] once, then [`Component::update`] on that
//! call and every later one.

use super::{NodeKey, SceneError, World};
use crate::foundation::time::FrameTime;
use crate::render::Renderable;
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Downcasting support for components
///
/// Implemented for every `'static` type; component authors never implement
/// it by hand.
pub trait AsAny: Any {
    /// Borrow as `Any`
    fn as_any(&self) -> &dyn Any;

    /// Mutably borrow as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behavioral unit attached to a node
///
/// Components reach their owner and its siblings through the
/// [`ComponentContext`] passed to each hook instead of holding references.
pub trait Component: AsAny {
    /// One-time setup, run on the first non-skipped update
    ///
    /// Cross-references captured here are kept for the node's lifetime;
    /// disabling and re-enabling the owner does not run `init` again.
    fn init(&mut self, _ctx: &mut ComponentContext<'_>) -> Result<(), SceneError> {
        Ok(())
    }

    /// Per-tick behavior
    fn update(&mut self, _ctx: &mut ComponentContext<'_>) -> Result<(), SceneError> {
        Ok(())
    }

    /// Called when the owning node is destroyed
    fn on_destroy(&mut self, _world: &mut World, _owner: NodeKey) {}

    /// Expose this component to the render pipeline
    fn as_renderable(&self) -> Option<&dyn Renderable> {
        None
    }
}

pub(crate) fn downcast_ref<T: Component>(component: &dyn Component) -> Option<&T> {
    component.as_any().downcast_ref::<T>()
}

pub(crate) fn downcast_mut<T: Component>(component: &mut dyn Component) -> Option<&mut T> {
    component.as_any_mut().downcast_mut::<T>()
}

/// Storage slot for one component instance
pub(crate) struct ComponentSlot {
    pub(crate) type_name: &'static str,
    pub(crate) initialized: bool,
    /// `None` while the component is checked out for its own update
    pub(crate) component: Option<Box<dyn Component>>,
}

/// Result of looking a component up by type
pub(crate) enum Lookup<T> {
    Found(T),
    Missing,
    InUse,
}

/// Ordered, single-instance-per-type component store of one node
#[derive(Default)]
pub struct ComponentSet {
    slots: Vec<ComponentSlot>,
    index: HashMap<TypeId, usize>,
}

impl ComponentSet {
    /// Number of components on the node
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the node has no components
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether a component of type `T` is attached
    pub fn contains<T: Component>(&self) -> bool {
        self.index.contains_key(&TypeId::of::<T>())
    }

    /// Type names in registration order
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().map(|slot| slot.type_name)
    }

    /// Whether the component of type `T` has run `init`
    pub fn is_initialized<T: Component>(&self) -> bool {
        self.index
            .get(&TypeId::of::<T>())
            .is_some_and(|&i| self.slots[i].initialized)
    }

    pub(crate) fn get<T: Component>(&self) -> Lookup<&T> {
        let Some(&i) = self.index.get(&TypeId::of::<T>()) else {
            return Lookup::Missing;
        };
        match self.slots[i].component.as_deref() {
            Some(component) => downcast_ref::<T>(component).map_or(Lookup::Missing, Lookup::Found),
            None => Lookup::InUse,
        }
    }

    pub(crate) fn get_mut<T: Component>(&mut self) -> Lookup<&mut T> {
        let Some(&i) = self.index.get(&TypeId::of::<T>()) else {
            return Lookup::Missing;
        };
        match self.slots[i].component.as_deref_mut() {
            Some(component) => downcast_mut::<T>(component).map_or(Lookup::Missing, Lookup::Found),
            None => Lookup::InUse,
        }
    }

    /// Append a component; the caller has checked the type is not present
    pub(crate) fn push(&mut self, type_id: TypeId, type_name: &'static str, component: Box<dyn Component>) -> usize {
        let i = self.slots.len();
        self.slots.push(ComponentSlot {
            type_name,
            initialized: false,
            component: Some(component),
        });
        self.index.insert(type_id, i);
        i
    }

    pub(crate) fn slot(&self, i: usize) -> Option<&ComponentSlot> {
        self.slots.get(i)
    }

    pub(crate) fn slot_mut(&mut self, i: usize) -> Option<&mut ComponentSlot> {
        self.slots.get_mut(i)
    }

    pub(crate) fn slots(&self) -> &[ComponentSlot] {
        &self.slots
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = ComponentSlot> + '_ {
        self.index.clear();
        self.slots.drain(..)
    }
}

/// Access handed to component hooks
///
/// Gives the component its owner key, the frame timing and the world, so it
/// can look up sibling components or other nodes by key.
pub struct ComponentContext<'w> {
    world: &'w mut World,
    owner: NodeKey,
    time: FrameTime,
}

impl<'w> ComponentContext<'w> {
    pub(crate) fn new(world: &'w mut World, owner: NodeKey, time: FrameTime) -> Self {
        Self { world, owner, time }
    }

    /// Node that owns the component being updated
    pub fn owner(&self) -> NodeKey {
        self.owner
    }

    /// Timing of the current tick
    pub fn time(&self) -> FrameTime {
        self.time
    }

    /// Seconds since the previous tick
    pub fn delta(&self) -> f32 {
        self.time.delta
    }

    /// Shared access to the world
    pub fn world(&self) -> &World {
        self.world
    }

    /// Mutable access to the world
    pub fn world_mut(&mut self) -> &mut World {
        self.world
    }

    /// Parent of the owner, if committed
    pub fn parent(&self) -> Option<NodeKey> {
        self.world.parent(self.owner)
    }

    /// Sibling component on the owner; fails if absent
    pub fn sibling<T: Component>(&self) -> Result<&T, SceneError> {
        self.world.get::<T>(self.owner)
    }

    /// Mutable sibling component on the owner; fails if absent
    pub fn sibling_mut<T: Component>(&mut self) -> Result<&mut T, SceneError> {
        self.world.get_mut::<T>(self.owner)
    }

    /// Sibling component on the owner, if present
    pub fn try_sibling<T: Component>(&self) -> Option<&T> {
        self.world.try_get::<T>(self.owner)
    }
}
