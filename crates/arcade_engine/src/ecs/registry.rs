//! Type-indexed component factories
//!
//! Games register one constructor per concrete component type at startup.
//! [`World::add`](super::World::add) looks the factory up by type, so
//! construction never needs reflection. Factories may capture whatever
//! services the component needs.

use super::{Component, NodeKey};
use std::any::{type_name, TypeId};
use std::collections::HashMap;

type Factory = Box<dyn Fn(NodeKey) -> Box<dyn Component>>;

/// Map from component type to its constructor
#[derive(Default)]
pub struct ComponentRegistry {
    factories: HashMap<TypeId, Factory>,
}

impl ComponentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the constructor for `T`, replacing any previous one
    pub fn register<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Component,
        F: Fn(NodeKey) -> T + 'static,
    {
        log::debug!("Registered component factory for {}", type_name::<T>());
        self.factories
            .insert(TypeId::of::<T>(), Box::new(move |owner| Box::new(factory(owner))));
        self
    }

    /// Register `T::default` as the constructor for `T`
    pub fn register_default<T: Component + Default>(&mut self) -> &mut Self {
        self.register::<T, _>(|_| T::default())
    }

    /// Whether a factory exists for `T`
    pub fn contains<T: Component>(&self) -> bool {
        self.factories.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered factories
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether no factories are registered
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub(crate) fn build<T: Component>(&self, owner: NodeKey) -> Option<Box<dyn Component>> {
        self.factories.get(&TypeId::of::<T>()).map(|factory| factory(owner))
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("factories", &self.factories.len())
            .finish()
    }
}
