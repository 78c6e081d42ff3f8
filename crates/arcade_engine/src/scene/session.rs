//! Cross-scene session state
//!
//! Holds at most one value per type (score, lives, unlocked levels...). The
//! [`SceneManager`](super::SceneManager) owns the session and hands it to
//! every scene hook, so no state lives in globals.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;

/// Type-keyed state shared by successive scenes
#[derive(Default)]
pub struct Session {
    values: HashMap<TypeId, Box<dyn Any>>,
}

impl Session {
    /// Empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, returning the previous value of the same type
    pub fn insert<T: 'static>(&mut self, value: T) -> Option<T> {
        self.values
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Value of type `T`
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.values.get(&TypeId::of::<T>())?.downcast_ref::<T>()
    }

    /// Mutable value of type `T`
    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.values.get_mut(&TypeId::of::<T>())?.downcast_mut::<T>()
    }

    /// Value of type `T`, inserting `T::default()` first if absent
    pub fn get_or_default<T: Default + 'static>(&mut self) -> &mut T {
        // Slots are keyed by the TypeId of their contents
        self.values
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::default()))
            .downcast_mut::<T>()
            .unwrap_or_else(|| unreachable!("session slot for {} holds another type", type_name::<T>()))
    }

    /// Remove and return the value of type `T`
    pub fn remove<T: 'static>(&mut self) -> Option<T> {
        self.values
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }

    /// Whether a value of type `T` is stored
    pub fn contains<T: 'static>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the session is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drop every stored value
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("values", &self.values.len()).finish()
    }
}
