//! Scene tree and component system
//!
//! Provides the node arena, the typed component store with lazy
//! initialization and the built-in components.

pub mod component;
pub mod components;
pub mod entity;
pub mod error;
pub mod node;
pub mod registry;
pub mod world;

#[cfg(test)]
mod tests;

pub use component::{AsAny, Component, ComponentContext, ComponentSet};
pub use entity::{NodeId, NodeKey};
pub use error::SceneError;
pub use node::{Node, NodeDisabled};
pub use registry::ComponentRegistry;
pub use world::{World, DEFAULT_BUCKET_SIZE};
