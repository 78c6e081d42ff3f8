//! Errors raised by the scene tree and component store

use super::NodeKey;
use thiserror::Error;

/// Scene tree and component errors
///
/// These signal wiring bugs in game code and are surfaced to the caller;
/// the engine never retries or corrects them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// `get` asked for a component the node does not have
    #[error("component not found: {component} on node {node:?}")]
    ComponentNotFound {
        /// Type name of the requested component
        component: &'static str,
        /// Node that was searched
        node: NodeKey,
    },

    /// The component is currently checked out for its own update
    #[error("component {component} on node {node:?} is being updated")]
    ComponentInUse {
        /// Type name of the requested component
        component: &'static str,
        /// Node that owns it
        node: NodeKey,
    },

    /// `add` was called for a type with no registered factory
    #[error("no factory registered for component {0}")]
    FactoryNotRegistered(&'static str),

    /// The key does not belong to a live node
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeKey),

    /// Another child of the same parent already carries this name
    #[error("a sibling named '{name}' already exists under {parent:?}")]
    NameConflict {
        /// Conflicting name
        name: String,
        /// Parent whose children collide
        parent: NodeKey,
    },

    /// The child is the parent itself or one of its ancestors
    #[error("adding {child:?} under {parent:?} would create a cycle")]
    HierarchyCycle {
        /// Intended parent
        parent: NodeKey,
        /// Intended child
        child: NodeKey,
    },

    /// Error raised by game code inside a component hook
    #[error("component {component} failed: {message}")]
    Component {
        /// Type name of the failing component
        component: &'static str,
        /// Description from the component
        message: String,
    },
}
