//! Scene lifecycle
//!
//! A [`Scene`] owns the root node of one game screen; the [`SceneManager`]
//! switches between scenes and threads the [`Session`] through them.

#[allow(clippy::module_inception)]
mod scene;
mod scene_manager;
mod session;

#[cfg(test)]
mod tests;

pub use scene::{Scene, SceneHooks};
pub use scene_manager::SceneManager;
pub use session::Session;
