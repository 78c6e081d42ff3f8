//! Layered, multi-stage rendering
//!
//! Components opt into rendering through [`Component::as_renderable`]. Every
//! frame the [`RenderPipeline`] collects them into a [`LayerMap`] and runs
//! its stages against a [`RenderBackend`].
//!
//! [`Component::as_renderable`]: crate::ecs::Component::as_renderable

pub mod backend;
pub mod layers;
pub mod pipeline;
pub mod recording;
pub mod stages;

#[cfg(test)]
mod tests;

pub use backend::{
    BackendResult, LayerConfig, RenderBackend, RenderTarget, SamplerMode, ShaderParams, SpriteDraw,
    TextureId,
};
pub use layers::{LayerMap, RenderEntry};
pub use pipeline::{PipelineStage, RenderContext, RenderPipeline, RenderStats};
pub use recording::{DrawCommand, RecordingBackend};
pub use stages::{EffectStage, LayersStage};

use crate::ecs::{Component, NodeKey, SceneError, World};
use crate::foundation::time::FrameTime;
use thiserror::Error;

/// Errors raised while rendering a frame
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// An effect stage had neither an explicit input nor a previous output
    #[error("stage '{stage}' has no input target")]
    MissingInput {
        /// Stage name
        stage: String,
    },

    /// A target id the backend never created
    #[error("unknown render target {0}")]
    UnknownTarget(u32),

    /// Backend-specific failure
    #[error("render backend error: {0}")]
    Backend(String),

    /// Scene lookup failed while drawing
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Something that draws itself on one layer
pub trait Renderable {
    /// Layer index; lower layers are drawn first
    fn layer(&self) -> i32;

    /// Hidden renderables are left out of the layer map
    fn hidden(&self) -> bool {
        false
    }

    /// Submit draw calls through the context
    fn draw(&self, ctx: &mut DrawContext<'_>) -> Result<(), RenderError>;
}

/// Access handed to [`Renderable::draw`]
pub struct DrawContext<'a> {
    pub(crate) backend: &'a mut dyn RenderBackend,
    pub(crate) world: &'a World,
    pub(crate) owner: NodeKey,
    pub(crate) layer: i32,
    pub(crate) time: FrameTime,
}

impl DrawContext<'_> {
    /// Backend to submit draws to
    pub fn backend(&mut self) -> &mut dyn RenderBackend {
        &mut *self.backend
    }

    /// World being rendered
    pub fn world(&self) -> &World {
        self.world
    }

    /// Node owning the renderable
    pub fn owner(&self) -> NodeKey {
        self.owner
    }

    /// Layer currently being drawn
    pub fn layer(&self) -> i32 {
        self.layer
    }

    /// Frame timing
    pub fn time(&self) -> FrameTime {
        self.time
    }

    /// Sibling component on the owner, if present
    pub fn sibling<T: Component>(&self) -> Option<&T> {
        self.world.try_get::<T>(self.owner)
    }
}
