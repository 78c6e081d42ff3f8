//! # Arcade Engine
//!
//! The shared core of a family of small 2D arcade games.
//!
//! ## Features
//!
//! - **Scene tree**: nodes with deferred add/remove, enable cascading, names and paths
//! - **Components**: one instance per type per node, initialized on first update
//! - **Broad-phase collision**: grid-bucketed bounding boxes with overlap notifications
//! - **Layered rendering**: multi-stage pipeline with offscreen targets and effects
//! - **Scene lifecycle**: enter/exit/step with session state threaded between scenes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arcade_engine::prelude::*;
//! use std::rc::Rc;
//!
//! struct Level;
//!
//! impl SceneHooks for Level {
//!     fn on_enter(&mut self, world: &mut World, root: NodeKey, _session: &mut Session) -> Result<(), SceneError> {
//!         let ship = world.spawn_named("ship");
//!         world.insert(ship, TransformComponent::from_position(Vec2::new(160.0, 120.0)))?;
//!         world.insert(ship, BoundingBox::new(Vec2::new(8.0, 8.0)))?;
//!         world.add_child(root, ship)
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     arcade_engine::foundation::logging::init_with_filter(&config.log_filter);
//!
//!     let registry = Rc::new(ComponentRegistry::new());
//!     let pipeline = RenderPipeline::new().with_stage(LayersStage::new("world").with_clear(config.clear_color));
//!     let mut scenes = SceneManager::new(pipeline);
//!     scenes.change_scene(Scene::new("level", registry, &config).with_hooks(Level));
//!
//!     let mut backend = RecordingBackend::new(320, 240);
//!     scenes.step(1.0 / 60.0)?;
//!     scenes.render(&mut backend)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod events;
pub mod foundation;
pub mod render;
pub mod scene;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, EngineConfig},
        ecs::{
            components::{BoundingBox, Pose, Rotation, SpriteRenderer, TransformComponent},
            Component, ComponentContext, ComponentRegistry, NodeDisabled, NodeId, NodeKey, SceneError, World,
        },
        events::{SubscriptionId, Topic},
        foundation::{
            math::{Color, Mat3, Rect, Vec2},
            time::FrameTime,
        },
        render::{
            DrawContext, EffectStage, LayerConfig, LayersStage, PipelineStage, RecordingBackend, RenderBackend,
            RenderContext, RenderError, RenderPipeline, RenderTarget, Renderable, SamplerMode, ShaderParams,
            TextureId,
        },
        scene::{Scene, SceneHooks, SceneManager, Session},
        spatial::{BoxHandle, Collision, CollisionIndex},
    };
}
