//! A scene: one world, one root node and the frame clock that drives them

use super::Session;
use crate::config::EngineConfig;
use crate::ecs::{ComponentRegistry, NodeKey, SceneError, World};
use crate::foundation::time::FrameTime;
use crate::render::{RenderBackend, RenderError, RenderPipeline, RenderStats};
use std::rc::Rc;

/// Game-specific setup and teardown for a scene
pub trait SceneHooks {
    /// Build the initial tree under `root`
    fn on_enter(&mut self, world: &mut World, root: NodeKey, session: &mut Session) -> Result<(), SceneError>;

    /// Persist whatever should outlive the scene into the session
    fn on_exit(&mut self, _world: &mut World, _root: NodeKey, _session: &mut Session) -> Result<(), SceneError> {
        Ok(())
    }
}

/// Owns a scene tree and steps it once per frame
pub struct Scene {
    name: String,
    world: World,
    root: NodeKey,
    time: FrameTime,
    entered: bool,
    hooks: Option<Box<dyn SceneHooks>>,
}

impl Scene {
    /// Scene with an empty root node named after the scene
    pub fn new(name: impl Into<String>, registry: Rc<ComponentRegistry>, config: &EngineConfig) -> Self {
        let name = name.into();
        let mut world = World::new(registry, config.bucket_size());
        let root = world.spawn_named(name.clone());
        Self {
            name,
            world,
            root,
            time: FrameTime::default(),
            entered: false,
            hooks: None,
        }
    }

    /// Builder pattern: attach enter/exit hooks
    #[must_use]
    pub fn with_hooks(mut self, hooks: impl SceneHooks + 'static) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    /// Scene name, also the root node's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root node of the tree
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// The scene's world
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the scene's world
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Timing of the last step
    pub fn time(&self) -> FrameTime {
        self.time
    }

    /// Whether `enter` ran without a matching `exit`
    pub fn is_entered(&self) -> bool {
        self.entered
    }

    /// Start the scene: reset the clock and run the enter hook
    ///
    /// The scene only counts as entered once the hook succeeds.
    pub fn enter(&mut self, session: &mut Session) -> Result<(), SceneError> {
        log::debug!("Entering scene '{}'", self.name);
        self.time = FrameTime::default();
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_enter(&mut self.world, self.root, session)?;
        }
        self.entered = true;
        Ok(())
    }

    /// Run the exit hook and stop the scene
    ///
    /// A failing hook leaves the scene entered.
    pub fn exit(&mut self, session: &mut Session) -> Result<(), SceneError> {
        log::debug!("Exiting scene '{}' after {} frames", self.name, self.time.frame);
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_exit(&mut self.world, self.root, session)?;
        }
        self.entered = false;
        Ok(())
    }

    /// Advance one tick of `dt` seconds
    ///
    /// Updates the whole tree from the root, then commits nodes destroyed
    /// during the tick. Destroys are committed even when an update fails.
    pub fn step(&mut self, dt: f32) -> Result<(), SceneError> {
        if !self.entered {
            log::warn!("Stepping scene '{}' before it was entered", self.name);
        }
        self.time.advance(dt);
        let result = self.world.update(self.root, self.time);
        self.world.commit_destroyed();
        result
    }

    /// Render the tree through `pipeline`
    pub fn render(
        &self,
        pipeline: &mut RenderPipeline,
        backend: &mut dyn RenderBackend,
    ) -> Result<RenderStats, RenderError> {
        pipeline.render(&self.world, self.root, backend, self.time)
    }

    /// Resolve a `/`-separated path of names below the root
    pub fn find(&self, path: &str) -> Option<NodeKey> {
        self.world.resolve_path(self.root, path)
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("world", &self.world)
            .field("time", &self.time)
            .field("entered", &self.entered)
            .finish_non_exhaustive()
    }
}
