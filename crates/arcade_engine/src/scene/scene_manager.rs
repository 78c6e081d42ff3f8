//! Scene Manager - active scene, session and render pipeline
//!
//! The host calls [`SceneManager::step`] then [`SceneManager::render`] once
//! per frame. A scene change requested at any point (including from inside
//! a component) takes effect at the start of the next step: the old scene
//! exits before the new one enters.

use super::{Scene, Session};
use crate::ecs::SceneError;
use crate::render::{RenderBackend, RenderError, RenderPipeline, RenderStats};

/// Drives the current scene and owns the state that outlives it
#[derive(Debug, Default)]
pub struct SceneManager {
    session: Session,
    pipeline: RenderPipeline,
    current: Option<Scene>,
    pending: Option<Scene>,
}

impl SceneManager {
    /// Manager rendering through `pipeline`
    pub fn new(pipeline: RenderPipeline) -> Self {
        Self {
            pipeline,
            ..Self::default()
        }
    }

    /// Builder pattern: start from an existing session
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Queue `scene` to replace the current one at the next step
    ///
    /// A second request before that step replaces the first.
    pub fn change_scene(&mut self, scene: Scene) {
        if let Some(dropped) = self.pending.replace(scene) {
            log::debug!("Scene change to '{}' superseded", dropped.name());
        }
    }

    /// Whether a scene change is waiting for the next step
    pub fn has_pending_change(&self) -> bool {
        self.pending.is_some()
    }

    /// Scene currently being stepped
    pub fn current(&self) -> Option<&Scene> {
        self.current.as_ref()
    }

    /// Mutable access to the current scene
    pub fn current_mut(&mut self) -> Option<&mut Scene> {
        self.current.as_mut()
    }

    /// Session shared by every scene
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable session access
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Render pipeline
    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    /// Mutable pipeline access, e.g. to add stages or layer configs
    pub fn pipeline_mut(&mut self) -> &mut RenderPipeline {
        &mut self.pipeline
    }

    /// Apply any queued scene change, then step the current scene
    pub fn step(&mut self, dt: f32) -> Result<(), SceneError> {
        if let Some(next) = self.pending.take() {
            self.switch_to(next)?;
        }
        match self.current.as_mut() {
            Some(scene) => scene.step(dt),
            None => Ok(()),
        }
    }

    /// Render the current scene; `None` when there is no scene yet
    pub fn render(&mut self, backend: &mut dyn RenderBackend) -> Result<Option<RenderStats>, RenderError> {
        match self.current.as_ref() {
            Some(scene) => scene.render(&mut self.pipeline, backend).map(Some),
            None => Ok(None),
        }
    }

    /// Exit the current scene and enter `next`
    ///
    /// If the old scene fails to exit it stays current and `next` is queued
    /// again, so the following step retries the switch. If `next` fails to
    /// enter it still becomes current, unentered, because the old scene has
    /// already exited.
    fn switch_to(&mut self, mut next: Scene) -> Result<(), SceneError> {
        if let Some(previous) = self.current.as_mut() {
            if let Err(err) = previous.exit(&mut self.session) {
                log::warn!("Scene '{}' failed to exit, keeping it: {err}", previous.name());
                self.pending = Some(next);
                return Err(err);
            }
            log::debug!("Scene '{}' -> '{}'", previous.name(), next.name());
        }
        let entered = next.enter(&mut self.session);
        if let Err(err) = &entered {
            log::warn!("Scene '{}' failed to enter: {err}", next.name());
        }
        self.current = Some(next);
        entered
    }
}
