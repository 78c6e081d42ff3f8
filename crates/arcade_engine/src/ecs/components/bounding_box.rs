//! Bounding box component
//!
//! A fixed half-size rectangle centered on the owner's world position. The
//! rectangle is never set directly: every update reads the sibling
//! [`TransformComponent`] and, when the position changed, moves the box in
//! the world's collision index, which dispatches overlap notifications.

use super::TransformComponent;
use crate::ecs::{Component, ComponentContext, NodeKey, SceneError, World};
use crate::events::{SubscriptionId, Topic};
use crate::foundation::math::{Rect, Vec2};
use crate::spatial::{BoxEvents, BoxHandle, BoxMoved, Collision};

/// Axis-aligned collision box following its owner's transform
///
/// Requires a [`TransformComponent`] registered earlier on the same node.
#[derive(Debug)]
pub struct BoundingBox {
    half_size: Vec2,
    handle: Option<BoxHandle>,
    center: Option<Vec2>,
    events: BoxEvents,
}

impl BoundingBox {
    /// Box with the given half-size
    pub fn new(half_size: Vec2) -> Self {
        Self {
            half_size,
            handle: None,
            center: None,
            events: BoxEvents::default(),
        }
    }

    /// Half of the box's width and height
    pub fn half_size(&self) -> Vec2 {
        self.half_size
    }

    /// Handle in the collision index, once initialized
    pub fn handle(&self) -> Option<BoxHandle> {
        self.handle
    }

    /// Rectangle at the last known position
    pub fn rect(&self) -> Option<Rect> {
        self.center
            .map(|center| Rect::from_center_half_size(center, self.half_size))
    }

    /// Topic fired for every overlap involving this box
    ///
    /// Subscriptions made before the first update are kept.
    pub fn on_collision(&self) -> &Topic<Collision> {
        &self.events.collided
    }

    /// Topic fired after every position change
    pub fn on_moved(&self) -> &Topic<BoxMoved> {
        &self.events.moved
    }

    /// Shorthand for subscribing to [`on_collision`](Self::on_collision)
    pub fn subscribe_collision(&self, handler: impl FnMut(&Collision) + 'static) -> SubscriptionId {
        self.events.collided.subscribe(handler)
    }

    fn owner_position(ctx: &ComponentContext<'_>) -> Result<Vec2, SceneError> {
        Ok(ctx.sibling::<TransformComponent>()?.world().position)
    }
}

impl Component for BoundingBox {
    fn init(&mut self, ctx: &mut ComponentContext<'_>) -> Result<(), SceneError> {
        let center = Self::owner_position(ctx)?;
        let owner = ctx.owner();
        let handle = ctx
            .world_mut()
            .collision_mut()
            .register(owner, center, self.half_size, self.events.clone());
        self.handle = Some(handle);
        Ok(())
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>) -> Result<(), SceneError> {
        let center = Self::owner_position(ctx)?;
        if self.center == Some(center) {
            return Ok(());
        }
        self.center = Some(center);
        if let Some(handle) = self.handle {
            ctx.world_mut().move_box(handle, center);
        }
        Ok(())
    }

    fn on_destroy(&mut self, world: &mut World, _owner: NodeKey) {
        if let Some(handle) = self.handle.take() {
            world.collision_mut().unregister(handle);
        }
    }
}
