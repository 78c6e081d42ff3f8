//! Transform component for the scene tree
//!
//! Follows the engine's 2D conventions:
//! - Angle 0 points "up" (negative Y)
//! - Rotation is stored both as a signed angle and as a unit direction, and
//!   writing either one recomputes the other
//! - Only position composes down the hierarchy

use crate::ecs::{Component, ComponentContext, SceneError};
use crate::foundation::math::Vec2;

/// Rotation kept as an angle/direction pair
///
/// `direction = (sin a, -cos a)` and `angle = atan2(direction.x, -direction.y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    angle: f32,
    direction: Vec2,
}

impl Rotation {
    /// Rotation pointing up
    pub fn identity() -> Self {
        Self::from_angle(0.0)
    }

    /// Build from a signed angle in radians
    pub fn from_angle(angle: f32) -> Self {
        Self {
            angle,
            direction: Vec2::new(angle.sin(), -angle.cos()),
        }
    }

    /// Build from a direction vector; zero-length input yields the identity
    pub fn from_direction(direction: Vec2) -> Self {
        let mut rotation = Self::identity();
        rotation.set_direction(direction);
        rotation
    }

    /// Signed angle in radians
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Unit direction vector
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Set the angle and recompute the direction
    pub fn set_angle(&mut self, angle: f32) {
        *self = Self::from_angle(angle);
    }

    /// Set the direction and recompute the angle
    ///
    /// Zero-length (or non-finite) vectors have no angle and are ignored.
    pub fn set_direction(&mut self, direction: Vec2) {
        let length = direction.norm();
        if !length.is_finite() || length <= f32::EPSILON {
            return;
        }
        self.direction = direction / length;
        self.angle = self.direction.x.atan2(-self.direction.y);
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

/// Position, rotation and scale in 2D
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    /// Position in world units
    pub position: Vec2,
    /// Rotation kept in sync with its direction
    pub rotation: Rotation,
    /// Per-axis scale
    pub scale: Vec2,
}

impl Pose {
    /// Pose at a position with no rotation and unit scale
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Builder pattern: set the rotation angle
    pub fn with_angle(mut self, angle: f32) -> Self {
        self.rotation.set_angle(angle);
        self
    }

    /// Builder pattern: set the scale
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Rotation angle in radians
    pub fn angle(&self) -> f32 {
        self.rotation.angle()
    }

    /// Set the rotation angle
    pub fn set_angle(&mut self, angle: f32) {
        self.rotation.set_angle(angle);
    }

    /// Facing direction
    pub fn direction(&self) -> Vec2 {
        self.rotation.direction()
    }

    /// Set the facing direction
    pub fn set_direction(&mut self, direction: Vec2) {
        self.rotation.set_direction(direction);
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: Rotation::identity(),
            scale: Vec2::new(1.0, 1.0),
        }
    }
}

/// Local and world pose of a node
///
/// Game logic writes `local`. Each update recomputes `world` as a copy of
/// `local` offset by the parent's world position when the parent has a
/// transform. Rotation and scale are not inherited from the parent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformComponent {
    /// Authoritative pose relative to the parent
    pub local: Pose,
    world: Pose,
}

impl TransformComponent {
    /// Transform at a local position
    pub fn from_position(position: Vec2) -> Self {
        Self::from_pose(Pose::from_position(position))
    }

    /// Transform from a full local pose
    pub fn from_pose(local: Pose) -> Self {
        Self {
            world: local.clone(),
            local,
        }
    }

    /// Pose computed by the last update
    pub fn world(&self) -> &Pose {
        &self.world
    }

    /// Recompute `world` from `local` and the parent's world position
    pub fn refresh(&mut self, parent_world_position: Option<Vec2>) {
        self.world = self.local.clone();
        if let Some(offset) = parent_world_position {
            self.world.position += offset;
        }
    }
}

impl Component for TransformComponent {
    fn update(&mut self, ctx: &mut ComponentContext<'_>) -> Result<(), SceneError> {
        let parent_position = ctx
            .parent()
            .and_then(|parent| ctx.world().try_get::<Self>(parent))
            .map(|parent| parent.world().position);
        self.refresh(parent_position);
        Ok(())
    }
}
