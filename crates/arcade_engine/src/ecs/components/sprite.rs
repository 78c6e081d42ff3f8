//! Sprite renderer component

use super::TransformComponent;
use crate::ecs::Component;
use crate::foundation::math::{Color, Vec2};
use crate::render::{DrawContext, RenderError, Renderable, SpriteDraw, TextureId};

/// Draws one textured quad at the owner's world pose
///
/// Without a sibling [`TransformComponent`] the sprite is drawn at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteRenderer {
    /// Texture to draw
    pub texture: TextureId,
    /// Size in world units before scaling
    pub size: Vec2,
    /// Color multiplier
    pub tint: Color,
    /// Layer index
    pub layer: i32,
    /// Skip this sprite when collecting layers
    pub hidden: bool,
}

impl SpriteRenderer {
    /// Visible sprite on a layer
    pub fn new(texture: TextureId, size: Vec2, layer: i32) -> Self {
        Self {
            texture,
            size,
            tint: Color::WHITE,
            layer,
            hidden: false,
        }
    }

    /// Builder pattern: set the tint
    #[must_use]
    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }
}

impl Component for SpriteRenderer {
    fn as_renderable(&self) -> Option<&dyn Renderable> {
        Some(self)
    }
}

impl Renderable for SpriteRenderer {
    fn layer(&self) -> i32 {
        self.layer
    }

    fn hidden(&self) -> bool {
        self.hidden
    }

    fn draw(&self, ctx: &mut DrawContext<'_>) -> Result<(), RenderError> {
        let (position, angle, scale) = ctx
            .sibling::<TransformComponent>()
            .map(|transform| {
                let pose = transform.world();
                (pose.position, pose.angle(), pose.scale)
            })
            .unwrap_or((Vec2::zeros(), 0.0, Vec2::new(1.0, 1.0)));

        let sprite = SpriteDraw {
            node: ctx.owner(),
            texture: self.texture,
            position,
            angle,
            size: self.size,
            scale,
            tint: self.tint,
        };
        ctx.backend().draw_sprite(&sprite)
    }
}
