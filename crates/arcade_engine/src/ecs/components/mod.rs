//! Built-in components

pub mod bounding_box;
pub mod sprite;
pub mod transform;

pub use bounding_box::BoundingBox;
pub use sprite::SpriteRenderer;
pub use transform::{Pose, Rotation, TransformComponent};
