//! Spatial partitioning for broad-phase collision detection
//!
//! Bounding boxes live in a uniform bucket grid; moving a box updates its
//! bucket membership incrementally and scans its buckets for overlaps.

mod collision;
mod grid;

pub use collision::{BoxEvents, BoxHandle, BoxMoved, Collision, CollisionIndex};
pub use grid::{BucketCoord, SpatialGrid};
