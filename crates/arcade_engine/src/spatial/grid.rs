//! Uniform bucket grid
//!
//! World space is cut into fixed-size rectangular buckets addressed by
//! integer coordinates. Rectangles are treated as half-open, so a box whose
//! edge lies exactly on a bucket boundary does not occupy the next bucket.

use super::BoxHandle;
use crate::foundation::math::{Rect, Vec2};
use std::collections::HashMap;

/// Integer address of a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketCoord {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl BucketCoord {
    /// Create a bucket coordinate
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Sparse grid of buckets, each holding the boxes that overlap it
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    bucket_size: Vec2,
    buckets: HashMap<BucketCoord, Vec<BoxHandle>>,
}

impl SpatialGrid {
    /// Create an empty grid
    ///
    /// # Panics
    /// If either bucket dimension is not strictly positive.
    pub fn new(bucket_size: Vec2) -> Self {
        assert!(
            bucket_size.x > 0.0 && bucket_size.y > 0.0,
            "bucket size must be positive, got {bucket_size:?}"
        );
        Self {
            bucket_size,
            buckets: HashMap::new(),
        }
    }

    /// Size of one bucket
    pub fn bucket_size(&self) -> Vec2 {
        self.bucket_size
    }

    /// Every bucket the rectangle overlaps, row by row
    #[allow(clippy::cast_possible_truncation)]
    pub fn buckets_for(&self, rect: &Rect) -> Vec<BucketCoord> {
        let first_x = (rect.min.x / self.bucket_size.x).floor() as i32;
        let first_y = (rect.min.y / self.bucket_size.y).floor() as i32;
        // Half-open: an edge on a boundary stays in the lower bucket
        let last_x = ((rect.max.x / self.bucket_size.x).ceil() as i32 - 1).max(first_x);
        let last_y = ((rect.max.y / self.bucket_size.y).ceil() as i32 - 1).max(first_y);

        let mut coords = Vec::new();
        for y in first_y..=last_y {
            for x in first_x..=last_x {
                coords.push(BucketCoord::new(x, y));
            }
        }
        coords
    }

    /// Add a box to a bucket
    pub fn insert(&mut self, coord: BucketCoord, handle: BoxHandle) {
        let members = self.buckets.entry(coord).or_default();
        if !members.contains(&handle) {
            members.push(handle);
        }
    }

    /// Remove a box from a bucket, dropping the bucket when it empties
    pub fn remove(&mut self, coord: BucketCoord, handle: BoxHandle) {
        if let Some(members) = self.buckets.get_mut(&coord) {
            members.retain(|&h| h != handle);
            if members.is_empty() {
                self.buckets.remove(&coord);
            }
        }
    }

    /// Boxes registered in a bucket, in insertion order
    pub fn members(&self, coord: BucketCoord) -> &[BoxHandle] {
        self.buckets.get(&coord).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of non-empty buckets
    pub fn occupied_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Remove every box from every bucket
    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}
