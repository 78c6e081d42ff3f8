//! Broad-phase collision index
//!
//! The index is split into two phases:
//! - Broad phase: every box sharing at least one bucket with the moved box
//!   is a candidate, minus the box itself, boxes of the same owner and boxes
//!   whose owner is disabled.
//! - Narrow phase: candidates are tested with an axis-aligned rectangle
//!   overlap. Each hit notifies the moved box, then the other box.
//!
//! Scans run per move. When two overlapping boxes both move in the same
//! tick each move scans on its own, so that pair is reported twice. Nothing
//! here deduplicates across scans.

use super::grid::{BucketCoord, SpatialGrid};
use crate::ecs::NodeKey;
use crate::events::Topic;
use crate::foundation::math::{Rect, Vec2};
use slotmap::SlotMap;
use std::collections::HashSet;

slotmap::new_key_type! {
    /// Handle of a box registered in a [`CollisionIndex`]
    pub struct BoxHandle;
}

/// Published after a box's rectangle changed position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxMoved {
    /// Box that moved
    pub handle: BoxHandle,
    /// Node owning the box
    pub owner: NodeKey,
    /// New rectangle
    pub rect: Rect,
}

/// Published on both boxes of an overlapping pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// Box receiving the notification
    pub this: BoxHandle,
    /// Node owning `this`
    pub this_owner: NodeKey,
    /// The other box of the pair
    pub other: BoxHandle,
    /// Node owning `other`
    pub other_owner: NodeKey,
    /// Rectangle of `other` at the time of the hit
    pub other_rect: Rect,
}

/// Notification topics of one box
#[derive(Debug, Clone, Default)]
pub struct BoxEvents {
    /// Fired after every position change
    pub moved: Topic<BoxMoved>,
    /// Fired for every overlap found by a scan involving this box
    pub collided: Topic<Collision>,
}

#[derive(Debug)]
struct BoxEntry {
    owner: NodeKey,
    half_size: Vec2,
    rect: Rect,
    buckets: Vec<BucketCoord>,
    events: BoxEvents,
}

/// Registry of bounding boxes bucketed on a uniform grid
#[derive(Debug)]
pub struct CollisionIndex {
    grid: SpatialGrid,
    boxes: SlotMap<BoxHandle, BoxEntry>,
}

impl CollisionIndex {
    /// Create an empty index with the given bucket size
    pub fn new(bucket_size: Vec2) -> Self {
        Self {
            grid: SpatialGrid::new(bucket_size),
            boxes: SlotMap::with_key(),
        }
    }

    /// Underlying bucket grid
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Register a box and place it in the buckets it overlaps
    ///
    /// The half-size is fixed for the box's lifetime; moves only change its
    /// center. Registration alone does not scan for overlaps; the first
    /// [`move_to`](Self::move_to) does.
    pub fn register(&mut self, owner: NodeKey, center: Vec2, half_size: Vec2, events: BoxEvents) -> BoxHandle {
        let rect = Rect::from_center_half_size(center, half_size);
        let buckets = self.grid.buckets_for(&rect);
        let handle = self.boxes.insert(BoxEntry {
            owner,
            half_size,
            rect,
            buckets: buckets.clone(),
            events,
        });
        for coord in buckets {
            self.grid.insert(coord, handle);
        }
        log::trace!("Registered box {handle:?} for {owner:?} at {rect:?}");
        handle
    }

    /// Remove a box from the index; returns false for unknown handles
    pub fn unregister(&mut self, handle: BoxHandle) -> bool {
        let Some(entry) = self.boxes.remove(handle) else {
            return false;
        };
        for coord in entry.buckets {
            self.grid.remove(coord, handle);
        }
        true
    }

    /// Current rectangle of a box
    pub fn rect(&self, handle: BoxHandle) -> Option<Rect> {
        self.boxes.get(handle).map(|entry| entry.rect)
    }

    /// Half-size a box was registered with
    pub fn half_size(&self, handle: BoxHandle) -> Option<Vec2> {
        self.boxes.get(handle).map(|entry| entry.half_size)
    }

    /// Owner of a box
    pub fn owner(&self, handle: BoxHandle) -> Option<NodeKey> {
        self.boxes.get(handle).map(|entry| entry.owner)
    }

    /// Buckets a box currently occupies
    pub fn buckets_of(&self, handle: BoxHandle) -> &[BucketCoord] {
        self.boxes
            .get(handle)
            .map(|entry| entry.buckets.as_slice())
            .unwrap_or(&[])
    }

    /// Boxes registered in a bucket
    pub fn bucket_members(&self, coord: BucketCoord) -> &[BoxHandle] {
        self.grid.members(coord)
    }

    /// Notification topics of a box
    pub fn events(&self, handle: BoxHandle) -> Option<&BoxEvents> {
        self.boxes.get(handle).map(|entry| &entry.events)
    }

    /// Number of registered boxes
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether no boxes are registered
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Boxes whose rectangle overlaps `rect`, without owner filtering
    pub fn query_rect(&self, rect: &Rect) -> Vec<BoxHandle> {
        let mut seen = HashSet::new();
        let mut hits = Vec::new();
        for coord in self.grid.buckets_for(rect) {
            for &handle in self.grid.members(coord) {
                if seen.insert(handle) && self.boxes[handle].rect.intersects(rect) {
                    hits.push(handle);
                }
            }
        }
        hits
    }

    /// Re-center a box, update its bucket membership and dispatch overlaps
    ///
    /// `is_enabled` reports whether a candidate's owner is enabled. Returns
    /// the number of overlapping pairs found by this scan.
    pub fn move_to(&mut self, handle: BoxHandle, center: Vec2, is_enabled: impl Fn(NodeKey) -> bool) -> usize {
        let Some(entry) = self.boxes.get_mut(handle) else {
            return 0;
        };
        let rect = Rect::from_center_half_size(center, entry.half_size);
        entry.rect = rect;
        let owner = entry.owner;

        let new_buckets = self.grid.buckets_for(&rect);
        let old_buckets = std::mem::replace(&mut entry.buckets, new_buckets.clone());
        for &coord in old_buckets.iter().filter(|c| !new_buckets.contains(c)) {
            self.grid.remove(coord, handle);
        }
        for &coord in new_buckets.iter().filter(|c| !old_buckets.contains(c)) {
            self.grid.insert(coord, handle);
        }

        let events = self.boxes[handle].events.clone();
        events.moved.publish(&BoxMoved { handle, owner, rect });

        let hits = self.scan(handle, owner, &rect, &new_buckets, &is_enabled);
        for &(other, other_owner, other_rect) in &hits {
            log::trace!("Collision {owner:?} <-> {other_owner:?}");
            events.collided.publish(&Collision {
                this: handle,
                this_owner: owner,
                other,
                other_owner,
                other_rect,
            });
            if let Some(other_entry) = self.boxes.get(other) {
                other_entry.events.collided.publish(&Collision {
                    this: other,
                    this_owner: other_owner,
                    other: handle,
                    other_owner: owner,
                    other_rect: rect,
                });
            }
        }
        hits.len()
    }

    fn scan(
        &self,
        handle: BoxHandle,
        owner: NodeKey,
        rect: &Rect,
        buckets: &[BucketCoord],
        is_enabled: &impl Fn(NodeKey) -> bool,
    ) -> Vec<(BoxHandle, NodeKey, Rect)> {
        let mut seen = HashSet::new();
        let mut hits = Vec::new();
        for &coord in buckets {
            for &candidate in self.grid.members(coord) {
                if candidate == handle || !seen.insert(candidate) {
                    continue;
                }
                let other = &self.boxes[candidate];
                if other.owner == owner || !is_enabled(other.owner) {
                    continue;
                }
                if rect.intersects(&other.rect) {
                    hits.push((candidate, other.owner, other.rect));
                }
            }
        }
        hits
    }

    /// Remove every box
    pub fn clear(&mut self) {
        self.boxes.clear();
        self.grid.clear();
    }
}
