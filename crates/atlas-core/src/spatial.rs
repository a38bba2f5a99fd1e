//! Spatial index over placed footprints.
//!
//! Uses an R-tree (via `rstar`) so that collision and proximity queries
//! touch only the footprints whose boxes intersect the query box, instead of
//! scanning every placed node. Both the packer (once per scanned candidate)
//! and the drag validator (once per pointer move) go through this index.

use rstar::{AABB, RTree, RTreeObject};

use crate::{
    footprint::{Footprint, FootprintShape},
    identifier::Id,
};

/// A footprint stored in the index together with its owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedFootprint {
    id: Id,
    footprint: Footprint,
}

impl IndexedFootprint {
    pub fn new(id: Id, footprint: Footprint) -> Self {
        Self { id, footprint }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }
}

impl RTreeObject for IndexedFootprint {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let bounds = self.footprint.bounds();
        AABB::from_corners(
            [bounds.min_x(), bounds.min_y()],
            [bounds.max_x(), bounds.max_y()],
        )
    }
}

/// R-tree of placed footprints keyed by node id.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: RTree<IndexedFootprint>,
    shape: FootprintShape,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(FootprintShape::default())
    }
}

impl SpatialIndex {
    /// Creates an empty index using `shape` as the collision metric.
    pub fn new(shape: FootprintShape) -> Self {
        Self {
            tree: RTree::new(),
            shape,
        }
    }

    /// Bulk-loads an index from existing entries.
    pub fn from_entries(
        shape: FootprintShape,
        entries: impl IntoIterator<Item = IndexedFootprint>,
    ) -> Self {
        Self {
            tree: RTree::bulk_load(entries.into_iter().collect()),
            shape,
        }
    }

    pub fn shape(&self) -> FootprintShape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    pub fn insert(&mut self, id: Id, footprint: Footprint) {
        self.tree.insert(IndexedFootprint::new(id, footprint));
    }

    /// Removes the exact entry; returns false if it was not present.
    pub fn remove(&mut self, id: Id, footprint: Footprint) -> bool {
        self.tree
            .remove(&IndexedFootprint::new(id, footprint))
            .is_some()
    }

    /// Returns the first indexed footprint (other than `exclude`) that
    /// collides with `footprint` under `spacing`.
    pub fn first_collision(
        &self,
        footprint: &Footprint,
        spacing: f32,
        exclude: Option<Id>,
    ) -> Option<Id> {
        self.candidates(footprint, spacing)
            .filter(|entry| Some(entry.id) != exclude)
            .find(|entry| footprint.collides(&entry.footprint, spacing, self.shape))
            .map(|entry| entry.id)
    }

    /// Ids of indexed footprints within `threshold` of touching `footprint`,
    /// nearest first.
    pub fn nearby(&self, footprint: &Footprint, threshold: f32, exclude: Option<Id>) -> Vec<Id> {
        let mut found: Vec<(f32, Id)> = self
            .candidates(footprint, threshold)
            .filter(|entry| Some(entry.id) != exclude)
            .filter(|entry| footprint.is_near(&entry.footprint, threshold, self.shape))
            .map(|entry| {
                let distance = self
                    .shape
                    .distance(footprint.center(), entry.footprint.center());
                (distance, entry.id)
            })
            .collect();
        found.sort_by(|a, b| a.0.total_cmp(&b.0));
        found.into_iter().map(|(_, id)| id).collect()
    }

    /// Iterates over every indexed footprint.
    pub fn iter(&self) -> impl Iterator<Item = &IndexedFootprint> {
        self.tree.iter()
    }

    /// Entries whose boxes intersect the footprint's box grown by `margin`.
    fn candidates(
        &self,
        footprint: &Footprint,
        margin: f32,
    ) -> impl Iterator<Item = &IndexedFootprint> {
        let bounds = footprint.bounds();
        let search = AABB::from_corners(
            [bounds.min_x() - margin, bounds.min_y() - margin],
            [bounds.max_x() + margin, bounds.max_y() + margin],
        );
        self.tree.locate_in_envelope_intersecting(&search)
    }
}
