//! Single-region packing.
//!
//! [`RegionPacker`] places as many nodes as it can inside one region of
//! fixed size without footprint overlap. It is a greedy first-fit: nodes are
//! taken in descending `(priority, size)` order and each is put at the first
//! candidate center of a row-major scan over the region.
//!
//! # Scaling
//!
//! Each node scans up to `(side / search_step)²` candidates and every
//! candidate is checked against the spatial index of the nodes already
//! placed, so a region costs roughly O(n · positions · log n). That is fine
//! for regions holding a few hundred nodes. Larger regions should use a
//! coarser `search_step` rather than expecting the packer to adapt.

use log::{debug, trace};

use atlas_core::{
    footprint::{Footprint, FootprintShape, TOLERANCE, center_bounds},
    geometry::{Bounds, Point, Size},
    identifier::Id,
    spatial::SpatialIndex,
};

use crate::{config::LayoutConfig, model::PlacedNode};

/// A node waiting to be packed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackItem {
    id: Id,
    size: f32,
    radius: f32,
    priority: u32,
}

impl PackItem {
    pub fn new(id: Id, size: f32, radius: f32) -> Self {
        Self {
            id,
            size,
            radius,
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }
}

/// Outcome of packing one region.
///
/// Positions of `placed` are local to the region's top-left corner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackResult {
    pub placed: Vec<PlacedNode>,
    pub overflow: Vec<PackItem>,
}

/// Greedy first-fit packer for a single region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionPacker {
    spacing: f32,
    search_step: f32,
    shape: FootprintShape,
}

impl RegionPacker {
    /// Creates a packer. `search_step` must be positive.
    pub fn new(spacing: f32, search_step: f32, shape: FootprintShape) -> Self {
        Self {
            spacing,
            search_step,
            shape,
        }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(
            config.spacing(),
            config.search_step(),
            config.footprint_shape(),
        )
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn shape(&self) -> FootprintShape {
        self.shape
    }

    /// Packs `items` into an empty region of the given size.
    ///
    /// ```
    /// # use atlas::layout::packer::{PackItem, RegionPacker};
    /// # use atlas_core::{footprint::FootprintShape, geometry::{Point, Size}, identifier::Id};
    /// let packer = RegionPacker::new(0.5, 1.0, FootprintShape::Circle);
    /// let result = packer.pack(
    ///     vec![PackItem::new(Id::new("solo"), 1.0, 2.0)],
    ///     Size::square(10.0),
    /// );
    ///
    /// assert_eq!(result.placed[0].position(), Point::new(2.0, 2.0));
    /// assert!(result.overflow.is_empty());
    /// ```
    pub fn pack(&self, items: Vec<PackItem>, area: Size) -> PackResult {
        self.pack_around(items, area, &[])
    }

    /// Packs `items` into a region that already holds `obstacles`.
    ///
    /// Obstacles (in region-local coordinates) are avoided but not returned;
    /// every item ends up in exactly one of `placed` or `overflow`.
    pub fn pack_around(
        &self,
        mut items: Vec<PackItem>,
        area: Size,
        obstacles: &[PlacedNode],
    ) -> PackResult {
        // Stable: equal keys keep their input order.
        items.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.size.total_cmp(&a.size))
        });

        let region = Bounds::new_from_top_left(Point::default(), area);
        let mut index = SpatialIndex::new(self.shape);
        for obstacle in obstacles {
            index.insert(obstacle.id(), obstacle.footprint());
        }

        let mut result = PackResult::default();
        for item in items {
            match self.find_position(&item, &region, &index) {
                Some(position) => {
                    trace!(node_id:% = item.id, position:?; "Placed node");
                    index.insert(item.id, Footprint::new(position, item.radius));
                    result
                        .placed
                        .push(PlacedNode::new(item.id, position, item.size, item.radius));
                }
                None => {
                    trace!(node_id:% = item.id, size = item.size; "No room for node");
                    result.overflow.push(item);
                }
            }
        }

        debug!(
            placed = result.placed.len(),
            overflow = result.overflow.len(),
            obstacles = obstacles.len();
            "Packed region"
        );
        result
    }

    /// First valid center of a row-major scan, if any.
    fn find_position(&self, item: &PackItem, region: &Bounds, index: &SpatialIndex) -> Option<Point> {
        let allowed = center_bounds(region, item.radius);
        if allowed.is_empty() {
            return None;
        }

        let xs = self.scan_axis(allowed.min_x(), allowed.max_x());
        let ys = self.scan_axis(allowed.min_y(), allowed.max_y());

        ys.into_iter()
            .flat_map(|y| xs.iter().map(move |&x| Point::new(x, y)))
            .map(|candidate| allowed.clamp_point(candidate))
            .find(|&candidate| {
                let footprint = Footprint::new(candidate, item.radius);
                footprint.fits_within(region)
                    && index
                        .first_collision(&footprint, self.spacing, None)
                        .is_none()
            })
    }

    /// Multiples of the search step within `[min, max]`.
    fn scan_axis(&self, min: f32, max: f32) -> Vec<f32> {
        let first = (min / self.search_step - TOLERANCE).ceil() as i64;
        let last = (max / self.search_step + TOLERANCE).floor() as i64;
        (first..=last)
            .map(|step| step as f32 * self.search_step)
            .collect()
    }
}
