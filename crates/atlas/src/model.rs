//! Input and output model of a layout run.
//!
//! Inputs ([`NodeSpec`], [`RegionSpec`], [`MapDocument`]) are constructed
//! fresh for every relayout. Outputs ([`Layout`] and its parts) carry
//! absolute grid coordinates; a host that wants a node to stay where it is
//! feeds the coordinates back in as [`NodeSpec::with_saved_position`].

use serde::{Deserialize, Serialize};

use atlas_core::{
    footprint::Footprint,
    geometry::{Bounds, Point},
    identifier::Id,
    sizing::SizeHints,
};

/// A node to be placed on the map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeSpec {
    id: Id,
    /// Explicit size; skips classification when present.
    #[serde(default)]
    size: Option<f32>,
    /// Magnitude metric used to derive the size.
    #[serde(default)]
    magnitude: Option<u64>,
    #[serde(default)]
    dependency_count: Option<u32>,
    #[serde(default)]
    importance: Option<f32>,
    #[serde(default)]
    is_root: bool,
    /// Explicit grouping category; wins over freshness.
    #[serde(default)]
    category: Option<String>,
    /// Unix timestamp (seconds) of the node's last update.
    #[serde(default)]
    freshness_timestamp: Option<i64>,
    /// Manual mode: region the node belongs to.
    #[serde(default)]
    assigned_region: Option<Id>,
    /// Manual mode: absolute grid position from a previous layout.
    #[serde(default)]
    saved_position: Option<Point>,
}

impl NodeSpec {
    /// Creates a node with no metadata; it will be classified into the smallest tier.
    pub fn new(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            size: None,
            magnitude: None,
            dependency_count: None,
            importance: None,
            is_root: false,
            category: None,
            freshness_timestamp: None,
            assigned_region: None,
            saved_position: None,
        }
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_magnitude(mut self, magnitude: u64) -> Self {
        self.magnitude = Some(magnitude);
        self
    }

    pub fn with_dependency_count(mut self, count: u32) -> Self {
        self.dependency_count = Some(count);
        self
    }

    pub fn with_importance(mut self, importance: f32) -> Self {
        self.importance = Some(importance);
        self
    }

    pub fn with_root(mut self, is_root: bool) -> Self {
        self.is_root = is_root;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_freshness_timestamp(mut self, timestamp: i64) -> Self {
        self.freshness_timestamp = Some(timestamp);
        self
    }

    pub fn with_assigned_region(mut self, region: impl Into<Id>) -> Self {
        self.assigned_region = Some(region.into());
        self
    }

    pub fn with_saved_position(mut self, position: Point) -> Self {
        self.saved_position = Some(position);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn freshness_timestamp(&self) -> Option<i64> {
        self.freshness_timestamp
    }

    pub fn assigned_region(&self) -> Option<Id> {
        self.assigned_region
    }

    pub fn saved_position(&self) -> Option<Point> {
        self.saved_position
    }

    /// Metadata handed to the size classifier.
    pub fn size_hints(&self) -> SizeHints {
        SizeHints {
            explicit: self.size,
            magnitude: self.magnitude,
            dependency_count: self.dependency_count,
            importance: self.importance,
            is_root: self.is_root,
        }
    }
}

/// A caller-supplied region (manual mode).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegionSpec {
    id: Id,
    name: String,
    /// Position in the region grid; `(order / N, order % N)` for N columns.
    order: usize,
}

impl RegionSpec {
    pub fn new(id: impl Into<Id>, name: impl Into<String>, order: usize) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            order,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> usize {
        self.order
    }
}

/// A complete layout request as read from a map file.
///
/// A document with regions is laid out in manual mode, one without in
/// automatic mode.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MapDocument {
    /// Reference time (unix seconds) for freshness buckets.
    #[serde(default)]
    now: Option<i64>,
    #[serde(default)]
    regions: Vec<RegionSpec>,
    #[serde(default)]
    nodes: Vec<NodeSpec>,
}

impl MapDocument {
    pub fn new(nodes: Vec<NodeSpec>) -> Self {
        Self {
            now: None,
            regions: Vec::new(),
            nodes,
        }
    }

    pub fn with_regions(mut self, regions: Vec<RegionSpec>) -> Self {
        self.regions = regions;
        self
    }

    pub fn with_reference_time(mut self, now: i64) -> Self {
        self.now = Some(now);
        self
    }

    pub fn now(&self) -> Option<i64> {
        self.now
    }

    pub fn regions(&self) -> &[RegionSpec] {
        &self.regions
    }

    pub fn nodes(&self) -> &[NodeSpec] {
        &self.nodes
    }

    /// Returns true when the document supplies its own regions.
    pub fn is_manual(&self) -> bool {
        !self.regions.is_empty()
    }
}

/// Row and column of a region in the region grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GridPosition {
    row: usize,
    col: usize,
}

impl GridPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Row-major slot for `order` in a grid of `columns` columns.
    ///
    /// ```
    /// # use atlas::model::GridPosition;
    /// assert_eq!(GridPosition::from_order(6, 4), GridPosition::new(1, 2));
    /// ```
    pub fn from_order(order: usize, columns: usize) -> Self {
        Self {
            row: order / columns,
            col: order % columns,
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }
}

/// A node with its final absolute grid position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacedNode {
    id: Id,
    position: Point,
    size: f32,
    radius: f32,
}

impl PlacedNode {
    pub fn new(id: Id, position: Point, size: f32, radius: f32) -> Self {
        Self {
            id,
            position,
            size,
            radius,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.position, self.radius)
    }

    /// The same node shifted by `offset`.
    pub fn translate(mut self, offset: Point) -> Self {
        self.position = self.position.add_point(offset);
        self
    }
}

/// A region of the laid out map and its members.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionLayout {
    id: Id,
    name: String,
    grid_position: GridPosition,
    bounds: Bounds,
    nodes: Vec<PlacedNode>,
}

impl RegionLayout {
    pub fn new(
        id: Id,
        name: impl Into<String>,
        grid_position: GridPosition,
        bounds: Bounds,
        nodes: Vec<PlacedNode>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            grid_position,
            bounds,
            nodes,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid_position(&self) -> GridPosition {
        self.grid_position
    }

    /// Absolute bounds of the region in grid units.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn nodes(&self) -> &[PlacedNode] {
        &self.nodes
    }
}

/// Why a node ended up in the overflow list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowReason {
    /// The footprint is larger than a region in some dimension.
    Oversized,
    /// Automatic mode stopped at the configured region cap.
    RegionCapReached,
    /// A freshly created, empty region could not take the node.
    Unplaceable,
    /// Manual mode: the assigned region is full.
    RegionFull,
    /// Manual mode: no supplied region had room for an unassigned node.
    NoRegionFits,
}

/// A node that was not placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverflowNode {
    id: Id,
    size: f32,
    reason: OverflowReason,
}

impl OverflowNode {
    pub fn new(id: Id, size: f32, reason: OverflowReason) -> Self {
        Self { id, size, reason }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn reason(&self) -> OverflowReason {
        self.reason
    }
}

/// The result of a full relayout.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    map_bounds: Bounds,
    regions: Vec<RegionLayout>,
    overflow: Vec<OverflowNode>,
}

impl Layout {
    /// Assembles a layout; the map bounds are the union of the region bounds.
    pub fn new(regions: Vec<RegionLayout>, overflow: Vec<OverflowNode>) -> Self {
        let map_bounds = regions
            .iter()
            .map(RegionLayout::bounds)
            .reduce(|acc, bounds| acc.merge(&bounds))
            .unwrap_or_default();
        Self {
            map_bounds,
            regions,
            overflow,
        }
    }

    pub fn map_bounds(&self) -> Bounds {
        self.map_bounds
    }

    pub fn regions(&self) -> &[RegionLayout] {
        &self.regions
    }

    pub fn overflow(&self) -> &[OverflowNode] {
        &self.overflow
    }

    /// Iterates over every placed node in region order.
    pub fn nodes(&self) -> impl Iterator<Item = &PlacedNode> {
        self.regions.iter().flat_map(|region| region.nodes.iter())
    }

    pub fn placed_count(&self) -> usize {
        self.regions.iter().map(|region| region.nodes.len()).sum()
    }

    /// Finds a placed node and the region holding it.
    pub fn find_node(&self, id: Id) -> Option<(&RegionLayout, &PlacedNode)> {
        self.regions.iter().find_map(|region| {
            region
                .nodes
                .iter()
                .find(|node| node.id == id)
                .map(|node| (region, node))
        })
    }
}
