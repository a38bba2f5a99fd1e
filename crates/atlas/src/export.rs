//! Screen-space report of a layout.
//!
//! The report is what an external renderer consumes: every region and node
//! with its grid coordinates and the same coordinates projected through an
//! [`IsoProjection`]. It serializes with serde; the CLI writes it as TOML.

use serde::Serialize;

use atlas_core::{
    geometry::{Bounds, Point},
    projection::IsoProjection,
};

use crate::{
    error::AtlasError,
    model::{Layout, OverflowNode, OverflowReason, PlacedNode, RegionLayout},
};

/// Serializable view of a [`Layout`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutReport {
    placed: usize,
    overflowed: usize,
    map: BoundsReport,
    regions: Vec<RegionReport>,
    overflow: Vec<OverflowReport>,
}

/// A rectangle in grid units with its projected corners.
///
/// Corners go clockwise on screen from the top vertex of the diamond.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundsReport {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
    screen_corners: Vec<[f32; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionReport {
    id: String,
    name: String,
    row: usize,
    col: usize,
    bounds: BoundsReport,
    nodes: Vec<NodeReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeReport {
    id: String,
    grid_x: f32,
    grid_y: f32,
    size: f32,
    radius: f32,
    screen_x: f32,
    screen_y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverflowReport {
    id: String,
    size: f32,
    reason: OverflowReason,
}

impl LayoutReport {
    /// Projects every part of `layout` through `projection`.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::Geometry`] if a coordinate is not finite.
    pub fn from_layout(layout: &Layout, projection: &IsoProjection) -> Result<Self, AtlasError> {
        let regions = layout
            .regions()
            .iter()
            .map(|region| RegionReport::new(region, projection))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            placed: layout.placed_count(),
            overflowed: layout.overflow().len(),
            map: BoundsReport::new(layout.map_bounds(), projection)?,
            regions,
            overflow: layout.overflow().iter().map(OverflowReport::new).collect(),
        })
    }

    pub fn placed(&self) -> usize {
        self.placed
    }

    pub fn overflowed(&self) -> usize {
        self.overflowed
    }

    pub fn regions(&self) -> &[RegionReport] {
        &self.regions
    }

    pub fn overflow(&self) -> &[OverflowReport] {
        &self.overflow
    }

    /// Renders the report as a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::InvalidInput`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, AtlasError> {
        toml::to_string_pretty(self)
            .map_err(|err| AtlasError::InvalidInput(format!("cannot serialize report: {err}")))
    }
}

impl BoundsReport {
    fn new(bounds: Bounds, projection: &IsoProjection) -> Result<Self, AtlasError> {
        let corners = [
            bounds.min_point(),
            Point::new(bounds.max_x(), bounds.min_y()),
            bounds.max_point(),
            Point::new(bounds.min_x(), bounds.max_y()),
        ];
        let screen_corners = corners
            .into_iter()
            .map(|corner| {
                let screen = projection.to_screen(corner)?;
                Ok([screen.x(), screen.y()])
            })
            .collect::<Result<Vec<_>, AtlasError>>()?;

        Ok(Self {
            min_x: bounds.min_x(),
            min_y: bounds.min_y(),
            max_x: bounds.max_x(),
            max_y: bounds.max_y(),
            screen_corners,
        })
    }
}

impl RegionReport {
    fn new(region: &RegionLayout, projection: &IsoProjection) -> Result<Self, AtlasError> {
        let nodes = region
            .nodes()
            .iter()
            .map(|node| NodeReport::new(node, projection))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: region.id().to_string(),
            name: region.name().to_string(),
            row: region.grid_position().row(),
            col: region.grid_position().col(),
            bounds: BoundsReport::new(region.bounds(), projection)?,
            nodes,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn nodes(&self) -> &[NodeReport] {
        &self.nodes
    }
}

impl NodeReport {
    fn new(node: &PlacedNode, projection: &IsoProjection) -> Result<Self, AtlasError> {
        let position = node.position();
        let screen = projection.to_screen(position)?;
        Ok(Self {
            id: node.id().to_string(),
            grid_x: position.x(),
            grid_y: position.y(),
            size: node.size(),
            radius: node.radius(),
            screen_x: screen.x(),
            screen_y: screen.y(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn grid_position(&self) -> Point {
        Point::new(self.grid_x, self.grid_y)
    }

    pub fn screen_position(&self) -> Point {
        Point::new(self.screen_x, self.screen_y)
    }
}

impl OverflowReport {
    fn new(node: &OverflowNode) -> Self {
        Self {
            id: node.id().to_string(),
            size: node.size(),
            reason: node.reason(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn reason(&self) -> OverflowReason {
        self.reason
    }
}

#[cfg(test)]
mod tests {
    use atlas_core::{geometry::Size, identifier::Id};

    use super::*;
    use crate::model::GridPosition;

    fn layout() -> Layout {
        let region = RegionLayout::new(
            Id::new("region-0"),
            "fresh",
            GridPosition::new(0, 0),
            Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::square(10.0)),
            vec![PlacedNode::new(Id::new("a"), Point::new(2.0, 2.0), 1.0, 2.0)],
        );
        Layout::new(
            vec![region],
            vec![OverflowNode::new(
                Id::new("big"),
                4.0,
                OverflowReason::Oversized,
            )],
        )
    }

    #[test]
    fn test_projects_nodes_and_corners() {
        let projection = IsoProjection::new(64.0, 32.0).unwrap();
        let report = LayoutReport::from_layout(&layout(), &projection).unwrap();

        let node = &report.regions()[0].nodes()[0];
        assert_eq!(node.id(), "a");
        assert_eq!(node.grid_position(), Point::new(2.0, 2.0));
        assert_eq!(node.screen_position(), Point::new(0.0, 64.0));

        let corners = &report.regions()[0].bounds.screen_corners;
        assert_eq!(corners[0], [0.0, 0.0]);
        assert_eq!(corners[1], [320.0, 160.0]);
        assert_eq!(corners[2], [0.0, 320.0]);
        assert_eq!(corners[3], [-320.0, 160.0]);
    }

    #[test]
    fn test_toml_output() {
        let projection = IsoProjection::new(64.0, 32.0).unwrap();
        let report = LayoutReport::from_layout(&layout(), &projection).unwrap();

        let text = report.to_toml_string().unwrap();
        assert!(text.contains("placed = 1"));
        assert!(text.contains("[[regions]]"));
        assert!(text.contains("reason = \"oversized\""));
    }
}
