//! Collision-aware dragging of placed nodes.
//!
//! A [`Scene`] owns the live node registry of one laid out map together with
//! a spatial index over the node footprints. Dragging goes through a
//! [`DragSession`], which mutably borrows the scene, so at most one drag can
//! be active at a time:
//!
//! ```text
//! Idle --begin_drag--> Dragging --end / end_outside / cancel / drop--> Idle
//! ```
//!
//! While dragging, each pointer position is turned into a grid delta through
//! the inverse projection. A candidate that would overlap another node is
//! rejected and the node stays at the last accepted position. On release the
//! node snaps to a nearby free integer cell, or goes back to where the drag
//! started.
//!
//! Side effects are reported as [`DragEvent`] values queued in the scene and
//! drained with [`Scene::take_events`].
//!
//! # Example
//!
//! ```
//! # use atlas::interaction::{DragEvent, Scene};
//! # use atlas_core::{footprint::Footprint, geometry::{Bounds, Point, Size}, identifier::Id, projection::IsoProjection};
//! let projection = IsoProjection::new(64.0, 32.0).unwrap();
//! let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::square(20.0));
//! let mut scene = Scene::new(projection, bounds);
//! scene.insert_node(Id::new("a"), Footprint::new(Point::new(5.0, 5.0), 2.0));
//!
//! let mut session = scene.begin_drag(Id::new("a"), Point::new(0.0, 0.0)).unwrap();
//! // One grid unit along +x is (32, 16) on screen.
//! session.drag_move(Point::new(64.0, 32.0));
//! let finished = session.end();
//!
//! assert_eq!(finished, Point::new(7.0, 5.0));
//! assert!(matches!(
//!     scene.take_events().last(),
//!     Some(DragEvent::Ended { committed: true, .. })
//! ));
//! ```

use std::mem;

use indexmap::IndexMap;
use log::{debug, trace};

use atlas_core::{
    footprint::{Footprint, FootprintShape, center_bounds},
    geometry::{Bounds, Point},
    identifier::Id,
    projection::IsoProjection,
    spatial::{IndexedFootprint, SpatialIndex},
};

use crate::{
    config::{AppConfig, InteractionConfig, LayoutConfig},
    error::AtlasError,
    model::Layout,
};

/// Side effect of a drag, for the host to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent {
    /// A drag began; viewport panning is suspended.
    Started { node: Id, position: Point },
    /// The node moved to a new accepted position.
    Moved {
        node: Id,
        position: Point,
        nearby: Vec<Id>,
    },
    /// The drag was released. `committed` is false when the node went back
    /// to its pre-drag position.
    Ended {
        node: Id,
        position: Point,
        committed: bool,
    },
    /// The drag was abandoned and the node restored.
    Cancelled { node: Id, position: Point },
}

/// Live node registry of one laid out map.
#[derive(Debug, Clone)]
pub struct Scene {
    projection: IsoProjection,
    map_bounds: Bounds,
    spacing: f32,
    proximity_threshold: f32,
    nodes: IndexMap<Id, Footprint>,
    index: SpatialIndex,
    panning_suspended: bool,
    nearby: Vec<Id>,
    events: Vec<DragEvent>,
}

impl Scene {
    /// Creates an empty scene covering `map_bounds`.
    ///
    /// Spacing and proximity start at their configuration defaults.
    pub fn new(projection: IsoProjection, map_bounds: Bounds) -> Self {
        Self {
            projection,
            map_bounds,
            spacing: LayoutConfig::default().spacing(),
            proximity_threshold: InteractionConfig::default().proximity_threshold(),
            nodes: IndexMap::new(),
            index: SpatialIndex::default(),
            panning_suspended: false,
            nearby: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Builds a scene holding every placed node of `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::Config`] when the projection settings are invalid.
    pub fn from_layout(layout: &Layout, config: &AppConfig) -> Result<Self, AtlasError> {
        let projection = config.projection().projection()?;
        let mut scene = Self::new(projection, layout.map_bounds())
            .with_spacing(config.layout().spacing())
            .with_proximity_threshold(config.interaction().proximity_threshold());

        scene.nodes = layout
            .nodes()
            .map(|node| (node.id(), node.footprint()))
            .collect();
        scene.index = SpatialIndex::from_entries(
            config.layout().footprint_shape(),
            scene
                .nodes
                .iter()
                .map(|(&id, &footprint)| IndexedFootprint::new(id, footprint)),
        );
        debug!(nodes = scene.nodes.len(); "Built interaction scene");
        Ok(scene)
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_proximity_threshold(mut self, threshold: f32) -> Self {
        self.proximity_threshold = threshold;
        self
    }

    /// Switches the collision metric, re-indexing existing nodes.
    pub fn with_shape(mut self, shape: FootprintShape) -> Self {
        self.index = SpatialIndex::from_entries(
            shape,
            self.nodes
                .iter()
                .map(|(&id, &footprint)| IndexedFootprint::new(id, footprint)),
        );
        self
    }

    /// Registers a node, replacing any previous footprint with the same id.
    pub fn insert_node(&mut self, id: Id, footprint: Footprint) -> Option<Footprint> {
        let previous = self.nodes.insert(id, footprint);
        if let Some(old) = previous {
            self.index.remove(id, old);
        }
        self.index.insert(id, footprint);
        previous
    }

    pub fn projection(&self) -> &IsoProjection {
        &self.projection
    }

    pub fn map_bounds(&self) -> Bounds {
        self.map_bounds
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Committed grid position of a node.
    pub fn position(&self, id: Id) -> Option<Point> {
        self.nodes.get(&id).map(Footprint::center)
    }

    /// Nodes close to the node being dragged, nearest first.
    pub fn nearby(&self) -> &[Id] {
        &self.nearby
    }

    /// Returns true while a drag owns the pointer gesture.
    pub fn panning_suspended(&self) -> bool {
        self.panning_suspended
    }

    /// Drains the queued drag events.
    pub fn take_events(&mut self) -> Vec<DragEvent> {
        mem::take(&mut self.events)
    }

    /// Returns true when node `id` could sit at `center`: inside the map
    /// and clear of every other node.
    pub fn is_valid_position(&self, id: Id, center: Point) -> bool {
        let Some(footprint) = self.nodes.get(&id) else {
            return false;
        };
        self.is_clear(id, &footprint.with_center(center))
    }

    /// Starts dragging `id` with the pointer at screen position `pointer`.
    ///
    /// Returns `None`, and changes nothing, when no such node is registered.
    pub fn begin_drag(&mut self, id: Id, pointer: Point) -> Option<DragSession<'_>> {
        let Some(footprint) = self.nodes.get(&id).copied() else {
            debug!(node_id:% = id; "Ignoring drag of unknown node");
            return None;
        };

        let original = footprint.center();
        self.panning_suspended = true;
        self.nearby.clear();
        self.events.push(DragEvent::Started {
            node: id,
            position: original,
        });
        debug!(node_id:% = id, position:? = original; "Drag started");

        Some(DragSession {
            scene: self,
            node: id,
            radius: footprint.radius(),
            pointer_origin: pointer,
            original,
            displayed: original,
            finished: false,
        })
    }

    fn is_clear(&self, id: Id, footprint: &Footprint) -> bool {
        footprint.fits_within(&self.map_bounds)
            && self
                .index
                .first_collision(footprint, self.spacing, Some(id))
                .is_none()
    }

    fn commit(&mut self, id: Id, footprint: Footprint) {
        if let Some(old) = self.nodes.insert(id, footprint) {
            self.index.remove(id, old);
        }
        self.index.insert(id, footprint);
    }

    fn release_pointer(&mut self) {
        self.panning_suspended = false;
        self.nearby.clear();
    }
}

/// An active drag of one node.
///
/// Dropping a session that was not ended cancels it.
#[derive(Debug)]
pub struct DragSession<'s> {
    scene: &'s mut Scene,
    node: Id,
    radius: f32,
    pointer_origin: Point,
    original: Point,
    displayed: Point,
    finished: bool,
}

impl DragSession<'_> {
    pub fn node(&self) -> Id {
        self.node
    }

    /// Position the node had when the drag started.
    pub fn original_position(&self) -> Point {
        self.original
    }

    /// Last accepted position.
    pub fn displayed_position(&self) -> Point {
        self.displayed
    }

    pub fn nearby(&self) -> &[Id] {
        &self.scene.nearby
    }

    /// Moves the pointer to screen position `pointer` and returns the
    /// node's displayed grid position.
    ///
    /// The candidate is clamped to the map. If it overlaps another node the
    /// displayed position does not change.
    pub fn drag_move(&mut self, pointer: Point) -> Point {
        let delta = match self
            .projection()
            .delta_to_grid(pointer.sub_point(self.pointer_origin))
        {
            Ok(delta) => delta,
            Err(err) => {
                trace!(node_id:% = self.node, err:%; "Ignoring pointer move");
                return self.displayed;
            }
        };

        let allowed = center_bounds(&self.scene.map_bounds, self.radius);
        let candidate = allowed.clamp_point(self.original.add_point(delta));
        let footprint = Footprint::new(candidate, self.radius);

        if !self.scene.is_clear(self.node, &footprint) {
            trace!(node_id:% = self.node, candidate:?; "Rejected colliding position");
            return self.displayed;
        }

        self.displayed = candidate;
        self.scene.nearby = self.scene.index.nearby(
            &footprint,
            self.scene.proximity_threshold,
            Some(self.node),
        );
        self.scene.events.push(DragEvent::Moved {
            node: self.node,
            position: candidate,
            nearby: self.scene.nearby.clone(),
        });
        self.displayed
    }

    /// Releases the pointer and returns the node's final position.
    pub fn end(mut self) -> Point {
        self.finish()
    }

    /// Releases the pointer outside the map view; same outcome as [`Self::end`].
    pub fn end_outside(mut self) -> Point {
        self.finish()
    }

    /// Abandons the drag, restoring the pre-drag position.
    pub fn cancel(mut self) -> Point {
        self.abort()
    }

    fn projection(&self) -> &IsoProjection {
        &self.scene.projection
    }

    fn finish(&mut self) -> Point {
        self.finished = true;
        let snapped = self
            .snap_candidates()
            .into_iter()
            .find(|&cell| {
                self.scene
                    .is_clear(self.node, &Footprint::new(cell, self.radius))
            });

        let (position, committed) = match snapped {
            Some(cell) => (cell, true),
            None => (self.original, false),
        };
        if committed {
            self.scene
                .commit(self.node, Footprint::new(position, self.radius));
        }

        self.scene.release_pointer();
        self.scene.events.push(DragEvent::Ended {
            node: self.node,
            position,
            committed,
        });
        debug!(node_id:% = self.node, position:?, committed; "Drag ended");
        position
    }

    fn abort(&mut self) -> Point {
        self.finished = true;
        self.scene.release_pointer();
        self.scene.events.push(DragEvent::Cancelled {
            node: self.node,
            position: self.original,
        });
        debug!(node_id:% = self.node; "Drag cancelled");
        self.original
    }

    /// Integer cells to try on release: the rounded cell first, then the
    /// rest of the surrounding 2×2 cells, nearest first.
    fn snap_candidates(&self) -> Vec<Point> {
        let allowed = center_bounds(&self.scene.map_bounds, self.radius);
        let p = self.displayed;

        let mut cells = vec![clamp_to_cell(&allowed, p.round())];
        let mut neighbours: Vec<Point> = [
            Point::new(p.x().floor(), p.y().floor()),
            Point::new(p.x().ceil(), p.y().floor()),
            Point::new(p.x().floor(), p.y().ceil()),
            Point::new(p.x().ceil(), p.y().ceil()),
        ]
        .into_iter()
        .map(|cell| clamp_to_cell(&allowed, cell))
        .collect();
        neighbours.sort_by(|a, b| a.distance(p).total_cmp(&b.distance(p)));

        for cell in neighbours {
            if !cells.contains(&cell) {
                cells.push(cell);
            }
        }
        cells
    }
}

impl Drop for DragSession<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.abort();
        }
    }
}

/// Clamps a cell into `allowed`, staying on integer coordinates when the
/// allowed range contains any.
fn clamp_to_cell(allowed: &Bounds, cell: Point) -> Point {
    let axis = |value: f32, min: f32, max: f32| {
        let (low, high) = (min.ceil(), max.floor());
        if low <= high {
            value.clamp(low, high)
        } else {
            (min + max) / 2.0
        }
    };
    Point::new(
        axis(cell.x(), allowed.min_x(), allowed.max_x()),
        axis(cell.y(), allowed.min_y(), allowed.max_y()),
    )
}
