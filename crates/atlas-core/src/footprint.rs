//! Node footprints and the predicates that keep them apart.
//!
//! A footprint is the exclusion zone of radius `k × size` around a node's
//! center. Two footprints collide when their centers are closer than
//! `radius_a + radius_b + spacing` under the configured [`FootprintShape`]
//! metric. These predicates are shared by the packer, the allocator's
//! saved-position checks and the drag validator, so every component agrees
//! on what "overlap" means.

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Point, Size};

/// Slack absorbed by the overlap and containment tests.
pub const TOLERANCE: f32 = 1e-4;

/// Metric used to compare footprints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FootprintShape {
    /// Disk of the given radius; Euclidean distance.
    #[default]
    Circle,
    /// Axis-aligned square with half-side equal to the radius; Chebyshev distance.
    Square,
}

impl FootprintShape {
    /// Distance between two centers under this metric.
    pub fn distance(self, a: Point, b: Point) -> f32 {
        match self {
            Self::Circle => a.distance(b),
            Self::Square => {
                let delta = a.sub_point(b).abs();
                delta.x().max(delta.y())
            }
        }
    }
}

/// A node's exclusion zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    center: Point,
    radius: f32,
}

impl Footprint {
    pub fn new(center: Point, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// The same footprint moved to another center.
    pub fn with_center(mut self, center: Point) -> Self {
        self.center = center;
        self
    }

    /// Axis-aligned box enclosing the footprint.
    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_center(self.center, Size::square(self.radius * 2.0))
    }

    /// Returns true when the two footprints are closer than `spacing` apart.
    ///
    /// ```
    /// # use atlas_core::footprint::{Footprint, FootprintShape};
    /// # use atlas_core::geometry::Point;
    /// let a = Footprint::new(Point::new(3.0, 3.0), 3.0);
    /// let b = Footprint::new(Point::new(9.5, 3.0), 3.0);
    ///
    /// assert!(!a.collides(&b, 0.5, FootprintShape::Circle));
    /// assert!(a.collides(&b, 1.0, FootprintShape::Circle));
    /// ```
    pub fn collides(&self, other: &Footprint, spacing: f32, shape: FootprintShape) -> bool {
        let required = self.radius + other.radius + spacing;
        shape.distance(self.center, other.center) < required - TOLERANCE
    }

    /// Returns true when the two footprints are within `threshold` of touching.
    pub fn is_near(&self, other: &Footprint, threshold: f32, shape: FootprintShape) -> bool {
        shape.distance(self.center, other.center) < self.radius + other.radius + threshold
    }

    /// Returns true when the whole footprint lies inside `bounds`.
    pub fn fits_within(&self, bounds: &Bounds) -> bool {
        bounds.contains_bounds(&self.bounds(), TOLERANCE)
    }
}

/// Bounds a center must stay inside for a footprint of `radius` to fit in `bounds`.
pub fn center_bounds(bounds: &Bounds, radius: f32) -> Bounds {
    bounds.shrink(radius)
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_square_distance_is_chebyshev() {
        let d = FootprintShape::Square.distance(Point::new(0.0, 0.0), Point::new(3.0, -7.0));
        assert_approx_eq!(f32, d, 7.0);
    }

    #[test]
    fn test_touching_with_spacing_does_not_collide() {
        let a = Footprint::new(Point::new(0.0, 0.0), 3.0);
        let b = Footprint::new(Point::new(6.5, 0.0), 3.0);

        assert!(!a.collides(&b, 0.5, FootprintShape::Circle));
        assert!(a.collides(&b, 0.6, FootprintShape::Circle));
    }

    #[test]
    fn test_diagonal_differs_between_shapes() {
        let a = Footprint::new(Point::new(0.0, 0.0), 2.0);
        let b = Footprint::new(Point::new(3.0, 3.0), 2.0);

        // Euclidean distance 4.24 > 4, Chebyshev distance 3 < 4.
        assert!(!a.collides(&b, 0.0, FootprintShape::Circle));
        assert!(a.collides(&b, 0.0, FootprintShape::Square));
    }

    #[test]
    fn test_fits_within() {
        let region = Bounds::new_from_top_left(Point::default(), Size::square(10.0));

        assert!(Footprint::new(Point::new(2.0, 2.0), 2.0).fits_within(&region));
        assert!(Footprint::new(Point::new(8.0, 8.0), 2.0).fits_within(&region));
        assert!(!Footprint::new(Point::new(1.0, 5.0), 2.0).fits_within(&region));
        assert!(!Footprint::new(Point::new(5.0, 5.0), 6.0).fits_within(&region));
    }

    #[test]
    fn test_center_bounds() {
        let region = Bounds::new_from_top_left(Point::default(), Size::square(10.0));
        let centers = center_bounds(&region, 2.0);

        assert_eq!(centers.min_point(), Point::new(2.0, 2.0));
        assert_eq!(centers.max_point(), Point::new(8.0, 8.0));
        assert!(center_bounds(&region, 6.0).is_empty());
    }

    #[test]
    fn test_is_near() {
        let a = Footprint::new(Point::new(0.0, 0.0), 2.0);
        let b = Footprint::new(Point::new(5.5, 0.0), 2.0);

        assert!(a.is_near(&b, 2.0, FootprintShape::Circle));
        assert!(!a.is_near(&b, 1.0, FootprintShape::Circle));
    }
}
