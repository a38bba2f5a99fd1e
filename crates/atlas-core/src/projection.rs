//! Isometric projection between grid space and screen space.
//!
//! The projection is the classic 2:1 diamond mapping:
//!
//! ```text
//! screen.x = (grid.x - grid.y) * tile_width  / 2 + origin.x
//! screen.y = (grid.x + grid.y) * tile_height / 2 + origin.y
//! ```
//!
//! and its exact inverse. Pointer deltas are converted with the linear part
//! only (no origin), see [`IsoProjection::delta_to_grid`].

use crate::geometry::{GeometryError, Point};

/// Bijective grid/screen mapping for an isometric map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsoProjection {
    half_width: f32,
    half_height: f32,
    origin: Point,
}

impl IsoProjection {
    /// Creates a projection for tiles of the given screen width and height.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonFinite`] when a tile dimension is not a
    /// finite, strictly positive number.
    pub fn new(tile_width: f32, tile_height: f32) -> Result<Self, GeometryError> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(tile_width) || !valid(tile_height) {
            return Err(GeometryError::NonFinite {
                x: tile_width,
                y: tile_height,
            });
        }
        Ok(Self {
            half_width: tile_width / 2.0,
            half_height: tile_height / 2.0,
            origin: Point::default(),
        })
    }

    /// Sets the screen position of grid cell `(0, 0)`.
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    /// Screen width of one tile.
    pub fn tile_width(&self) -> f32 {
        self.half_width * 2.0
    }

    /// Screen height of one tile.
    pub fn tile_height(&self) -> f32 {
        self.half_height * 2.0
    }

    /// Projects a grid position to screen space.
    ///
    /// ```
    /// # use atlas_core::projection::IsoProjection;
    /// # use atlas_core::geometry::Point;
    /// let projection = IsoProjection::new(64.0, 32.0).unwrap();
    /// let screen = projection.to_screen(Point::new(1.0, 0.0)).unwrap();
    /// assert_eq!(screen, Point::new(32.0, 16.0));
    /// ```
    pub fn to_screen(&self, grid: Point) -> Result<Point, GeometryError> {
        let linear = self.linear_to_screen(grid.finite()?);
        Ok(linear.add_point(self.origin))
    }

    /// Maps a screen position back to grid space.
    pub fn to_grid(&self, screen: Point) -> Result<Point, GeometryError> {
        let local = screen.finite()?.sub_point(self.origin);
        Ok(self.linear_to_grid(local))
    }

    /// Converts a screen-space pointer delta into a grid-space delta.
    pub fn delta_to_grid(&self, delta: Point) -> Result<Point, GeometryError> {
        Ok(self.linear_to_grid(delta.finite()?))
    }

    fn linear_to_screen(&self, grid: Point) -> Point {
        Point::new(
            (grid.x() - grid.y()) * self.half_width,
            (grid.x() + grid.y()) * self.half_height,
        )
    }

    fn linear_to_grid(&self, screen: Point) -> Point {
        let u = screen.x() / self.half_width;
        let v = screen.y() / self.half_height;
        Point::new((v + u) / 2.0, (v - u) / 2.0)
    }
}
