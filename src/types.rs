//! Common types and traits for 2D floor-plan geometry.
//!
//! Everything here is expressed in grid units, the floor plan's native
//! length unit. Pixel scales belong to the rendering side and never show up
//! in these types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Width of the fixed playfield in grid units.
pub const PLAYFIELD_WIDTH: f64 = 20.0;

/// Height of the fixed playfield in grid units.
pub const PLAYFIELD_HEIGHT: f64 = 14.0;

/// Radius of the no-placement disk around every doorway.
pub const DOOR_RADIUS: f64 = 1.0;

/// Snap resolution for positions (half a grid unit).
pub const GRID_SNAP: f64 = 0.5;

/// Represents a 2D point in grid units.
///
/// # Examples
/// ```
/// use floor_plan_designer::types::Point;
///
/// let door = Point::new(4.0, 2.0);
/// assert_eq!(door.distance_squared(&Point::new(1.0, 6.0)), 25.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Doorway checks compare against a squared radius, so no square root
    /// is ever taken on the hot path.
    #[inline]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Width/height pair of an axis-aligned footprint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Size {
    pub w: f64,
    pub h: f64,
}

impl Size {
    #[inline]
    pub const fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    /// Returns the footprint turned by a quarter (width and height swapped).
    #[inline]
    pub const fn swapped(&self) -> Self {
        Self::new(self.h, self.w)
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from its anchor and extent.
    #[inline]
    pub const fn from_origin_and_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.w, size.h)
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns the center point.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Trait for objects with a 2D footprint.
pub trait Dimensional {
    /// Returns the nominal (unrotated) footprint.
    fn dimensions(&self) -> Size;
}

/// Trait for objects anchored somewhere on the floor.
pub trait Positioned {
    /// Returns the top-left anchor.
    fn position(&self) -> Point;
}

/// Rounds a coordinate to the nearest half grid unit.
///
/// ```
/// use floor_plan_designer::types::snap_to_half_unit;
///
/// assert_eq!(snap_to_half_unit(1.26), 1.5);
/// assert_eq!(snap_to_half_unit(3.74), 3.5);
/// ```
#[inline]
pub fn snap_to_half_unit(value: f64) -> f64 {
    (value / GRID_SNAP).round() * GRID_SNAP
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(4.0, 6.0);
        assert_eq!(a.distance_squared(&b), 25.0);
        assert_eq!(b.distance_squared(&a), 25.0);
        assert_eq!(a.distance_squared(&a), 0.0);
    }

    #[test]
    fn test_size_swap() {
        let size = Size::new(2.0, 3.0);
        assert_eq!(size.swapped(), Size::new(3.0, 2.0));
        assert_eq!(size.swapped().swapped(), size);
    }

    #[test]
    fn test_rect_edges_and_center() {
        let rect = Rect::new(4.0, 1.0, 2.0, 3.0);
        assert_eq!(rect.right(), 6.0);
        assert_eq!(rect.bottom(), 4.0);
        assert_eq!(rect.center(), Point::new(5.0, 2.5));
        assert_eq!(
            Rect::from_origin_and_size(rect.origin(), Size::new(2.0, 3.0)),
            rect
        );
    }

    #[test]
    fn test_snap_to_half_unit() {
        assert_eq!(snap_to_half_unit(0.0), 0.0);
        assert_eq!(snap_to_half_unit(0.24), 0.0);
        assert_eq!(snap_to_half_unit(0.26), 0.5);
        assert_eq!(snap_to_half_unit(2.75), 3.0);
        assert_eq!(snap_to_half_unit(-0.3), -0.5);
    }
}
