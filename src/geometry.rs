//! Geometric helpers for 2D collision checks on the floor plan.
//!
//! This module offers the rectangle/rectangle and rectangle/disk tests used by
//! the placement validator and the overlap helpers used for door derivation.

use crate::types::{Point, Rect};

/// Checks whether two rectangles overlap with positive area.
///
/// Uses Axis-Aligned Bounding Box (AABB) collision detection with open
/// intervals: rectangles that only share an edge or a corner do NOT overlap.
///
/// # Parameters
/// * `a` - First rectangle
/// * `b` - Second rectangle
///
/// # Examples
/// ```
/// use floor_plan_designer::geometry::rectangles_overlap;
/// use floor_plan_designer::types::Rect;
///
/// let a = Rect::new(0.0, 0.0, 2.0, 2.0);
/// let b = Rect::new(2.0, 0.0, 2.0, 2.0);
/// assert!(!rectangles_overlap(&a, &b));
/// ```
pub fn rectangles_overlap(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

/// Clamps a point onto a rectangle.
///
/// The result is the point of the (closed) rectangle nearest to `point`; it is
/// `point` itself when the point lies inside.
pub fn closest_point_on_rectangle(point: Point, rect: &Rect) -> Point {
    Point::new(
        point.x.max(rect.left()).min(rect.right()),
        point.y.max(rect.top()).min(rect.bottom()),
    )
}

/// Checks whether a point lies inside a rectangle (edges included).
pub fn point_inside_rectangle(point: Point, rect: &Rect) -> bool {
    point.x >= rect.left()
        && point.x <= rect.right()
        && point.y >= rect.top()
        && point.y <= rect.bottom()
}

/// Checks whether `inner` lies completely within `outer`.
///
/// Equivalent to all four corners of `inner` being inside `outer`.
pub fn rectangle_contains(outer: &Rect, inner: &Rect) -> bool {
    point_inside_rectangle(inner.origin(), outer)
        && point_inside_rectangle(Point::new(inner.right(), inner.bottom()), outer)
}

/// Checks whether a rectangle reaches into an open disk.
///
/// Compares squared distances so no square root is needed. A rectangle whose
/// nearest point lies exactly on the circle does not intersect.
pub fn rectangle_intersects_disk(rect: &Rect, center: Point, radius: f64) -> bool {
    let closest = closest_point_on_rectangle(center, rect);
    closest.distance_squared(&center) < radius * radius
}

/// Calculates the overlap of two intervals in one dimension.
///
/// # Returns
/// Length of the overlap, at least 0.0
///
/// # Examples
/// ```
/// use floor_plan_designer::geometry::overlap_1d;
///
/// assert_eq!(overlap_1d(0.0, 5.0, 3.0, 8.0), 2.0);
/// assert_eq!(overlap_1d(0.0, 1.0, 3.0, 8.0), 0.0);
/// ```
pub fn overlap_1d(a1: f64, a2: f64, b1: f64, b2: f64) -> f64 {
    (a2.min(b2) - a1.max(b1)).max(0.0)
}

/// Midpoint of the common part of two intervals, if they share a segment of
/// positive length.
pub fn overlap_midpoint(a1: f64, a2: f64, b1: f64, b2: f64) -> Option<f64> {
    if overlap_1d(a1, a2, b1, b2) <= 0.0 {
        return None;
    }
    Some((a1.max(b1) + a2.min(b2)) / 2.0)
}
