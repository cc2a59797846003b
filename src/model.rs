//! Data models for the floor-plan designer.
//!
//! This module defines the fundamental data structures for furniture placement:
//! - `Room`: An axis-aligned room rectangle with its declared neighbours
//! - `Door`: A doorway point derived from two rooms sharing a wall
//! - `FurnitureTemplate`: A catalog entry that can be placed
//! - `FurnitureItem`: A placed piece of furniture with position and rotation
//!
//! Placed items implement the `Dimensional` and `Positioned` traits from `types`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::rotation::{apply_delta, effective_footprint};
use crate::types::{Dimensional, Point, Positioned, Rect, Size};

/// Validation error for room and furniture data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("Malformed entry: {0}")]
    Malformed(String),
}

fn validate_dimension(value: f64, name: &str) -> Result<(), ValidationError> {
    if value <= 0.0 || !value.is_finite() {
        return Err(ValidationError::InvalidDimension(format!(
            "{} must be positive, got: {}",
            name, value
        )));
    }
    Ok(())
}

fn validate_coordinate(value: f64, name: &str) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidCoordinate(format!(
            "{} must be finite, got: {}",
            name, value
        )));
    }
    Ok(())
}

fn validate_identifier(value: &str, what: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::InvalidIdentifier(format!(
            "{} must not be empty",
            what
        )));
    }
    Ok(())
}

/// A room of the floor plan.
///
/// Adjacency is kept exactly as declared: `A -> B` does not imply `B -> A`.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct Room {
    pub id: String,
    pub rect: Rect,
    pub adjacent_to: Vec<String>,
}

impl Room {
    /// Creates a room after validating its geometry.
    ///
    /// # Examples
    /// ```
    /// use floor_plan_designer::model::Room;
    /// use floor_plan_designer::types::Rect;
    ///
    /// assert!(Room::new("living", Rect::new(0.0, 0.0, 5.0, 5.0), vec![]).is_ok());
    /// assert!(Room::new("living", Rect::new(0.0, 0.0, -5.0, 5.0), vec![]).is_err());
    /// ```
    pub fn new(
        id: impl Into<String>,
        rect: Rect,
        adjacent_to: Vec<String>,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        validate_identifier(&id, "Room id")?;
        validate_coordinate(rect.x, "Room x")?;
        validate_coordinate(rect.y, "Room y")?;
        validate_dimension(rect.width, "Room width")?;
        validate_dimension(rect.height, "Room height")?;
        Ok(Self {
            id,
            rect,
            adjacent_to,
        })
    }
}

/// A doorway point, derived from two rooms sharing a wall.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
pub struct Door {
    pub x: f64,
    pub y: f64,
}

impl Door {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Room category a catalog entry belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Bedroom,
    Living,
    Kitchen,
    Bathroom,
}

impl Category {
    pub fn code(&self) -> &'static str {
        match self {
            Category::Bedroom => "bedroom",
            Category::Living => "living",
            Category::Kitchen => "kitchen",
            Category::Bathroom => "bathroom",
        }
    }
}

/// A catalog entry that furniture items are created from.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct FurnitureTemplate {
    pub id: String,
    pub label: String,
    pub category: Category,
    pub color: String,
    pub w: f64,
    pub h: f64,
}

impl FurnitureTemplate {
    /// Creates a template after validating the footprint.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        category: Category,
        color: impl Into<String>,
        footprint: Size,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        validate_identifier(&id, "Template id")?;
        validate_dimension(footprint.w, "Width")?;
        validate_dimension(footprint.h, "Height")?;
        Ok(Self {
            id,
            label: label.into(),
            category,
            color: color.into(),
            w: footprint.w,
            h: footprint.h,
        })
    }

    /// Instantiates an unplaced item at `position` with rotation 0.
    pub fn instantiate(&self, key: impl Into<String>, position: Point) -> FurnitureItem {
        FurnitureItem {
            id: self.id.clone(),
            key: key.into(),
            label: self.label.clone(),
            category: self.category,
            color: self.color.clone(),
            w: self.w,
            h: self.h,
            x: position.x,
            y: position.y,
            rotation: 0,
        }
    }
}

/// A placed piece of furniture.
///
/// # Fields
/// * `key` - Unique key assigned at placement time, never changes afterwards
/// * `w`, `h` - Nominal (unrotated) footprint
/// * `x`, `y` - Top-left anchor in grid units
/// * `rotation` - Whole degrees in `[0, 360)`
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct FurnitureItem {
    pub id: String,
    pub key: String,
    pub label: String,
    pub category: Category,
    pub color: String,
    pub w: f64,
    pub h: f64,
    pub x: f64,
    pub y: f64,
    pub rotation: u16,
}

impl FurnitureItem {
    /// Footprint after applying the quarter-turn approximation.
    #[inline]
    pub fn effective_footprint(&self) -> Size {
        effective_footprint(self.dimensions(), self.rotation)
    }

    /// Effective footprint rectangle if the item were anchored at `anchor`.
    #[inline]
    pub fn rect_at(&self, anchor: Point) -> Rect {
        Rect::from_origin_and_size(anchor, self.effective_footprint())
    }

    /// Effective footprint rectangle at the current position.
    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect_at(self.position())
    }

    /// Moves the anchor without any validation.
    pub fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    /// Turns the item by a continuous delta without any validation.
    pub fn rotate_by(&mut self, delta_degrees: f64) {
        self.rotation = apply_delta(self.rotation, delta_degrees);
    }
}

impl Dimensional for FurnitureItem {
    fn dimensions(&self) -> Size {
        Size::new(self.w, self.h)
    }
}

impl Positioned for FurnitureItem {
    fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}
