//! Placement validation for furniture on a floor plan.
//!
//! This module decides whether an item may sit at a candidate position. The
//! rules run in a fixed order and the first failing rule decides the verdict:
//! 1. the effective footprint stays inside the playfield
//! 2. it does not overlap any other placed item
//! 3. it lies completely inside at least one room
//! 4. it keeps clear of every doorway's exclusion disk
//!
//! Validation is pure: it reads its inputs and mutates nothing.

use serde::Serialize;
use utoipa::ToSchema;

use crate::geometry::{rectangle_contains, rectangle_intersects_disk, rectangles_overlap};
use crate::model::{Door, FurnitureItem, Room};
use crate::types::{DOOR_RADIUS, PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH, Point, Rect};

/// Configuration for placement rules and placement defaults.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlacementConfig {
    /// Width of the overall floor area in grid units
    pub playfield_width: f64,
    /// Height of the overall floor area in grid units
    pub playfield_height: f64,
    /// Radius of the exclusion disk around each doorway
    pub door_radius: f64,
    /// Anchor at which newly added items are placed
    pub default_anchor: Point,
    /// Degrees of rotation per unit of vertical drag
    pub rotation_rate: f64,
}

impl PlacementConfig {
    pub const DEFAULT_PLAYFIELD_WIDTH: f64 = PLAYFIELD_WIDTH;
    pub const DEFAULT_PLAYFIELD_HEIGHT: f64 = PLAYFIELD_HEIGHT;
    pub const DEFAULT_DOOR_RADIUS: f64 = DOOR_RADIUS;
    pub const DEFAULT_ANCHOR: Point = Point::new(1.0, 1.0);
    pub const DEFAULT_ROTATION_RATE: f64 = 0.5;

    /// Creates a builder for custom configuration.
    pub fn builder() -> PlacementConfigBuilder {
        PlacementConfigBuilder::default()
    }

    /// The playfield as a rectangle anchored at the origin.
    pub fn playfield(&self) -> Rect {
        Rect::new(0.0, 0.0, self.playfield_width, self.playfield_height)
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            playfield_width: Self::DEFAULT_PLAYFIELD_WIDTH,
            playfield_height: Self::DEFAULT_PLAYFIELD_HEIGHT,
            door_radius: Self::DEFAULT_DOOR_RADIUS,
            default_anchor: Self::DEFAULT_ANCHOR,
            rotation_rate: Self::DEFAULT_ROTATION_RATE,
        }
    }
}

/// Builder for PlacementConfig.
#[derive(Clone, Debug, Default)]
pub struct PlacementConfigBuilder {
    config: PlacementConfig,
}

impl PlacementConfigBuilder {
    pub fn playfield_width(mut self, width: f64) -> Self {
        self.config.playfield_width = width;
        self
    }

    pub fn playfield_height(mut self, height: f64) -> Self {
        self.config.playfield_height = height;
        self
    }

    pub fn door_radius(mut self, radius: f64) -> Self {
        self.config.door_radius = radius;
        self
    }

    pub fn default_anchor(mut self, anchor: Point) -> Self {
        self.config.default_anchor = anchor;
        self
    }

    pub fn rotation_rate(mut self, rate: f64) -> Self {
        self.config.rotation_rate = rate;
        self
    }

    pub fn build(self) -> PlacementConfig {
        self.config
    }
}

/// Outcome of a validation, as a reason code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlacementReason {
    Accepted,
    OutOfBounds,
    FurnitureCollision,
    WallCollision,
    DoorwayBlocked,
}

impl PlacementReason {
    pub fn code(&self) -> &'static str {
        match self {
            PlacementReason::Accepted => "accepted",
            PlacementReason::OutOfBounds => "out_of_bounds",
            PlacementReason::FurnitureCollision => "furniture_collision",
            PlacementReason::WallCollision => "wall_collision",
            PlacementReason::DoorwayBlocked => "doorway_blocked",
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, PlacementReason::Accepted)
    }
}

impl std::fmt::Display for PlacementReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacementReason::Accepted => write!(f, "Placement valid"),
            PlacementReason::OutOfBounds => write!(f, "Error: Out of bounds"),
            PlacementReason::FurnitureCollision => write!(f, "Error: Furniture collision"),
            PlacementReason::WallCollision => write!(f, "Error: Wall collision"),
            PlacementReason::DoorwayBlocked => write!(f, "Error: Doorway blocked"),
        }
    }
}

/// Result of validating one candidate placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct Verdict {
    pub accepted: bool,
    pub reason: PlacementReason,
}

impl Verdict {
    pub const fn accepted() -> Self {
        Self {
            accepted: true,
            reason: PlacementReason::Accepted,
        }
    }

    pub const fn rejected(reason: PlacementReason) -> Self {
        Self {
            accepted: false,
            reason,
        }
    }

    /// Human-readable status line.
    pub fn message(&self) -> String {
        self.reason.to_string()
    }
}

/// Read-only view of everything a placement is checked against.
#[derive(Clone, Copy, Debug)]
pub struct PlacementContext<'a> {
    pub placed: &'a [FurnitureItem],
    pub rooms: &'a [Room],
    pub doors: &'a [Door],
    pub config: &'a PlacementConfig,
}

impl<'a> PlacementContext<'a> {
    pub fn new(
        placed: &'a [FurnitureItem],
        rooms: &'a [Room],
        doors: &'a [Door],
        config: &'a PlacementConfig,
    ) -> Self {
        Self {
            placed,
            rooms,
            doors,
            config,
        }
    }

    /// Validates `item` at `candidate`.
    ///
    /// The item's current rotation decides the effective footprint. An entry
    /// in `placed` carrying the same key is the item itself and is ignored.
    pub fn validate(&self, candidate: Point, item: &FurnitureItem) -> Verdict {
        let footprint = item.rect_at(candidate);

        if !rectangle_contains(&self.config.playfield(), &footprint) {
            return Verdict::rejected(PlacementReason::OutOfBounds);
        }

        let collides = self
            .placed
            .iter()
            .filter(|other| other.key != item.key)
            .any(|other| rectangles_overlap(&footprint, &other.rect()));
        if collides {
            return Verdict::rejected(PlacementReason::FurnitureCollision);
        }

        let inside_room = self
            .rooms
            .iter()
            .any(|room| rectangle_contains(&room.rect, &footprint));
        if !inside_room {
            return Verdict::rejected(PlacementReason::WallCollision);
        }

        let blocks_door = self
            .doors
            .iter()
            .any(|door| {
                rectangle_intersects_disk(&footprint, door.point(), self.config.door_radius)
            });
        if blocks_door {
            return Verdict::rejected(PlacementReason::DoorwayBlocked);
        }

        Verdict::accepted()
    }
}

/// Validates a candidate placement with explicit inputs.
///
/// # Parameters
/// * `candidate` - Proposed top-left anchor
/// * `item` - Item to place (its key excludes it from the collision check)
/// * `placed` - Items currently on the floor
/// * `rooms` - Rooms of the loaded floor plan
/// * `doors` - Doorways derived from the floor plan
/// * `config` - Playfield bounds and door radius
pub fn validate_placement(
    candidate: Point,
    item: &FurnitureItem,
    placed: &[FurnitureItem],
    rooms: &[Room],
    doors: &[Door],
    config: &PlacementConfig,
) -> Verdict {
    PlacementContext::new(placed, rooms, doors, config).validate(candidate, item)
}

/// Like `validate_placement`, with the default playfield and door radius.
pub fn validate_position(
    candidate: Point,
    item: &FurnitureItem,
    placed: &[FurnitureItem],
    rooms: &[Room],
    doors: &[Door],
) -> Verdict {
    validate_placement(
        candidate,
        item,
        placed,
        rooms,
        doors,
        &PlacementConfig::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, FurnitureTemplate};
    use crate::types::{Rect, Size};

    fn item(key: &str, w: f64, h: f64, x: f64, y: f64) -> FurnitureItem {
        FurnitureTemplate::new("box", "Box", Category::Living, "#ccc", Size::new(w, h))
            .unwrap()
            .instantiate(key, Point::new(x, y))
    }

    fn room(id: &str, rect: Rect) -> Room {
        Room::new(id, rect, vec![]).unwrap()
    }

    fn living() -> Vec<Room> {
        vec![room("living", Rect::new(0.0, 0.0, 5.0, 5.0))]
    }

    #[test]
    fn accepts_item_inside_single_room() {
        let candidate = item("a", 2.0, 2.0, 0.0, 0.0);
        let verdict = validate_position(Point::new(1.0, 1.0), &candidate, &[], &living(), &[]);
        assert_eq!(verdict, Verdict::accepted());
        assert_eq!(verdict.message(), "Placement valid");
    }

    #[test]
    fn rejects_item_exceeding_room() {
        let candidate = item("a", 2.0, 2.0, 0.0, 0.0);
        let verdict = validate_position(Point::new(4.0, 4.0), &candidate, &[], &living(), &[]);
        assert_eq!(verdict, Verdict::rejected(PlacementReason::WallCollision));
    }

    #[test]
    fn rejects_overlap_with_other_furniture() {
        let placed = vec![item("a", 2.0, 2.0, 1.0, 1.0), item("b", 2.0, 2.0, 3.0, 1.0)];
        let candidate = item("c", 2.0, 2.0, 0.0, 0.0);
        let verdict = validate_position(Point::new(1.0, 1.0), &candidate, &placed, &living(), &[]);
        assert_eq!(verdict.reason, PlacementReason::FurnitureCollision);
        assert!(!verdict.accepted);
    }

    #[test]
    fn edge_touching_furniture_is_allowed() {
        let placed = vec![item("a", 2.0, 2.0, 1.0, 1.0)];
        let candidate = item("b", 2.0, 2.0, 0.0, 0.0);
        let verdict = validate_position(Point::new(3.0, 1.0), &candidate, &placed, &living(), &[]);
        assert!(verdict.accepted);
    }

    #[test]
    fn item_does_not_collide_with_itself() {
        let placed = vec![item("a", 2.0, 2.0, 1.0, 1.0)];
        let verdict = validate_position(Point::new(1.5, 1.0), &placed[0], &placed, &living(), &[]);
        assert!(verdict.accepted);
    }

    #[test]
    fn rejects_blocked_doorway() {
        let rooms = vec![room("hall", Rect::new(0.0, 0.0, 10.0, 10.0))];
        let doors = vec![Door::new(5.0, 2.0)];
        let candidate = item("a", 2.0, 2.0, 0.0, 0.0);
        let verdict = validate_position(Point::new(4.0, 1.0), &candidate, &[], &rooms, &doors);
        assert_eq!(verdict.reason, PlacementReason::DoorwayBlocked);
    }

    #[test]
    fn item_exactly_one_radius_from_door_is_allowed() {
        let rooms = vec![room("hall", Rect::new(0.0, 0.0, 10.0, 10.0))];
        let doors = vec![Door::new(5.0, 2.0)];
        let candidate = item("a", 2.0, 2.0, 0.0, 0.0);
        // Right edge at x = 4, exactly one unit left of the door.
        let verdict = validate_position(Point::new(2.0, 1.0), &candidate, &[], &rooms, &doors);
        assert!(verdict.accepted);
    }

    #[test]
    fn out_of_bounds_wins_over_every_other_rule() {
        let rooms = vec![room("huge", Rect::new(-5.0, -5.0, 40.0, 40.0))];
        let placed = vec![item("a", 2.0, 2.0, 19.0, 13.0)];
        let candidate = item("b", 2.0, 2.0, 0.0, 0.0);
        let verdict = validate_position(Point::new(19.0, 13.0), &candidate, &placed, &rooms, &[]);
        assert_eq!(verdict.reason, PlacementReason::OutOfBounds);

        let verdict = validate_position(Point::new(-0.5, 0.0), &candidate, &[], &rooms, &[]);
        assert_eq!(verdict.reason, PlacementReason::OutOfBounds);
    }

    #[test]
    fn furniture_collision_wins_over_wall_and_door() {
        let placed = vec![item("a", 2.0, 2.0, 4.0, 4.0)];
        let doors = vec![Door::new(5.0, 5.0)];
        let candidate = item("b", 2.0, 2.0, 0.0, 0.0);
        let verdict = validate_position(Point::new(4.0, 4.0), &candidate, &placed, &living(), &doors);
        assert_eq!(verdict.reason, PlacementReason::FurnitureCollision);
    }

    #[test]
    fn wall_collision_wins_over_door() {
        let doors = vec![Door::new(5.0, 2.0)];
        let candidate = item("a", 2.0, 2.0, 0.0, 0.0);
        let verdict = validate_position(Point::new(4.0, 1.0), &candidate, &[], &living(), &doors);
        assert_eq!(verdict.reason, PlacementReason::WallCollision);
    }

    #[test]
    fn spanning_two_adjacent_rooms_is_rejected() {
        let rooms = vec![
            room("a", Rect::new(0.0, 0.0, 4.0, 4.0)),
            room("b", Rect::new(4.0, 0.0, 4.0, 4.0)),
        ];
        let candidate = item("x", 2.0, 1.0, 0.0, 0.0);
        let verdict = validate_position(Point::new(3.0, 0.0), &candidate, &[], &rooms, &[]);
        assert_eq!(verdict.reason, PlacementReason::WallCollision);

        let verdict = validate_position(Point::new(4.0, 0.0), &candidate, &[], &rooms, &[]);
        assert!(verdict.accepted);
    }

    #[test]
    fn no_rooms_means_wall_collision() {
        let candidate = item("a", 1.0, 1.0, 0.0, 0.0);
        let verdict = validate_position(Point::new(1.0, 1.0), &candidate, &[], &[], &[]);
        assert_eq!(verdict.reason, PlacementReason::WallCollision);
    }

    #[test]
    fn rotation_swaps_footprint_for_every_check() {
        let rooms = vec![room("narrow", Rect::new(0.0, 0.0, 2.0, 5.0))];
        let mut candidate = item("a", 3.0, 1.0, 0.0, 0.0);
        let verdict = validate_position(Point::new(0.0, 0.0), &candidate, &[], &rooms, &[]);
        assert_eq!(verdict.reason, PlacementReason::WallCollision);

        candidate.rotate_by(90.0);
        let verdict = validate_position(Point::new(0.0, 0.0), &candidate, &[], &rooms, &[]);
        assert!(verdict.accepted);
    }

    #[test]
    fn others_collide_with_their_effective_footprint() {
        let mut other = item("a", 3.0, 1.0, 0.0, 0.0);
        other.rotate_by(90.0);
        // Rotated, `other` covers [0,1]x[0,3].
        let placed = vec![other];
        let candidate = item("b", 1.0, 1.0, 0.0, 0.0);
        let rooms = vec![room("r", Rect::new(0.0, 0.0, 5.0, 5.0))];

        let verdict = validate_position(Point::new(0.0, 2.0), &candidate, &placed, &rooms, &[]);
        assert_eq!(verdict.reason, PlacementReason::FurnitureCollision);
        let verdict = validate_position(Point::new(2.0, 0.0), &candidate, &placed, &rooms, &[]);
        assert!(verdict.accepted);
    }

    #[test]
    fn custom_config_changes_bounds_and_radius() {
        let config = PlacementConfig::builder()
            .playfield_width(4.0)
            .playfield_height(4.0)
            .door_radius(0.25)
            .build();
        let rooms = vec![room("r", Rect::new(0.0, 0.0, 10.0, 10.0))];
        let doors = vec![Door::new(5.0, 2.0)];
        let candidate = item("a", 2.0, 2.0, 0.0, 0.0);

        let verdict =
            validate_placement(Point::new(3.0, 0.0), &candidate, &[], &rooms, &doors, &config);
        assert_eq!(verdict.reason, PlacementReason::OutOfBounds);

        let small_radius = PlacementConfig::builder().door_radius(0.25).build();
        let verdict =
            validate_placement(Point::new(2.75, 1.0), &candidate, &[], &rooms, &doors, &small_radius);
        assert!(verdict.accepted);
    }

    #[test]
    fn reason_codes_are_stable() {
        assert_eq!(PlacementReason::OutOfBounds.code(), "out_of_bounds");
        assert_eq!(PlacementReason::DoorwayBlocked.to_string(), "Error: Doorway blocked");
        assert!(PlacementReason::Accepted.is_accepted());
        assert!(!PlacementReason::WallCollision.is_accepted());
    }
}
