//! Doorway derivation from room adjacency.
//!
//! A door is placed on the wall shared by a room and each neighbour it
//! declares: at the neighbour's left edge when the room's right edge touches
//! it, or at the neighbour's top edge when the room's bottom edge touches it.
//! The door sits in the middle of the shared wall segment.

use std::collections::HashMap;

use tracing::trace;

use crate::geometry::overlap_midpoint;
use crate::model::{Door, Room};

/// Computes the door for one directed `(room, neighbour)` pair.
///
/// Returns `None` when the rooms do not share a collinear wall segment of
/// positive length in the declared direction (diagonal, disjoint or only
/// touching at a corner).
pub fn door_between(room: &Room, neighbour: &Room) -> Option<Door> {
    let a = &room.rect;
    let b = &neighbour.rect;

    if a.right() == b.left() {
        if let Some(y) = overlap_midpoint(a.top(), a.bottom(), b.top(), b.bottom()) {
            return Some(Door::new(b.left(), y));
        }
    }

    if a.bottom() == b.top() {
        if let Some(x) = overlap_midpoint(a.left(), a.right(), b.left(), b.right()) {
            return Some(Door::new(x, b.top()));
        }
    }

    None
}

/// Derives all doorway points of a room set.
///
/// Every declared adjacency is treated as a directed edge. Neighbour ids that
/// do not resolve to a room are skipped, as are pairs that share no wall.
/// Points are deduplicated by exact coordinate equality and returned in
/// discovery order.
///
/// # Examples
/// ```
/// use floor_plan_designer::doors::derive_doors;
/// use floor_plan_designer::model::{Door, Room};
/// use floor_plan_designer::types::Rect;
///
/// let a = Room::new("a", Rect::new(0.0, 0.0, 4.0, 4.0), vec!["b".into()]).unwrap();
/// let b = Room::new("b", Rect::new(4.0, 0.0, 4.0, 4.0), vec!["a".into()]).unwrap();
/// assert_eq!(derive_doors(&[a, b]), vec![Door::new(4.0, 2.0)]);
/// ```
pub fn derive_doors(rooms: &[Room]) -> Vec<Door> {
    let by_id: HashMap<&str, &Room> = rooms.iter().map(|r| (r.id.as_str(), r)).collect();
    let mut doors: Vec<Door> = Vec::new();

    for room in rooms {
        for neighbour_id in &room.adjacent_to {
            let Some(neighbour) = by_id.get(neighbour_id.as_str()) else {
                trace!(room = %room.id, neighbour = %neighbour_id, "unknown neighbour skipped");
                continue;
            };

            match door_between(room, neighbour) {
                Some(door) => {
                    if !doors.iter().any(|d| d.x == door.x && d.y == door.y) {
                        doors.push(door);
                    }
                }
                None => {
                    trace!(room = %room.id, neighbour = %neighbour_id, "no shared wall");
                }
            }
        }
    }

    doors
}
