//! Floor-plan ingestion.
//!
//! Floor-plan documents come from an XML-to-JSON conversion, so their shape is
//! loose: a single room may appear as an object instead of an array, numeric
//! attributes are strings, and `adjacentTo` may be missing, a single id or a
//! list of ids. This module normalizes such documents into strongly typed
//! [`Room`]s before any placement logic sees them.
//!
//! Expected layout:
//!
//! ```json
//! { "floorPlan": { "rooms": { "room": [
//!     { "@attributes": { "id": "living" },
//!       "position": { "@attributes": { "x": "0", "y": "0", "width": "10", "height": "6" } },
//!       "adjacentTo": ["kitchen"] }
//! ] } } }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::doors::derive_doors;
use crate::model::{Door, Room, ValidationError};
use crate::types::{Point, Rect};

static NEXT_FLOOR_PLAN_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one loaded floor-plan document.
///
/// Every load produces a new id, even for byte-identical documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub struct FloorPlanId(pub u64);

impl FloorPlanId {
    fn next() -> Self {
        Self(NEXT_FLOOR_PLAN_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Errors that prevent a floor-plan document from being loaded at all.
///
/// Structural problems never end up here; they degrade to an empty or
/// partial room set instead.
#[derive(Debug, Error)]
pub enum FloorPlanError {
    #[error("floor-plan document is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// A line between the centers of two declared neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
pub struct AdjacencyLink {
    pub from: Point,
    pub to: Point,
}

/// Immutable snapshot of a loaded floor plan.
///
/// The door set is derived once when the plan is built and shared by every
/// validation against this plan; a new plan (new identity) derives its own.
#[derive(Clone, Debug)]
pub struct FloorPlan {
    id: FloorPlanId,
    rooms: Vec<Room>,
    doors: Vec<Door>,
}

impl FloorPlan {
    /// Builds a plan from already normalized rooms.
    pub fn new(rooms: Vec<Room>) -> Self {
        let doors = derive_doors(&rooms);
        let id = FloorPlanId::next();
        debug!(
            plan = id.0,
            rooms = rooms.len(),
            doors = doors.len(),
            "floor plan built"
        );
        Self { id, rooms, doors }
    }

    /// A plan without rooms. Every placement against it fails the wall check.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Parses a floor-plan document from its JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, FloorPlanError> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_document(&value))
    }

    /// Normalizes an already parsed document.
    ///
    /// Never fails: unusable parts are logged and left out.
    pub fn from_document(document: &Value) -> Self {
        Self::new(parse_rooms(document))
    }

    pub fn id(&self) -> FloorPlanId {
        self.id
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    /// Looks up a room by id.
    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    /// Center-to-center links for every resolvable declared adjacency.
    pub fn adjacency_links(&self) -> Vec<AdjacencyLink> {
        self.rooms
            .iter()
            .flat_map(|room| {
                room.adjacent_to
                    .iter()
                    .filter_map(move |id| self.room(id))
                    .map(move |neighbour| AdjacencyLink {
                        from: room.rect.center(),
                        to: neighbour.rect.center(),
                    })
            })
            .collect()
    }
}

impl Default for FloorPlan {
    fn default() -> Self {
        Self::empty()
    }
}

/// Accepts either a single value or a list of values.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Numeric attribute given either as text or as a JSON number.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum NumericAttr {
    Number(f64),
    Text(String),
}

impl NumericAttr {
    fn parse(&self, name: &str) -> Result<f64, ValidationError> {
        match self {
            NumericAttr::Number(value) => Ok(*value),
            NumericAttr::Text(raw) => raw.trim().parse::<f64>().map_err(|err| {
                ValidationError::InvalidCoordinate(format!(
                    "{} ('{}') is not a number: {}",
                    name, raw, err
                ))
            }),
        }
    }
}

/// Identifier given either as text or as a bare JSON number.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum IdAttr {
    Text(String),
    Number(serde_json::Number),
}

impl IdAttr {
    fn into_string(self) -> String {
        match self {
            IdAttr::Text(text) => text,
            IdAttr::Number(number) => number.to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct RawDocument {
    #[serde(rename = "floorPlan")]
    floor_plan: Option<RawFloorPlan>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct RawFloorPlan {
    rooms: Option<RawRooms>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct RawRooms {
    room: Option<OneOrMany<Value>>,
}

#[derive(Deserialize, Debug)]
struct RawIdAttributes {
    id: IdAttr,
}

#[derive(Deserialize, Debug)]
struct RawRectAttributes {
    x: NumericAttr,
    y: NumericAttr,
    width: NumericAttr,
    height: NumericAttr,
}

#[derive(Deserialize, Debug)]
struct RawPosition {
    #[serde(rename = "@attributes")]
    attributes: RawRectAttributes,
}

#[derive(Deserialize, Debug)]
struct RawRoom {
    #[serde(rename = "@attributes")]
    attributes: RawIdAttributes,
    position: RawPosition,
    #[serde(rename = "adjacentTo", default)]
    adjacent_to: Option<OneOrMany<IdAttr>>,
}

impl RawRoom {
    fn into_room(self) -> Result<Room, ValidationError> {
        let attrs = &self.position.attributes;
        let rect = Rect::new(
            attrs.x.parse("x")?,
            attrs.y.parse("y")?,
            attrs.width.parse("width")?,
            attrs.height.parse("height")?,
        );
        let adjacent_to = self
            .adjacent_to
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .map(IdAttr::into_string)
            .collect();
        Room::new(self.attributes.id.into_string(), rect, adjacent_to)
    }
}

fn parse_rooms(document: &Value) -> Vec<Room> {
    let raw = match RawDocument::deserialize(document) {
        Ok(raw) => raw,
        Err(err) => {
            warn!("Floor-plan document has an unexpected shape ({err}); using no rooms.");
            return Vec::new();
        }
    };

    let entries = raw
        .floor_plan
        .and_then(|plan| plan.rooms)
        .and_then(|rooms| rooms.room)
        .map(OneOrMany::into_vec)
        .unwrap_or_default();

    if entries.is_empty() {
        warn!("Floor-plan document contains no rooms.");
    }

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let parsed = RawRoom::deserialize(&entry)
                .map_err(|err| ValidationError::Malformed(err.to_string()))
                .and_then(RawRoom::into_room);
            match parsed {
                Ok(room) => Some(room),
                Err(err) => {
                    warn!("Skipping room #{index}: {err}");
                    None
                }
            }
        })
        .collect()
}
