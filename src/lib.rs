//! Furniture placement validation for 2D floor plans.
//!
//! Rooms are loaded from a floor-plan document, doors are derived from the
//! walls that neighbouring rooms share, and every furniture placement is
//! checked against the playfield, other furniture, room walls and door
//! clearance before it is committed.

pub mod api;
pub mod catalog;
pub mod config;
pub mod doors;
pub mod floor_plan;
pub mod geometry;
pub mod manager;
pub mod model;
pub mod rotation;
pub mod session;
pub mod types;
pub mod validator;
