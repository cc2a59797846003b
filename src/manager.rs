//! Placement state: the collection of placed furniture and the selection.
//!
//! `PlacementManager` is the only owner of placed items. Every mutation goes
//! through the validator first, so the collection always holds a valid
//! configuration:
//! - `add` places a new item at the default anchor, or does not place it at all
//! - `move_item` commits a valid move, and deletes the item on an invalid one
//! - `rotate` changes rotation without validation; the next move re-checks
//! - `clear` empties everything

use tracing::{debug, info, warn};

use crate::floor_plan::FloorPlan;
use crate::model::{FurnitureItem, FurnitureTemplate};
use crate::types::Point;
use crate::validator::{PlacementConfig, PlacementContext, Verdict};

/// Status shown before anything happened.
pub const INITIAL_STATUS: &str = "Drag furniture to the map";

/// Status after an add was refused.
pub const STARTING_AREA_BLOCKED: &str = "The starting area is blocked.";

/// Result of adding a template.
#[derive(Clone, Debug, PartialEq)]
pub enum AddOutcome {
    Added(FurnitureItem),
    Rejected { template_id: String, verdict: Verdict },
}

/// Result of moving an item.
#[derive(Clone, Debug, PartialEq)]
pub enum MoveOutcome {
    Moved(FurnitureItem),
    /// The move was invalid and the item is gone.
    Removed {
        item: FurnitureItem,
        verdict: Verdict,
        was_selected: bool,
    },
    UnknownKey,
}

/// Result of changing an item's rotation.
#[derive(Clone, Debug, PartialEq)]
pub enum RotateOutcome {
    Rotated(FurnitureItem),
    UnknownKey,
}

/// Owns placed furniture, the selected key and the status line.
#[derive(Clone, Debug)]
pub struct PlacementManager {
    items: Vec<FurnitureItem>,
    selected: Option<String>,
    status: String,
    next_sequence: u64,
    config: PlacementConfig,
}

impl Default for PlacementManager {
    fn default() -> Self {
        Self::new(PlacementConfig::default())
    }
}

impl PlacementManager {
    pub fn new(config: PlacementConfig) -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            status: INITIAL_STATUS.to_string(),
            next_sequence: 1,
            config,
        }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Placed items in placement order.
    pub fn items(&self) -> &[FurnitureItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&FurnitureItem> {
        self.items.iter().find(|item| item.key == key)
    }

    pub fn selected_key(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_item(&self) -> Option<&FurnitureItem> {
        self.selected_key().and_then(|key| self.get(key))
    }

    pub fn status_message(&self) -> &str {
        &self.status
    }

    /// Validates `item` at `candidate` against the current collection.
    pub fn check(&self, item: &FurnitureItem, candidate: Point, plan: &FloorPlan) -> Verdict {
        PlacementContext::new(&self.items, plan.rooms(), plan.doors(), &self.config)
            .validate(candidate, item)
    }

    fn next_key(&mut self, template_id: &str) -> String {
        let key = format!("{}-{}", template_id, self.next_sequence);
        self.next_sequence += 1;
        key
    }

    /// Places a new item from `template` at the default anchor.
    ///
    /// A rejected item never enters the collection.
    pub fn add(&mut self, template: &FurnitureTemplate, plan: &FloorPlan) -> AddOutcome {
        let anchor = self.config.default_anchor;
        let key = self.next_key(&template.id);
        let item = template.instantiate(key, anchor);
        let verdict = self.check(&item, anchor, plan);

        if !verdict.accepted {
            info!(
                template = %template.id,
                reason = verdict.reason.code(),
                "add rejected"
            );
            self.status = STARTING_AREA_BLOCKED.to_string();
            return AddOutcome::Rejected {
                template_id: template.id.clone(),
                verdict,
            };
        }

        debug!(key = %item.key, "item added");
        self.items.push(item.clone());
        AddOutcome::Added(item)
    }

    /// Moves an item, or removes it when the target is invalid.
    ///
    /// The item's current rotation is used. An unknown key changes nothing.
    pub fn move_item(&mut self, key: &str, target: Point, plan: &FloorPlan) -> MoveOutcome {
        let Some(index) = self.items.iter().position(|item| item.key == key) else {
            warn!(key, "move ignored: no such item");
            return MoveOutcome::UnknownKey;
        };

        let verdict = self.check(&self.items[index], target, plan);
        self.status = verdict.message();

        if verdict.accepted {
            let item = &mut self.items[index];
            item.set_position(target);
            debug!(key, x = target.x, y = target.y, "item moved");
            return MoveOutcome::Moved(item.clone());
        }

        let item = self.items.remove(index);
        let was_selected = self.selected.as_deref() == Some(key);
        if was_selected {
            self.selected = None;
        }
        info!(key, reason = verdict.reason.code(), "invalid move, item removed");
        MoveOutcome::Removed {
            item,
            verdict,
            was_selected,
        }
    }

    /// Turns an item by `delta_degrees` without validating the result.
    pub fn rotate(&mut self, key: &str, delta_degrees: f64) -> RotateOutcome {
        self.update_rotation(key, |item| item.rotate_by(delta_degrees))
    }

    /// Turns an item by a vertical drag distance at the configured rate.
    pub fn rotate_by_drag(&mut self, key: &str, drag_distance: f64) -> RotateOutcome {
        let delta = drag_distance * self.config.rotation_rate;
        self.rotate(key, delta)
    }

    /// Puts an item back to rotation 0 without validating the result.
    pub fn reset_rotation(&mut self, key: &str) -> RotateOutcome {
        self.update_rotation(key, |item| item.rotation = 0)
    }

    fn update_rotation(
        &mut self,
        key: &str,
        update: impl FnOnce(&mut FurnitureItem),
    ) -> RotateOutcome {
        match self.items.iter_mut().find(|item| item.key == key) {
            Some(item) => {
                update(item);
                debug!(key, rotation = item.rotation, "item rotated");
                RotateOutcome::Rotated(item.clone())
            }
            None => {
                warn!(key, "rotation ignored: no such item");
                RotateOutcome::UnknownKey
            }
        }
    }

    /// Selects an item, or clears the selection with `None`.
    ///
    /// Selecting a key that is not placed clears the selection. Returns
    /// whether something is selected afterwards.
    pub fn select(&mut self, key: Option<&str>) -> bool {
        self.selected = key
            .filter(|key| self.items.iter().any(|item| item.key == *key))
            .map(str::to_owned);
        self.selected.is_some()
    }

    /// Removes every item and the selection. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        self.selected = None;
        debug!(removed, "placement cleared");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_template;
    use crate::model::{Category, Room};
    use crate::types::{Positioned, Rect, Size};
    use crate::validator::PlacementReason;

    fn plan_with(rooms: Vec<Room>) -> FloorPlan {
        FloorPlan::new(rooms)
    }

    fn living_plan() -> FloorPlan {
        plan_with(vec![
            Room::new("living", Rect::new(0.0, 0.0, 10.0, 8.0), vec![]).unwrap(),
        ])
    }

    fn square(side: f64) -> FurnitureTemplate {
        FurnitureTemplate::new("box", "Box", Category::Living, "#ccc", Size::new(side, side))
            .unwrap()
    }

    fn added_key(outcome: AddOutcome) -> String {
        match outcome {
            AddOutcome::Added(item) => item.key,
            other => panic!("expected item to be added, got {:?}", other),
        }
    }

    #[test]
    fn add_places_item_at_default_anchor() {
        let plan = living_plan();
        let mut manager = PlacementManager::default();
        let bed = find_template("bed").unwrap();

        let key = added_key(manager.add(bed, &plan));
        let item = manager.get(&key).unwrap();
        assert_eq!((item.x, item.y), (1.0, 1.0));
        assert_eq!(item.rotation, 0);
        assert!(key.starts_with("bed-"));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn keys_are_unique() {
        let plan = plan_with(vec![
            Room::new("hall", Rect::new(0.0, 0.0, 20.0, 14.0), vec![]).unwrap(),
        ]);
        let mut manager = PlacementManager::default();
        let tpl = square(1.0);

        let first = added_key(manager.add(&tpl, &plan));
        let _ = manager.move_item(&first, Point::new(5.0, 5.0), &plan);
        let second = added_key(manager.add(&tpl, &plan));
        assert_ne!(first, second);
    }

    #[test]
    fn add_into_invalid_anchor_leaves_collection_empty() {
        // The only room starts right of the default anchor.
        let plan = plan_with(vec![
            Room::new("far", Rect::new(5.0, 5.0, 5.0, 5.0), vec![]).unwrap(),
        ]);
        let mut manager = PlacementManager::default();

        let outcome = manager.add(&square(2.0), &plan);
        match outcome {
            AddOutcome::Rejected { verdict, .. } => {
                assert_eq!(verdict.reason, PlacementReason::WallCollision)
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert!(manager.is_empty());
        assert_eq!(manager.status_message(), STARTING_AREA_BLOCKED);
    }

    #[test]
    fn add_onto_occupied_anchor_is_rejected() {
        let plan = living_plan();
        let mut manager = PlacementManager::default();
        let tpl = square(2.0);

        let _ = added_key(manager.add(&tpl, &plan));
        let outcome = manager.add(&tpl, &plan);
        assert!(matches!(
            outcome,
            AddOutcome::Rejected { verdict, .. }
                if verdict.reason == PlacementReason::FurnitureCollision
        ));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn valid_move_updates_position_in_place() {
        let plan = living_plan();
        let mut manager = PlacementManager::default();
        let key = added_key(manager.add(&square(2.0), &plan));

        let outcome = manager.move_item(&key, Point::new(4.5, 3.0), &plan);
        assert!(matches!(outcome, MoveOutcome::Moved(_)));
        let item = manager.get(&key).unwrap();
        assert_eq!((item.x, item.y), (4.5, 3.0));
        assert_eq!(manager.status_message(), "Placement valid");
    }

    #[test]
    fn invalid_move_removes_item_and_clears_selection() {
        let plan = living_plan();
        let mut manager = PlacementManager::default();
        let key = added_key(manager.add(&square(2.0), &plan));
        assert!(manager.select(Some(&key)));

        let outcome = manager.move_item(&key, Point::new(9.0, 1.0), &plan);
        match outcome {
            MoveOutcome::Removed {
                verdict,
                was_selected,
                ..
            } => {
                assert_eq!(verdict.reason, PlacementReason::WallCollision);
                assert!(was_selected);
            }
            other => panic!("expected removal, got {:?}", other),
        }
        assert!(manager.get(&key).is_none());
        assert!(manager.selected_key().is_none());
        assert_eq!(manager.status_message(), "Error: Wall collision");
    }

    #[test]
    fn invalid_move_keeps_selection_of_other_item() {
        let plan = living_plan();
        let mut manager = PlacementManager::default();
        let tpl = square(1.0);
        let first = added_key(manager.add(&tpl, &plan));
        let _ = manager.move_item(&first, Point::new(6.0, 6.0), &plan);
        let second = added_key(manager.add(&tpl, &plan));
        manager.select(Some(&first));

        let outcome = manager.move_item(&second, Point::new(6.0, 6.0), &plan);
        assert!(matches!(
            outcome,
            MoveOutcome::Removed { was_selected: false, .. }
        ));
        assert_eq!(manager.selected_key(), Some(first.as_str()));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn moving_unknown_key_is_a_no_op() {
        let plan = living_plan();
        let mut manager = PlacementManager::default();
        let key = added_key(manager.add(&square(1.0), &plan));

        assert_eq!(
            manager.move_item("ghost-1", Point::new(3.0, 3.0), &plan),
            MoveOutcome::UnknownKey
        );
        assert_eq!(manager.len(), 1);
        assert!(manager.get(&key).is_some());
        assert_eq!(manager.status_message(), INITIAL_STATUS);
    }

    #[test]
    fn rotation_is_not_validated_until_next_move() {
        let plan = plan_with(vec![
            Room::new("narrow", Rect::new(0.0, 0.0, 5.0, 3.0), vec![]).unwrap(),
        ]);
        let mut manager = PlacementManager::default();
        let sofa = find_template("sofa").unwrap();
        let key = added_key(manager.add(sofa, &plan));

        // Rotated, the sofa is 1x3 and sticks out of the room at (1,1).
        assert!(matches!(manager.rotate(&key, 90.0), RotateOutcome::Rotated(_)));
        assert_eq!(manager.get(&key).unwrap().rotation, 90);
        assert_eq!(manager.len(), 1);

        let outcome = manager.move_item(&key, Point::new(1.0, 1.0), &plan);
        assert!(matches!(outcome, MoveOutcome::Removed { .. }));
        assert!(manager.is_empty());
    }

    #[test]
    fn rotate_by_drag_uses_rate_and_reset_returns_to_zero() {
        let plan = living_plan();
        let mut manager = PlacementManager::default();
        let key = added_key(manager.add(&square(1.0), &plan));

        let _ = manager.rotate_by_drag(&key, 100.0);
        assert_eq!(manager.get(&key).unwrap().rotation, 50);
        let _ = manager.rotate_by_drag(&key, -120.0);
        assert_eq!(manager.get(&key).unwrap().rotation, 350);

        let _ = manager.reset_rotation(&key);
        assert_eq!(manager.get(&key).unwrap().rotation, 0);
        assert_eq!(manager.rotate("ghost", 10.0), RotateOutcome::UnknownKey);
    }

    #[test]
    fn select_only_accepts_placed_keys() {
        let plan = living_plan();
        let mut manager = PlacementManager::default();
        let key = added_key(manager.add(&square(1.0), &plan));

        assert!(manager.select(Some(&key)));
        assert_eq!(manager.selected_item().map(|i| i.key.as_str()), Some(key.as_str()));
        assert!(!manager.select(Some("ghost")));
        assert!(manager.selected_key().is_none());
        manager.select(Some(&key));
        assert!(!manager.select(None));
        assert!(manager.selected_key().is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let plan = living_plan();
        let mut manager = PlacementManager::default();
        let key = added_key(manager.add(&square(1.0), &plan));
        manager.select(Some(&key));

        assert_eq!(manager.clear(), 1);
        assert!(manager.is_empty());
        assert!(manager.selected_key().is_none());
        assert_eq!(manager.clear(), 0);
        assert!(manager.is_empty());
    }

    #[test]
    fn collection_stays_valid_after_mixed_operations() {
        let plan = living_plan();
        let mut manager = PlacementManager::default();
        let tpl = square(2.0);

        for target in [(3.0, 1.0), (5.0, 1.0), (7.0, 1.0), (1.0, 4.0), (9.0, 9.0)] {
            if let AddOutcome::Added(item) = manager.add(&tpl, &plan) {
                let _ = manager.move_item(&item.key, Point::new(target.0, target.1), &plan);
            }
        }

        for item in manager.items() {
            let verdict = manager.check(item, item.position(), &plan);
            assert!(verdict.accepted, "{} is in an invalid spot", item.key);
        }
        assert_eq!(manager.len(), 4);
    }
}
